use bigdecimal::num_bigint::{BigInt, Sign, ToBigInt};
use bigdecimal::BigDecimal;
use primitive_types::U256;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::error::NumError;
use super::params::MAX_DECIMAL_WIDTH;

/// Checks the raw shape of a protocol number: ASCII digits, with at most
/// one interior dot when `allow_dot` is set. Signs, exponents, spaces and
/// bare dots are all rejected; leading zeros are fine.
pub fn is_positive_decimal(s: &str, allow_dot: bool) -> bool {
  if s.is_empty() {
    return false;
  }
  let mut dot_seen = false;
  for (i, byte) in s.bytes().enumerate() {
    match byte {
      b'0'..=b'9' => {}
      b'.' if allow_dot && !dot_seen && i != 0 && i != s.len() - 1 => dot_seen = true,
      _ => return false,
    }
  }
  true
}

/// Arbitrary-precision decimal used while a protocol number is parsed
/// and scaled; amounts leave this type as [`U256`] once normalized.
#[derive(PartialEq, PartialOrd, Debug, Clone)]
pub struct Num(BigDecimal);

impl Num {
  pub fn checked_add(&self, other: &Num) -> Result<Self, NumError> {
    Ok(Self(self.0.clone() + &other.0))
  }

  pub fn checked_sub(&self, other: &Num) -> Result<Self, NumError> {
    if self.0 < other.0 {
      return Err(NumError::Overflow {
        op: String::from("checked_sub"),
        org: self.clone(),
        other: other.clone(),
      });
    }
    Ok(Self(self.0.clone() - &other.0))
  }

  pub fn checked_mul(&self, other: &Num) -> Result<Self, NumError> {
    Ok(Self(self.0.clone() * &other.0))
  }

  /// Number of fractional digits, trailing zeros included.
  pub fn scale(&self) -> i64 {
    let (_, scale) = self.0.as_bigint_and_exponent();
    scale
  }

  pub fn checked_to_u256(&self) -> Result<U256, NumError> {
    if !self.0.is_integer() {
      return Err(NumError::InvalidInteger(self.clone()));
    }
    let int = self
      .0
      .to_bigint()
      .ok_or_else(|| NumError::InvalidInteger(self.clone()))?;
    let (sign, bytes) = int.to_bytes_be();
    if sign == Sign::Minus || bytes.len() > 32 {
      return Err(NumError::Overflow {
        op: String::from("to_u256"),
        org: self.clone(),
        other: Num::from(U256::MAX),
      });
    }
    Ok(U256::from_big_endian(&bytes))
  }
}

impl From<U256> for Num {
  fn from(n: U256) -> Self {
    let mut bytes = [0u8; 32];
    n.to_big_endian(&mut bytes);
    Self(BigDecimal::from(BigInt::from_bytes_be(Sign::Plus, &bytes)))
  }
}

impl From<u64> for Num {
  fn from(n: u64) -> Self {
    Self(BigDecimal::from(n))
  }
}

impl FromStr for Num {
  type Err = NumError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.starts_with('.') || s.ends_with('.') || s.find(&['e', 'E', '+', '-']).is_some() {
      return Err(NumError::InvalidNum(s.to_string()));
    }
    let num = BigDecimal::from_str(s).map_err(|_| NumError::InvalidNum(s.to_string()))?;

    let (_, scale) = num.as_bigint_and_exponent();
    if scale > i64::from(MAX_DECIMAL_WIDTH) {
      return Err(NumError::InvalidNum(s.to_string()));
    }

    Ok(Self(num))
  }
}

impl Display for Num {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    self.0.fmt(f)
  }
}

/// Parses a protocol amount and normalizes it to 18-decimal fixed point.
///
/// Fails when the fractional part carries more digits than the tick's
/// `decimals`, when `decimals` exceeds 18, or when the scaled result does
/// not fit 256 bits.
pub fn extended_to_18_decimals(s: &str, decimals: u8) -> Result<U256, NumError> {
  if decimals > MAX_DECIMAL_WIDTH {
    return Err(NumError::DecimalsOutOfRange(decimals));
  }
  let amount = Num::from_str(s)?;
  if amount.scale() > i64::from(decimals) {
    return Err(NumError::ExcessPrecision(amount, decimals));
  }
  amount
    .checked_mul(&Num::from(U256::exp10(usize::from(MAX_DECIMAL_WIDTH))))?
    .checked_to_u256()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_is_positive_decimal() {
    assert!(is_positive_decimal("0", false));
    assert!(is_positive_decimal("001", false));
    assert!(is_positive_decimal("1000", false));
    assert!(is_positive_decimal("1.5", true));
    assert!(is_positive_decimal("00.100", true));

    assert!(!is_positive_decimal("", true));
    assert!(!is_positive_decimal("1.5", false));
    assert!(!is_positive_decimal(".5", true));
    assert!(!is_positive_decimal("5.", true));
    assert!(!is_positive_decimal("1.2.3", true));
    assert!(!is_positive_decimal("-1", true));
    assert!(!is_positive_decimal("+1", true));
    assert!(!is_positive_decimal("1e2", true));
    assert!(!is_positive_decimal(" 1", true));
    assert!(!is_positive_decimal("1 ", true));
  }

  #[test]
  fn test_num_from_str() {
    assert_eq!(Num::from_str("001").unwrap(), Num::from(1u64));
    assert!(Num::from_str(".1").is_err());
    assert!(Num::from_str("1.").is_err());
    assert!(Num::from_str("-1.1").is_err());
    assert!(Num::from_str("1e2").is_err());
    assert!(Num::from_str("100E2").is_err());
    assert!(Num::from_str("").is_err());
    assert!(Num::from_str(" 123").is_err());

    // at most 18 fractional digits.
    assert!(Num::from_str("1.000000000000000001").is_ok());
    assert!(Num::from_str("1.0000000000000000001").is_err());
  }

  #[test]
  fn test_num_checked_sub_underflow() {
    let three = Num::from_str("3").unwrap();
    let one = Num::from_str("1").unwrap();
    assert_eq!(three.checked_sub(&one).unwrap(), Num::from(2u64));
    assert!(one.checked_sub(&three).is_err());
  }

  #[test]
  fn test_checked_to_u256() {
    assert_eq!(
      Num::from_str("42").unwrap().checked_to_u256().unwrap(),
      U256::from(42u64)
    );
    assert_eq!(
      Num::from(U256::MAX).checked_to_u256().unwrap(),
      U256::MAX
    );
    assert!(matches!(
      Num::from_str("1.5").unwrap().checked_to_u256(),
      Err(NumError::InvalidInteger(_))
    ));
    let too_big = Num::from(U256::MAX)
      .checked_add(&Num::from(1u64))
      .unwrap();
    assert!(matches!(
      too_big.checked_to_u256(),
      Err(NumError::Overflow { .. })
    ));
  }

  #[test]
  fn test_extended_to_18_decimals() {
    assert_eq!(
      extended_to_18_decimals("1000", 18).unwrap(),
      U256::from(1000u64) * U256::exp10(18)
    );
    assert_eq!(
      extended_to_18_decimals("1.5", 1).unwrap(),
      U256::from(15u64) * U256::exp10(17)
    );
    // trailing zeros count as precision.
    assert_eq!(
      extended_to_18_decimals("1.100", 3).unwrap(),
      U256::from(11u64) * U256::exp10(17)
    );
    assert!(matches!(
      extended_to_18_decimals("1.100", 2),
      Err(NumError::ExcessPrecision(..))
    ));
    assert!(matches!(
      extended_to_18_decimals("1.5", 0),
      Err(NumError::ExcessPrecision(..))
    ));
    assert!(matches!(
      extended_to_18_decimals("1", 19),
      Err(NumError::DecimalsOutOfRange(19))
    ));
    // u64::MAX whole tokens still fit.
    assert_eq!(
      extended_to_18_decimals(&u64::MAX.to_string(), 18).unwrap(),
      U256::from(u64::MAX) * U256::exp10(18)
    );
  }
}

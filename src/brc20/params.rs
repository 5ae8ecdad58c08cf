use once_cell::sync::Lazy;
use primitive_types::U256;
use std::env;

pub const MAX_DECIMAL_WIDTH: u8 = 18;
pub const TICK_BYTE_COUNT: usize = 4;
/// Tick width introduced by the self-mint extension.
pub const SELF_MINT_TICK_BYTE_COUNT: usize = 5;

/// Ceiling override, in 18-decimal atomic units.
pub const AMOUNT_UPPER_LIMIT_ENV: &str = "BRC20_AMOUNT_UPPER_LIMIT";
pub const SELF_MINT_ENV: &str = "BRC20_SELF_MINT";

static AMOUNT_UPPER_LIMIT: Lazy<U256> = Lazy::new(|| {
  if let Ok(raw) = env::var(AMOUNT_UPPER_LIMIT_ENV) {
    match U256::from_dec_str(&raw) {
      Ok(limit) => return limit,
      Err(err) => log::warn!("ignoring malformed {AMOUNT_UPPER_LIMIT_ENV}={raw}: {err}"),
    }
  }
  default_amount_upper_limit()
});

/// The protocol ceiling is u64::MAX whole tokens, normalized to 18
/// decimals.
pub fn default_amount_upper_limit() -> U256 {
  U256::from(u64::MAX) * U256::exp10(18)
}

/// Interpreter tunables, read from the environment once per process and
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
  /// Ceiling applied to max supply, per-mint limit, and any single
  /// amount, in 18-decimal atomic units.
  pub upper_limit: U256,
  /// Accept 5-byte ticks. The key scheme handles both widths
  /// unconditionally; this gate only widens what the interpreter lets
  /// through.
  pub self_mint_enabled: bool,
}

impl Config {
  pub fn from_env() -> Self {
    Self {
      upper_limit: *AMOUNT_UPPER_LIMIT,
      self_mint_enabled: env::var(SELF_MINT_ENV).map_or(false, |v| v == "1" || v == "true"),
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      upper_limit: default_amount_upper_limit(),
      self_mint_enabled: false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_upper_limit() {
    let limit = default_amount_upper_limit();
    assert_eq!(limit % U256::exp10(18), U256::zero());
    assert_eq!(limit / U256::exp10(18), U256::from(u64::MAX));
  }

  #[test]
  fn test_default_config_rejects_self_mint() {
    assert!(!Config::default().self_mint_enabled);
  }
}

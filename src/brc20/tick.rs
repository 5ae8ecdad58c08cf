use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use super::error::BRC20Error;
use super::params::{SELF_MINT_TICK_BYTE_COUNT, TICK_BYTE_COUNT};

/// A normalized (lowercased) token ticker.
///
/// The protocol baseline is exactly 4 bytes; the self-mint extension
/// adds 5-byte tickers behind an explicit gate. Length is measured after
/// lowercasing, in bytes, so multi-byte characters count at their UTF-8
/// width.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tick(String);

impl Tick {
  pub fn parse(raw: &str, self_mint_enabled: bool) -> Result<Self, BRC20Error> {
    let lower = raw.to_lowercase();
    let len = lower.as_bytes().len();
    if len == TICK_BYTE_COUNT || (self_mint_enabled && len == SELF_MINT_TICK_BYTE_COUNT) {
      Ok(Self(lower))
    } else {
      Err(BRC20Error::InvalidTickLen(len))
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn as_bytes(&self) -> &[u8] {
    self.0.as_bytes()
  }
}

impl Display for Tick {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    self.0.fmt(f)
  }
}

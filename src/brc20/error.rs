use super::num::Num;

/// Protocol-level rejection of one inscription. Every variant means the
/// record is a no-op: the interpreter logs it at debug level and moves
/// on, because invalid inscriptions are defined as no-ops and consensus
/// requires bit-identical handling across implementations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BRC20Error {
  #[error("num error: {0}")]
  Num(#[from] NumError),

  #[error("invalid amount: {0}")]
  InvalidAmount(String),

  #[error("amount out of range: {0}")]
  AmountOutOfRange(String),

  #[error("invalid decimals: {0}")]
  InvalidDecimals(String),

  #[error("invalid tick length: {0}")]
  InvalidTickLen(usize),

  #[error("tick already deployed: {0}")]
  DuplicateTick(String),

  #[error("tick not deployed: {0}")]
  TickNotDeployed(String),

  #[error("tick minted out: {0}")]
  MintedOut(String),

  #[error("mint amount exceeds the per-mint limit: {0}")]
  MintAmountExceedsLimit(String),

  #[error("insufficient available balance: {available} < {required}")]
  InsufficientBalance { available: String, required: String },

  #[error("transfer inscription already used or invalid: {0}")]
  TransferInscriptionUnusable(String),
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum JSONError {
  #[error("invalid json")]
  InvalidJson,

  #[error("parse operation json error: {0}")]
  ParseOperationJsonError(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NumError {
  #[error("{op} overflow: original: {org}, other: {other}")]
  Overflow { op: String, org: Num, other: Num },

  #[error("invalid integer {0}")]
  InvalidInteger(Num),

  #[error("invalid number: {0}")]
  InvalidNum(String),

  #[error("decimals out of range: {0}")]
  DecimalsOutOfRange(u8),

  #[error("{0} has more than {1} fractional digits")]
  ExcessPrecision(Num, u8),
}

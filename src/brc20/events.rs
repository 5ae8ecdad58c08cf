use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::tick::Tick;

/// Outcome of one accepted inscription. Receipts are derived data only:
/// they are returned to the caller, never written to committed state, so
/// they carry no consensus weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
  pub inscription_id: String,
  pub event: BRC20Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BRC20Event {
  Deploy(DeployEvent),
  Mint(MintEvent),
  InscribeTransfer(InscribeTransferEvent),
  Transfer(TransferEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployEvent {
  pub tick: Tick,
  pub max_supply: U256,
  pub limit_per_mint: U256,
  pub decimals: u8,
  pub deploy_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintEvent {
  pub tick: Tick,
  pub to_pkscript: String,
  pub amount: U256,
  /// Set when the amount was clipped to the remaining supply.
  pub msg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InscribeTransferEvent {
  pub tick: Tick,
  pub source_pkscript: String,
  pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferEvent {
  pub tick: Tick,
  pub source_pkscript: String,
  /// Empty when the inscription was spent as fee and the reservation
  /// returned to the source.
  pub to_pkscript: Option<String>,
  pub amount: U256,
  pub sent_as_fee: bool,
}

use sha3::{Digest, Keccak224};

use super::tick::Tick;
use crate::state::{Key, KEY_SIZE};

/// State-keyspace domain separators. The discriminator that precedes the
/// separator is empty for tick registry entries, the decoded wallet for
/// wallet balances, and the hex pkscript for pkscript balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StateId {
  AvailableBalancePkscript = 0,
  AvailableBalanceWallet = 1,
  OverallBalancePkscript = 2,
  OverallBalanceWallet = 3,
  TickExists = 4,
  RemainingSupply = 5,
  MaxSupply = 6,
  LimitPerMint = 7,
  Decimals = 8,
}

/// Event-keyspace domain separators, one record group per inscription id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventId {
  TransferInscribeSourceWallet = 0,
  TransferInscribeSourcePkscript1 = 1,
  TransferInscribeSourcePkscript2 = 2,
  TransferTransferCount = 3,
  TransferInscribeCount = 4,
}

/// 32-byte state key: a keccak-224 prefix of the discriminator, then the
/// state id, then the plaintext tick. The separator sits immediately
/// before the tick so the two keyspaces cannot collide while the tick
/// stays human-inspectable.
///
/// Panics on any tick width other than 4 or 5 bytes; reaching this with
/// an unchecked tick is an interpreter bug.
pub fn state_key(state_id: StateId, unique_id: &[u8], tick: &Tick) -> Key {
  let digest = Keccak224::digest(unique_id);
  let tick_bytes = tick.as_bytes();
  let mut key = [0u8; KEY_SIZE];
  match tick_bytes.len() {
    4 => {
      key[..27].copy_from_slice(&digest[..27]);
      key[27] = state_id as u8;
      key[28..].copy_from_slice(tick_bytes);
    }
    5 => {
      key[..26].copy_from_slice(&digest[..26]);
      key[26] = state_id as u8;
      key[27..].copy_from_slice(tick_bytes);
    }
    other => panic!("tick must be 4 or 5 bytes, got {other}"),
  }
  key
}

/// 32-byte event key: the 4-byte event id, then keccak-224 of the
/// inscription id.
pub fn event_key(event_id: EventId, inscription_id: &str) -> Key {
  let digest = Keccak224::digest(inscription_id.as_bytes());
  let mut key = [0u8; KEY_SIZE];
  key[0] = event_id as u8;
  key[4..].copy_from_slice(&digest);
  key
}

/// The five registry keys of one tick.
pub struct TickStatusKeys {
  pub exists: Key,
  pub remaining_supply: Key,
  pub max_supply: Key,
  pub limit_per_mint: Key,
  pub decimals: Key,
}

pub fn tick_status_keys(tick: &Tick) -> TickStatusKeys {
  TickStatusKeys {
    exists: state_key(StateId::TickExists, b"", tick),
    remaining_supply: state_key(StateId::RemainingSupply, b"", tick),
    max_supply: state_key(StateId::MaxSupply, b"", tick),
    limit_per_mint: state_key(StateId::LimitPerMint, b"", tick),
    decimals: state_key(StateId::Decimals, b"", tick),
  }
}

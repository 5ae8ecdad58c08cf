use primitive_types::U256;
use std::time::Instant;

use super::error::BRC20Error;
use super::events::{
  BRC20Event, DeployEvent, InscribeTransferEvent, MintEvent, Receipt, TransferEvent,
};
use super::keys::{event_key, state_key, tick_status_keys, EventId, StateId};
use super::num::{extended_to_18_decimals, is_positive_decimal};
use super::operation::{deserialize_brc20, Deploy, Mint, Operation, Transfer};
use super::params::{Config, MAX_DECIMAL_WIDTH};
use super::tick::Tick;
use crate::address::decode_address;
use crate::getter::OrdTransfer;
use crate::state::{AuthenticatedMap, StateHeader, Value, VALUE_SIZE};

/// The BRC-20 interpreter: a deterministic fold of one block's ordinal
/// transfers over the committed store.
///
/// All reads observe committed state only; every new value is computed
/// from threaded arguments and staged, so the caller decides when the
/// block's writes become visible by paging the store.
pub struct BRC20Updater<'a, T: AuthenticatedMap> {
  state: &'a mut StateHeader<T>,
  config: &'a Config,
}

impl<'a, T: AuthenticatedMap> BRC20Updater<'a, T> {
  pub fn new(state: &'a mut StateHeader<T>, config: &'a Config) -> Self {
    Self { state, config }
  }

  /// Applies one block of transfers, in the exact order given. Invalid
  /// records are skipped without effect; each accepted record yields a
  /// receipt.
  pub fn index_block(&mut self, transfers: &[OrdTransfer]) -> Vec<Receipt> {
    let start = Instant::now();
    let mut receipts = Vec::new();
    for transfer in transfers {
      let Some((tick, operation)) = resolve_operation(transfer, self.config.self_mint_enabled)
      else {
        continue;
      };
      let result = match operation {
        Operation::Deploy(deploy) if transfer.old_satpoint.is_empty() => {
          self.process_deploy(transfer, &tick, deploy)
        }
        Operation::Mint(mint) if transfer.old_satpoint.is_empty() => {
          self.process_mint(transfer, &tick, mint)
        }
        Operation::Transfer(op) => self.process_transfer(transfer, &tick, op),
        // a moved deploy or mint inscription carries no meaning.
        _ => {
          log::debug!(
            "skipping inscription {}: moved deploy or mint inscription",
            transfer.inscription_id
          );
          continue;
        }
      };
      match result {
        Ok(event) => receipts.push(Receipt {
          inscription_id: transfer.inscription_id.clone(),
          event,
        }),
        Err(err) => log::debug!("skipping inscription {}: {err}", transfer.inscription_id),
      }
    }
    log::info!(
      "indexed {} ordinal transfers into {} receipts above height {} in {} ms",
      transfers.len(),
      receipts.len(),
      self.state.height(),
      start.elapsed().as_millis(),
    );
    receipts
  }

  fn process_deploy(
    &mut self,
    transfer: &OrdTransfer,
    tick: &Tick,
    deploy: Deploy,
  ) -> Result<BRC20Event, BRC20Error> {
    let keys = tick_status_keys(tick);
    if self.state.get(&keys.exists).is_some() {
      return Err(BRC20Error::DuplicateTick(tick.to_string()));
    }

    let decimals = match &deploy.decimals {
      None => MAX_DECIMAL_WIDTH,
      Some(raw) => {
        if !is_positive_decimal(raw, false) {
          return Err(BRC20Error::InvalidDecimals(raw.clone()));
        }
        raw
          .parse::<u8>()
          .map_err(|_| BRC20Error::InvalidDecimals(raw.clone()))?
      }
    };
    if decimals > MAX_DECIMAL_WIDTH {
      return Err(BRC20Error::InvalidDecimals(decimals.to_string()));
    }

    if !is_positive_decimal(&deploy.max_supply, true) {
      return Err(BRC20Error::InvalidAmount(deploy.max_supply.clone()));
    }
    let max_supply = extended_to_18_decimals(&deploy.max_supply, decimals)?;
    if max_supply.is_zero() || max_supply > self.config.upper_limit {
      return Err(BRC20Error::AmountOutOfRange(deploy.max_supply.clone()));
    }

    let limit_per_mint = match &deploy.mint_limit {
      None => max_supply,
      Some(raw) => {
        if !is_positive_decimal(raw, true) {
          return Err(BRC20Error::InvalidAmount(raw.clone()));
        }
        let limit = extended_to_18_decimals(raw, decimals)?;
        if limit.is_zero() || limit > self.config.upper_limit {
          return Err(BRC20Error::AmountOutOfRange(raw.clone()));
        }
        limit
      }
    };

    // presence of any value under the exists key marks deployment; the
    // numeric content is irrelevant.
    self.state.insert_u256(&keys.exists, U256::zero());
    self.state.insert_u256(&keys.remaining_supply, max_supply);
    self.state.insert_u256(&keys.max_supply, max_supply);
    self.state.insert_u256(&keys.limit_per_mint, limit_per_mint);
    self.state.insert_u256(&keys.decimals, U256::from(decimals));

    Ok(BRC20Event::Deploy(DeployEvent {
      tick: tick.clone(),
      max_supply,
      limit_per_mint,
      decimals,
      deploy_by: transfer.new_pkscript.clone(),
    }))
  }

  fn process_mint(
    &mut self,
    transfer: &OrdTransfer,
    tick: &Tick,
    mint: Mint,
  ) -> Result<BRC20Event, BRC20Error> {
    let keys = tick_status_keys(tick);
    if self.state.get(&keys.exists).is_none() {
      return Err(BRC20Error::TickNotDeployed(tick.to_string()));
    }
    let remaining_supply = self.state.get_u256(&keys.remaining_supply);
    let limit_per_mint = self.state.get_u256(&keys.limit_per_mint);
    let decimals = self.state.get_u256(&keys.decimals).low_u64() as u8;

    if !is_positive_decimal(&mint.amount, true) {
      return Err(BRC20Error::InvalidAmount(mint.amount.clone()));
    }
    let mut amount = extended_to_18_decimals(&mint.amount, decimals)?;
    if amount.is_zero() || amount > self.config.upper_limit {
      return Err(BRC20Error::AmountOutOfRange(mint.amount.clone()));
    }
    if remaining_supply.is_zero() {
      return Err(BRC20Error::MintedOut(tick.to_string()));
    }
    if amount > limit_per_mint {
      return Err(BRC20Error::MintAmountExceedsLimit(mint.amount.clone()));
    }

    let mut msg = None;
    if amount > remaining_supply {
      msg = Some(format!(
        "amount clipped to the remaining supply: {remaining_supply}"
      ));
      amount = remaining_supply;
    }

    self.mint_inscribe(transfer, tick, amount);

    Ok(BRC20Event::Mint(MintEvent {
      tick: tick.clone(),
      to_pkscript: transfer.new_pkscript.clone(),
      amount,
      msg,
    }))
  }

  fn mint_inscribe(&mut self, transfer: &OrdTransfer, tick: &Tick, amount: U256) {
    let wallet = decode_address(&transfer.new_wallet);
    let pkscript = transfer.new_pkscript.as_bytes();

    let available_key = state_key(StateId::AvailableBalancePkscript, pkscript, tick);
    let overall_key = state_key(StateId::OverallBalancePkscript, pkscript, tick);
    let new_available = self.state.get_u256(&available_key).overflowing_add(amount).0;
    let new_overall = self.state.get_u256(&overall_key).overflowing_add(amount).0;
    self.state.insert_u256(&available_key, new_available);
    self.state.insert_u256(&overall_key, new_overall);

    // the wallet keyspace mirrors the pkscript keyspace slot for slot.
    let available_key = state_key(StateId::AvailableBalanceWallet, &wallet, tick);
    let overall_key = state_key(StateId::OverallBalanceWallet, &wallet, tick);
    self.state.insert_u256(&available_key, new_available);
    self.state.insert_u256(&overall_key, new_overall);

    let keys = tick_status_keys(tick);
    let remaining = self.state.get_u256(&keys.remaining_supply);
    self
      .state
      .insert_u256(&keys.remaining_supply, remaining.overflowing_sub(amount).0);
  }

  fn process_transfer(
    &mut self,
    transfer: &OrdTransfer,
    tick: &Tick,
    op: Transfer,
  ) -> Result<BRC20Event, BRC20Error> {
    let keys = tick_status_keys(tick);
    if self.state.get(&keys.exists).is_none() {
      return Err(BRC20Error::TickNotDeployed(tick.to_string()));
    }
    let decimals = self.state.get_u256(&keys.decimals).low_u64() as u8;

    if !is_positive_decimal(&op.amount, true) {
      return Err(BRC20Error::InvalidAmount(op.amount.clone()));
    }
    let amount = extended_to_18_decimals(&op.amount, decimals)?;
    if amount.is_zero() || amount > self.config.upper_limit {
      return Err(BRC20Error::AmountOutOfRange(op.amount.clone()));
    }

    if transfer.old_satpoint.is_empty() {
      let available_key = state_key(
        StateId::AvailableBalancePkscript,
        transfer.new_pkscript.as_bytes(),
        tick,
      );
      let available = self.state.get_u256(&available_key);
      if available < amount {
        return Err(BRC20Error::InsufficientBalance {
          available: available.to_string(),
          required: amount.to_string(),
        });
      }
      self.transfer_inscribe(transfer, tick, amount, available);
      Ok(BRC20Event::InscribeTransfer(InscribeTransferEvent {
        tick: tick.clone(),
        source_pkscript: transfer.new_pkscript.clone(),
        amount,
      }))
    } else {
      if self.is_used_or_invalid(&transfer.inscription_id) {
        return Err(BRC20Error::TransferInscriptionUnusable(
          transfer.inscription_id.clone(),
        ));
      }
      let event = if transfer.sent_as_fee {
        self.transfer_spend_to_fee(transfer, tick, amount)
      } else {
        self.transfer_spend(transfer, tick, amount)
      };
      Ok(BRC20Event::Transfer(event))
    }
  }

  /// Reserves the amount behind the inscription: available drops on both
  /// balance keyspaces, overall stays put, and the source is recorded so
  /// the spend can find it.
  fn transfer_inscribe(
    &mut self,
    transfer: &OrdTransfer,
    tick: &Tick,
    amount: U256,
    available: U256,
  ) {
    let wallet = decode_address(&transfer.new_wallet);
    let new_available = available.overflowing_sub(amount).0;
    self.state.insert_u256(
      &state_key(StateId::AvailableBalanceWallet, &wallet, tick),
      new_available,
    );
    self.state.insert_u256(
      &state_key(
        StateId::AvailableBalancePkscript,
        transfer.new_pkscript.as_bytes(),
        tick,
      ),
      new_available,
    );

    self.save_source(transfer, &wallet);

    let count_key = event_key(EventId::TransferInscribeCount, &transfer.inscription_id);
    let count = self.state.get_u256(&count_key).overflowing_add(U256::one()).0;
    self.state.insert_u256(&count_key, count);
  }

  /// Fee spend: the reservation flows back to the source; overall is
  /// untouched.
  fn transfer_spend_to_fee(
    &mut self,
    transfer: &OrdTransfer,
    tick: &Tick,
    amount: U256,
  ) -> TransferEvent {
    let (wallet, pkscript) = self.load_source(&transfer.inscription_id);

    let available_key = state_key(StateId::AvailableBalanceWallet, &wallet, tick);
    let new_available = self.state.get_u256(&available_key).overflowing_add(amount).0;
    self.state.insert_u256(&available_key, new_available);
    self.state.insert_u256(
      &state_key(StateId::AvailableBalancePkscript, pkscript.as_bytes(), tick),
      new_available,
    );

    self.bump_transfer_count(&transfer.inscription_id);

    TransferEvent {
      tick: tick.clone(),
      source_pkscript: pkscript,
      to_pkscript: None,
      amount,
      sent_as_fee: true,
    }
  }

  /// Normal spend: the reserved amount leaves the source's overall
  /// balance and lands fully spendable at the receiver.
  fn transfer_spend(&mut self, transfer: &OrdTransfer, tick: &Tick, amount: U256) -> TransferEvent {
    let receiver_wallet = decode_address(&transfer.new_wallet);
    let (source_wallet, source_pkscript) = self.load_source(&transfer.inscription_id);

    let overall_key = state_key(StateId::OverallBalanceWallet, &source_wallet, tick);
    let new_source_overall = self.state.get_u256(&overall_key).overflowing_sub(amount).0;
    self.state.insert_u256(&overall_key, new_source_overall);
    self.state.insert_u256(
      &state_key(
        StateId::OverallBalancePkscript,
        source_pkscript.as_bytes(),
        tick,
      ),
      new_source_overall,
    );

    let available_key = state_key(StateId::AvailableBalanceWallet, &receiver_wallet, tick);
    let overall_key = state_key(StateId::OverallBalanceWallet, &receiver_wallet, tick);
    let new_available = self.state.get_u256(&available_key).overflowing_add(amount).0;
    let new_overall = self.state.get_u256(&overall_key).overflowing_add(amount).0;
    self.state.insert_u256(&available_key, new_available);
    self.state.insert_u256(&overall_key, new_overall);
    self.state.insert_u256(
      &state_key(
        StateId::AvailableBalancePkscript,
        transfer.new_pkscript.as_bytes(),
        tick,
      ),
      new_available,
    );
    self.state.insert_u256(
      &state_key(
        StateId::OverallBalancePkscript,
        transfer.new_pkscript.as_bytes(),
        tick,
      ),
      new_overall,
    );

    self.bump_transfer_count(&transfer.inscription_id);

    TransferEvent {
      tick: tick.clone(),
      source_pkscript,
      to_pkscript: Some(transfer.new_pkscript.clone()),
      amount,
      sent_as_fee: false,
    }
  }

  /// An inscription is spendable as a transfer only in the reserved
  /// state: inscribed exactly once and never spent. Both counters are
  /// monotone, so a duplicate inscribe poisons the id permanently.
  fn is_used_or_invalid(&self, inscription_id: &str) -> bool {
    let inscribe_count = self
      .state
      .get_u256(&event_key(EventId::TransferInscribeCount, inscription_id));
    let transfer_count = self
      .state
      .get_u256(&event_key(EventId::TransferTransferCount, inscription_id));
    inscribe_count != U256::one() || !transfer_count.is_zero()
  }

  fn bump_transfer_count(&mut self, inscription_id: &str) {
    let count_key = event_key(EventId::TransferTransferCount, inscription_id);
    let count = self.state.get_u256(&count_key).overflowing_add(U256::one()).0;
    self.state.insert_u256(&count_key, count);
  }

  /// Persists the decoded source wallet and the length-prefixed pkscript
  /// under the inscription's event keys. The pkscript prefix byte holds
  /// the hex length in nibbles; an odd hex string gains a trailing zero
  /// nibble before packing.
  fn save_source(&mut self, transfer: &OrdTransfer, wallet: &Value) {
    self.state.insert(
      &event_key(
        EventId::TransferInscribeSourceWallet,
        &transfer.inscription_id,
      ),
      wallet,
    );

    let mut pkscript_hex = transfer.new_pkscript.clone();
    let nibbles = pkscript_hex.len();
    if nibbles % 2 == 1 {
      pkscript_hex.push('0');
    }
    let mut encoded = vec![nibbles as u8];
    encoded.extend(hex::decode(&pkscript_hex).unwrap_or_default());

    let first = pad_slot(&encoded[..encoded.len().min(VALUE_SIZE)]);
    self.state.insert(
      &event_key(
        EventId::TransferInscribeSourcePkscript1,
        &transfer.inscription_id,
      ),
      &first,
    );
    if encoded.len() > VALUE_SIZE {
      let second = pad_slot(&encoded[VALUE_SIZE..]);
      self.state.insert(
        &event_key(
          EventId::TransferInscribeSourcePkscript2,
          &transfer.inscription_id,
        ),
        &second,
      );
    }
  }

  fn load_source(&self, inscription_id: &str) -> (Value, String) {
    let wallet = self
      .state
      .get(&event_key(
        EventId::TransferInscribeSourceWallet,
        inscription_id,
      ))
      .unwrap_or_default();

    let mut packed = Vec::new();
    if let Some(slot) = self.state.get(&event_key(
      EventId::TransferInscribeSourcePkscript1,
      inscription_id,
    )) {
      packed.extend_from_slice(&slot);
    }
    if let Some(slot) = self.state.get(&event_key(
      EventId::TransferInscribeSourcePkscript2,
      inscription_id,
    )) {
      packed.extend_from_slice(&slot);
    }
    let nibbles = packed.first().copied().unwrap_or_default() as usize;
    let mut pkscript = hex::encode(&packed[1.min(packed.len())..]);
    pkscript.truncate(nibbles);
    (wallet, pkscript)
  }
}

/// Preprocessing of one raw record: fee-inscription and content-type
/// gates, optional hex unwrapping of the content type, payload decoding,
/// and tick normalization. `None` means the record is not a BRC-20
/// action; the reason is logged at debug level.
fn resolve_operation(transfer: &OrdTransfer, self_mint_enabled: bool) -> Option<(Tick, Operation)> {
  if transfer.sent_as_fee && transfer.old_satpoint.is_empty() {
    log::debug!(
      "skipping inscription {}: inscribed directly as fee",
      transfer.inscription_id
    );
    return None;
  }
  if transfer.content_type.is_empty() {
    log::debug!(
      "skipping inscription {}: empty content type",
      transfer.inscription_id
    );
    return None;
  }
  let content_type = match hex::decode(&transfer.content_type) {
    Ok(decoded) => String::from_utf8_lossy(&decoded).into_owned(),
    Err(_) => transfer.content_type.clone(),
  };
  let media = content_type.split(';').next().unwrap_or_default();
  if media != "application/json" && media != "text/plain" {
    log::debug!(
      "skipping inscription {}: unsupported media {media}",
      transfer.inscription_id
    );
    return None;
  }
  let operation = match deserialize_brc20(&transfer.content) {
    Ok(operation) => operation,
    Err(err) => {
      log::debug!("skipping inscription {}: {err}", transfer.inscription_id);
      return None;
    }
  };
  let tick = match Tick::parse(operation.tick(), self_mint_enabled) {
    Ok(tick) => tick,
    Err(err) => {
      log::debug!("skipping inscription {}: {err}", transfer.inscription_id);
      return None;
    }
  };
  Some((tick, operation))
}

fn pad_slot(bytes: &[u8]) -> Value {
  assert!(
    bytes.len() <= VALUE_SIZE,
    "pkscript fragment of {} bytes does not fit a value slot",
    bytes.len()
  );
  let mut slot = [0u8; VALUE_SIZE];
  slot[..bytes.len()].copy_from_slice(bytes);
  slot
}

use anyhow::Context;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AuthenticatedMap, Key, Value, KEY_SIZE, NODE_WIDTH, STEM_SIZE, VALUE_SIZE};
use crate::getter::OrdGetter;
use crate::Result;

/// Flat mirror of the authenticated tree. Ordered, so the snapshot
/// encoding is deterministic.
pub type KeyValueMap = BTreeMap<Key, Value>;

/// One staged write. `old_value` is the committed value at staging time;
/// `old_exists` distinguishes an absent key from a present all-zero slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
  pub key: Key,
  pub old_value: Value,
  pub new_value: Value,
  pub old_exists: bool,
}

/// The committed key-value store: an authenticated map, its flat mirror,
/// and the pending write log of the block in progress.
///
/// Writes are staged in the log and only reach the tree and the mirror
/// when [`StateHeader::page`] runs. Reads always return the committed
/// value; a record that needs its own earlier write must thread the
/// freshly computed value through arguments instead of reading it back.
/// Changing that rule silently alters visible state within a batch.
pub struct StateHeader<T> {
  root: T,
  kv: KeyValueMap,
  temp: Vec<DiffEntry>,
  height: u32,
  hash: String,
}

impl<T: AuthenticatedMap> StateHeader<T> {
  pub fn new(root: T, height: u32, hash: String) -> Self {
    Self {
      root,
      kv: KeyValueMap::new(),
      temp: Vec::new(),
      height,
      hash,
    }
  }

  /// Stages a write of one value slot. Committed state is untouched until
  /// the next [`StateHeader::page`].
  pub fn insert(&mut self, key: &[u8], value: &[u8]) {
    if key.len() != KEY_SIZE {
      panic!("key must be {KEY_SIZE} bytes, got {}", key.len());
    }
    if value.len() != VALUE_SIZE {
      panic!("value must be {VALUE_SIZE} bytes, got {}", value.len());
    }
    let key: Key = key.try_into().unwrap();
    let new_value: Value = value.try_into().unwrap();
    let committed = self.root.get(&key);
    self.temp.push(DiffEntry {
      key,
      old_value: committed.unwrap_or_default(),
      new_value,
      old_exists: committed.is_some(),
    });
  }

  /// Reads the committed value of a slot. Staged writes are not visible.
  pub fn get(&self, key: &[u8]) -> Option<Value> {
    if key.len() != KEY_SIZE {
      panic!("key must be {KEY_SIZE} bytes, got {}", key.len());
    }
    let key: Key = key.try_into().unwrap();
    self.root.get(&key)
  }

  pub fn insert_u256(&mut self, key: &[u8], value: U256) {
    let mut slot = [0u8; VALUE_SIZE];
    value.to_big_endian(&mut slot);
    self.insert(key, &slot);
  }

  /// Big-endian decode of a slot; an absent key reads as zero.
  pub fn get_u256(&self, key: &[u8]) -> U256 {
    match self.get(key) {
      Some(value) => U256::from_big_endian(&value),
      None => U256::zero(),
    }
  }

  /// Stages a variable-length blob under a stem: the slot at `stem_key`
  /// holds the occupied slot count, payload slot `i` lives at the stem
  /// key with its final byte incremented by `i + 1`.
  pub fn insert_bytes(&mut self, stem_key: &[u8], value: &[u8]) {
    if stem_key.len() != KEY_SIZE {
      panic!("key must be {KEY_SIZE} bytes, got {}", stem_key.len());
    }
    let suffix = stem_key[STEM_SIZE] as usize;
    let capacity = (NODE_WIDTH - suffix).saturating_sub(1) * VALUE_SIZE;
    if value.len() > capacity {
      panic!(
        "blob of {} bytes exceeds the {capacity} byte budget at suffix {suffix}",
        value.len()
      );
    }
    let required_slots = (value.len() + VALUE_SIZE - 1) / VALUE_SIZE;
    self.insert_u256(stem_key, U256::from(required_slots));

    let mut slot_key: Key = stem_key.try_into().unwrap();
    let mut slot = [0u8; VALUE_SIZE];
    for (i, chunk) in value.chunks(VALUE_SIZE).enumerate() {
      slot_key[STEM_SIZE] = stem_key[STEM_SIZE] + i as u8 + 1;
      slot.fill(0);
      slot[..chunk.len()].copy_from_slice(chunk);
      self.insert(&slot_key, &slot);
    }
  }

  /// Reads a blob staged with [`StateHeader::insert_bytes`]: slot count
  /// times [`VALUE_SIZE`] bytes. Callers that need the logical byte
  /// length must track it separately.
  pub fn get_bytes(&self, stem_key: &[u8]) -> Vec<u8> {
    let required_slots = self.get_u256(stem_key).low_u64();
    let mut slot_key: Key = stem_key.try_into().unwrap();
    let mut value = Vec::new();
    for i in 0..required_slots {
      slot_key[STEM_SIZE] = stem_key[STEM_SIZE] + i as u8 + 1;
      if let Some(slot) = self.get(&slot_key) {
        value.extend_from_slice(&slot);
      }
    }
    value
  }

  /// Flushes the pending write log into the tree and the flat mirror, in
  /// append order, then advances the height. When `query_hash` is set the
  /// new block's hash is fetched through the getter; a fetch failure
  /// surfaces to the caller.
  pub fn page<G: OrdGetter>(&mut self, getter: &G, query_hash: bool) -> Result {
    for entry in &self.temp {
      self.kv.insert(entry.key, entry.new_value);
      self.root.insert(&entry.key, &entry.new_value);
    }
    let staged = self.temp.len();
    self.temp.clear();
    self.height += 1;
    if query_hash {
      self.hash = getter.get_block_hash(self.height)?;
    }
    log::debug!("paged {staged} staged writes at height {}", self.height);
    Ok(())
  }

  /// Deterministic encoding of the flat mirror only; the tree is
  /// reconstructed on restore.
  pub fn serialize(&self) -> Result<Vec<u8>> {
    Ok(bincode::serialize(&self.kv)?)
  }

  /// Rebuilds a store from a snapshot: every entry is replayed into a
  /// fresh tree and the commitment recomputed. The height travels out of
  /// band; the hash starts empty.
  pub fn deserialize(bytes: &[u8], height: u32) -> Result<Self>
  where
    T: Default,
  {
    let kv: KeyValueMap = bincode::deserialize(bytes).context("corrupt state snapshot")?;
    let mut root = T::default();
    for (key, value) in &kv {
      root.insert(key, value);
    }
    root.commit();
    Ok(Self {
      root,
      kv,
      temp: Vec::new(),
      height,
      hash: String::new(),
    })
  }

  /// The staged, not yet paged, writes of the block in progress.
  pub fn pending(&self) -> &[DiffEntry] {
    &self.temp
  }

  pub fn kv(&self) -> &KeyValueMap {
    &self.kv
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn block_hash(&self) -> &str {
    &self.hash
  }

  pub fn commitment(&mut self) -> [u8; 32] {
    self.root.commit()
  }
}

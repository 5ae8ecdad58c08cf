use sha3::{Digest, Keccak256};
use std::collections::BTreeMap;

use super::{AuthenticatedMap, Key, Value};

/// Reference [`AuthenticatedMap`] backed by an ordered map.
///
/// The commitment is a keccak-256 digest over the sorted flat image:
/// deterministic and binding, but without openings. Suitable for tests,
/// snapshot restore, and any deployment that does not need proofs.
#[derive(Debug, Default, Clone)]
pub struct MemoryMap {
  entries: BTreeMap<Key, Value>,
  commitment: Option<[u8; 32]>,
}

impl AuthenticatedMap for MemoryMap {
  fn insert(&mut self, key: &Key, value: &Value) {
    self.entries.insert(*key, *value);
    self.commitment = None;
  }

  fn get(&self, key: &Key) -> Option<Value> {
    self.entries.get(key).copied()
  }

  fn commit(&mut self) -> [u8; 32] {
    if let Some(commitment) = self.commitment {
      return commitment;
    }
    let mut hasher = Keccak256::new();
    for (key, value) in &self.entries {
      hasher.update(key);
      hasher.update(value);
    }
    let commitment: [u8; 32] = hasher.finalize().into();
    self.commitment = Some(commitment);
    commitment
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_get_absent_key() {
    let map = MemoryMap::default();
    assert_eq!(map.get(&[1u8; 32]), None);
  }

  #[test]
  fn test_commitment_tracks_content() {
    let mut a = MemoryMap::default();
    let mut b = MemoryMap::default();

    a.insert(&[1u8; 32], &[2u8; 32]);
    a.insert(&[3u8; 32], &[4u8; 32]);
    // insertion order does not matter.
    b.insert(&[3u8; 32], &[4u8; 32]);
    b.insert(&[1u8; 32], &[2u8; 32]);
    assert_eq!(a.commit(), b.commit());

    let empty = MemoryMap::default().commit();
    assert_ne!(a.commit(), empty);

    a.insert(&[1u8; 32], &[9u8; 32]);
    assert_ne!(a.commit(), b.commit());
  }
}

use bitcoin::address::{Address, NetworkUnchecked, Payload};
use bitcoin::hashes::Hash;

use crate::state::{Value, VALUE_SIZE};

/// Canonical 32-byte form of a Bitcoin address.
///
/// Decodes the address payload (pubkey hash, script hash, or witness
/// program) and zero-pads it on the right to one value slot. Malformed
/// input degrades to the raw string bytes, truncated or padded to the
/// slot width; callers treat the result opaquely, so best effort is the
/// whole contract.
pub fn decode_address(address: &str) -> Value {
  match address.parse::<Address<NetworkUnchecked>>() {
    Ok(decoded) => match &decoded.payload {
      Payload::PubkeyHash(pubkey_hash) => pad_slot(&pubkey_hash.to_byte_array()),
      Payload::ScriptHash(script_hash) => pad_slot(&script_hash.to_byte_array()),
      Payload::WitnessProgram(program) => pad_slot(program.program().as_bytes()),
      _ => pad_slot(address.as_bytes()),
    },
    Err(_) => pad_slot(address.as_bytes()),
  }
}

fn pad_slot(bytes: &[u8]) -> Value {
  let mut slot = [0u8; VALUE_SIZE];
  let len = bytes.len().min(VALUE_SIZE);
  slot[..len].copy_from_slice(&bytes[..len]);
  slot
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decode_is_deterministic() {
    let address = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
    assert_eq!(decode_address(address), decode_address(address));
  }

  #[test]
  fn test_decode_p2wpkh_payload() {
    // witness program of the BIP-173 example address.
    let decoded = decode_address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");
    let mut expected = [0u8; VALUE_SIZE];
    expected[..20].copy_from_slice(&hex::decode("751e76e8199196d454941c45d1b3a323f1433bd6").unwrap());
    assert_eq!(decoded, expected);
  }

  #[test]
  fn test_decode_p2tr_uses_the_witness_program() {
    let address = "bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqzk5jj0";
    let decoded = decode_address(address);
    assert_ne!(decoded, pad_slot(address.as_bytes()));
    assert_ne!(decoded, [0u8; VALUE_SIZE]);
  }

  #[test]
  fn test_malformed_address_falls_back_to_raw_bytes() {
    let decoded = decode_address("not an address");
    assert_eq!(&decoded[..14], b"not an address");
    assert_eq!(decoded[14..], [0u8; 18]);
  }

  #[test]
  fn test_distinct_addresses_decode_to_distinct_slots() {
    assert_ne!(
      decode_address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"),
      decode_address("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2"),
    );
  }
}

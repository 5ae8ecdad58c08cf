use crate::Result;

/// A single ordinal transfer, as yielded by the external getter.
///
/// `old_satpoint` is empty when the record creates the inscription and
/// non-empty when it moves an existing one. `content` is the raw
/// inscription body; `new_pkscript` is hex encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdTransfer {
  pub tx_id: u64,
  pub inscription_id: String,
  pub old_satpoint: String,
  pub new_pkscript: String,
  pub new_wallet: String,
  pub sent_as_fee: bool,
  pub content_type: String,
  pub content: Vec<u8>,
}

/// Source of block hashes and block-ordered ordinal transfers.
///
/// Records must be yielded in protocol order; the interpreter processes
/// them exactly in the order received.
pub trait OrdGetter {
  fn get_block_hash(&self, height: u32) -> Result<String>;

  fn block_transfers(&self, height: u32) -> Result<Vec<OrdTransfer>>;
}

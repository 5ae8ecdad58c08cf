pub mod error;
pub mod events;
pub mod keys;
pub mod num;
pub mod operation;
pub mod params;
pub mod tick;
pub mod updater;

pub use self::{
  error::{BRC20Error, JSONError, NumError},
  events::{BRC20Event, DeployEvent, InscribeTransferEvent, MintEvent, Receipt, TransferEvent},
  operation::{deserialize_brc20, Deploy, Mint, Operation, Transfer},
  params::Config,
  tick::Tick,
  updater::BRC20Updater,
};

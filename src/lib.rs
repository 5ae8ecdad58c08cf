#![allow(clippy::too_many_arguments, clippy::result_large_err)]

pub mod address;
pub mod brc20;
pub mod getter;
pub mod state;

pub use crate::{
  brc20::{BRC20Event, BRC20Updater, Config, Receipt, Tick},
  getter::{OrdGetter, OrdTransfer},
  state::{AuthenticatedMap, Key, MemoryMap, StateHeader, Value},
};

pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;

//! Proof-of-work mining core for a multi-chain chainweb node.
//!
//! This crate owns the mine/await-cut race (`miner_loop`), cut extension
//! (`cut_extender`), the inner hash-guess-check loop (`inner_miner`), and the
//! per-epoch difficulty cache (`target_cache`). Everything it touches outside
//! of its own state is reached through the collaborator traits in
//! `collaborators`; the node process wires in real implementations, and this
//! crate's own tests wire in the in-memory ones from `mocks`.

pub mod chain_selector;
pub mod clock;
pub mod collaborators;
pub mod config;
pub mod cut_extender;
pub mod error;
pub mod inner_miner;
pub mod logging;
pub mod miner_loop;
pub mod mocks;
pub mod payload;
pub mod target_cache;

pub use chain_selector::ChainSelector;
pub use clock::{Clock, FixedClock, SystemClock};
pub use collaborators::{CutStore, Executor, HeaderDb, HeaderDbSet, PayloadStore};
pub use config::{MinerConfig, MinerInfo, DEFAULT_REFRESH_INTERVAL};
pub use cut_extender::CutExtender;
pub use error::{ExecutorError, MiningError};
pub use miner_loop::{MineOutcome, MinerLoop, NewMinedBlock};
pub use payload::PayloadWithOutputs;
pub use target_cache::TargetCache;

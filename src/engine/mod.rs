// 8.0: pool engine. creates and edits pools, executes swaps, serves prices and
// TWAPs, snapshots reserves each block. deterministic, all state in the store.

mod config;
mod core;
mod genesis;
mod pools;
mod prices;
mod queries;
mod results;
mod snapshots;
mod swaps;

pub use config::EngineConfig;
pub use core::Engine;
pub use queries::{AllPools, ReserveAssets};
pub use results::{EditCost, EngineError, PoolPrices, SwapOutcome};

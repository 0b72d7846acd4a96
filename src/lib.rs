// vamm-core: virtual AMM pricing core for perpetual futures.
// constant product reserves scaled by a peg multiplier, per block reserve
// snapshots, and TWAPs over them. deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Pair, Direction, TwapCalcOption, Timestamp, BlockContext
//   2.x  decimal.rs: Dec, 18 digit fixed point
//   3.x  pricing.rs: swap math on the x * y = k curve
//   4.x  limits.rs: fluctuation, spread and user slippage limits
//   5.x  twap.rs: time weighted average over snapshots
//   6.x  repeg.rs: cost of peg and swap invariant edits
//   7.x  genesis.rs: export/import state
//   8.x  engine/: pools, swaps, prices, snapshots, queries
//   9.x  events.rs: state transition events
//   10.x config.rs, logging.rs: app config, env presets, tracing setup
//        market.rs: market record, config and validation
//        snapshot.rs: reserve snapshots, per snapshot pricing, fatal invariant
//        store.rs: PoolStore trait + in-memory store
//        oracle.rs: index price source (mocked)

// core pricing modules
pub mod decimal;
pub mod limits;
pub mod market;
pub mod pricing;
pub mod repeg;
pub mod snapshot;
pub mod twap;
pub mod types;

// state and orchestration
pub mod engine;
pub mod events;
pub mod genesis;
pub mod store;

// integration modules
pub mod config;
pub mod logging;
pub mod oracle;

// re exports for convenience
pub use config::{AppConfig, ConfigError, Environment, LoggingConfig};
pub use decimal::{Dec, DecError};
pub use engine::*;
pub use events::*;
pub use genesis::{GenesisError, GenesisState};
pub use limits::{check_if_limit_is_violated, UserLimitViolation};
pub use market::{Market, MarketConfig, MarketError};
pub use oracle::{MockOracle, OracleError, OracleSource};
pub use repeg::{calc_repeg_cost, calc_swap_invariant_cost, market_value, FundFlow};
pub use snapshot::{price_with_snapshot, InvariantViolation, ReserveSnapshot};
pub use store::{MemStore, PoolStore, SnapshotIter, SnapshotRange};
pub use twap::{TwapError, TwapQuery};
pub use types::*;

//! Genesis export and import.

use super::core::Engine;
use crate::genesis::{GenesisError, GenesisState};
use crate::oracle::OracleSource;
use crate::store::PoolStore;

impl<S: PoolStore, O: OracleSource> Engine<S, O> {
    /// Every market with its latest snapshot, in pair order.
    pub fn export_genesis(&self) -> GenesisState {
        let markets = self.store.markets();
        let snapshots = markets
            .iter()
            .filter_map(|market| self.store.latest_snapshot(&market.pair))
            .collect();
        GenesisState::new(markets, snapshots)
    }

    /// Validates the whole state before writing any of it.
    pub fn init_genesis(&mut self, state: GenesisState) -> Result<(), GenesisError> {
        state.validate()?;

        let (market_count, snapshot_count) = (state.markets.len(), state.snapshots.len());
        for market in state.markets {
            self.store.set_market(market);
        }
        for snapshot in state.snapshots {
            self.store.set_snapshot(snapshot);
        }

        tracing::info!(markets = market_count, snapshots = snapshot_count, "genesis imported");
        Ok(())
    }
}

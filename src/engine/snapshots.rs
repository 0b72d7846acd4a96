//! Per block snapshots and the fluctuation check that reads them.

use super::core::Engine;
use super::results::EngineError;
use crate::events::{EventPayload, ReserveSnapshotSavedEvent};
use crate::market::Market;
use crate::oracle::OracleSource;
use crate::snapshot::{assert_valid_snapshot, ReserveSnapshot};
use crate::store::{PoolStore, SnapshotRange};
use crate::types::{Pair, Timestamp};

impl<S: PoolStore, O: OracleSource> Engine<S, O> {
    /// Snapshots every market at the current block time. Run once per block,
    /// after all of the block's swaps.
    pub fn end_blocker(&mut self) {
        let markets = self.store.markets();
        for market in &markets {
            let snapshot = market.to_snapshot(self.block.time);
            assert_valid_snapshot(&snapshot);
            self.store.set_snapshot(snapshot);

            self.emit_event(EventPayload::ReserveSnapshotSaved(ReserveSnapshotSavedEvent {
                pair: market.pair.clone(),
                quote_reserve: market.quote_reserve,
                base_reserve: market.base_reserve,
                mark_price: market.get_mark_price(),
                block_height: self.block.height,
                block_time: self.block.time,
            }));
        }
        tracing::debug!(
            height = self.block.height,
            time = %self.block.time,
            markets = markets.len(),
            "reserve snapshots saved"
        );
    }

    /// Latest snapshot of the pair, whatever block wrote it.
    pub fn get_last_snapshot(&self, pair: &Pair) -> Result<ReserveSnapshot, EngineError> {
        self.store
            .latest_snapshot(pair)
            .ok_or_else(|| EngineError::NoSnapshot(pair.clone()))
    }

    // latest snapshot from an earlier block, else the current block's own
    fn fluctuation_reference(&self, pair: &Pair) -> Result<ReserveSnapshot, EngineError> {
        let before_block = Timestamp::from_millis(self.block.time.as_millis().saturating_sub(1));
        let range = SnapshotRange::all().end_inclusive(before_block).descending();
        match self.store.snapshots(pair, range).next() {
            Some(snapshot) => Ok(snapshot),
            None => self.get_last_snapshot(pair),
        }
    }

    /// Fails if `market`, about to be persisted, moved its mark price outside
    /// the fluctuation band of the reference snapshot.
    pub fn check_fluctuation_limit_ratio(&self, market: &Market) -> Result<(), EngineError> {
        if market.config.fluctuation_limit_ratio.is_zero() {
            return Ok(());
        }

        let snapshot = self.fluctuation_reference(&market.pair)?;
        if market.is_over_fluctuation_limit_in_relation_with_snapshot(&snapshot) {
            return Err(EngineError::OverFluctuationLimit {
                pair: market.pair.clone(),
                mark_price: market.get_mark_price(),
                snapshot_price: snapshot.mark_price(),
            });
        }
        Ok(())
    }
}

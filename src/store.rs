//! Keyed storage for markets and snapshots.
//!
//! The engine only needs point reads and writes on markets plus ordered range
//! scans over one pair's snapshots, so the store is a narrow trait. `MemStore`
//! keeps everything in ordered maps, which makes iteration order deterministic.

use crate::market::Market;
use crate::snapshot::ReserveSnapshot;
use crate::types::{Pair, Timestamp};
use std::collections::BTreeMap;

/// Bounds of a snapshot scan within one pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotRange {
    /// Newest timestamp to include, unbounded if `None`
    pub end_inclusive: Option<Timestamp>,
    /// Newest first when set
    pub descending: bool,
}

impl SnapshotRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn end_inclusive(mut self, end: Timestamp) -> Self {
        self.end_inclusive = Some(end);
        self
    }

    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }
}

/// Lazy scan over one pair's snapshots, borrowed from the store.
pub type SnapshotIter<'a> = Box<dyn Iterator<Item = ReserveSnapshot> + 'a>;

pub trait PoolStore {
    fn get_market(&self, pair: &Pair) -> Option<Market>;

    fn set_market(&mut self, market: Market);

    /// All markets in pair order.
    fn markets(&self) -> Vec<Market>;

    /// Writes the snapshot under `(pair, timestamp_ms)`, replacing any snapshot
    /// already stored under that key.
    fn set_snapshot(&mut self, snapshot: ReserveSnapshot);

    /// Snapshots are produced on demand, so callers that stop early never
    /// touch the rest of the history.
    fn snapshots(&self, pair: &Pair, range: SnapshotRange) -> SnapshotIter<'_>;

    fn has_market(&self, pair: &Pair) -> bool {
        self.get_market(pair).is_some()
    }

    fn latest_snapshot(&self, pair: &Pair) -> Option<ReserveSnapshot> {
        self.snapshots(pair, SnapshotRange::all().descending()).next()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemStore {
    markets: BTreeMap<Pair, Market>,
    snapshots: BTreeMap<(Pair, i64), ReserveSnapshot>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }
}

impl PoolStore for MemStore {
    fn get_market(&self, pair: &Pair) -> Option<Market> {
        self.markets.get(pair).cloned()
    }

    fn set_market(&mut self, market: Market) {
        self.markets.insert(market.pair.clone(), market);
    }

    fn markets(&self) -> Vec<Market> {
        self.markets.values().cloned().collect()
    }

    fn set_snapshot(&mut self, snapshot: ReserveSnapshot) {
        let key = (snapshot.pair.clone(), snapshot.timestamp_ms);
        self.snapshots.insert(key, snapshot);
    }

    fn snapshots(&self, pair: &Pair, range: SnapshotRange) -> SnapshotIter<'_> {
        let end = range.end_inclusive.map_or(i64::MAX, |t| t.as_millis());
        let scan = self
            .snapshots
            .range((pair.clone(), i64::MIN)..=(pair.clone(), end))
            .map(|(_, snapshot)| snapshot.clone());

        if range.descending {
            Box::new(scan.rev())
        } else {
            Box::new(scan)
        }
    }
}

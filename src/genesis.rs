// 7.0: genesis state. the full pool state needed to restart a chain: every
// market plus its latest reserve snapshot.

use crate::market::{Market, MarketError};
use crate::snapshot::ReserveSnapshot;
use crate::types::Pair;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub markets: Vec<Market>,
    pub snapshots: Vec<ReserveSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenesisError {
    #[error("invalid market {pair}: {source}")]
    InvalidMarket { pair: Pair, source: MarketError },

    #[error("duplicate market {0}")]
    DuplicateMarket(Pair),

    #[error("invalid snapshot for {pair}: {source}")]
    InvalidSnapshot { pair: Pair, source: MarketError },

    #[error("snapshot for {0} has no market")]
    OrphanSnapshot(Pair),
}

impl GenesisState {
    pub fn new(markets: Vec<Market>, snapshots: Vec<ReserveSnapshot>) -> Self {
        Self { markets, snapshots }
    }

    pub fn validate(&self) -> Result<(), GenesisError> {
        let mut pairs = BTreeSet::new();
        for market in &self.markets {
            market.validate().map_err(|source| GenesisError::InvalidMarket {
                pair: market.pair.clone(),
                source,
            })?;
            if !pairs.insert(market.pair.clone()) {
                return Err(GenesisError::DuplicateMarket(market.pair.clone()));
            }
        }

        for snapshot in &self.snapshots {
            snapshot.validate().map_err(|source| GenesisError::InvalidSnapshot {
                pair: snapshot.pair.clone(),
                source,
            })?;
            if !pairs.contains(&snapshot.pair) {
                return Err(GenesisError::OrphanSnapshot(snapshot.pair.clone()));
            }
        }
        Ok(())
    }
}

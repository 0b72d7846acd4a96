// Oracle integration
//
// The engine reads index prices but never writes them. Whatever feeds the
// chain's exchange rates implements OracleSource; MockOracle is the in-memory
// version used by tests and the simulator.

use crate::decimal::Dec;
use crate::types::Pair;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("no exchange rate for {0}")]
    NoPrice(Pair),

    #[error("oracle is unavailable")]
    Unavailable,
}

/// Read-only source of index prices
pub trait OracleSource {
    fn exchange_rate(&self, pair: &Pair) -> Result<Dec, OracleError>;
}

/// Fixed prices keyed by pair, with a health switch to simulate outages
#[derive(Debug, Clone)]
pub struct MockOracle {
    prices: BTreeMap<Pair, Dec>,
    healthy: bool,
}

impl Default for MockOracle {
    fn default() -> Self {
        Self {
            prices: BTreeMap::new(),
            healthy: true,
        }
    }
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, pair: Pair, price: Dec) -> Self {
        self.prices.insert(pair, price);
        self
    }

    pub fn set_price(&mut self, pair: Pair, price: Dec) {
        self.prices.insert(pair, price);
    }

    pub fn remove_price(&mut self, pair: &Pair) {
        self.prices.remove(pair);
    }

    pub fn set_healthy(&mut self, healthy: bool) {
        self.healthy = healthy;
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }
}

impl OracleSource for MockOracle {
    fn exchange_rate(&self, pair: &Pair) -> Result<Dec, OracleError> {
        if !self.healthy {
            return Err(OracleError::Unavailable);
        }
        self.prices
            .get(pair)
            .copied()
            .ok_or_else(|| OracleError::NoPrice(pair.clone()))
    }
}

// 8.0 engine/core.rs: main engine. owns the store, the oracle, the current block and the event log.

use super::config::EngineConfig;
use super::results::EngineError;
use crate::events::{Event, EventLog, EventPayload};
use crate::market::Market;
use crate::oracle::OracleSource;
use crate::store::PoolStore;
use crate::types::{BlockContext, Pair, Timestamp};

/** 8.1: main engine struct. all pool state lives in the store */
#[derive(Debug)]
pub struct Engine<S, O> {
    pub(super) config: EngineConfig,
    pub(super) store: S,
    pub(super) oracle: O,
    pub(super) block: BlockContext,
    pub(super) events: EventLog,
}

impl<S: PoolStore, O: OracleSource> Engine<S, O> {
    pub fn new(config: EngineConfig, store: S, oracle: O) -> Self {
        let events = EventLog::new(config.max_events);
        Self {
            config,
            store,
            oracle,
            block: BlockContext::genesis(),
            events,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn block(&self) -> BlockContext {
        self.block
    }

    pub fn block_time(&self) -> Timestamp {
        self.block.time
    }

    pub fn set_block(&mut self, height: i64, time: Timestamp) {
        self.block = BlockContext::new(height, time);
    }

    /// Moves to the next block, `elapsed_ms` after the current one.
    pub fn advance_block(&mut self, elapsed_ms: i64) {
        self.block = self.block.next(elapsed_ms);
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        self.events.recent(count)
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub(super) fn load_market(&self, pair: &Pair) -> Result<Market, EngineError> {
        self.store
            .get_market(pair)
            .ok_or_else(|| EngineError::PairNotSupported(pair.clone()))
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let id = self.events.push(self.block.time, payload);

        if self.config.verbose {
            if let Some(event) = self.events.recent(1).first() {
                tracing::debug!(event_id = id.0, payload = ?event.payload, "event emitted");
            }
        }
    }
}

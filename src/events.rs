// 9.0: every state change produces an event. used for audit trails and for
// notifying whatever consumes the pool state. EventPayload lists all event types.

use crate::decimal::Dec;
use crate::market::MarketConfig;
use crate::types::{Pair, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    // Pool lifecycle
    PoolCreated(PoolCreatedEvent),

    // Trading
    SwapExecuted(SwapEvent),
    MarkPriceChanged(MarkPriceChangedEvent),

    // Per block snapshots
    ReserveSnapshotSaved(ReserveSnapshotSavedEvent),

    // Governance edits
    PegMultiplierEdited(PegMultiplierEditedEvent),
    ConfigEdited(ConfigEditedEvent),
    SwapInvariantEdited(SwapInvariantEditedEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolCreatedEvent {
    pub pair: Pair,
    pub base_reserve: Dec,
    pub quote_reserve: Dec,
    pub peg_multiplier: Dec,
}

/// Signed reserve deltas from the pool's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEvent {
    pub pair: Pair,
    pub quote_delta: Dec,
    pub base_delta: Dec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkPriceChangedEvent {
    pub pair: Pair,
    pub price: Dec,
    pub block_time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSnapshotSavedEvent {
    pub pair: Pair,
    pub quote_reserve: Dec,
    pub base_reserve: Dec,
    pub mark_price: Dec,
    pub block_height: i64,
    pub block_time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PegMultiplierEditedEvent {
    pub pair: Pair,
    pub old_peg: Dec,
    pub new_peg: Dec,
    pub cost: Dec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEditedEvent {
    pub pair: Pair,
    pub config: MarketConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapInvariantEditedEvent {
    pub pair: Pair,
    pub multiplier: Dec,
    pub new_sqrt_depth: Dec,
    pub cost: Dec,
}

impl EventPayload {
    pub fn pair(&self) -> &Pair {
        match self {
            EventPayload::PoolCreated(e) => &e.pair,
            EventPayload::SwapExecuted(e) => &e.pair,
            EventPayload::MarkPriceChanged(e) => &e.pair,
            EventPayload::ReserveSnapshotSaved(e) => &e.pair,
            EventPayload::PegMultiplierEdited(e) => &e.pair,
            EventPayload::ConfigEdited(e) => &e.pair,
            EventPayload::SwapInvariantEdited(e) => &e.pair,
        }
    }
}

/// Bounded in-memory event log. Oldest events drop off once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Vec<Event>,
    next_id: u64,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
            capacity,
        }
    }

    pub fn push(&mut self, timestamp: Timestamp, payload: EventPayload) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.events.push(Event::new(id, timestamp, payload));

        if self.events.len() > self.capacity {
            let drain_count = self.events.len() - self.capacity;
            self.events.drain(0..drain_count);
        }
        id
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

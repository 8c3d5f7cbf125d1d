//! Mock event sinks for integration tests.
//!
//! `RecordingSink` keeps every outbound message so tests can assert on
//! the full history; `FailingSink` rejects everything and counts the
//! attempts, to check that components keep going when delivery fails.

use henhouse::app::ports::EventSink;
use henhouse::entity::EntityId;
use henhouse::error::SendError;
use henhouse::messages::{Destination, Outbound};

pub fn hen(id: &str) -> EntityId {
    EntityId::new(id).unwrap()
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Outbound>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.events.iter().map(Outbound::kind).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// Messages addressed to the lighting regulator, in emission order.
    pub fn to_lighting(&self) -> Vec<Outbound> {
        self.events
            .iter()
            .filter(|e| e.destination() == Destination::Lighting)
            .cloned()
            .collect()
    }

    /// `(entity, amount)` for every `feed_dispensed` actuation.
    pub fn dispensed(&self) -> Vec<(&str, u32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Outbound::FeedDispensed { entity_id, amount } => {
                    Some((entity_id.as_str(), *amount))
                }
                _ => None,
            })
            .collect()
    }

    /// Light levels actuated for `entity`, in order.
    pub fn light_levels(&self, entity: &str) -> Vec<i32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Outbound::LightLevel {
                    entity_id, level, ..
                } if entity_id.as_str() == entity => Some(*level),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: Outbound) -> Result<(), SendError> {
        self.events.push(event);
        Ok(())
    }
}

// ── FailingSink ───────────────────────────────────────────────

pub struct FailingSink {
    pub error: SendError,
    pub attempts: usize,
}

impl FailingSink {
    pub fn new(error: SendError) -> Self {
        Self { error, attempts: 0 }
    }
}

impl EventSink for FailingSink {
    fn emit(&mut self, _event: Outbound) -> Result<(), SendError> {
        self.attempts += 1;
        Err(self.error)
    }
}

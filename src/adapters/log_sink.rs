//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every outbound message to the
//! process logger as one structured line.  Entity actuations, alerts and
//! state changes all land in the same stream; a UI or bus adapter would
//! implement the same trait.

use log::{info, warn};

use crate::app::ports::EventSink;
use crate::error::SendError;
use crate::messages::{Destination, Outbound};

/// Adapter that logs every [`Outbound`] message.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: Outbound) -> Result<(), SendError> {
        match &event {
            Outbound::Alarm(a) => {
                warn!(
                    "ALERT | {} | entity={} | {}",
                    a.event_type,
                    a.entity_id.as_ref().map_or("-", |e| e.as_str()),
                    serde_json::Value::Object(a.payload.clone()),
                );
            }
            Outbound::NoFeed {
                entity_id,
                hunger,
                remaining_feed,
            } => {
                warn!(
                    "ALERT | no_feed | entity={} hunger={} remaining={}",
                    entity_id, hunger, remaining_feed
                );
            }
            Outbound::LowFeed { level, threshold } => {
                warn!("ALERT | low_feed_warning | level={} threshold={}", level, threshold);
            }
            Outbound::FeedState {
                level,
                capacity,
                reason,
            } => {
                info!("STATE | feed {}/{} ({})", level, capacity, reason);
            }
            Outbound::LightState {
                entity_id,
                level,
                mode,
                reason,
            } => {
                info!(
                    "STATE | light entity={} level={} mode={} ({})",
                    entity_id,
                    level,
                    mode.as_str(),
                    reason
                );
            }
            other => {
                let to = match other.destination() {
                    Destination::Entity => "ENTITY",
                    Destination::Lighting => "LIGHTING",
                    Destination::Sink => "SINK",
                };
                info!("{} | {}", to, other.to_wire());
            }
        }
        Ok(())
    }
}

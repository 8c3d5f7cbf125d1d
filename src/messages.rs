//! Message contracts.
//!
//! Every message on the wire is one flat JSON object carrying a `topic`
//! and a `type`.  Inbound objects are decoded into closed per-topic enums
//! that the runtime routes to a component mailbox; outbound messages are
//! the [`Outbound`] enum, rendered back to the flat wire form by
//! [`Outbound::to_wire`].
//!
//! ```text
//!   {"topic":"feeding","type":"hunger_update","entity_id":"hen-1","hunger":82}
//!        │
//!        ▼  Inbound::decode
//!   Inbound::Feeding(FeedingMsg::Hunger(HungerSample { .. }))
//! ```
//!
//! Unknown topics and unknown types decode to `Ok(None)` and are ignored.
//! A known type with missing or mistyped fields is a [`DecodeError`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::entity::EntityId;
use crate::error::DecodeError;

// ───────────────────────────────────────────────────────────────
// Topics
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Behavior,
    Alerts,
    Feeding,
    Lighting,
    UpdateState,
    Logging,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Behavior => "behavior",
            Self::Alerts => "alerts",
            Self::Feeding => "feeding",
            Self::Lighting => "lighting",
            Self::UpdateState => "update_state",
            Self::Logging => "logging",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "behavior" => Some(Self::Behavior),
            "alerts" => Some(Self::Alerts),
            "feeding" => Some(Self::Feeding),
            "lighting" => Some(Self::Lighting),
            "update_state" => Some(Self::UpdateState),
            "logging" => Some(Self::Logging),
            _ => None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Inbound payloads
// ───────────────────────────────────────────────────────────────

/// Behaviour telemetry from an entity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BehaviorSample {
    #[serde(default, alias = "hen_id")]
    pub entity_id: Option<EntityId>,
    pub aggression: f32,
    #[serde(default)]
    pub hunger: i32,
}

/// Alert raised by another collaborator, relayed verbatim.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ExternalAlert {
    #[serde(default)]
    pub event_type: Option<String>,
    /// Wire `type`, used as the event type when `event_type` is absent.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, alias = "hen_id")]
    pub entity_id: Option<EntityId>,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl ExternalAlert {
    pub fn event_type(&self) -> &str {
        self.event_type
            .as_deref()
            .or(self.kind.as_deref())
            .unwrap_or("external_alert")
    }
}

/// Hunger telemetry from an entity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HungerSample {
    #[serde(default, alias = "hen_id")]
    pub entity_id: Option<EntityId>,
    pub hunger: i32,
    /// Sender-side threshold hint (`hunger_high`).  Informational only.
    #[serde(default)]
    pub threshold: Option<i32>,
}

/// Aggression reading forwarded to the lighting regulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggressionUpdate {
    #[serde(default, alias = "hen_id", skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
    pub aggression: f32,
    #[serde(default)]
    pub hunger: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Explicit light level request (`set_light`).  Without a `level` the
/// regulator falls back to its neutral setpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LightRequest {
    #[serde(default, alias = "hen_id")]
    pub entity_id: Option<EntityId>,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request to switch an entity (or, without an id, every known entity)
/// to the calm light level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalmRequest {
    #[serde(default, alias = "hen_id", skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
}

// ───────────────────────────────────────────────────────────────
// Per-topic inbound messages (one mailbox each)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum BehaviorMsg {
    Sample(BehaviorSample),
    Alert(ExternalAlert),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedingMsg {
    Hunger(HungerSample),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightingMsg {
    SetLight(LightRequest),
    Aggression(AggressionUpdate),
    Calm(CalmRequest),
}

/// A decoded inbound message, already addressed to its component.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Behavior(BehaviorMsg),
    Feeding(FeedingMsg),
    Lighting(LightingMsg),
}

impl Inbound {
    /// Decode one JSON line.
    pub fn decode(line: &str) -> Result<Option<Self>, DecodeError> {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(body)) => Self::from_body(body),
            _ => Err(DecodeError::InvalidJson),
        }
    }

    /// Decode an already-parsed envelope object.
    pub fn from_body(mut body: Map<String, Value>) -> Result<Option<Self>, DecodeError> {
        let topic = match body.remove("topic") {
            Some(Value::String(t)) => t,
            _ => return Err(DecodeError::MissingTopic),
        };
        let Some(topic) = Topic::parse(&topic) else {
            return Ok(None);
        };
        let kind = body
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Self::from_parts(topic, &kind, body)
    }

    /// Dispatch on `(topic, type)`.  Unmatched pairs yield `Ok(None)`.
    pub fn from_parts(
        topic: Topic,
        kind: &str,
        body: Map<String, Value>,
    ) -> Result<Option<Self>, DecodeError> {
        let msg = match (topic, kind) {
            (Topic::Behavior, "behavior_update" | "aggression_detected") => {
                Self::Behavior(BehaviorMsg::Sample(payload(body, "behavior")?))
            }
            (Topic::Alerts, _) => Self::Behavior(BehaviorMsg::Alert(payload(body, "alert")?)),
            (Topic::Feeding, "hunger_update" | "hunger_high") => {
                Self::Feeding(FeedingMsg::Hunger(payload(body, "hunger")?))
            }
            (Topic::Lighting, "set_light") => {
                Self::Lighting(LightingMsg::SetLight(payload(body, "set_light")?))
            }
            (Topic::Lighting, "aggression_update") => {
                Self::Lighting(LightingMsg::Aggression(payload(body, "aggression_update")?))
            }
            (Topic::Lighting, "calm_hens") => {
                Self::Lighting(LightingMsg::Calm(payload(body, "calm_hens")?))
            }
            _ => return Ok(None),
        };
        Ok(Some(msg))
    }
}

fn payload<T: DeserializeOwned>(
    body: Map<String, Value>,
    kind: &'static str,
) -> Result<T, DecodeError> {
    serde_json::from_value(Value::Object(body)).map_err(|_| DecodeError::Malformed(kind))
}

// ───────────────────────────────────────────────────────────────
// Outbound
// ───────────────────────────────────────────────────────────────

/// Alarm raised to the notification sink.  Never persisted here.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmEvent {
    pub event_type: String,
    pub entity_id: Option<EntityId>,
    pub payload: Map<String, Value>,
}

/// How an entity's current light level was last set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LightMode {
    Init,
    Auto,
    Manual,
    Calm,
}

impl LightMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Auto => "auto",
            Self::Manual => "manual",
            Self::Calm => "calm",
        }
    }
}

/// Where an outbound message is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Actuation for the addressed entity.
    Entity,
    /// Logging / UI consumers.
    Sink,
    /// The lighting regulator's own mailbox.
    Lighting,
}

/// Everything a component can emit.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// `aggression_alert` or a relabelled external alert.
    Alarm(AlarmEvent),
    NoFeed {
        entity_id: EntityId,
        hunger: i32,
        remaining_feed: u32,
    },
    LowFeed {
        level: u32,
        threshold: u32,
    },
    /// Debounced aggression reading for the lighting regulator.
    Forward(AggressionUpdate),
    /// Post-alarm calm request for the lighting regulator.
    Calm(CalmRequest),
    /// Feed actuation: the entity's hunger drops by `amount`.
    FeedDispensed {
        entity_id: EntityId,
        amount: u32,
    },
    /// Sink-side record of a dispensed portion.
    FeedReport {
        entity_id: EntityId,
        portion: u32,
        remaining_feed: u32,
        hunger_before: i32,
    },
    /// Feed resource state broadcast.
    FeedState {
        level: u32,
        capacity: u32,
        reason: &'static str,
    },
    /// Light actuation for an entity.
    LightLevel {
        entity_id: EntityId,
        level: i32,
        reason: String,
    },
    /// Light state change for the sink.
    LightState {
        entity_id: EntityId,
        level: i32,
        mode: LightMode,
        reason: String,
    },
}

impl Outbound {
    pub fn topic(&self) -> Topic {
        match self {
            Self::Alarm(_) | Self::NoFeed { .. } | Self::LowFeed { .. } => Topic::Alerts,
            Self::Forward(_) => Topic::Behavior,
            Self::Calm(_) | Self::LightLevel { .. } => Topic::Lighting,
            Self::FeedDispensed { .. } => Topic::Feeding,
            Self::FeedReport { .. } => Topic::Logging,
            Self::FeedState { .. } | Self::LightState { .. } => Topic::UpdateState,
        }
    }

    /// Wire `type` discriminator.
    pub fn kind(&self) -> &str {
        match self {
            Self::Alarm(a) => &a.event_type,
            Self::NoFeed { .. } => "no_feed",
            Self::LowFeed { .. } => "low_feed_warning",
            Self::Forward(_) => "aggression_update",
            Self::Calm(_) => "calm_hens",
            Self::FeedDispensed { .. } | Self::FeedReport { .. } => "feed_dispensed",
            Self::FeedState { .. } => "feed_update",
            Self::LightLevel { .. } => "light_level_update",
            Self::LightState { .. } => "light_update",
        }
    }

    /// Component that produced the message.
    pub fn source(&self) -> &'static str {
        match self {
            Self::Alarm(_) | Self::Forward(_) | Self::Calm(_) => "behavior_alarm",
            Self::NoFeed { .. }
            | Self::LowFeed { .. }
            | Self::FeedDispensed { .. }
            | Self::FeedReport { .. }
            | Self::FeedState { .. } => "feed_control",
            Self::LightLevel { .. } | Self::LightState { .. } => "lighting",
        }
    }

    pub fn destination(&self) -> Destination {
        match self {
            Self::Forward(_) | Self::Calm(_) => Destination::Lighting,
            Self::FeedDispensed { .. } | Self::LightLevel { .. } => Destination::Entity,
            _ => Destination::Sink,
        }
    }

    pub fn entity_id(&self) -> Option<&EntityId> {
        match self {
            Self::Alarm(a) => a.entity_id.as_ref(),
            Self::Forward(u) => u.entity_id.as_ref(),
            Self::Calm(c) => c.entity_id.as_ref(),
            Self::NoFeed { entity_id, .. }
            | Self::FeedDispensed { entity_id, .. }
            | Self::FeedReport { entity_id, .. }
            | Self::LightLevel { entity_id, .. }
            | Self::LightState { entity_id, .. } => Some(entity_id),
            Self::LowFeed { .. } | Self::FeedState { .. } => None,
        }
    }

    /// Convert a lighting-bound message into the regulator's mailbox type.
    pub fn into_lighting(self) -> Option<LightingMsg> {
        match self {
            Self::Forward(u) => Some(LightingMsg::Aggression(u)),
            Self::Calm(c) => Some(LightingMsg::Calm(c)),
            _ => None,
        }
    }

    /// Flat JSON wire form: `topic`, `type`, `source` plus the fields.
    pub fn to_wire(&self) -> Value {
        let fields = match self {
            Self::Alarm(a) => json!({
                "entity_id": a.entity_id,
                "event_type": a.event_type,
                "payload": a.payload,
            }),
            Self::NoFeed {
                entity_id,
                hunger,
                remaining_feed,
            } => json!({
                "entity_id": entity_id,
                "hunger": hunger,
                "remaining_feed": remaining_feed,
            }),
            Self::LowFeed { level, threshold } => json!({
                "level": level,
                "threshold": threshold,
                "remaining_feed": level,
            }),
            Self::Forward(u) => json!(u),
            Self::Calm(c) => json!(c),
            Self::FeedDispensed { entity_id, amount } => json!({
                "entity_id": entity_id,
                "amount": amount,
            }),
            Self::FeedReport {
                entity_id,
                portion,
                remaining_feed,
                hunger_before,
            } => json!({
                "entity_id": entity_id,
                "portion": portion,
                "remaining_feed": remaining_feed,
                "hunger_before": hunger_before,
            }),
            Self::FeedState {
                level,
                capacity,
                reason,
            } => json!({
                "level": level,
                "capacity": capacity,
                "reason": reason,
            }),
            Self::LightLevel {
                entity_id,
                level,
                reason,
            } => json!({
                "entity_id": entity_id,
                "level": level,
                "reason": reason,
            }),
            Self::LightState {
                entity_id,
                level,
                mode,
                reason,
            } => json!({
                "entity_id": entity_id,
                "level": level,
                "mode": mode,
                "reason": reason,
            }),
        };

        let mut wire = Map::new();
        wire.insert("topic".into(), Value::from(self.topic().as_str()));
        wire.insert("type".into(), Value::from(self.kind()));
        wire.insert("source".into(), Value::from(self.source()));
        if let Value::Object(fields) = fields {
            for (k, v) in fields {
                if !v.is_null() {
                    wire.insert(k, v);
                }
            }
        }
        Value::Object(wire)
    }
}

//! Aggression Alarm Monitor.
//!
//! A stateless-per-message filter with one small cache:
//!
//! 1. Drop samples without an entity id.
//! 2. Clamp aggression to `[-A, A]`.
//! 3. `|aggression| >= threshold` → `aggression_alert`, every time.
//!    Alarms are never debounced.
//! 4. Forward the reading to the lighting regulator unless the same value
//!    was already forwarded for this entity inside the debounce window.
//!
//! External alerts from other collaborators are relabelled and re-emitted
//! untouched.

use log::{debug, info, warn};
use serde_json::{Map, Value};

use super::ports::{Clock, EventSink, emit_best_effort};
use crate::config::BehaviorConfig;
use crate::control::gate::{Debounce, clamp_aggression};
use crate::messages::{
    AggressionUpdate, AlarmEvent, BehaviorMsg, BehaviorSample, CalmRequest, ExternalAlert,
    Outbound,
};

pub struct AlarmMonitor<C> {
    clock: C,
    max_abs_aggression: f32,
    threshold: f32,
    calm_on_alarm: bool,
    forwards: Debounce<f32>,
}

impl<C: Clock> AlarmMonitor<C> {
    pub fn new(cfg: &BehaviorConfig, clock: C) -> Self {
        Self {
            clock,
            max_abs_aggression: cfg.max_abs_aggression,
            threshold: cfg.aggression_threshold,
            calm_on_alarm: cfg.calm_on_alarm,
            forwards: Debounce::new(cfg.regulate_interval()),
        }
    }

    /// Route one mailbox message.
    pub fn handle<S: EventSink + ?Sized>(&mut self, msg: BehaviorMsg, sink: &mut S) {
        match msg {
            BehaviorMsg::Sample(sample) => self.ingest(&sample, sink),
            BehaviorMsg::Alert(alert) => self.relay(alert, sink),
        }
    }

    pub fn ingest<S: EventSink + ?Sized>(&mut self, sample: &BehaviorSample, sink: &mut S) {
        let Some(entity) = sample.entity_id.clone() else {
            warn!("ALARM | behavior sample without entity_id dropped");
            return;
        };
        let aggression = clamp_aggression(sample.aggression, self.max_abs_aggression);

        if aggression.abs() >= self.threshold {
            info!(
                "ALARM | {} aggression={} hunger={} threshold={}",
                entity, aggression, sample.hunger, self.threshold
            );
            let mut payload = Map::new();
            payload.insert("aggression".into(), Value::from(aggression));
            payload.insert("hunger".into(), Value::from(sample.hunger));
            payload.insert("threshold".into(), Value::from(self.threshold));
            emit_best_effort(
                sink,
                Outbound::Alarm(AlarmEvent {
                    event_type: "aggression_alert".into(),
                    entity_id: Some(entity.clone()),
                    payload,
                }),
            );
            if self.calm_on_alarm {
                emit_best_effort(
                    sink,
                    Outbound::Calm(CalmRequest {
                        entity_id: Some(entity.clone()),
                    }),
                );
            }
        }

        let now = self.clock.now();
        if !self.forwards.should_send(&entity, aggression, now) {
            debug!("ALARM | {} forward debounced (aggression={})", entity, aggression);
            return;
        }
        emit_best_effort(
            sink,
            Outbound::Forward(AggressionUpdate {
                entity_id: Some(entity),
                aggression,
                hunger: sample.hunger,
                reason: Some("behavior_update".into()),
            }),
        );
    }

    /// Re-emit an alert from another collaborator as an [`AlarmEvent`].
    pub fn relay<S: EventSink + ?Sized>(&mut self, alert: ExternalAlert, sink: &mut S) {
        let event_type = alert.event_type().to_owned();
        info!("ALARM | relayed {}", event_type);
        emit_best_effort(
            sink,
            Outbound::Alarm(AlarmEvent {
                event_type,
                entity_id: alert.entity_id,
                payload: alert.payload,
            }),
        );
    }
}

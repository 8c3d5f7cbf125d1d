//! Lighting Setpoint Regulator.
//!
//! Owns the light level of every entity.  Regulated targets (from
//! aggression readings) and explicit requests (`set_light`, `calm_hens`)
//! go through the same acceptance gate:
//!
//! ```text
//!   accept  ⇔  now - last_accepted[e] ≥ min_update_interval
//!           ∧  |new - level[e]| ≥ min_delta_to_send
//! ```
//!
//! A rejected request leaves the current level untouched.  That is
//! hysteresis, not an error, so it only shows up at `debug` level.
//!
//! Every known entity gets exactly one ungated `"init"` broadcast: those
//! named in the config at [`start`](LightingRegulator::start), the rest on
//! first sight.

use indexmap::IndexMap;
use log::{debug, info, warn};

use super::ports::{Clock, EventSink, emit_best_effort};
use crate::config::LightingConfig;
use crate::control::gate::{RateGate, clamp_level};
use crate::control::proportional::DeadBandController;
use crate::entity::EntityId;
use crate::messages::{AggressionUpdate, CalmRequest, LightMode, LightRequest, LightingMsg, Outbound};

const REASON_INIT: &str = "init";
const REASON_REGULATE: &str = "regulate";
const REASON_MANUAL: &str = "manual_set";
const REASON_CALM: &str = "calm_hens";

/// Light state mirrored per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLight {
    pub level: i32,
    pub mode: LightMode,
}

pub struct LightingRegulator<C> {
    clock: C,
    controller: DeadBandController,
    gate: RateGate,
    min_delta: i32,
    min_level: i32,
    max_level: i32,
    initial_level: i32,
    calm_level: i32,
    lights: IndexMap<EntityId, EntityLight>,
    started: bool,
}

impl<C: Clock> LightingRegulator<C> {
    pub fn new(cfg: &LightingConfig, clock: C) -> Self {
        Self {
            clock,
            controller: DeadBandController::new(cfg),
            gate: RateGate::new(cfg.update_interval()),
            min_delta: cfg.min_delta_to_send,
            min_level: cfg.min_level,
            max_level: cfg.max_level,
            initial_level: clamp_level(cfg.neutral_level, cfg.min_level, cfg.max_level),
            calm_level: clamp_level(cfg.calm_level, cfg.min_level, cfg.max_level),
            lights: IndexMap::new(),
            started: false,
        }
    }

    /// Broadcast the initial level of every configured entity.  Runs once;
    /// later calls are no-ops.
    pub fn start<S: EventSink + ?Sized>(&mut self, entities: &[EntityId], sink: &mut S) {
        if self.started {
            return;
        }
        self.started = true;
        for entity in entities {
            self.register(entity, sink);
        }
        info!("LIGHT | started with {} entities", self.lights.len());
    }

    /// Create state for `entity` on first sight and broadcast its initial
    /// level, bypassing the gate.  Known entities are left alone.
    pub fn register<S: EventSink + ?Sized>(&mut self, entity: &EntityId, sink: &mut S) {
        if self.lights.contains_key(entity) {
            return;
        }
        let light = EntityLight {
            level: self.initial_level,
            mode: LightMode::Init,
        };
        self.lights.insert(entity.clone(), light);
        self.broadcast(entity, light, REASON_INIT, sink);
    }

    /// Route one mailbox message.
    pub fn handle<S: EventSink + ?Sized>(&mut self, msg: LightingMsg, sink: &mut S) {
        match msg {
            LightingMsg::Aggression(update) => self.on_aggression(&update, sink),
            LightingMsg::SetLight(req) => self.on_set_light(req, sink),
            LightingMsg::Calm(req) => self.calm(&req, sink),
        }
    }

    fn on_aggression<S: EventSink + ?Sized>(&mut self, update: &AggressionUpdate, sink: &mut S) {
        let Some(entity) = &update.entity_id else {
            warn!("LIGHT | aggression_update without entity_id dropped");
            return;
        };
        self.regulate(entity, update.aggression, sink);
    }

    fn on_set_light<S: EventSink + ?Sized>(&mut self, req: LightRequest, sink: &mut S) {
        let Some(entity) = &req.entity_id else {
            warn!("LIGHT | set_light without entity_id dropped");
            return;
        };
        let reason = req.reason.as_deref().unwrap_or(REASON_MANUAL);
        let level = req.level.unwrap_or(self.initial_level);
        self.manual_set(entity, level, reason, sink);
    }

    /// Proportional regulation.  Returns `true` if an actuation went out.
    pub fn regulate<S: EventSink + ?Sized>(
        &mut self,
        entity: &EntityId,
        aggression: f32,
        sink: &mut S,
    ) -> bool {
        let target = self.controller.target(aggression);
        self.request(entity, target, LightMode::Auto, REASON_REGULATE, sink)
    }

    /// Externally requested level, clamped to range and gated like any
    /// regulated output.
    pub fn manual_set<S: EventSink + ?Sized>(
        &mut self,
        entity: &EntityId,
        level: i32,
        reason: &str,
        sink: &mut S,
    ) -> bool {
        self.request(entity, level, LightMode::Manual, reason, sink)
    }

    /// Calm one entity, or every known entity when the request names none.
    pub fn calm<S: EventSink + ?Sized>(&mut self, req: &CalmRequest, sink: &mut S) {
        match &req.entity_id {
            Some(entity) => {
                self.request(entity, self.calm_level, LightMode::Calm, REASON_CALM, sink);
            }
            None => {
                let entities: Vec<EntityId> = self.lights.keys().cloned().collect();
                for entity in &entities {
                    self.request(entity, self.calm_level, LightMode::Calm, REASON_CALM, sink);
                }
            }
        }
    }

    pub fn level(&self, entity: &EntityId) -> Option<i32> {
        self.lights.get(entity).map(|l| l.level)
    }

    pub fn state(&self, entity: &EntityId) -> Option<EntityLight> {
        self.lights.get(entity).copied()
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.lights.keys()
    }

    // ── Internal ──────────────────────────────────────────────────

    fn request<S: EventSink + ?Sized>(
        &mut self,
        entity: &EntityId,
        level: i32,
        mode: LightMode,
        reason: &str,
        sink: &mut S,
    ) -> bool {
        self.register(entity, sink);
        let level = clamp_level(level, self.min_level, self.max_level);
        let now = self.clock.now();
        if !self.allow(entity, level) {
            debug!("LIGHT | {} request {} ({}) gated", entity, level, reason);
            return false;
        }

        let light = EntityLight { level, mode };
        self.lights.insert(entity.clone(), light);
        self.gate.mark(entity, now);
        info!("LIGHT | {} -> {} ({}, {})", entity, level, mode.as_str(), reason);
        self.broadcast(entity, light, reason, sink);
        true
    }

    /// Acceptance gate: interval elapsed and change large enough.
    fn allow(&self, entity: &EntityId, new_level: i32) -> bool {
        let current = self.level(entity).unwrap_or(self.initial_level);
        self.gate.is_open(entity, self.clock.now())
            && (new_level - current).abs() >= self.min_delta
    }

    fn broadcast<S: EventSink + ?Sized>(
        &self,
        entity: &EntityId,
        light: EntityLight,
        reason: &str,
        sink: &mut S,
    ) {
        emit_best_effort(
            sink,
            Outbound::LightLevel {
                entity_id: entity.clone(),
                level: light.level,
                reason: reason.to_owned(),
            },
        );
        emit_best_effort(
            sink,
            Outbound::LightState {
                entity_id: entity.clone(),
                level: light.level,
                mode: light.mode,
                reason: reason.to_owned(),
            },
        );
    }
}

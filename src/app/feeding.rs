//! Feed Batch Scheduler.
//!
//! Owns the single feed silo.  Every hunger reading updates a per-entity
//! cache and triggers one decision cycle:
//!
//! 1. Silo empty → `no_feed` for every hungry entity, broadcast, done.
//! 2. Candidates = cached hunger ≥ threshold, hungriest first (ties keep
//!    first-seen order).
//! 3. Serve up to `max_hens_per_batch`, skipping entities still in
//!    cooldown, capping each portion at what is left in the silo.
//! 4. Broadcast the silo state if anything was dispensed.
//! 5. Warn whenever the silo is at or below the low-feed threshold.
//!
//! Every hungry entity ends a cycle fed, alerted, or skipped by cooldown.
//! The level can never go negative: portions are always capped.

use core::time::Duration;
use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info, warn};

use super::ports::{Clock, EventSink, emit_best_effort};
use crate::config::FeedingConfig;
use crate::control::gate::elapsed;
use crate::entity::EntityId;
use crate::messages::{FeedingMsg, HungerSample, Outbound};

/// The shared, depletable feed resource.  `level <= capacity` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedResource {
    level: u32,
    capacity: u32,
}

impl FeedResource {
    /// Starting level is capped at capacity.
    pub fn new(level: u32, capacity: u32) -> Self {
        Self {
            level: level.min(capacity),
            capacity,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.level == 0
    }

    /// Take up to `portion` units.  Returns what was actually taken.
    fn take(&mut self, portion: u32) -> u32 {
        let taken = portion.min(self.level);
        self.level -= taken;
        taken
    }
}

/// Outcome of one decision cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// `(entity, portion)` in serving order.
    pub served: Vec<(EntityId, u32)>,
    /// Hungry entities skipped because they were fed too recently.
    pub cooling_down: Vec<EntityId>,
    /// Hungry entities that got a `no_feed` alert instead.
    pub starved: Vec<EntityId>,
}

pub struct FeedScheduler<C> {
    clock: C,
    feed: FeedResource,
    portion_size: u32,
    hunger_threshold: i32,
    low_feed_threshold: u32,
    max_per_batch: usize,
    cooldown: Duration,
    last_hunger: IndexMap<EntityId, i32>,
    last_fed_at: HashMap<EntityId, Duration>,
    started: bool,
}

impl<C: Clock> FeedScheduler<C> {
    pub fn new(cfg: &FeedingConfig, clock: C) -> Self {
        Self {
            clock,
            feed: FeedResource::new(cfg.initial_feed_level, cfg.silo_capacity),
            portion_size: cfg.portion_size,
            hunger_threshold: cfg.hunger_threshold,
            low_feed_threshold: cfg.low_feed_threshold,
            max_per_batch: cfg.max_hens_per_batch,
            cooldown: cfg.cooldown(),
            last_hunger: IndexMap::new(),
            last_fed_at: HashMap::new(),
            started: false,
        }
    }

    /// Publish the starting silo state once.
    pub fn start<S: EventSink + ?Sized>(&mut self, sink: &mut S) {
        if self.started {
            return;
        }
        self.started = true;
        info!(
            "FEED | started, silo {}/{}",
            self.feed.level(),
            self.feed.capacity()
        );
        self.broadcast_state("init", sink);
    }

    /// Route one mailbox message.
    pub fn handle<S: EventSink + ?Sized>(&mut self, msg: FeedingMsg, sink: &mut S) {
        match msg {
            FeedingMsg::Hunger(sample) => {
                self.ingest(&sample, sink);
            }
        }
    }

    /// Record a hunger reading and run a decision cycle.
    /// Samples without an entity id are dropped and return `None`.
    pub fn ingest<S: EventSink + ?Sized>(
        &mut self,
        sample: &HungerSample,
        sink: &mut S,
    ) -> Option<BatchReport> {
        let Some(entity) = &sample.entity_id else {
            warn!("FEED | hunger sample without entity_id dropped");
            return None;
        };
        Some(self.ingest_hunger(entity, sample.hunger, sink))
    }

    pub fn ingest_hunger<S: EventSink + ?Sized>(
        &mut self,
        entity: &EntityId,
        hunger: i32,
        sink: &mut S,
    ) -> BatchReport {
        debug!("FEED | {} hunger={}", entity, hunger);
        self.last_hunger.insert(entity.clone(), hunger);
        self.schedule_batch(sink)
    }

    pub fn schedule_batch<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> BatchReport {
        let mut report = BatchReport::default();

        if self.feed.is_empty() {
            for (entity, hunger) in self.hungry() {
                self.alert_no_feed(&entity, hunger, sink);
                report.starved.push(entity);
            }
            self.broadcast_state("no_feed", sink);
            return report;
        }

        let now = self.clock.now();
        for (entity, hunger) in self.hungry() {
            if report.served.len() >= self.max_per_batch {
                break;
            }
            if self.in_cooldown(&entity, now) {
                debug!("FEED | {} in cooldown, skipped", entity);
                report.cooling_down.push(entity);
                continue;
            }
            let portion = self.feed.take(self.portion_size);
            if portion == 0 {
                self.alert_no_feed(&entity, hunger, sink);
                report.starved.push(entity);
                break;
            }
            self.last_fed_at.insert(entity.clone(), now);
            info!(
                "FEED | {} fed portion={} hunger_before={} remaining={}",
                entity,
                portion,
                hunger,
                self.feed.level()
            );
            emit_best_effort(
                sink,
                Outbound::FeedDispensed {
                    entity_id: entity.clone(),
                    amount: portion,
                },
            );
            emit_best_effort(
                sink,
                Outbound::FeedReport {
                    entity_id: entity.clone(),
                    portion,
                    remaining_feed: self.feed.level(),
                    hunger_before: hunger,
                },
            );
            report.served.push((entity, portion));
        }

        if !report.served.is_empty() {
            self.broadcast_state("batch_feed", sink);
        }
        if self.feed.level() <= self.low_feed_threshold {
            warn!(
                "FEED | low feed: {} <= {}",
                self.feed.level(),
                self.low_feed_threshold
            );
            emit_best_effort(
                sink,
                Outbound::LowFeed {
                    level: self.feed.level(),
                    threshold: self.low_feed_threshold,
                },
            );
        }
        report
    }

    pub fn feed(&self) -> FeedResource {
        self.feed
    }

    pub fn last_hunger(&self, entity: &EntityId) -> Option<i32> {
        self.last_hunger.get(entity).copied()
    }

    pub fn last_fed_at(&self, entity: &EntityId) -> Option<Duration> {
        self.last_fed_at.get(entity).copied()
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Candidates at or above threshold, hungriest first.  `sort_by` is
    /// stable, so equal hunger keeps first-seen order.
    fn hungry(&self) -> Vec<(EntityId, i32)> {
        let mut candidates: Vec<(EntityId, i32)> = self
            .last_hunger
            .iter()
            .filter(|&(_, &h)| h >= self.hunger_threshold)
            .map(|(e, &h)| (e.clone(), h))
            .collect();
        candidates.sort_by(|a, b| b.1.cmp(&a.1));
        candidates
    }

    fn in_cooldown(&self, entity: &EntityId, now: Duration) -> bool {
        self.last_fed_at
            .get(entity)
            .is_some_and(|&at| elapsed(now, at) < self.cooldown)
    }

    fn alert_no_feed<S: EventSink + ?Sized>(&self, entity: &EntityId, hunger: i32, sink: &mut S) {
        warn!("FEED | no feed for {} (hunger={})", entity, hunger);
        emit_best_effort(
            sink,
            Outbound::NoFeed {
                entity_id: entity.clone(),
                hunger,
                remaining_feed: self.feed.level(),
            },
        );
    }

    fn broadcast_state<S: EventSink + ?Sized>(&self, reason: &'static str, sink: &mut S) {
        emit_best_effort(
            sink,
            Outbound::FeedState {
                level: self.feed.level(),
                capacity: self.feed.capacity(),
                reason,
            },
        );
    }
}

//! Clamping and anti-spam gates.
//!
//! Two flavours of per-entity time gating live here:
//!
//! - [`Debounce`] suppresses a *repeat* of an unchanged value inside a
//!   window.  A changed value always passes.
//! - [`RateGate`] only remembers when an entity last had an update
//!   accepted.  The caller combines it with its own delta check.
//!
//! All timestamps are monotonic offsets (`Duration` since the clock's
//! origin), never wall-clock time.

use core::time::Duration;
use std::collections::HashMap;

use crate::entity::EntityId;

/// Clamp aggression to `[-max_abs, max_abs]`.  NaN maps to zero.
pub fn clamp_aggression(aggression: f32, max_abs: f32) -> f32 {
    if aggression.is_nan() {
        return 0.0;
    }
    let bound = max_abs.abs();
    aggression.clamp(-bound, bound)
}

/// Clamp an integer level to `[min, max]`.
///
/// Tolerates an inverted range by clamping to `min`, so it never panics
/// on an unvalidated config.
pub fn clamp_level(level: i32, min: i32, max: i32) -> i32 {
    if min > max {
        return min;
    }
    level.clamp(min, max)
}

/// Time since `then`, saturating at zero if the clock was reset.
pub fn elapsed(now: Duration, then: Duration) -> Duration {
    now.saturating_sub(then)
}

// ── Debounce ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebounceEntry<V> {
    pub last_value: V,
    pub last_sent_at: Duration,
}

/// Per-entity "same value within the window" suppressor.
#[derive(Debug)]
pub struct Debounce<V> {
    window: Duration,
    entries: HashMap<EntityId, DebounceEntry<V>>,
}

impl<V: PartialEq + Copy> Debounce<V> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: HashMap::new(),
        }
    }

    /// Returns `true` and records the send unless `value` equals the last
    /// value sent for `entity` less than `window` ago.
    pub fn should_send(&mut self, entity: &EntityId, value: V, now: Duration) -> bool {
        if let Some(entry) = self.entries.get(entity) {
            if elapsed(now, entry.last_sent_at) < self.window && entry.last_value == value {
                return false;
            }
        }
        self.entries.insert(
            entity.clone(),
            DebounceEntry {
                last_value: value,
                last_sent_at: now,
            },
        );
        true
    }

    pub fn entry(&self, entity: &EntityId) -> Option<&DebounceEntry<V>> {
        self.entries.get(entity)
    }
}

// ── Rate gate ─────────────────────────────────────────────────

/// Per-entity minimum interval between accepted updates.
///
/// An entity that has never been accepted is always inside the gate.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_accepted: HashMap<EntityId, Duration>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: HashMap::new(),
        }
    }

    pub fn is_open(&self, entity: &EntityId, now: Duration) -> bool {
        self.last_accepted
            .get(entity)
            .is_none_or(|&at| elapsed(now, at) >= self.min_interval)
    }

    pub fn mark(&mut self, entity: &EntityId, now: Duration) {
        self.last_accepted.insert(entity.clone(), now);
    }

    pub fn last_accepted(&self, entity: &EntityId) -> Option<Duration> {
        self.last_accepted.get(entity).copied()
    }
}

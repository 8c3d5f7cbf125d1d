//! System configuration parameters
//!
//! All tunable parameters for the henhouse control core, grouped by the
//! component that consumes them.  Every field has a default so a partial
//! JSON file only needs to name what it overrides.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Entities known at startup.  Each gets one `"init"` light broadcast.
    pub entities: Vec<EntityId>,
    pub behavior: BehaviorConfig,
    pub lighting: LightingConfig,
    pub feeding: FeedingConfig,
}

/// Aggression Alarm Monitor parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Aggression is clamped to `[-max_abs_aggression, max_abs_aggression]`.
    pub max_abs_aggression: f32,
    /// `|aggression|` at or above this raises an alarm.
    pub aggression_threshold: f32,
    /// Debounce window for forwarding unchanged aggression to lighting.
    pub regulate_min_interval_sec: f32,
    /// Ask lighting to calm the alarmed entity after every alarm.
    pub calm_on_alarm: bool,
}

/// Lighting Setpoint Regulator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub min_level: i32,
    pub max_level: i32,
    /// Setpoint used inside the dead-band and for new entities.
    pub neutral_level: i32,
    /// Level change per unit of aggression outside the dead-band.
    pub gain_per_aggression: f32,
    /// Dead-band lower bound (inclusive).
    pub target_aggr_min: f32,
    /// Dead-band upper bound (inclusive).
    pub target_aggr_max: f32,
    /// Minimum time between accepted updates for one entity.
    pub min_update_interval_s: f32,
    /// Minimum `|new - current|` for an update to be accepted.
    pub min_delta_to_send: i32,
    /// Level requested by a `calm_hens` command.
    pub calm_level: i32,
}

/// Feed Batch Scheduler parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedingConfig {
    pub silo_capacity: u32,
    pub initial_feed_level: u32,
    /// Feed units dispensed per served entity.
    pub portion_size: u32,
    /// Cached hunger at or above this makes an entity a candidate.
    pub hunger_threshold: i32,
    /// Level at or below which a `low_feed_warning` is emitted.
    pub low_feed_threshold: u32,
    /// Upper bound on entities served per decision cycle.
    pub max_hens_per_batch: usize,
    /// Minimum time between two feeds of the same entity.
    pub feed_cooldown_s: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            max_abs_aggression: 10.0,
            aggression_threshold: 7.0,
            regulate_min_interval_sec: 2.0,
            calm_on_alarm: false,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            min_level: 0,
            max_level: 100,
            neutral_level: 50,
            gain_per_aggression: 5.0,
            target_aggr_min: -3.0,
            target_aggr_max: 3.0,
            min_update_interval_s: 1.0,
            min_delta_to_send: 2,
            calm_level: 70,
        }
    }
}

impl Default for FeedingConfig {
    fn default() -> Self {
        Self {
            silo_capacity: 100,
            initial_feed_level: 100,
            portion_size: 5,
            hunger_threshold: 70,
            low_feed_threshold: 20,
            max_hens_per_batch: 3,
            feed_cooldown_s: 30.0,
        }
    }
}

impl SystemConfig {
    /// Range-check every section.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, id) in self.entities.iter().enumerate() {
            if self.entities[..i].contains(id) {
                return Err(ConfigError::ValidationFailed("entities: duplicate id"));
            }
        }
        self.behavior.validate()?;
        self.lighting.validate()?;
        self.feeding.validate()
    }
}

impl BehaviorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_abs_aggression.is_finite() && self.max_abs_aggression > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "behavior.max_abs_aggression must be positive",
            ));
        }
        if !self.aggression_threshold.is_finite() || self.aggression_threshold < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "behavior.aggression_threshold must be non-negative",
            ));
        }
        if !is_interval(self.regulate_min_interval_sec) {
            return Err(ConfigError::ValidationFailed(
                "behavior.regulate_min_interval_sec must be a non-negative duration",
            ));
        }
        Ok(())
    }

    pub fn regulate_interval(&self) -> Duration {
        secs(self.regulate_min_interval_sec)
    }
}

impl LightingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_level > self.max_level {
            return Err(ConfigError::ValidationFailed(
                "lighting.min_level exceeds max_level",
            ));
        }
        let range = self.min_level..=self.max_level;
        if !range.contains(&self.neutral_level) {
            return Err(ConfigError::ValidationFailed(
                "lighting.neutral_level outside [min_level, max_level]",
            ));
        }
        if !range.contains(&self.calm_level) {
            return Err(ConfigError::ValidationFailed(
                "lighting.calm_level outside [min_level, max_level]",
            ));
        }
        if !self.gain_per_aggression.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "lighting.gain_per_aggression must be finite",
            ));
        }
        if !(self.target_aggr_min.is_finite()
            && self.target_aggr_max.is_finite()
            && self.target_aggr_min <= self.target_aggr_max)
        {
            return Err(ConfigError::ValidationFailed(
                "lighting.target_aggr_min exceeds target_aggr_max",
            ));
        }
        if !is_interval(self.min_update_interval_s) {
            return Err(ConfigError::ValidationFailed(
                "lighting.min_update_interval_s must be a non-negative duration",
            ));
        }
        if self.min_delta_to_send < 0 {
            return Err(ConfigError::ValidationFailed(
                "lighting.min_delta_to_send must be non-negative",
            ));
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        secs(self.min_update_interval_s)
    }
}

impl FeedingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_feed_level > self.silo_capacity {
            return Err(ConfigError::ValidationFailed(
                "feeding.initial_feed_level exceeds silo_capacity",
            ));
        }
        if self.portion_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "feeding.portion_size must be positive",
            ));
        }
        if self.max_hens_per_batch == 0 {
            return Err(ConfigError::ValidationFailed(
                "feeding.max_hens_per_batch must be positive",
            ));
        }
        if !is_interval(self.feed_cooldown_s) {
            return Err(ConfigError::ValidationFailed(
                "feeding.feed_cooldown_s must be a non-negative duration",
            ));
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Duration {
        secs(self.feed_cooldown_s)
    }
}

/// Non-negative, finite and small enough to be a `Duration`.
fn is_interval(v: f32) -> bool {
    Duration::try_from_secs_f32(v).is_ok()
}

/// Seconds to `Duration`; anything `is_interval` rejects maps to zero.
fn secs(v: f32) -> Duration {
    Duration::try_from_secs_f32(v).unwrap_or(Duration::ZERO)
}

//! Dead-band proportional controller for light levels
//!
//! Maps an aggression reading to a target light level.  Inside the
//! dead-band the target is the neutral setpoint regardless of the exact
//! reading; outside it the response is linear in aggression and
//! saturates at the configured level bounds.
//!
//! ```text
//!   level
//!   max ┤                    ╭────
//!       │                   ╱
//!   neu ┤──────────────────╱
//!       │      ╱ dead-band
//!   min ┤─────╯
//!       └──────┬──────┬──────────▶ aggression
//!            a_min   a_max
//! ```

use super::gate::clamp_level;
use crate::config::LightingConfig;

/// Proportional controller with a dead-band around zero error.
#[derive(Debug, Clone)]
pub struct DeadBandController {
    neutral: i32,
    gain: f32,
    band_min: f32,
    band_max: f32,
    output_min: i32,
    output_max: i32,
}

impl DeadBandController {
    pub fn new(cfg: &LightingConfig) -> Self {
        Self {
            neutral: cfg.neutral_level,
            gain: cfg.gain_per_aggression,
            band_min: cfg.target_aggr_min,
            band_max: cfg.target_aggr_max,
            output_min: cfg.min_level,
            output_max: cfg.max_level,
        }
    }

    pub fn in_dead_band(&self, aggression: f32) -> bool {
        (self.band_min..=self.band_max).contains(&aggression)
    }

    /// Target level for the given aggression reading.
    pub fn target(&self, aggression: f32) -> i32 {
        if self.in_dead_band(aggression) {
            return self.clamp(self.neutral);
        }
        let raw = self.neutral as f32 + self.gain * aggression;
        if !raw.is_finite() {
            return self.clamp(self.neutral);
        }
        // f32 -> i32 casts saturate, so huge gains still land in range.
        self.clamp(raw.round_ties_even() as i32)
    }

    fn clamp(&self, level: i32) -> i32 {
        clamp_level(level, self.output_min, self.output_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> DeadBandController {
        DeadBandController::new(&LightingConfig::default())
    }

    #[test]
    fn dead_band_holds_neutral() {
        let c = controller();
        for a in [-3.0, -1.5, 0.0, 2.9, 3.0] {
            assert_eq!(c.target(a), 50, "aggression {a}");
        }
    }

    #[test]
    fn linear_outside_band() {
        let c = controller();
        assert_eq!(c.target(4.0), 70);
        assert_eq!(c.target(-4.0), 30);
        // Halves go to the even neighbour.
        assert_eq!(c.target(5.5), 78);
        assert_eq!(c.target(-5.5), 22);
    }

    #[test]
    fn saturates_at_bounds() {
        let c = controller();
        assert_eq!(c.target(10.0), 100);
        assert_eq!(c.target(-10.0), 0);
        assert_eq!(c.target(f32::INFINITY), 50);
    }

    #[test]
    fn neutral_outside_range_is_clamped() {
        let cfg = LightingConfig {
            neutral_level: 150,
            ..LightingConfig::default()
        };
        assert_eq!(DeadBandController::new(&cfg).target(0.0), 100);
    }
}

//! Pitch-to-height mapping with motion limits
//!
//! One [`PitchMapper`] per logical output channel. Each tick converts the
//! latest pitch estimate into a target position, then moves the current
//! position toward it under exponential smoothing with optional velocity
//! and acceleration caps, so the physical fixture always receives
//! bounded-rate commands.

use serde::{Deserialize, Serialize};

use crate::analysis::PitchEstimate;
use crate::error::{CoreError, Result};

/// Configuration for a pitch mapper channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Lowest pitch of the mapped range, Hz
    pub pitch_min: f32,
    /// Highest pitch of the mapped range, Hz
    pub pitch_max: f32,
    /// Lower bound of the output range
    pub out_min: f32,
    /// Upper bound of the output range; also the "home" position
    pub out_max: f32,
    /// Exponential smoothing time constant in seconds; <= 0 snaps
    /// immediately and skips the motion limits
    pub smoothing_tau: f32,
    /// Maximum speed in output units per second; <= 0 disables the cap
    pub max_velocity: f32,
    /// Maximum acceleration in output units per second squared; <= 0
    /// disables the cap
    pub max_acceleration: f32,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            pitch_min: 80.0,
            pitch_max: 350.0,
            out_min: 0.0,
            out_max: 100.0,
            smoothing_tau: 0.25,
            max_velocity: 60.0,
            max_acceleration: 200.0,
        }
    }
}

impl MapperConfig {
    /// Check that the pitch and output ranges are non-degenerate
    pub fn validate(&self) -> Result<()> {
        if self.pitch_max <= self.pitch_min {
            return Err(CoreError::InvalidConfig(format!(
                "pitch range is empty: {}..{} Hz",
                self.pitch_min, self.pitch_max
            )));
        }
        if self.out_max <= self.out_min {
            return Err(CoreError::InvalidConfig(format!(
                "output range is empty: {}..{}",
                self.out_min, self.out_max
            )));
        }
        Ok(())
    }
}

/// Smoothed, rate-limited mapping from pitch to a physical position.
///
/// Pitch maps inversely: higher pitch produces a *lower* output value, so
/// that with the usual "0 = fully raised" hoist convention a high note
/// lifts the fixture.
#[derive(Debug, Clone)]
pub struct PitchMapper {
    config: MapperConfig,
    position: f32,
    velocity: f32,
    last_valid_target: Option<f32>,
}

impl PitchMapper {
    /// Create a mapper resting at the home position
    pub fn new(config: MapperConfig) -> Self {
        Self {
            config,
            position: config.out_max,
            velocity: 0.0,
            last_valid_target: None,
        }
    }

    /// Current (unrounded) position
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Current velocity in output units per second
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Last target derived from a valid pitch, if any was ever observed
    pub fn last_valid_target(&self) -> Option<f32> {
        self.last_valid_target
    }

    /// Rounded integer output, the value handed to the fixture layer
    pub fn output(&self) -> u8 {
        self.position.round().clamp(0.0, 255.0) as u8
    }

    /// Advance the mapper by `dt` seconds with the latest pitch estimate
    pub fn tick(&mut self, pitch: PitchEstimate, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let cfg = self.config;

        let target = match pitch.hz() {
            Some(hz) if hz >= cfg.pitch_min && hz <= cfg.pitch_max => {
                let t = ((hz - cfg.pitch_min) / (cfg.pitch_max - cfg.pitch_min)).clamp(0.0, 1.0);
                // Inverse mapping: high pitch -> low output value
                let target = cfg.out_max + (cfg.out_min - cfg.out_max) * t;
                self.last_valid_target = Some(target);
                target
            }
            _ => match self.last_valid_target {
                // Never saw a valid pitch: freeze, never drift to a default
                None => return,
                // Last known-good position is home: hold rather than
                // creeping back to the top on every brief silence.
                // Deliberate policy, see the module docs.
                Some(t) if t == cfg.out_max => return,
                Some(t) => t,
            },
        };

        if cfg.smoothing_tau <= 0.0 {
            self.position = target.clamp(cfg.out_min, cfg.out_max);
            self.velocity = 0.0;
            return;
        }

        let alpha = 1.0 - (-dt / cfg.smoothing_tau).exp();
        let mut step = (target - self.position) * alpha;
        if cfg.max_velocity > 0.0 {
            let cap = cfg.max_velocity * dt;
            step = step.clamp(-cap, cap);
        }

        let desired_velocity = step / dt;
        if cfg.max_acceleration > 0.0 {
            let cap = cfg.max_acceleration * dt;
            let dv = (desired_velocity - self.velocity).clamp(-cap, cap);
            self.velocity += dv;
        } else {
            self.velocity = desired_velocity;
        }

        self.position = (self.position + self.velocity * dt).clamp(cfg.out_min, cfg.out_max);
    }

    /// Reset between scenario segments: home position, zero velocity,
    /// target cleared
    pub fn reset(&mut self) {
        self.position = self.config.out_max;
        self.velocity = 0.0;
        self.last_valid_target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::PitchEstimate;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn config() -> MapperConfig {
        MapperConfig {
            pitch_min: 100.0,
            pitch_max: 300.0,
            out_min: 0.0,
            out_max: 100.0,
            smoothing_tau: 0.2,
            max_velocity: 50.0,
            max_acceleration: 0.0,
        }
    }

    #[test]
    fn degenerate_ranges_are_rejected() {
        let bad = MapperConfig {
            pitch_min: 300.0,
            pitch_max: 100.0,
            ..MapperConfig::default()
        };
        assert!(bad.validate().is_err());
        assert!(MapperConfig::default().validate().is_ok());
    }

    #[test]
    fn frozen_until_first_valid_pitch() {
        let mut mapper = PitchMapper::new(config());
        let start = mapper.position();
        for _ in 0..200 {
            mapper.tick(PitchEstimate::Unvoiced, 0.03);
        }
        assert_eq!(mapper.position(), start);
    }

    #[test]
    fn high_pitch_maps_to_low_output() {
        let cfg = MapperConfig {
            smoothing_tau: 0.0,
            ..config()
        };
        let mut mapper = PitchMapper::new(cfg);
        mapper.tick(PitchEstimate::Voiced(300.0), 0.03);
        assert_abs_diff_eq!(mapper.position(), 0.0);
        mapper.tick(PitchEstimate::Voiced(100.0), 0.03);
        assert_abs_diff_eq!(mapper.position(), 100.0);
        mapper.tick(PitchEstimate::Voiced(200.0), 0.03);
        assert_abs_diff_eq!(mapper.position(), 50.0, epsilon = 1e-4);
    }

    #[test]
    fn dropout_keeps_moving_toward_last_target() {
        let mut mapper = PitchMapper::new(config());
        mapper.tick(PitchEstimate::Voiced(300.0), 0.03);
        let after_voiced = mapper.position();
        assert!(after_voiced < 100.0);
        // Pitch lost: keeps approaching the last valid target (0.0)
        mapper.tick(PitchEstimate::Unvoiced, 0.03);
        assert!(mapper.position() < after_voiced);
    }

    #[test]
    fn dropout_with_home_target_holds_position() {
        let mut mapper = PitchMapper::new(config());
        // pitch_min maps exactly to home (out_max)
        mapper.tick(PitchEstimate::Voiced(100.0), 0.03);
        assert_eq!(mapper.last_valid_target(), Some(100.0));
        // Move away from home via a direct state change: drive down first
        mapper.tick(PitchEstimate::Voiced(300.0), 0.5);
        mapper.tick(PitchEstimate::Voiced(100.0), 0.01);
        let held = mapper.position();
        for _ in 0..100 {
            mapper.tick(PitchEstimate::Unvoiced, 0.03);
        }
        // Must not re-approach home while unvoiced
        assert_eq!(mapper.position(), held);
    }

    #[test]
    fn out_of_range_pitch_is_treated_as_invalid() {
        let mut mapper = PitchMapper::new(config());
        let start = mapper.position();
        mapper.tick(PitchEstimate::Voiced(1000.0), 0.03);
        assert_eq!(mapper.position(), start);
        assert_eq!(mapper.last_valid_target(), None);
    }

    #[test]
    fn reset_returns_home_and_clears_target() {
        let mut mapper = PitchMapper::new(config());
        mapper.tick(PitchEstimate::Voiced(300.0), 0.5);
        assert!(mapper.position() < 100.0);
        mapper.reset();
        assert_eq!(mapper.position(), 100.0);
        assert_eq!(mapper.velocity(), 0.0);
        assert_eq!(mapper.last_valid_target(), None);
    }

    proptest! {
        /// Per-tick displacement never exceeds the velocity cap.
        #[test]
        fn velocity_cap_bounds_displacement(
            pitches in prop::collection::vec(50.0f32..500.0, 1..100),
            dt in 0.005f32..0.1,
        ) {
            let cfg = MapperConfig {
                max_velocity: 40.0,
                max_acceleration: 150.0,
                ..config()
            };
            let mut mapper = PitchMapper::new(cfg);
            for hz in pitches {
                let before = mapper.position();
                mapper.tick(PitchEstimate::Voiced(hz), dt);
                let moved = (mapper.position() - before).abs();
                prop_assert!(
                    moved <= cfg.max_velocity * dt + 1e-3,
                    "moved {} in {}s exceeds cap", moved, dt
                );
            }
        }
    }
}

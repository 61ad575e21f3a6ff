//! Emergency-stop safety layer
//!
//! While engaged, the safety layer has unconditional write priority over
//! every other producer of the universe buffer: the tick scheduler calls
//! [`SafetyLayer::enforce`] after all mapper/scenario writes, so the safe
//! state always lands last within a tick.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use lumivox_core::Rgb8;

use super::fixture::FixtureBank;

/// Safe state pushed to every fixture while the e-stop is engaged
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Height (0..=100) every fixture is driven to
    pub safe_height: u8,
    /// Color every fixture is driven to
    pub safe_color: Rgb8,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        // Fully raised, dim red: fixtures out of the performers' way and
        // visibly in the stopped state
        Self {
            safe_height: 100,
            safe_color: Rgb8::new(64, 0, 0),
        }
    }
}

/// E-stop state machine
#[derive(Debug)]
pub struct SafetyLayer {
    config: SafetyConfig,
    engaged: bool,
}

impl SafetyLayer {
    /// Create a disengaged safety layer
    pub fn new(config: SafetyConfig) -> Self {
        Self {
            config,
            engaged: false,
        }
    }

    /// True while the e-stop is engaged
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Engage the e-stop and stamp every fixture with the safe state.
    /// Idempotent: returns false if already engaged.
    pub fn trigger_estop(&mut self, bank: &mut FixtureBank) -> bool {
        if self.engaged {
            return false;
        }
        self.engaged = true;
        warn!(
            safe_height = self.config.safe_height,
            "emergency stop engaged"
        );
        self.enforce(bank);
        true
    }

    /// Disengage. Idempotent; prior fixture state is NOT restored, the
    /// downstream producers re-push their state on the next tick.
    pub fn reset_estop(&mut self) -> bool {
        if !self.engaged {
            return false;
        }
        self.engaged = false;
        info!("emergency stop reset");
        true
    }

    /// Per-tick hook: while engaged, re-apply the safe state to every
    /// fixture, overriding whatever other writers produced this tick.
    pub fn enforce(&self, bank: &mut FixtureBank) {
        if !self.engaged {
            return;
        }
        for index in 0..bank.fixture_count() {
            bank.set_height(index, self.config.safe_height);
            bank.set_color(index, self.config.safe_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dmx::fixture::KineticFixture;

    fn bank() -> FixtureBank {
        FixtureBank::new(vec![KineticFixture::at(1), KineticFixture::at(5)])
    }

    #[test]
    fn trigger_is_idempotent() {
        let mut bank = bank();
        let mut safety = SafetyLayer::new(SafetyConfig::default());
        assert!(safety.trigger_estop(&mut bank));
        assert!(!safety.trigger_estop(&mut bank));
        assert!(safety.is_engaged());
    }

    #[test]
    fn trigger_stamps_every_fixture() {
        let mut bank = bank();
        let mut safety = SafetyLayer::new(SafetyConfig {
            safe_height: 100,
            safe_color: Rgb8::new(10, 20, 30),
        });
        safety.trigger_estop(&mut bank);
        for start in [1u16, 5] {
            assert_eq!(bank.universe().channel(start), 255);
            assert_eq!(bank.universe().channel(start + 1), 10);
            assert_eq!(bank.universe().channel(start + 2), 20);
            assert_eq!(bank.universe().channel(start + 3), 30);
        }
    }

    #[test]
    fn enforce_overrides_other_writers() {
        let mut bank = bank();
        let mut safety = SafetyLayer::new(SafetyConfig::default());
        safety.trigger_estop(&mut bank);
        // Another producer writes after the trigger
        bank.set_height(0, 0);
        bank.set_color(0, Rgb8::new(255, 255, 255));
        // The scheduler runs the hook last
        safety.enforce(&mut bank);
        assert_eq!(bank.universe().channel(1), 255);
        assert_eq!(bank.universe().channel(2), 64);
    }

    #[test]
    fn reset_does_not_restore_prior_state() {
        let mut bank = bank();
        let mut safety = SafetyLayer::new(SafetyConfig::default());
        safety.trigger_estop(&mut bank);
        assert!(safety.reset_estop());
        assert!(!safety.reset_estop());
        // Safe values remain until a producer overwrites them
        assert_eq!(bank.universe().channel(1), 255);
        // And enforce is now a no-op
        bank.set_height(0, 0);
        safety.enforce(&mut bank);
        assert_eq!(bank.universe().channel(1), 0);
    }
}

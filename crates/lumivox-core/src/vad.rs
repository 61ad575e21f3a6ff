//! Debounced voice activity detection
//!
//! A tick-driven reducer over the latest loudness level. Brief loudness
//! spikes and brief dropouts are both debounced: voice must persist for
//! `min_voice_duration` before `VoiceStarted` fires, and silence must
//! persist for `end_silence_duration` before `VoiceEnded` fires.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Detector states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceActivity {
    /// No voice, nothing pending
    Silent,
    /// Loudness crossed the threshold; waiting out the debounce window
    Armed,
    /// Voice confirmed
    Active,
    /// Loudness dropped; waiting out the end-silence window
    Releasing,
}

/// Events fired by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadEvent {
    /// Debounced start of voice
    VoiceStarted,
    /// Debounced end of voice
    VoiceEnded,
}

/// Configuration for the voice activity detector
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    /// Loudness level (0..1) at or above which the input counts as voice
    pub threshold: f32,
    /// Seconds the level must stay at/above threshold before voice starts
    pub min_voice_duration: f64,
    /// Seconds the level must stay below threshold before voice ends
    pub end_silence_duration: f64,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            min_voice_duration: 0.15,
            end_silence_duration: 0.6,
        }
    }
}

/// Debounced voice activity detector.
///
/// No background thread; `tick` must be called once per analysis tick with
/// a monotonic timestamp in seconds.
#[derive(Debug)]
pub struct VoiceActivityDetector {
    config: VadConfig,
    state: VoiceActivity,
    armed_at: f64,
    releasing_at: f64,
    last_voice_at: f64,
}

impl VoiceActivityDetector {
    /// Create a detector in the `Silent` state
    pub fn new(config: VadConfig) -> Self {
        Self {
            config,
            state: VoiceActivity::Silent,
            armed_at: 0.0,
            releasing_at: 0.0,
            last_voice_at: 0.0,
        }
    }

    /// Current state
    pub fn state(&self) -> VoiceActivity {
        self.state
    }

    /// True while voice is confirmed (Active or Releasing)
    pub fn is_voice(&self) -> bool {
        matches!(self.state, VoiceActivity::Active | VoiceActivity::Releasing)
    }

    /// Timestamp of the most recent above-threshold tick while active
    pub fn last_voice_at(&self) -> f64 {
        self.last_voice_at
    }

    /// Advance the state machine with the latest loudness level.
    ///
    /// Returns an event on the debounced start/end transitions.
    pub fn tick(&mut self, t: f64, level: f32) -> Option<VadEvent> {
        let loud = level >= self.config.threshold;
        match self.state {
            VoiceActivity::Silent => {
                if loud {
                    self.state = VoiceActivity::Armed;
                    self.armed_at = t;
                }
                None
            }
            VoiceActivity::Armed => {
                if !loud {
                    // Debounce rejected: spike shorter than min duration
                    self.state = VoiceActivity::Silent;
                    None
                } else if t - self.armed_at >= self.config.min_voice_duration {
                    self.state = VoiceActivity::Active;
                    self.last_voice_at = t;
                    debug!(t, "voice started");
                    Some(VadEvent::VoiceStarted)
                } else {
                    None
                }
            }
            VoiceActivity::Active => {
                if loud {
                    self.last_voice_at = t;
                } else {
                    self.state = VoiceActivity::Releasing;
                    self.releasing_at = t;
                }
                None
            }
            VoiceActivity::Releasing => {
                if loud {
                    // Debounce rejected: dropout shorter than end silence
                    self.state = VoiceActivity::Active;
                    self.last_voice_at = t;
                    None
                } else if t - self.releasing_at >= self.config.end_silence_duration {
                    self.state = VoiceActivity::Silent;
                    debug!(t, "voice ended");
                    Some(VadEvent::VoiceEnded)
                } else {
                    None
                }
            }
        }
    }

    /// Return to `Silent` and clear pending timestamps
    pub fn reset(&mut self) {
        self.state = VoiceActivity::Silent;
        self.armed_at = 0.0;
        self.releasing_at = 0.0;
        self.last_voice_at = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> VoiceActivityDetector {
        VoiceActivityDetector::new(VadConfig {
            threshold: 0.1,
            min_voice_duration: 0.1,
            end_silence_duration: 0.2,
        })
    }

    #[test]
    fn short_spike_does_not_fire() {
        let mut vad = detector();
        // Above threshold for just under min_voice_duration
        assert_eq!(vad.tick(0.00, 0.5), None);
        assert_eq!(vad.tick(0.05, 0.5), None);
        assert_eq!(vad.tick(0.09, 0.5), None);
        // Drops before the debounce window elapses
        assert_eq!(vad.tick(0.095, 0.0), None);
        assert_eq!(vad.state(), VoiceActivity::Silent);
    }

    #[test]
    fn sustained_voice_fires_exactly_once() {
        let mut vad = detector();
        assert_eq!(vad.tick(0.0, 0.5), None);
        assert_eq!(vad.tick(0.11, 0.5), Some(VadEvent::VoiceStarted));
        assert_eq!(vad.tick(0.2, 0.5), None);
        assert_eq!(vad.tick(0.3, 0.5), None);
        assert_eq!(vad.state(), VoiceActivity::Active);
    }

    #[test]
    fn brief_dropout_does_not_end_voice() {
        let mut vad = detector();
        vad.tick(0.0, 0.5);
        vad.tick(0.11, 0.5);
        assert_eq!(vad.tick(0.2, 0.0), None);
        assert_eq!(vad.state(), VoiceActivity::Releasing);
        // Voice resumes before end_silence_duration elapses
        assert_eq!(vad.tick(0.3, 0.5), None);
        assert_eq!(vad.state(), VoiceActivity::Active);
    }

    #[test]
    fn sustained_silence_ends_voice() {
        let mut vad = detector();
        vad.tick(0.0, 0.5);
        vad.tick(0.11, 0.5);
        assert_eq!(vad.tick(0.2, 0.0), None);
        assert_eq!(vad.tick(0.41, 0.0), Some(VadEvent::VoiceEnded));
        assert_eq!(vad.state(), VoiceActivity::Silent);
    }

    #[test]
    fn reset_returns_to_silent() {
        let mut vad = detector();
        vad.tick(0.0, 0.5);
        vad.tick(0.11, 0.5);
        assert_eq!(vad.state(), VoiceActivity::Active);
        vad.reset();
        assert_eq!(vad.state(), VoiceActivity::Silent);
    }
}

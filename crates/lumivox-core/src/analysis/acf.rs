//! Normalized autocorrelation pitch detector

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{raw_rms, PitchDetector, PitchEstimate};

/// Configuration for the autocorrelation detector
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AcfConfig {
    /// Lowest detectable frequency in Hz
    pub min_hz: f32,
    /// Highest detectable frequency in Hz
    pub max_hz: f32,
    /// Raw RMS below which the window is treated as silence
    pub silence_floor: f32,
    /// Minimum normalized correlation to accept a candidate lag
    pub confidence: f32,
}

impl Default for AcfConfig {
    fn default() -> Self {
        Self {
            min_hz: 70.0,
            max_hz: 400.0,
            silence_floor: 0.01,
            confidence: 0.15,
        }
    }
}

/// Pitch detector based on normalized autocorrelation.
///
/// For each candidate period in `[rate/max_hz, rate/min_hz]` the window is
/// correlated against itself shifted by that lag; the lag with the highest
/// normalized correlation wins, provided the correlation clears the
/// confidence threshold.
#[derive(Debug, Clone)]
pub struct AcfDetector {
    config: AcfConfig,
}

impl AcfDetector {
    /// Create a detector with the given configuration
    pub fn new(config: AcfConfig) -> Self {
        Self { config }
    }
}

impl PitchDetector for AcfDetector {
    fn estimate(&self, samples: &[f32], sample_rate: u32) -> PitchEstimate {
        let cfg = &self.config;
        if samples.is_empty() || cfg.max_hz <= cfg.min_hz {
            return PitchEstimate::Unvoiced;
        }
        if raw_rms(samples) < cfg.silence_floor {
            return PitchEstimate::Unvoiced;
        }

        let lag_min = ((sample_rate as f32 / cfg.max_hz).floor() as usize).max(1);
        let lag_max = ((sample_rate as f32 / cfg.min_hz).ceil() as usize).min(samples.len() - 1);
        if lag_min >= lag_max {
            return PitchEstimate::Unvoiced;
        }

        let mut best_lag = 0usize;
        let mut best_corr = 0.0f32;

        for lag in lag_min..=lag_max {
            let n = samples.len() - lag;
            let mut dot = 0.0f32;
            let mut energy_a = 0.0f32;
            let mut energy_b = 0.0f32;
            for i in 0..n {
                let a = samples[i];
                let b = samples[i + lag];
                dot += a * b;
                energy_a += a * a;
                energy_b += b * b;
            }
            let norm = (energy_a * energy_b).sqrt();
            if norm <= f32::EPSILON {
                continue;
            }
            let corr = dot / norm;
            // Strict-improvement margin: a periodic signal correlates
            // near-equally at every multiple of its period, and the
            // shortest such lag is the fundamental
            if corr > best_corr + 1e-4 {
                best_corr = corr;
                best_lag = lag;
            }
        }

        if best_lag == 0 || best_corr < cfg.confidence {
            trace!(best_corr, "autocorrelation below confidence threshold");
            return PitchEstimate::Unvoiced;
        }

        let hz = (sample_rate as f32 / best_lag as f32).clamp(cfg.min_hz, cfg.max_hz);
        PitchEstimate::Voiced(hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_low_confidence_noise() {
        // Deterministic pseudo-noise without any periodic structure
        let mut x = 0x12345678u32;
        let noise: Vec<f32> = (0..2048)
            .map(|_| {
                x = x.wrapping_mul(1664525).wrapping_add(1013904223);
                (x >> 16) as f32 / 32768.0 - 1.0
            })
            .collect();
        let detector = AcfDetector::new(AcfConfig {
            confidence: 0.6,
            ..AcfConfig::default()
        });
        assert_eq!(detector.estimate(&noise, 44_100), PitchEstimate::Unvoiced);
    }

    #[test]
    fn result_is_clamped_to_configured_range() {
        let cfg = AcfConfig::default();
        let detector = AcfDetector::new(cfg);
        let samples: Vec<f32> = (0..4096)
            .map(|i| (2.0 * std::f32::consts::PI * 100.0 * i as f32 / 44_100.0).sin())
            .collect();
        let hz = detector.estimate(&samples, 44_100).hz().unwrap();
        assert!(hz >= cfg.min_hz && hz <= cfg.max_hz);
    }
}

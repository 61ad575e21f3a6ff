//! YIN pitch detector (cumulative-mean-normalized difference)

use serde::{Deserialize, Serialize};

use super::{PitchDetector, PitchEstimate};

/// Configuration for the YIN detector
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct YinConfig {
    /// Normalized-difference threshold under which a lag is accepted
    pub threshold: f32,
}

impl Default for YinConfig {
    fn default() -> Self {
        Self { threshold: 0.12 }
    }
}

/// YIN pitch detector.
///
/// Computes the cumulative-mean-normalized difference function over lags in
/// `[0, len/2)`, takes the first lag `>= 2` that drops under the threshold
/// (walking forward while the function still decreases), and refines the lag
/// with parabolic interpolation before converting to Hz.
#[derive(Debug, Clone)]
pub struct YinDetector {
    config: YinConfig,
}

impl YinDetector {
    /// Create a detector with the given configuration
    pub fn new(config: YinConfig) -> Self {
        Self { config }
    }
}

impl PitchDetector for YinDetector {
    fn estimate(&self, samples: &[f32], sample_rate: u32) -> PitchEstimate {
        let half = samples.len() / 2;
        if half < 4 {
            return PitchEstimate::Unvoiced;
        }

        // Difference function over the first half of the window
        let mut diff = vec![0.0f32; half];
        for (tau, d) in diff.iter_mut().enumerate().skip(1) {
            let mut sum = 0.0f32;
            for i in 0..half {
                let delta = samples[i] - samples[i + tau];
                sum += delta * delta;
            }
            *d = sum;
        }

        // Cumulative-mean normalization; d'(0) is defined as 1
        let mut cmnd = vec![1.0f32; half];
        let mut running_sum = 0.0f32;
        for tau in 1..half {
            running_sum += diff[tau];
            cmnd[tau] = if running_sum > f32::EPSILON {
                diff[tau] * tau as f32 / running_sum
            } else {
                // Flat (silent) window: keep the function at 1 so no lag
                // ever crosses the threshold
                1.0
            };
        }

        // First threshold crossing, refined to the local minimum
        let mut tau = 2;
        let found = loop {
            if tau >= half {
                break None;
            }
            if cmnd[tau] < self.config.threshold {
                while tau + 1 < half && cmnd[tau + 1] < cmnd[tau] {
                    tau += 1;
                }
                break Some(tau);
            }
            tau += 1;
        };

        let Some(tau) = found else {
            return PitchEstimate::Unvoiced;
        };

        let refined = parabolic_interpolation(&cmnd, tau);
        if refined <= 0.0 {
            return PitchEstimate::Unvoiced;
        }
        PitchEstimate::Voiced(sample_rate as f32 / refined)
    }
}

/// Refine an integer lag using the three normalized-difference samples
/// around it. Returns the fractional lag of the parabola's vertex.
fn parabolic_interpolation(cmnd: &[f32], tau: usize) -> f32 {
    if tau == 0 || tau + 1 >= cmnd.len() {
        return tau as f32;
    }
    let s0 = cmnd[tau - 1];
    let s1 = cmnd[tau];
    let s2 = cmnd[tau + 1];
    let denom = 2.0 * (2.0 * s1 - s2 - s0);
    if denom.abs() <= f32::EPSILON {
        return tau as f32;
    }
    tau as f32 + (s2 - s0) / denom
}

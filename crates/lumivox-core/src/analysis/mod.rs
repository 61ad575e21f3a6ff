//! Voice signal analysis: loudness (RMS) and fundamental frequency
//!
//! One analysis tick consumes a [`SampleWindow`] and produces a loudness
//! level in `[0, 1]` plus a [`PitchEstimate`]. Two interchangeable pitch
//! detectors are provided behind the [`PitchDetector`] trait: a normalized
//! autocorrelation detector ([`AcfDetector`]) and a YIN detector
//! ([`YinDetector`]).

mod acf;
mod yin;

pub use acf::{AcfConfig, AcfDetector};
pub use yin::{YinConfig, YinDetector};

use serde::{Deserialize, Serialize};

/// A borrowed window of normalized samples plus its sample rate.
///
/// Produced once per analysis tick and consumed immediately; never stored.
#[derive(Debug, Clone, Copy)]
pub struct SampleWindow<'a> {
    /// Samples in ~[-1, 1]
    pub samples: &'a [f32],
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl<'a> SampleWindow<'a> {
    /// Create a new window over a sample slice
    pub fn new(samples: &'a [f32], sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }
}

/// Result of a pitch estimation pass.
///
/// `Unvoiced` is an explicit sentinel: it is distinguishable from any
/// legitimately low frequency, which a `0.0 Hz` convention would not be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PitchEstimate {
    /// A fundamental frequency in Hz
    Voiced(f32),
    /// No periodicity found in the window
    Unvoiced,
}

impl PitchEstimate {
    /// The estimated frequency, if voiced
    pub fn hz(&self) -> Option<f32> {
        match self {
            PitchEstimate::Voiced(hz) => Some(*hz),
            PitchEstimate::Unvoiced => None,
        }
    }

    /// True if a pitch was found
    pub fn is_voiced(&self) -> bool {
        matches!(self, PitchEstimate::Voiced(_))
    }
}

/// A pitch estimation algorithm.
///
/// Implementations are pure with respect to the window: the same samples and
/// sample rate always produce the same estimate.
pub trait PitchDetector: Send {
    /// Estimate the fundamental frequency of `samples`
    fn estimate(&self, samples: &[f32], sample_rate: u32) -> PitchEstimate;
}

/// Configuration for loudness computation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LoudnessConfig {
    /// Empirical gain applied to the raw RMS before clamping.
    ///
    /// Speech at a comfortable microphone distance has a raw RMS well below
    /// 1.0; the gain spreads it over the usable range.
    pub gain: f32,
}

impl Default for LoudnessConfig {
    fn default() -> Self {
        Self { gain: 5.0 }
    }
}

/// Root-mean-square loudness of a window, scaled by `gain`, clamped to [0, 1].
///
/// Non-finite samples are treated as silence so a corrupt capture buffer
/// cannot contaminate downstream state.
pub fn compute_rms(samples: &[f32], config: &LoudnessConfig) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples
        .iter()
        .map(|&s| if s.is_finite() { s * s } else { 0.0 })
        .sum();
    let rms = (sum / samples.len() as f32).sqrt();
    (rms * config.gain).clamp(0.0, 1.0)
}

/// Raw (unscaled) RMS, used by detectors as a silence floor check
pub(crate) fn raw_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples
        .iter()
        .map(|&s| if s.is_finite() { s * s } else { 0.0 })
        .sum();
    (sum / samples.len() as f32).sqrt()
}

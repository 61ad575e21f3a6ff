//! LumiVox Core - Voice Analysis Domain Model
//!
//! This crate contains the signal side of LumiVox, the voice-driven kinetic
//! lighting controller:
//! - Loudness (RMS) and pitch analysis over fixed sample windows
//! - Debounced voice activity detection
//! - Motion-limited pitch-to-height mapping
//! - Loudness-to-color mapping
//! - Ordered observer lists for analysis events
//!
//! Everything here is tick-driven and allocation-light; the output side
//! (DMX, Art-Net, safety) lives in `lumivox-control`.

#![warn(missing_docs)]

pub mod analysis;
pub mod color;
pub mod error;
pub mod events;
pub mod logging;
pub mod mapper;
pub mod vad;

pub use analysis::{
    compute_rms, AcfConfig, AcfDetector, LoudnessConfig, PitchDetector, PitchEstimate,
    SampleWindow, YinConfig, YinDetector,
};
pub use color::{level_to_color, ColorMapConfig, Rgb8};
pub use error::{CoreError, Result};
pub use events::{ObserverList, SubscriberId};
pub use logging::LogConfig;
pub use mapper::{MapperConfig, PitchMapper};
pub use vad::{VadConfig, VadEvent, VoiceActivity, VoiceActivityDetector};

//! LumiVox Control - DMX/Art-Net Output and Show Pipeline
//!
//! The actuator side of LumiVox:
//! - **DMX**: universe buffer, kinetic fixture model, e-stop safety layer
//! - **Art-Net**: byte-exact ArtDMX encoding, fire-and-forget UDP
//!   transport, multi-NIC source-interface selection
//! - **Motion**: cancellable single-owner move tasks for cue playback
//! - **Pipeline**: the tick scheduler wiring voice analysis
//!   (`lumivox-core`) to fixture output

#![warn(missing_docs)]

/// Art-Net encoding and transport
pub mod artnet;
/// DMX universe, fixtures and safety
pub mod dmx;
/// Error types
pub mod error;
/// Cancellable motion tasks
pub mod motion;
/// The tick-driven show pipeline
pub mod pipeline;

pub use artnet::{ArtNetAddress, ArtNetEndpoint, ArtNetSender, NicPreferences, ARTNET_PORT};
pub use dmx::{DmxUniverse, FixtureBank, KineticFixture, SafetyConfig, SafetyLayer, UNIVERSE_SIZE};
pub use error::{ControlError, Result};
pub use motion::{MotionHandle, MotionRegistry};
pub use pipeline::{PipelineConfig, PitchAlgorithm, ShowPipeline};

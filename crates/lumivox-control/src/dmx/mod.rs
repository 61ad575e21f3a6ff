//! DMX output model
//!
//! A single 512-channel universe, a table of kinetic fixtures writing into
//! it, and the e-stop safety layer that can override every other writer.

pub mod fixture;
pub mod safety;
pub mod universe;

pub use fixture::{FixtureBank, KineticFixture, MAX_HEIGHT};
pub use safety::{SafetyConfig, SafetyLayer};
pub use universe::{DmxUniverse, UNIVERSE_SIZE};

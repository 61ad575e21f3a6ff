//! Kinetic fixture model
//!
//! Each fixture occupies a contiguous run of DMX channels starting at its
//! start address: one height channel (winch position) and three color
//! channels. Addressing is absolute start address + per-attribute offsets;
//! Art-Net sub-universe packing is handled entirely by the endpoint.

use serde::{Deserialize, Serialize};

use lumivox_core::Rgb8;

use super::universe::DmxUniverse;

/// Heights are commanded in 0..=100 and scaled to the DMX byte range
pub const MAX_HEIGHT: u8 = 100;

/// One physical kinetic light. Immutable after configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KineticFixture {
    /// First DMX channel of this fixture (1..=512)
    pub start_address: u16,
    /// Height channel offset relative to the start address
    pub height_offset: u16,
    /// Red channel offset
    pub red_offset: u16,
    /// Green channel offset
    pub green_offset: u16,
    /// Blue channel offset
    pub blue_offset: u16,
}

impl KineticFixture {
    /// A fixture with the conventional layout: height, R, G, B
    pub fn at(start_address: u16) -> Self {
        Self {
            start_address,
            height_offset: 0,
            red_offset: 1,
            green_offset: 2,
            blue_offset: 3,
        }
    }

    // Saturates instead of wrapping; a saturated address is out of the
    // universe range, so the write below becomes a no-op
    fn channel(&self, offset: u16) -> u16 {
        self.start_address.saturating_add(offset)
    }
}

/// The configured fixture table plus the universe buffer they write into.
#[derive(Debug, Clone)]
pub struct FixtureBank {
    fixtures: Vec<KineticFixture>,
    universe: DmxUniverse,
}

impl FixtureBank {
    /// Create a bank over a fixture table
    pub fn new(fixtures: Vec<KineticFixture>) -> Self {
        Self {
            fixtures,
            universe: DmxUniverse::new(),
        }
    }

    /// Number of configured fixtures
    pub fn fixture_count(&self) -> usize {
        self.fixtures.len()
    }

    /// The configured fixture table
    pub fn fixtures(&self) -> &[KineticFixture] {
        &self.fixtures
    }

    /// Set a fixture's height (0..=100). Values above the range are
    /// clamped; an unknown fixture index is a no-op.
    pub fn set_height(&mut self, index: usize, height: u8) {
        let Some(fixture) = self.fixtures.get(index) else {
            return;
        };
        let clamped = height.min(MAX_HEIGHT);
        let byte = (clamped as f32 / MAX_HEIGHT as f32 * 255.0).round() as u8;
        self.universe.set_channel(fixture.channel(fixture.height_offset), byte);
    }

    /// Set a fixture's color; an unknown fixture index is a no-op
    pub fn set_color(&mut self, index: usize, color: Rgb8) {
        let Some(fixture) = self.fixtures.get(index) else {
            return;
        };
        self.universe.set_channel(fixture.channel(fixture.red_offset), color.r);
        self.universe.set_channel(fixture.channel(fixture.green_offset), color.g);
        self.universe.set_channel(fixture.channel(fixture.blue_offset), color.b);
    }

    /// The universe buffer as currently written
    pub fn universe(&self) -> &DmxUniverse {
        &self.universe
    }

    /// Zero the whole universe
    pub fn reset_all(&mut self) {
        self.universe.clear();
    }
}

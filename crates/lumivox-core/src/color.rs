//! Volume-to-color mapping
//!
//! Stateless: a loudness level in `[0, 1]` picks a hue by linear
//! interpolation and converts HSV (full saturation and value) to RGB.

use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};

/// An 8-bit RGB color ready for DMX channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb8 {
    /// Red 0..=255
    pub r: u8,
    /// Green 0..=255
    pub g: u8,
    /// Blue 0..=255
    pub b: u8,
}

impl Rgb8 {
    /// Construct from components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Configuration for the volume-to-color mapper
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMapConfig {
    /// Hue in degrees at zero loudness
    pub hue_low_deg: f32,
    /// Hue in degrees at full loudness
    pub hue_high_deg: f32,
}

impl Default for ColorMapConfig {
    fn default() -> Self {
        // Quiet = deep blue, loud = red
        Self {
            hue_low_deg: 240.0,
            hue_high_deg: 0.0,
        }
    }
}

/// Map a loudness level to a color.
///
/// `level` is clamped to `[0, 1]` before the hue interpolation.
pub fn level_to_color(level: f32, config: &ColorMapConfig) -> Rgb8 {
    let t = level.clamp(0.0, 1.0);
    let hue = config.hue_low_deg + (config.hue_high_deg - config.hue_low_deg) * t;
    let rgb: Srgb = Srgb::from_color(Hsv::new(hue, 1.0, 1.0));
    let rgb = rgb.into_format::<u8>();
    Rgb8::new(rgb.red, rgb.green, rgb.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_map_to_configured_hues() {
        let config = ColorMapConfig {
            hue_low_deg: 240.0,
            hue_high_deg: 0.0,
        };
        // Hue 240 = pure blue, hue 0 = pure red
        assert_eq!(level_to_color(0.0, &config), Rgb8::new(0, 0, 255));
        assert_eq!(level_to_color(1.0, &config), Rgb8::new(255, 0, 0));
    }

    #[test]
    fn level_is_clamped() {
        let config = ColorMapConfig::default();
        assert_eq!(
            level_to_color(-1.0, &config),
            level_to_color(0.0, &config)
        );
        assert_eq!(level_to_color(2.0, &config), level_to_color(1.0, &config));
    }
}

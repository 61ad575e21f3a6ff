//! Application configuration (TOML)

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use lumivox_control::{ArtNetEndpoint, KineticFixture, PipelineConfig, UNIVERSE_SIZE};
use lumivox_core::LogConfig;

/// Tick rates for the two decoupled loops
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Interval between analysis ticks, milliseconds
    pub analysis_interval_ms: u64,
    /// Art-Net refresh rate, frames per second
    pub send_fps: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            analysis_interval_ms: 30,
            send_fps: 40,
        }
    }
}

/// Microphone capture parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Requested input sample rate in Hz
    pub sample_rate: u32,
    /// Analysis window length in samples
    pub window_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            window_size: 2048,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging setup
    pub log: LogConfig,
    /// Analysis, mapping, VAD, color and safety parameters
    pub pipeline: PipelineConfig,
    /// The fixture table
    pub fixtures: Vec<KineticFixture>,
    /// Art-Net destination and NIC preferences
    pub artnet: ArtNetEndpoint,
    /// Tick rates
    pub ticks: TickConfig,
    /// Microphone capture
    pub capture: CaptureConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            pipeline: PipelineConfig::default(),
            // Four fixtures with the conventional height/R/G/B layout,
            // spaced ten channels apart
            fixtures: (0..4).map(|i| KineticFixture::at(1 + i * 10)).collect(),
            artnet: ArtNetEndpoint::default(),
            ticks: TickConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file. A missing file is degraded mode (defaults),
    /// a malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject degenerate ranges before they reach the pipeline
    pub fn validate(&self) -> Result<()> {
        self.pipeline
            .mapper
            .validate()
            .context("invalid mapper configuration")?;
        if self.capture.window_size < 256 {
            anyhow::bail!(
                "capture window of {} samples is too short for pitch analysis",
                self.capture.window_size
            );
        }
        for fixture in &self.fixtures {
            if fixture.start_address == 0 || fixture.start_address > UNIVERSE_SIZE as u16 {
                anyhow::bail!(
                    "fixture start address {} outside 1..={}",
                    fixture.start_address,
                    UNIVERSE_SIZE
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/lumivox.toml")).unwrap();
        assert_eq!(config.fixtures.len(), 4);
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[ticks]
analysis_interval_ms = 20
send_fps = 60

[[fixtures]]
start_address = 101
height_offset = 0
red_offset = 1
green_offset = 2
blue_offset = 3
"#
        )
        .unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.ticks.send_fps, 60);
        assert_eq!(config.fixtures.len(), 1);
        assert_eq!(config.fixtures[0].start_address, 101);
        // Untouched sections keep their defaults
        assert_eq!(config.capture.window_size, 2048);
    }

    #[test]
    fn fixture_address_outside_the_universe_is_rejected() {
        let mut config = AppConfig::default();
        config.fixtures.push(KineticFixture::at(65_534));
        assert!(config.validate().is_err());
        config.fixtures.pop();
        config.fixtures.push(KineticFixture::at(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fixtures = 12").unwrap();
        assert!(AppConfig::load(file.path()).is_err());
    }
}

//! The tick-driven show pipeline
//!
//! Single logical control loop, two independent tick rates: the analysis
//! tick runs signal analysis, voice activity, the mappers, fixture writes
//! and finally safety enforcement; the (typically faster) send tick pushes
//! the current universe state over Art-Net. The two are decoupled so lighting
//! refresh never depends on analysis cost, and a slow or failing network
//! never stalls analysis.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use lumivox_core::analysis::{
    compute_rms, AcfConfig, AcfDetector, LoudnessConfig, PitchDetector, SampleWindow, YinConfig,
    YinDetector,
};
use lumivox_core::color::{level_to_color, ColorMapConfig};
use lumivox_core::events::ObserverList;
use lumivox_core::mapper::{MapperConfig, PitchMapper};
use lumivox_core::vad::{VadConfig, VadEvent, VoiceActivityDetector};
use lumivox_core::Rgb8;

use crate::artnet::ArtNetSender;
use crate::dmx::fixture::{FixtureBank, KineticFixture};
use crate::dmx::safety::{SafetyConfig, SafetyLayer};
use crate::motion::{MotionHandle, MotionRegistry};

/// Which pitch detection algorithm drives the mappers
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum PitchAlgorithm {
    /// Normalized autocorrelation
    Acf(AcfConfig),
    /// YIN (cumulative-mean-normalized difference)
    Yin(YinConfig),
}

impl Default for PitchAlgorithm {
    fn default() -> Self {
        PitchAlgorithm::Yin(YinConfig::default())
    }
}

impl PitchAlgorithm {
    fn build(&self) -> Box<dyn PitchDetector> {
        match *self {
            PitchAlgorithm::Acf(config) => Box::new(AcfDetector::new(config)),
            PitchAlgorithm::Yin(config) => Box::new(YinDetector::new(config)),
        }
    }
}

/// Configuration for the whole pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Loudness (RMS) scaling
    pub loudness: LoudnessConfig,
    /// Pitch detection algorithm and its parameters
    pub pitch: PitchAlgorithm,
    /// Voice activity debouncing
    pub vad: VadConfig,
    /// Pitch-to-height mapping, shared by every fixture channel
    pub mapper: MapperConfig,
    /// Loudness-to-color mapping
    pub color: ColorMapConfig,
    /// Safety (e-stop) state
    pub safety: SafetyConfig,
    /// Clear mapper and VAD state when the pipeline stops
    pub reset_state_on_stop: bool,
}

/// The assembled signal-to-actuator pipeline.
///
/// All collaborators are owned and explicitly injected at construction;
/// nothing here is a singleton.
pub struct ShowPipeline {
    config: PipelineConfig,
    detector: Box<dyn PitchDetector>,
    vad: VoiceActivityDetector,
    mappers: Vec<PitchMapper>,
    bank: FixtureBank,
    safety: SafetyLayer,
    motion: MotionRegistry,
    sender: ArtNetSender,
    last_tick: Option<f64>,
    on_loudness: ObserverList<f32>,
    on_pitch: ObserverList<f32>,
    on_voice_started: ObserverList<()>,
    on_voice_ended: ObserverList<()>,
}

impl ShowPipeline {
    /// Assemble the pipeline over a fixture table and a ready transport
    pub fn new(config: PipelineConfig, fixtures: Vec<KineticFixture>, sender: ArtNetSender) -> Self {
        let mappers = fixtures
            .iter()
            .map(|_| PitchMapper::new(config.mapper))
            .collect();
        Self {
            detector: config.pitch.build(),
            vad: VoiceActivityDetector::new(config.vad),
            mappers,
            bank: FixtureBank::new(fixtures),
            safety: SafetyLayer::new(config.safety),
            motion: MotionRegistry::new(),
            sender,
            last_tick: None,
            on_loudness: ObserverList::new(),
            on_pitch: ObserverList::new(),
            on_voice_started: ObserverList::new(),
            on_voice_ended: ObserverList::new(),
            config,
        }
    }

    /// One analysis tick: consume the latest sample window at time `now`
    /// (monotonic seconds) and update every fixture's channels.
    pub fn analysis_tick(&mut self, window: SampleWindow<'_>, now: f64) {
        let dt = match self.last_tick {
            Some(prev) if now > prev => (now - prev) as f32,
            _ => 0.0,
        };
        self.last_tick = Some(now);

        let level = compute_rms(window.samples, &self.config.loudness);
        self.on_loudness.emit(&level);

        match self.vad.tick(now, level) {
            Some(VadEvent::VoiceStarted) => self.on_voice_started.emit(&()),
            Some(VadEvent::VoiceEnded) => self.on_voice_ended.emit(&()),
            None => {}
        }

        let pitch = self.detector.estimate(window.samples, window.sample_rate);
        if let Some(hz) = pitch.hz() {
            self.on_pitch.emit(&hz);
        }

        let color = level_to_color(level, &self.config.color);
        for (index, mapper) in self.mappers.iter_mut().enumerate() {
            mapper.tick(pitch, dt);
            // A discrete motion task owns the height channel while it runs
            if !self.motion.owns(index) {
                self.bank.set_height(index, mapper.output());
            }
            self.bank.set_color(index, color);
        }

        self.motion.tick(dt, &mut self.bank);

        // Safety is the only writer allowed to override within a tick, and
        // it must run last
        if self.safety.is_engaged() {
            self.safety.enforce(&mut self.bank);
        }
    }

    /// One send tick: push the universe's current state over Art-Net.
    ///
    /// Send failures drop this frame; the next tick retries with fresh
    /// data unconditionally.
    pub fn send_tick(&mut self) {
        if let Err(e) = self.sender.send(self.bank.universe()) {
            warn!("Art-Net send failed, frame dropped: {e}");
        }
    }

    /// Stop the pipeline: cancel all motion tasks and (if configured)
    /// clear transient analysis state. The universe and transport are left
    /// untouched; no forced blackout.
    pub fn stop(&mut self) {
        self.motion.cancel_all();
        if self.config.reset_state_on_stop {
            for mapper in &mut self.mappers {
                mapper.reset();
            }
            self.vad.reset();
            self.last_tick = None;
        }
        debug!("pipeline stopped");
    }

    // --- external producer API (cue/keyframe playback) ---

    /// Write a fixture height directly (0..=100); unknown index is a no-op
    pub fn set_fixture_height(&mut self, index: usize, height: u8) {
        self.bank.set_height(index, height);
    }

    /// Write a fixture color directly; unknown index is a no-op
    pub fn set_fixture_color(&mut self, index: usize, color: Rgb8) {
        self.bank.set_color(index, color);
    }

    /// Flush the universe to the network now
    pub fn apply(&mut self) {
        self.send_tick();
    }

    /// Zero the whole universe
    pub fn reset_all(&mut self) {
        self.bank.reset_all();
    }

    /// Start a bounded-speed move of one fixture to a target height.
    /// Returns `None` for an unknown fixture index.
    pub fn move_fixture_to_position(
        &mut self,
        index: usize,
        target: f32,
        max_speed: f32,
    ) -> Option<MotionHandle> {
        if index >= self.bank.fixture_count() {
            return None;
        }
        let from = self
            .mappers
            .get(index)
            .map(|m| m.position())
            .unwrap_or(target);
        Some(self.motion.start(index, from, target, max_speed))
    }

    // --- safety ---

    /// Engage the e-stop and flush the safe state immediately
    pub fn trigger_estop(&mut self) {
        if self.safety.trigger_estop(&mut self.bank) {
            self.send_tick();
        }
    }

    /// Disengage the e-stop; producers re-push state on the next tick
    pub fn reset_estop(&mut self) {
        self.safety.reset_estop();
    }

    /// True while the e-stop is engaged
    pub fn is_engaged(&self) -> bool {
        self.safety.is_engaged()
    }

    // --- observers ---

    /// Loudness level per analysis tick
    pub fn on_loudness(&mut self) -> &mut ObserverList<f32> {
        &mut self.on_loudness
    }

    /// Pitch in Hz, emitted only on voiced ticks
    pub fn on_pitch(&mut self) -> &mut ObserverList<f32> {
        &mut self.on_pitch
    }

    /// Debounced voice start
    pub fn on_voice_started(&mut self) -> &mut ObserverList<()> {
        &mut self.on_voice_started
    }

    /// Debounced voice end
    pub fn on_voice_ended(&mut self) -> &mut ObserverList<()> {
        &mut self.on_voice_ended
    }

    // --- inspection (used by the app and tests) ---

    /// The universe as currently written
    pub fn universe(&self) -> &crate::dmx::universe::DmxUniverse {
        self.bank.universe()
    }

    /// Per-fixture mapper state
    pub fn mapper(&self, index: usize) -> Option<&PitchMapper> {
        self.mappers.get(index)
    }

    /// Live motion task count
    pub fn active_motions(&self) -> usize {
        self.motion.active_count()
    }
}

//! End-to-end tests of the analysis -> mapper chain

use lumivox_core::analysis::{
    compute_rms, AcfConfig, AcfDetector, LoudnessConfig, PitchDetector, YinConfig, YinDetector,
};
use lumivox_core::mapper::{MapperConfig, PitchMapper};
use lumivox_core::vad::{VadConfig, VadEvent, VoiceActivityDetector};

const SAMPLE_RATE: u32 = 44_100;

fn sine(freq: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

#[test]
fn detectors_track_a_pitch_sweep() {
    let acf = AcfDetector::new(AcfConfig::default());
    let yin = YinDetector::new(YinConfig::default());

    for freq in [90.0, 150.0, 220.0, 330.0] {
        let samples = sine(freq, 2048);
        for (name, detector) in [
            ("acf", &acf as &dyn PitchDetector),
            ("yin", &yin as &dyn PitchDetector),
        ] {
            let hz = detector
                .estimate(&samples, SAMPLE_RATE)
                .hz()
                .unwrap_or_else(|| panic!("{name} lost the pitch at {freq} Hz"));
            assert!(
                (hz - freq).abs() / freq < 0.02,
                "{name} at {freq} Hz estimated {hz} Hz"
            );
        }
    }
}

#[test]
fn a_rising_voice_lowers_the_mapped_position() {
    let detector = YinDetector::new(YinConfig::default());
    let mut mapper = PitchMapper::new(MapperConfig {
        pitch_min: 80.0,
        pitch_max: 350.0,
        out_min: 0.0,
        out_max: 100.0,
        smoothing_tau: 0.1,
        max_velocity: 0.0,
        max_acceleration: 0.0,
    });

    let mut positions = Vec::new();
    for freq in [100.0, 180.0, 260.0, 340.0] {
        let samples = sine(freq, 2048);
        let pitch = detector.estimate(&samples, SAMPLE_RATE);
        // Let the smoothed position settle on each note
        for _ in 0..100 {
            mapper.tick(pitch, 0.03);
        }
        positions.push(mapper.position());
    }

    // Inverse mapping: each higher note settles at a lower output value
    for pair in positions.windows(2) {
        assert!(pair[1] < pair[0], "positions not descending: {positions:?}");
    }
}

#[test]
fn vad_passes_over_a_spoken_phrase_shape() {
    // Loudness trace of a phrase: attack, sustained voice with a short
    // dip, then release into silence
    let config = VadConfig {
        threshold: 0.2,
        min_voice_duration: 0.09,
        end_silence_duration: 0.3,
    };
    let mut vad = VoiceActivityDetector::new(config);
    let mut events = Vec::new();

    let trace: &[(f64, f32)] = &[
        (0.00, 0.05), // noise floor
        (0.03, 0.60), // attack
        (0.06, 0.55),
        (0.09, 0.58),
        (0.12, 0.57), // min duration reached -> started
        (0.15, 0.05), // short dip
        (0.18, 0.50), // voice resumes
        (0.21, 0.52),
        (0.24, 0.04), // release begins
        (0.30, 0.03),
        (0.40, 0.02),
        (0.55, 0.02), // end silence reached -> ended
    ];
    for &(t, level) in trace {
        if let Some(event) = vad.tick(t, level) {
            events.push(event);
        }
    }

    assert_eq!(events, vec![VadEvent::VoiceStarted, VadEvent::VoiceEnded]);
}

#[test]
fn loudness_follows_amplitude() {
    let config = LoudnessConfig { gain: 1.0 };
    let quiet: Vec<f32> = sine(220.0, 2048).iter().map(|s| s * 0.1).collect();
    let loud = sine(220.0, 2048);
    assert!(compute_rms(&quiet, &config) < compute_rms(&loud, &config));
}

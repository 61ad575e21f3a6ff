//! LumiVox - voice-driven kinetic lighting
//!
//! Microphone loudness and pitch drive the height and color of DMX
//! fixtures over Art-Net. Two decoupled tick loops: analysis at a fixed
//! interval, Art-Net refresh at a fixed FPS.

mod capture;
mod config;
mod logging_setup;

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};

use capture::MicCapture;
use config::AppConfig;
use lumivox_control::{ArtNetSender, ShowPipeline};
use lumivox_core::analysis::SampleWindow;

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("lumivox.toml"));
    let config = AppConfig::load(&config_path)?;

    let _log_guard = logging_setup::init(&config.log)?;
    info!("LumiVox starting with {} fixtures", config.fixtures.len());

    let sender = ArtNetSender::new(config.artnet.clone())?;
    let mut pipeline = ShowPipeline::new(
        config.pipeline.clone(),
        config.fixtures.clone(),
        sender,
    );

    pipeline.on_voice_started().subscribe(|_| info!("voice started"));
    pipeline.on_voice_ended().subscribe(|_| info!("voice ended"));

    // Degraded mode without a microphone: the pipeline still serves cue
    // playback and the e-stop
    let capture = match MicCapture::start(&config.capture) {
        Ok(capture) => Some(capture),
        Err(e) => {
            warn!("microphone unavailable, running without analysis input: {e:#}");
            None
        }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    spawn_stdin_watcher(Arc::clone(&shutdown));

    let analysis_interval = Duration::from_millis(config.ticks.analysis_interval_ms);
    let send_interval = Duration::from_secs_f64(1.0 / config.ticks.send_fps.max(1) as f64);
    let window_size = config.capture.window_size;

    let mut window: VecDeque<f32> = VecDeque::with_capacity(window_size);
    let started = Instant::now();
    let mut next_analysis = Instant::now();
    let mut next_send = Instant::now();

    info!("control loop running (type 'quit' or close stdin to stop)");
    while !shutdown.load(Ordering::Acquire) {
        let now = Instant::now();

        if now >= next_analysis {
            if let Some(capture) = &capture {
                capture.drain_into(&mut window, window_size);
                if window.len() == window_size {
                    let samples = window.make_contiguous();
                    pipeline.analysis_tick(
                        SampleWindow::new(samples, capture.sample_rate()),
                        started.elapsed().as_secs_f64(),
                    );
                }
            }
            next_analysis += analysis_interval;
        }

        if now >= next_send {
            pipeline.send_tick();
            next_send += send_interval;
        }

        let next_due = next_analysis.min(next_send);
        if let Some(wait) = next_due.checked_duration_since(Instant::now()) {
            std::thread::sleep(wait.min(Duration::from_millis(5)));
        }
    }

    pipeline.stop();
    info!("LumiVox stopped");
    Ok(())
}

/// Watch stdin on a helper thread; "quit" or EOF requests shutdown
fn spawn_stdin_watcher(shutdown: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match std::io::BufRead::read_line(&mut stdin.lock(), &mut line) {
                Ok(0) => break, // EOF
                Ok(_) if line.trim().eq_ignore_ascii_case("quit") => break,
                Ok(_) => {}
                Err(_) => break,
            }
        }
        shutdown.store(true, Ordering::Release);
    });
}

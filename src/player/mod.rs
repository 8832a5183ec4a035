use std::time::{Duration, Instant};
use log::{debug, info, warn};
use crate::audio::{AudioBackend, AudioError, OutputStream};
use crate::debug_println;
use crate::settings::ApplicationSettings;
use crate::sine::ToneGenerator;

/// Process status for a failed run.
pub const FAILURE_STATUS: i32 = -1;

/// What the callback did during a completed run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlaybackReport {
    pub invocations: u64,
    pub samples: u64,
    pub peak: u16,
    pub elapsed: Duration,
}

impl PlaybackReport {
    /// Audio produced by the callback, at `sample_rate` frames per second.
    pub fn audio_duration(&self, sample_rate: u32, channels: u16) -> Duration {
        let frames = self.samples / channels.max(1) as u64;
        Duration::from_secs_f64(frames as f64 / sample_rate as f64)
    }
}

/// Play the tone described by `settings` on `backend` for the configured
/// number of ticks, then shut the stream and the subsystem down.
pub fn play<B: AudioBackend>(
    backend: &mut B,
    settings: &ApplicationSettings,
) -> Result<PlaybackReport, AudioError> {
    backend.init()?;
    info!("PLAYER: Audio init successful.");

    let result = run_stream(backend, settings);
    backend.quit();
    info!("PLAYER: Audio subsystem released");
    result
}

fn run_stream<B: AudioBackend>(
    backend: &mut B,
    settings: &ApplicationSettings,
) -> Result<PlaybackReport, AudioError> {
    let spec = settings.get_stream_spec();
    let mut tone = ToneGenerator::new(settings.get_tone_spec());
    let stats = tone.stats();
    debug!("PLAYER: Tone wrap period: {:?} samples", tone.wrap_period());

    let stream = backend.open(&spec, move |buffer: &mut [i16]| tone.fill(buffer))?;
    info!("PLAYER: Open audio successful.");

    if let Err(err) = stream.resume() {
        stream.close();
        return Err(err);
    }
    info!("PLAYER: Playing for {:?}", settings.get_runtime());

    let ticks_per_second = (1000 / settings.get_tick().as_millis().max(1)) as u32;
    let started = Instant::now();
    let mut runtime = settings.get_runtime_ticks();
    while runtime > 0 {
        std::thread::sleep(settings.get_tick());
        runtime -= 1;
        if ticks_per_second > 0 && runtime % ticks_per_second == 0 {
            debug!("PLAYER: {} callbacks, {} ticks left", stats.invocations(), runtime);
            debug_println!("PLAYER: peak sample {}", stats.peak());
        }
    }
    let elapsed = started.elapsed();

    stream.close();
    info!("PLAYER: Stream closed after {:?}", elapsed);

    let report = PlaybackReport {
        invocations: stats.invocations(),
        samples: stats.samples(),
        peak: stats.peak(),
        elapsed,
    };
    if report.invocations == 0 {
        warn!("PLAYER: The output callback was never invoked");
    }
    Ok(report)
}

/// Map the outcome of `play` to the process exit status.
pub fn exit_code(result: &Result<PlaybackReport, AudioError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => FAILURE_STATUS,
    }
}

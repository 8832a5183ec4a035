use std::time::Duration;
use crate::config::*;

/// How the generator keeps the phase argument bounded across callbacks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PhaseWrap {
    /// Wrap the sample index every `round(rate / freq * WRAP_PERIODS)` samples.
    /// The period is not an exact multiple of the wave, so every wrap shifts
    /// the phase by a small fraction of a sample.
    Rounded,
    /// Accumulate the cycle fraction and wrap it at 1.0.
    Exact,
}

/// Parameters of the output stream requested from the audio subsystem.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StreamSpec {
    pub sample_rate: u32,
    pub channels: u16,
    pub buffer_size: u32,
    pub silence: i16,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ToneSpec {
    pub frequency: f64,
    pub amplitude: i16,
    pub sample_rate: u32,
    pub wrap_periods: f64,
    pub phase_wrap: PhaseWrap,
}

impl ToneSpec {
    /// Time between two samples, in seconds.
    pub fn time_lag(&self) -> f64 {
        1.0 / self.sample_rate as f64
    }

    /// Samples in one period of the tone (not an integer in general).
    pub fn period_samples(&self) -> f64 {
        self.sample_rate as f64 / self.frequency
    }

    pub fn wrap_period(&self) -> u64 {
        (self.period_samples() * self.wrap_periods).round().max(1.0) as u64
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ApplicationSettings {
    stream: StreamSpec,
    tone: ToneSpec,
    runtime_ticks: u32,
    tick: Duration,
}

impl ApplicationSettings {
    pub fn get_stream_spec(&self) -> StreamSpec {
        self.stream
    }

    pub fn get_tone_spec(&self) -> ToneSpec {
        self.tone
    }

    pub fn get_sample_rate(&self) -> u32 {
        self.stream.sample_rate
    }

    pub fn get_channels(&self) -> u16 {
        self.stream.channels
    }

    pub fn get_buffer_size(&self) -> u32 {
        self.stream.buffer_size
    }

    pub fn get_runtime_ticks(&self) -> u32 {
        self.runtime_ticks
    }

    pub fn get_tick(&self) -> Duration {
        self.tick
    }

    /// Total time the player keeps the stream running.
    pub fn get_runtime(&self) -> Duration {
        self.tick * self.runtime_ticks
    }

    pub fn with_runtime(mut self, ticks: u32, tick: Duration) -> Self {
        self.runtime_ticks = ticks;
        self.tick = tick;
        self
    }

    pub fn with_phase_wrap(mut self, phase_wrap: PhaseWrap) -> Self {
        self.tone.phase_wrap = phase_wrap;
        self
    }
}

pub struct Settings;

impl Settings {
    pub fn get_default_settings() -> ApplicationSettings {
        ApplicationSettings {
            stream: StreamSpec {
                sample_rate: SAMPLE_RATE,
                channels: CHANNELS,
                buffer_size: BUFFER_SIZE,
                silence: SILENCE,
            },
            tone: ToneSpec {
                frequency: FREQUENCY,
                amplitude: AMPLITUDE,
                sample_rate: SAMPLE_RATE,
                wrap_periods: WRAP_PERIODS,
                phase_wrap: PhaseWrap::Rounded,
            },
            runtime_ticks: RUNTIME_TICKS,
            tick: Duration::from_millis(TICK_MS),
        }
    }
}

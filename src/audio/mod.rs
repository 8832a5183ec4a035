// ============================================
//                  Scope/Imports
// ============================================
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, error, info, warn};
use crate::settings::StreamSpec;

pub mod error;

pub use error::AudioError;

// ============================================
//          Audio Subsystem Interface
// ============================================

/// A platform audio subsystem able to run one output stream fed by a
/// callback.
pub trait AudioBackend {
    type Stream: OutputStream;

    /// Bring up the subsystem and select the output device.
    fn init(&mut self) -> Result<(), AudioError>;

    /// Open a stream for `spec`. The stream starts paused; `callback` runs on
    /// a thread owned by the subsystem, one invocation at a time.
    fn open<C>(&mut self, spec: &StreamSpec, callback: C) -> Result<Self::Stream, AudioError>
    where
        C: FnMut(&mut [i16]) + Send + 'static;

    /// Release the subsystem.
    fn quit(&mut self);
}

pub trait OutputStream {
    fn resume(&self) -> Result<(), AudioError>;

    /// Stop the stream. The callback is not invoked after this returns.
    fn close(self);
}

// ============================================
//              cpal Implementation
// ============================================

#[derive(Default)]
pub struct CpalBackend {
    host: Option<cpal::Host>,
    device: Option<cpal::Device>,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for CpalBackend {
    type Stream = CpalStream;

    fn init(&mut self) -> Result<(), AudioError> {
        let host = cpal::default_host();
        info!("AUDIO: Initializing host {:?}", host.id());

        let device = host.default_output_device().ok_or_else(AudioError::no_output_device)?;
        match device.name() {
            Ok(name) => info!("AUDIO: Default output device: {}", name),
            Err(err) => warn!("AUDIO: Failed to get output device name: {}", err),
        }

        self.host = Some(host);
        self.device = Some(device);
        Ok(())
    }

    fn open<C>(&mut self, spec: &StreamSpec, mut callback: C) -> Result<CpalStream, AudioError>
    where
        C: FnMut(&mut [i16]) + Send + 'static,
    {
        let device = self.device.as_ref().ok_or_else(AudioError::not_initialized)?;

        let config = cpal::StreamConfig {
            channels: spec.channels,
            sample_rate: cpal::SampleRate(spec.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(spec.buffer_size),
        };
        debug!("AUDIO: Requesting output stream {:?}", config);

        let silence = spec.silence;
        let stream = match device.build_output_stream(
            &config,
            move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                data.fill(silence);
                callback(data);
            },
            |err| error!("AUDIO: An error occured on the output audio stream: {}", err),
            None,
        ) {
            Ok(stream) => stream,
            Err(err) => {
                warn!("AUDIO: Failed to build output stream: {}", err);
                list_supported_configs(device, spec);
                return Err(err.into());
            }
        };

        // Some hosts start streams right away
        if let Err(err) = stream.pause() {
            debug!("AUDIO: Unable to pause new stream: {}", err);
        }

        Ok(CpalStream { stream })
    }

    fn quit(&mut self) {
        self.device = None;
        if let Some(host) = self.host.take() {
            info!("AUDIO: Released host {:?}", host.id());
        }
    }
}

// ============================================
//         Supported Configurations
// ============================================
fn list_supported_configs(device: &cpal::Device, spec: &StreamSpec) {
    match device.supported_output_configs() {
        Ok(ranges) => {
            warn!("AUDIO: Supported output configurations:");
            for range in ranges {
                let marker = if supports(&range, spec) { " (matches)" } else { "" };
                warn!("AUDIO:   {}{}", describe_config(&range), marker);
            }
        }
        Err(err) => warn!("AUDIO: Unable to list supported configurations: {}", err),
    }
}

fn describe_config(range: &cpal::SupportedStreamConfigRange) -> String {
    let buffer = match range.buffer_size() {
        cpal::SupportedBufferSize::Range { min, max } => format!("{}-{} frames", min, max),
        cpal::SupportedBufferSize::Unknown => "unknown buffer size".to_string(),
    };
    format!(
        "Channels: {}, Sample Rate: {}-{} Hz, Format: {}, Buffer: {}",
        range.channels(),
        range.min_sample_rate().0,
        range.max_sample_rate().0,
        range.sample_format(),
        buffer
    )
}

/// Whether a stream for `spec` fits inside `range`.
fn supports(range: &cpal::SupportedStreamConfigRange, spec: &StreamSpec) -> bool {
    let buffer_fits = match range.buffer_size() {
        cpal::SupportedBufferSize::Range { min, max } => (*min..=*max).contains(&spec.buffer_size),
        cpal::SupportedBufferSize::Unknown => true,
    };
    range.channels() == spec.channels
        && range.sample_format() == cpal::SampleFormat::I16
        && range.min_sample_rate().0 <= spec.sample_rate
        && spec.sample_rate <= range.max_sample_rate().0
        && buffer_fits
}

pub struct CpalStream {
    stream: cpal::Stream,
}

impl OutputStream for CpalStream {
    fn resume(&self) -> Result<(), AudioError> {
        self.stream.play()?;
        Ok(())
    }

    fn close(self) {
        if let Err(err) = self.stream.pause() {
            warn!("AUDIO: Unable to pause audio stream: {}", err);
        }
        // Dropping the stream joins the callback thread
        drop(self.stream);
    }
}

use thiserror::Error;

// Status codes reported for audio subsystem failures
pub const NO_OUTPUT_DEVICE: i32 = 1;
pub const DEVICE_NOT_AVAILABLE: i32 = 2;
pub const CONFIG_NOT_SUPPORTED: i32 = 3;
pub const INVALID_ARGUMENT: i32 = 4;
pub const STREAM_ID_OVERFLOW: i32 = 5;
pub const BACKEND_SPECIFIC: i32 = 6;
pub const NOT_INITIALIZED: i32 = 7;

/// The two fatal failures of the player. Both carry a non-zero status code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("Audio init error with code: {code} ({reason})")]
    Init { code: i32, reason: String },
    #[error("Audio open error with code: {code} ({reason})")]
    StreamOpen { code: i32, reason: String },
}

impl AudioError {
    pub fn code(&self) -> i32 {
        match self {
            AudioError::Init { code, .. } | AudioError::StreamOpen { code, .. } => *code,
        }
    }

    pub fn no_output_device() -> Self {
        AudioError::Init {
            code: NO_OUTPUT_DEVICE,
            reason: "no output device available".to_string(),
        }
    }

    pub fn not_initialized() -> Self {
        AudioError::StreamOpen {
            code: NOT_INITIALIZED,
            reason: "audio subsystem is not initialized".to_string(),
        }
    }
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        #[allow(unreachable_patterns)]
        let code = match err {
            cpal::BuildStreamError::DeviceNotAvailable => DEVICE_NOT_AVAILABLE,
            cpal::BuildStreamError::StreamConfigNotSupported => CONFIG_NOT_SUPPORTED,
            cpal::BuildStreamError::InvalidArgument => INVALID_ARGUMENT,
            cpal::BuildStreamError::StreamIdOverflow => STREAM_ID_OVERFLOW,
            cpal::BuildStreamError::BackendSpecific { .. } => BACKEND_SPECIFIC,
            _ => BACKEND_SPECIFIC,
        };
        AudioError::StreamOpen { code, reason: err.to_string() }
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        #[allow(unreachable_patterns)]
        let code = match err {
            cpal::PlayStreamError::DeviceNotAvailable => DEVICE_NOT_AVAILABLE,
            cpal::PlayStreamError::BackendSpecific { .. } => BACKEND_SPECIFIC,
            _ => BACKEND_SPECIFIC,
        };
        AudioError::StreamOpen { code, reason: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_non_zero() {
        assert_eq!(AudioError::no_output_device().code(), NO_OUTPUT_DEVICE);
        let err: AudioError = cpal::BuildStreamError::StreamConfigNotSupported.into();
        assert_eq!(err.code(), CONFIG_NOT_SUPPORTED);
        assert!(matches!(err, AudioError::StreamOpen { .. }));
        let err: AudioError = cpal::PlayStreamError::DeviceNotAvailable.into();
        assert_eq!(err.code(), DEVICE_NOT_AVAILABLE);
    }

    #[test]
    fn message_carries_the_code() {
        let err = AudioError::StreamOpen { code: 42, reason: "busy".to_string() };
        assert_eq!(err.to_string(), "Audio open error with code: 42 (busy)");
    }
}

//! Recording session: the one stateful process in the app. A worker thread owns
//! the microphone capture stream and publishes state snapshots back to the UI.

pub mod runtime;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

pub use runtime::{RecorderController, RecorderRuntime, SessionSnapshot};

/// Convenient alias for results returned by session modules.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Classifies session failures so the UI can tell a refused microphone apart
/// from an internal fault. All of them are recoverable by user retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Microphone access refused or no usable input device.
    PermissionDenied,
    /// The capture stream failed after it was opened.
    Capture,
    Internal,
}

#[derive(Debug, Clone)]
pub struct SessionError {
    kind: ErrorKind,
    message: Arc<str>,
}

impl SessionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Internal, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::PermissionDenied, message)
    }

    pub fn capture(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Capture, message)
    }

    fn with_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Arc::from(message.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for SessionError {}

/// A finalized recording: the chunks captured between start and stop,
/// concatenated in arrival order and resampled to the target rate.
#[derive(Debug, Clone)]
pub struct RecordedClip {
    pub samples: Arc<[f32]>,
    pub sample_rate: u32,
    pub duration: Duration,
}

impl RecordedClip {
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration = if sample_rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(samples.len() as f64 / sample_rate as f64)
        };
        Self {
            samples: Arc::from(samples),
            sample_rate,
            duration,
        }
    }
}

/// Microphone capture settings shared between CLI and session runtime.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub device_name: Option<String>,
    pub sample_rate: u32,
    pub latency_ms: RangeInclusive<u32>,
}

impl CaptureSettings {
    pub fn new(
        device_name: Option<String>,
        sample_rate: u32,
        latency_ms: RangeInclusive<u32>,
    ) -> Self {
        Self {
            device_name,
            sample_rate,
            latency_ms,
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self::new(None, 16_000, 100..=200)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub capture: CaptureSettings,
}

impl SessionConfig {
    pub fn new(capture: CaptureSettings) -> Self {
        Self { capture }
    }
}

pub(crate) fn validate_config(config: &SessionConfig) -> Result<()> {
    if config.capture.sample_rate == 0 {
        return Err(SessionError::new("target sample rate must be positive"));
    }
    let latency = &config.capture.latency_ms;
    if *latency.start() == 0 || latency.end() < latency.start() {
        return Err(SessionError::new(
            "capture latency range must be positive and ordered",
        ));
    }
    Ok(())
}

/// Launch the recorder worker thread for the given configuration.
pub fn run_session(config: SessionConfig) -> Result<RecorderRuntime> {
    RecorderRuntime::new(config)
}

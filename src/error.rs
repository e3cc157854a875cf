use thiserror::Error;

/// Application-level errors using thiserror for structured error handling.
///
/// These errors represent domain-specific failures that can occur while
/// sampling the video feed or managing the recognizer. They can be chained
/// with anyhow in the host binary.

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to spawn frame sampler process: {program}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Frame sampler exited with status {status}: {stderr}")]
    ProcessFailed { status: String, stderr: String },

    #[error("Empty frame received from sampler")]
    EmptyFrame,

    #[error("Frame sampler did not finish within {timeout:?}")]
    Timeout { timeout: std::time::Duration },

    #[error("Failed to read frame from sampler")]
    ReadFailed(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine")]
    InitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to decode frame for recognition")]
    DecodeFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Region {region} lies outside the {width}x{height} frame")]
    RegionOutOfBounds {
        region: String,
        width: u32,
        height: u32,
    },

    #[error("Failed to perform OCR on {region}")]
    RecognitionFailed {
        region: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to terminate OCR engine")]
    TerminateFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine configuration directory")]
    NoConfigDir,
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Recognizer failed to initialize")]
    RecognizerInit(#[source] OcrError),

    #[error("Recognizer failed to terminate")]
    RecognizerTerminate(#[source] OcrError),

    #[error("Cannot change monitor state: {0}")]
    Transition(#[from] crate::state::TransitionError),

    #[error("Failed to start detection thread")]
    ThreadSpawnFailed(#[source] std::io::Error),

    #[error("Detection thread panicked")]
    ThreadPanicked,
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

//! Core error types for quietsleep-core.
//!
//! Every fallible concern gets its own `thiserror` enum; [`CoreError`]
//! wraps them for callers that only want one error type.

use std::path::PathBuf;
use thiserror::Error;

use crate::breath::BreathPhase;

/// Core error type for quietsleep-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session lifecycle errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Audio playback errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Noise synthesis errors
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the session controller and breath scheduler.
#[derive(Error, Debug)]
pub enum SessionError {
    /// `start()` was called while a session is active.
    #[error("a session is already running")]
    AlreadyRunning,

    /// A phase duration was zero.
    #[error("invalid rhythm: {phase:?} must last at least one second (got {seconds})")]
    InvalidRhythm { phase: BreathPhase, seconds: u32 },

    /// Playback failed; the session keeps running without that audio.
    /// The controller never returns this; it renders it into the message
    /// of an `AudioWarning` event.
    #[error("audio unavailable: {0}")]
    AudioUnavailable(#[from] AudioError),

    /// No meditation track has the requested id.
    #[error("unknown meditation track: {0}")]
    UnknownMeditationTrack(String),
}

/// Failures reported by an [`AudioSink`](crate::audio::AudioSink).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("audio source not found: {0}")]
    MissingSource(String),

    #[error("audio permission denied")]
    PermissionDenied,

    #[error("audio output is suspended")]
    Suspended,

    #[error("unknown playback handle {0}")]
    UnknownHandle(u64),

    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Noise synthesis errors.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The sample buffer could not be allocated.
    #[error("cannot allocate a buffer of {samples} samples")]
    BufferTooLarge { samples: usize },

    /// WAV encoding or decoding failed.
    #[error("WAV I/O failed for {path}: {message}")]
    Wav { path: PathBuf, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Out of range
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

//! # QuietSleep Core Library
//!
//! Core logic for the QuietSleep sleep aid: a paced-breathing guide with
//! spoken cues, procedurally synthesised and pre-recorded background noise,
//! a sleep countdown that tears the session down when it expires, and
//! guided meditation tracks. The `quietsleep-cli` binary is a thin layer
//! over this crate.
//!
//! ## Architecture
//!
//! - **Session controller**: owns one session at a time and everything it
//!   started. Driven by the caller through `advance()`; no internal threads
//! - **Timeline**: single logical clock with cancellable timers shared by
//!   the breath scheduler and the countdown
//! - **Noise**: white and pink (Paul Kellet filter) synthesis, WAV export
//! - **Audio**: the [`AudioSink`] trait the controller plays through
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionController`]: session lifecycle and live settings
//! - [`BreathCycleScheduler`]: Inhale, Hold, Exhale state machine
//! - [`NoiseSynthesizer`]: seeded noise generator
//! - [`Config`]: application configuration management

pub mod audio;
pub mod breath;
pub mod error;
pub mod events;
pub mod meditation;
pub mod noise;
pub mod rhythm;
pub mod session;
pub mod storage;
pub mod timer;

pub use audio::{AudioSink, AudioSource, Language, PlayOptions, PlaybackId, RecordingSink};
pub use breath::{BreathCycleScheduler, BreathEvent, BreathPhase};
pub use error::{AudioError, ConfigError, CoreError, SessionError, SynthesisError, ValidationError};
pub use events::{Event, StopReason};
pub use noise::{NoiseBuffer, NoiseKind, NoiseRequest, NoiseSynthesizer};
pub use rhythm::{Rhythm, RhythmPreset, PRESETS};
pub use session::{ControllerSettings, SessionController, SessionOptions, SessionState};
pub use storage::Config;
pub use timer::{format_clock, TimerId, Timeline, TIMER_OPTIONS_MIN};

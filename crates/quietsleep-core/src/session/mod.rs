mod controller;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::audio::{Language, CUE_VOLUME};
use crate::breath::BreathPhase;
use crate::noise::{NoiseRequest, DEFAULT_BUFFER_SECS, DEFAULT_SAMPLE_RATE};
use crate::rhythm::Rhythm;

pub use controller::SessionController;

/// Observable session state. Reset to idle on stop or countdown expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionState {
    pub running: bool,
    pub phase: BreathPhase,
    pub phase_elapsed_secs: u32,
    pub phase_total_secs: u32,
    pub phase_remaining_secs: u32,
    pub timer_remaining_secs: Option<u32>,
    /// Meditation track playing instead of a session, if any.
    pub meditation: Option<String>,
}

/// What `start()` should run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    pub rhythm: Rhythm,
    pub noise: Option<NoiseRequest>,
    pub timer_minutes: Option<u32>,
    pub guide_enabled: bool,
    pub language: Language,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            rhythm: Rhythm::default(),
            noise: None,
            timer_minutes: None,
            guide_enabled: true,
            language: Language::default(),
        }
    }
}

/// Audio parameters fixed for the controller's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSettings {
    pub sample_rate: u32,
    pub noise_buffer_secs: f32,
    pub cue_volume: f32,
    /// Directory that asset paths such as `audio/rain.mp3` resolve against.
    pub asset_root: PathBuf,
    /// Fixed seed for the noise generator; `None` draws from entropy.
    pub noise_seed: Option<u64>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            noise_buffer_secs: DEFAULT_BUFFER_SECS,
            cue_volume: CUE_VOLUME,
            asset_root: PathBuf::from("."),
            noise_seed: None,
        }
    }
}

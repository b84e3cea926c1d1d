//! Playback boundary.
//!
//! The core never touches an audio device. It issues abstract commands to
//! an [`AudioSink`]: play a source (looped or once) at a volume, change the
//! volume of a live handle, stop a handle. Every command returns a
//! `Result`; callers log failures and carry on.

mod cues;
mod recording;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AudioError;
use crate::noise::NoiseBuffer;

pub use cues::{CueSet, Language, CUE_VOLUME};
pub use recording::{ActivePlayback, AudioCommand, RecordingSink};

/// Handle of a playing source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaybackId(pub u64);

#[derive(Debug, Clone)]
pub enum AudioSource {
    /// In-memory synthesised buffer.
    Buffer(Arc<NoiseBuffer>),
    /// Asset file resolved against the asset root.
    File(PathBuf),
}

impl AudioSource {
    /// Short label for logs and events.
    pub fn describe(&self) -> String {
        match self {
            AudioSource::Buffer(buf) => format!("synth:{}", buf.kind.as_str()),
            AudioSource::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayOptions {
    pub volume: f32,
    pub looping: bool,
}

impl PlayOptions {
    pub fn looped(volume: f32) -> Self {
        Self {
            volume,
            looping: true,
        }
    }

    pub fn once(volume: f32) -> Self {
        Self {
            volume,
            looping: false,
        }
    }
}

pub trait AudioSink {
    /// Start playing `source`. One-shot sources may be forgotten by the
    /// caller; looped sources must eventually be stopped.
    fn play(&mut self, source: &AudioSource, options: PlayOptions) -> Result<PlaybackId, AudioError>;

    fn set_volume(&mut self, id: PlaybackId, volume: f32) -> Result<(), AudioError>;

    fn stop(&mut self, id: PlaybackId) -> Result<(), AudioError>;
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn play(&mut self, source: &AudioSource, options: PlayOptions) -> Result<PlaybackId, AudioError> {
        (**self).play(source, options)
    }

    fn set_volume(&mut self, id: PlaybackId, volume: f32) -> Result<(), AudioError> {
        (**self).set_volume(id, volume)
    }

    fn stop(&mut self, id: PlaybackId) -> Result<(), AudioError> {
        (**self).stop(id)
    }
}

impl<S: AudioSink + ?Sized> AudioSink for &mut S {
    fn play(&mut self, source: &AudioSource, options: PlayOptions) -> Result<PlaybackId, AudioError> {
        (**self).play(source, options)
    }

    fn set_volume(&mut self, id: PlaybackId, volume: f32) -> Result<(), AudioError> {
        (**self).set_volume(id, volume)
    }

    fn stop(&mut self, id: PlaybackId) -> Result<(), AudioError> {
        (**self).stop(id)
    }
}

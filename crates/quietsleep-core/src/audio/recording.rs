use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{AudioSink, AudioSource, PlayOptions, PlaybackId};
use crate::error::AudioError;

/// Command as seen by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AudioCommand {
    Play {
        id: PlaybackId,
        source: String,
        volume: f32,
        looping: bool,
    },
    SetVolume {
        id: PlaybackId,
        volume: f32,
    },
    Stop {
        id: PlaybackId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePlayback {
    pub source: String,
    pub volume: f32,
}

/// Sink that plays nothing and remembers every command.
///
/// Used by tests and by the headless CLI. It can be told to fail specific
/// sources, or everything, to exercise degraded sessions. With
/// `verify_files` set, file sources that do not exist fail with
/// `MissingSource`.
#[derive(Debug, Default)]
pub struct RecordingSink {
    next_id: u64,
    commands: Vec<AudioCommand>,
    active: BTreeMap<PlaybackId, ActivePlayback>,
    failing_sources: HashSet<String>,
    fail_all: Option<AudioError>,
    verify_files: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verifying_files() -> Self {
        Self {
            verify_files: true,
            ..Self::default()
        }
    }

    /// Make plays of sources whose description contains `needle` fail.
    pub fn fail_source(&mut self, needle: impl Into<String>) {
        self.failing_sources.insert(needle.into());
    }

    /// Make every command fail with `err` (`None` restores normal behaviour).
    pub fn fail_all(&mut self, err: Option<AudioError>) {
        self.fail_all = err;
    }

    pub fn commands(&self) -> &[AudioCommand] {
        &self.commands
    }

    /// Looped sources currently playing.
    pub fn active(&self) -> &BTreeMap<PlaybackId, ActivePlayback> {
        &self.active
    }

    pub fn is_playing(&self, needle: &str) -> bool {
        self.active.values().any(|p| p.source.contains(needle))
    }

    pub fn plays_of(&self, needle: &str) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, AudioCommand::Play { source, .. } if source.contains(needle)))
            .count()
    }

    pub fn stop_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, AudioCommand::Stop { .. }))
            .count()
    }

    fn check(&self, source: &AudioSource) -> Result<(), AudioError> {
        if let Some(err) = &self.fail_all {
            return Err(err.clone());
        }
        let label = source.describe();
        if self.failing_sources.iter().any(|n| label.contains(n.as_str())) {
            return Err(AudioError::MissingSource(label));
        }
        if let AudioSource::File(path) = source {
            if self.verify_files && !path.exists() {
                return Err(AudioError::MissingSource(label));
            }
        }
        Ok(())
    }
}

impl AudioSink for RecordingSink {
    fn play(&mut self, source: &AudioSource, options: PlayOptions) -> Result<PlaybackId, AudioError> {
        self.check(source)?;
        let id = PlaybackId(self.next_id);
        self.next_id += 1;
        let label = source.describe();
        tracing::debug!(id = id.0, source = %label, volume = options.volume, looping = options.looping, "play");
        if options.looping {
            self.active.insert(
                id,
                ActivePlayback {
                    source: label.clone(),
                    volume: options.volume,
                },
            );
        }
        self.commands.push(AudioCommand::Play {
            id,
            source: label,
            volume: options.volume,
            looping: options.looping,
        });
        Ok(id)
    }

    fn set_volume(&mut self, id: PlaybackId, volume: f32) -> Result<(), AudioError> {
        if let Some(err) = &self.fail_all {
            return Err(err.clone());
        }
        let playback = self
            .active
            .get_mut(&id)
            .ok_or(AudioError::UnknownHandle(id.0))?;
        playback.volume = volume;
        self.commands.push(AudioCommand::SetVolume { id, volume });
        Ok(())
    }

    fn stop(&mut self, id: PlaybackId) -> Result<(), AudioError> {
        if let Some(err) = &self.fail_all {
            return Err(err.clone());
        }
        self.active
            .remove(&id)
            .ok_or(AudioError::UnknownHandle(id.0))?;
        tracing::debug!(id = id.0, "stop");
        self.commands.push(AudioCommand::Stop { id });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn file(p: &str) -> AudioSource {
        AudioSource::File(PathBuf::from(p))
    }

    #[test]
    fn looped_sources_stay_active_until_stopped() {
        let mut sink = RecordingSink::new();
        let id = sink.play(&file("audio/rain.mp3"), PlayOptions::looped(0.3)).unwrap();
        sink.play(&file("audio/en-inhale.mp3"), PlayOptions::once(0.9)).unwrap();
        assert_eq!(sink.active().len(), 1);

        sink.set_volume(id, 0.5).unwrap();
        assert_eq!(sink.active()[&id].volume, 0.5);

        sink.stop(id).unwrap();
        assert!(!sink.is_playing("rain"));
        assert_eq!(sink.stop(id), Err(AudioError::UnknownHandle(id.0)));
    }

    #[test]
    fn failing_sources_are_rejected() {
        let mut sink = RecordingSink::new();
        sink.fail_source("inhale");
        assert!(sink.play(&file("audio/en-inhale.mp3"), PlayOptions::once(0.9)).is_err());
        assert!(sink.play(&file("audio/en-hold.mp3"), PlayOptions::once(0.9)).is_ok());

        sink.fail_all(Some(AudioError::Suspended));
        assert_eq!(
            sink.play(&file("audio/en-hold.mp3"), PlayOptions::once(0.9)),
            Err(AudioError::Suspended)
        );
    }

    #[test]
    fn verify_files_reports_missing_assets() {
        let mut sink = RecordingSink::verifying_files();
        let err = sink
            .play(&file("/definitely/not/here.mp3"), PlayOptions::looped(0.2))
            .unwrap_err();
        assert!(matches!(err, AudioError::MissingSource(_)));
    }
}

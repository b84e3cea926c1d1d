//! Guided meditation tracks.
//!
//! A meditation plays a spoken voice track once over a looped ambient bed.
//! It is exclusive with the breathing session; the controller enforces that.

use std::path::Path;

use serde::Serialize;

use crate::audio::{AudioSink, AudioSource, PlayOptions, PlaybackId};
use crate::error::AudioError;

pub const MEDITATION_BED: &str = "audio/meditation-bed.mp3";
pub const VOICE_VOLUME: f32 = 0.9;
pub const BED_VOLUME: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeditationTrack {
    pub id: &'static str,
    pub label: &'static str,
    pub voice: &'static str,
}

pub const MEDITATION_TRACKS: [MeditationTrack; 4] = [
    MeditationTrack {
        id: "en-1",
        label: "Meditation (EN) 1",
        voice: "audio/meditation-voice.mp3",
    },
    MeditationTrack {
        id: "en-2",
        label: "Meditation (EN) 2",
        voice: "audio/meditation-voice.mp3",
    },
    MeditationTrack {
        id: "zh-1",
        label: "Meditation (中文) 1",
        voice: "audio/meditation-zh-1.mp3",
    },
    MeditationTrack {
        id: "zh-2",
        label: "Meditation (中文) 2",
        voice: "audio/meditation-zh-2.mp3",
    },
];

pub fn track(id: &str) -> Option<&'static MeditationTrack> {
    MEDITATION_TRACKS.iter().find(|t| t.id == id)
}

#[derive(Debug)]
struct ActiveMeditation {
    track_id: &'static str,
    voice: Option<PlaybackId>,
    bed: Option<PlaybackId>,
}

/// Owns the voice and bed handles of the playing meditation.
#[derive(Debug, Default)]
pub struct MeditationPlayer {
    active: Option<ActiveMeditation>,
}

impl MeditationPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_track(&self) -> Option<&'static str> {
        self.active.as_ref().map(|a| a.track_id)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Switch to `track`, stopping whatever was playing. Playback failures
    /// are returned with their source label; the track still counts as
    /// active so a later stop tears down whatever did start.
    pub fn start<S: AudioSink + ?Sized>(
        &mut self,
        track: &'static MeditationTrack,
        asset_root: &Path,
        sink: &mut S,
    ) -> Vec<(String, AudioError)> {
        let mut failures = self.stop(sink);

        let mut play = |rel: &str, options: PlayOptions| {
            let source = AudioSource::File(asset_root.join(rel));
            match sink.play(&source, options) {
                Ok(id) => Some(id),
                Err(e) => {
                    failures.push((source.describe(), e));
                    None
                }
            }
        };
        let bed = play(MEDITATION_BED, PlayOptions::looped(BED_VOLUME));
        let voice = play(track.voice, PlayOptions::once(VOICE_VOLUME));

        self.active = Some(ActiveMeditation {
            track_id: track.id,
            voice,
            bed,
        });
        failures
    }

    /// Stop both handles. A voice track that already ended on its own is
    /// not an error.
    pub fn stop<S: AudioSink + ?Sized>(&mut self, sink: &mut S) -> Vec<(String, AudioError)> {
        let mut failures = Vec::new();
        let Some(active) = self.active.take() else {
            return failures;
        };
        if let Some(id) = active.voice {
            match sink.stop(id) {
                Ok(()) | Err(AudioError::UnknownHandle(_)) => {}
                Err(e) => failures.push((active.track_id.to_string(), e)),
            }
        }
        if let Some(id) = active.bed {
            if let Err(e) = sink.stop(id) {
                failures.push((MEDITATION_BED.to_string(), e));
            }
        }
        failures
    }
}

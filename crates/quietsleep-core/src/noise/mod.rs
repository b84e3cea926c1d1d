//! Noise selection and synthesis.
//!
//! White and pink noise are synthesised into loopable buffers. Every other
//! kind is a pre-recorded ambient track resolved to an asset path.

mod synth;
mod wav;

use serde::{Deserialize, Serialize};

pub use synth::{buffer_len, NoiseBuffer, NoiseSynthesizer, DEFAULT_BUFFER_SECS, DEFAULT_SAMPLE_RATE};
pub use wav::{read_wav, write_wav};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoiseKind {
    White,
    Pink,
    Brown,
    Rain,
    Ocean,
    Stream,
    Forest,
    Campfire,
    SingingBowl,
}

impl NoiseKind {
    pub const ALL: [NoiseKind; 9] = [
        NoiseKind::White,
        NoiseKind::Pink,
        NoiseKind::Brown,
        NoiseKind::Rain,
        NoiseKind::Ocean,
        NoiseKind::Stream,
        NoiseKind::Forest,
        NoiseKind::Campfire,
        NoiseKind::SingingBowl,
    ];

    /// Whether the kind is generated in-process rather than loaded.
    pub fn is_synthesized(self) -> bool {
        matches!(self, NoiseKind::White | NoiseKind::Pink)
    }

    /// Asset path of a pre-recorded track, relative to the asset root.
    pub fn track_path(self) -> Option<&'static str> {
        match self {
            NoiseKind::White | NoiseKind::Pink => None,
            NoiseKind::Brown => Some("audio/brown-noise.wav"),
            NoiseKind::Rain => Some("audio/forest-rain-light.mp3"),
            NoiseKind::Ocean => Some("audio/ocean-gentle.mp3"),
            NoiseKind::Stream => Some("audio/stream.mp3"),
            NoiseKind::Forest => Some("audio/forest-night-insects.mp3"),
            NoiseKind::Campfire => Some("audio/campfire.mp3"),
            NoiseKind::SingingBowl => Some("audio/singing-bowl.mp3"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoiseKind::White => "white",
            NoiseKind::Pink => "pink",
            NoiseKind::Brown => "brown",
            NoiseKind::Rain => "rain",
            NoiseKind::Ocean => "ocean",
            NoiseKind::Stream => "stream",
            NoiseKind::Forest => "forest",
            NoiseKind::Campfire => "campfire",
            NoiseKind::SingingBowl => "singing-bowl",
        }
    }
}

impl std::str::FromStr for NoiseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoiseKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown noise kind: {s}"))
    }
}

/// What to play and how loud. Volume is kept within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseRequest {
    pub kind: NoiseKind,
    pub volume: f32,
}

impl NoiseRequest {
    pub fn new(kind: NoiseKind, volume: f32) -> Self {
        Self {
            kind,
            volume: clamp_volume(volume),
        }
    }
}

/// Clamp a gain into `[0, 1]`; NaN becomes silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_white_and_pink_are_synthesized() {
        for kind in NoiseKind::ALL {
            assert_eq!(kind.is_synthesized(), kind.track_path().is_none());
        }
    }

    #[test]
    fn parses_kebab_case_names() {
        assert_eq!("singing-bowl".parse::<NoiseKind>().unwrap(), NoiseKind::SingingBowl);
        assert_eq!("pink".parse::<NoiseKind>().unwrap(), NoiseKind::Pink);
        assert!("violet".parse::<NoiseKind>().is_err());
    }

    #[test]
    fn request_volume_is_clamped() {
        assert_eq!(NoiseRequest::new(NoiseKind::White, 1.7).volume, 1.0);
        assert_eq!(NoiseRequest::new(NoiseKind::White, -0.2).volume, 0.0);
        assert_eq!(NoiseRequest::new(NoiseKind::White, f32::NAN).volume, 0.0);
    }
}

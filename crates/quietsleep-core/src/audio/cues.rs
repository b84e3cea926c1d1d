use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AudioSource;
use crate::breath::BreathPhase;

/// Volume of spoken phase cues.
pub const CUE_VOLUME: f32 = 0.9;

/// Language of the spoken cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "zh" => Ok(Language::Zh),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

/// One spoken cue per phase, e.g. `audio/en-inhale.mp3`.
#[derive(Debug, Clone)]
pub struct CueSet {
    language: Language,
    inhale: AudioSource,
    hold: AudioSource,
    exhale: AudioSource,
}

impl CueSet {
    pub fn new(language: Language, asset_root: &Path) -> Self {
        let cue = |phase: BreathPhase| {
            AudioSource::File(
                asset_root
                    .join("audio")
                    .join(format!("{}-{}.mp3", language.as_str(), phase.as_str())),
            )
        };
        Self {
            language,
            inhale: cue(BreathPhase::Inhale),
            hold: cue(BreathPhase::Hold),
            exhale: cue(BreathPhase::Exhale),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn for_phase(&self, phase: BreathPhase) -> Option<&AudioSource> {
        match phase {
            BreathPhase::Idle => None,
            BreathPhase::Inhale => Some(&self.inhale),
            BreathPhase::Hold => Some(&self.hold),
            BreathPhase::Exhale => Some(&self.exhale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_paths_follow_language_prefix() {
        let cues = CueSet::new(Language::Zh, Path::new("assets"));
        let hold = cues.for_phase(BreathPhase::Hold).unwrap().describe();
        assert!(hold.ends_with("zh-hold.mp3"), "{hold}");
        assert!(cues.for_phase(BreathPhase::Idle).is_none());
    }

    #[test]
    fn language_parses() {
        assert_eq!("zh".parse::<Language>().unwrap(), Language::Zh);
        assert!("fr".parse::<Language>().is_err());
    }
}

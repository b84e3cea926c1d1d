use serde::{Deserialize, Serialize};

use crate::breath::BreathPhase;
use crate::error::{SessionError, ValidationError};

/// Shortest phase the custom rhythm editor allows, in seconds.
pub const CUSTOM_MIN_SECS: u32 = 2;
/// Longest phase the custom rhythm editor allows, in seconds.
pub const CUSTOM_MAX_SECS: u32 = 10;

/// Id used for the user-editable rhythm.
pub const CUSTOM_RHYTHM_ID: &str = "custom";
/// Preset used when an unknown id is requested.
pub const FALLBACK_RHYTHM_ID: &str = "relax";

/// Durations of one breathing cycle, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rhythm {
    pub inhale_secs: u32,
    pub hold_secs: u32,
    pub exhale_secs: u32,
}

impl Rhythm {
    pub const fn new(inhale_secs: u32, hold_secs: u32, exhale_secs: u32) -> Self {
        Self {
            inhale_secs,
            hold_secs,
            exhale_secs,
        }
    }

    /// Build a custom rhythm, clamping each phase into the editor range.
    pub fn custom(inhale_secs: u32, hold_secs: u32, exhale_secs: u32) -> Self {
        let clamp = |v: u32| v.clamp(CUSTOM_MIN_SECS, CUSTOM_MAX_SECS);
        Self::new(clamp(inhale_secs), clamp(hold_secs), clamp(exhale_secs))
    }

    /// Reject rhythms with a zero-length phase.
    pub fn validate(&self) -> Result<(), SessionError> {
        for phase in BreathPhase::CYCLE {
            let seconds = self.duration_secs(phase);
            if seconds == 0 {
                return Err(SessionError::InvalidRhythm { phase, seconds });
            }
        }
        Ok(())
    }

    /// Duration of `phase` in seconds. `Idle` has no duration.
    pub fn duration_secs(&self, phase: BreathPhase) -> u32 {
        match phase {
            BreathPhase::Idle => 0,
            BreathPhase::Inhale => self.inhale_secs,
            BreathPhase::Hold => self.hold_secs,
            BreathPhase::Exhale => self.exhale_secs,
        }
    }

    /// Duration of `phase` in milliseconds.
    ///
    /// Uses saturating arithmetic so absurd values cannot overflow.
    pub fn duration_ms(&self, phase: BreathPhase) -> u64 {
        u64::from(self.duration_secs(phase)).saturating_mul(1000)
    }

    pub fn cycle_secs(&self) -> u32 {
        self.inhale_secs
            .saturating_add(self.hold_secs)
            .saturating_add(self.exhale_secs)
    }
}

impl Default for Rhythm {
    fn default() -> Self {
        Self::new(4, 4, 6)
    }
}

/// Parses `inhale-hold-exhale`, e.g. `4-7-8`.
impl std::str::FromStr for Rhythm {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidValue {
            field: "rhythm".into(),
            message: format!("expected inhale-hold-exhale seconds, got '{s}'"),
        };
        let parts: Vec<u32> = s
            .split('-')
            .map(|p| p.trim().parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?;
        let [inhale, hold, exhale] = parts[..] else {
            return Err(invalid());
        };
        for secs in [inhale, hold, exhale] {
            if secs == 0 {
                return Err(ValidationError::OutOfRange {
                    field: "rhythm".into(),
                    min: 1.0,
                    max: f64::from(u32::MAX),
                    value: 0.0,
                });
            }
        }
        Ok(Self::new(inhale, hold, exhale))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RhythmPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub rhythm: Rhythm,
}

/// Built-in presets, in display order.
pub const PRESETS: [RhythmPreset; 3] = [
    RhythmPreset {
        id: "box",
        label: "Box 4-4-4",
        rhythm: Rhythm::new(4, 4, 4),
    },
    RhythmPreset {
        id: "478",
        label: "Classic 4-7-8",
        rhythm: Rhythm::new(4, 7, 8),
    },
    RhythmPreset {
        id: "relax",
        label: "Relax 4-4-6",
        rhythm: Rhythm::new(4, 4, 6),
    },
];

pub fn preset(id: &str) -> Option<&'static RhythmPreset> {
    PRESETS.iter().find(|p| p.id == id)
}

/// Resolve a rhythm id the way the picker does: `custom` yields the user's
/// rhythm, a preset id yields the preset, anything else falls back to Relax.
pub fn resolve(id: &str, custom: Rhythm) -> Rhythm {
    if id == CUSTOM_RHYTHM_ID {
        return custom;
    }
    preset(id)
        .or_else(|| preset(FALLBACK_RHYTHM_ID))
        .map(|p| p.rhythm)
        .unwrap_or_default()
}

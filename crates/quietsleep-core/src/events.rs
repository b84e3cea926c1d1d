use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::breath::BreathPhase;
use crate::noise::{NoiseKind, NoiseRequest};
use crate::rhythm::Rhythm;
use crate::session::SessionState;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The user pressed stop.
    Manual,
    /// The sleep countdown reached zero.
    TimerExpired,
    /// The owning controller was dropped.
    Teardown,
    /// A meditation track took over.
    Meditation,
}

/// Every state change the controller makes produces an Event.
/// The UI renders from them; `at_ms` is timeline time, `at` wall time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        rhythm: Rhythm,
        guide_enabled: bool,
        noise: Option<NoiseRequest>,
        timer_minutes: Option<u32>,
        at: DateTime<Utc>,
    },
    SessionStopped {
        session_id: Option<Uuid>,
        reason: StopReason,
        at: DateTime<Utc>,
    },
    PhaseStarted {
        phase: BreathPhase,
        duration_secs: u32,
        cycle: u64,
        at_ms: u64,
    },
    /// Live countdown within the current phase.
    PhaseTick {
        phase: BreathPhase,
        remaining_secs: u32,
        at_ms: u64,
    },
    /// Sleep countdown progress.
    CountdownTick {
        remaining_secs: u32,
        at_ms: u64,
    },
    NoiseStarted {
        kind: NoiseKind,
        volume: f32,
    },
    NoiseStopped {
        kind: NoiseKind,
    },
    VolumeChanged {
        volume: f32,
    },
    /// Playback failed; the session carries on without it.
    AudioWarning {
        source: String,
        message: String,
        at_ms: u64,
    },
    MeditationStarted {
        track_id: String,
        at: DateTime<Utc>,
    },
    MeditationStopped {
        track_id: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        /// Breathing circle scale for the current phase position.
        scale: f32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Phase and duration if this is a `PhaseStarted`.
    pub fn phase_started(&self) -> Option<(BreathPhase, u32)> {
        match self {
            Event::PhaseStarted {
                phase,
                duration_secs,
                ..
            } => Some((*phase, *duration_secs)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let ev = Event::PhaseStarted {
            phase: BreathPhase::Hold,
            duration_secs: 7,
            cycle: 2,
            at_ms: 4_000,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "PhaseStarted");
        assert_eq!(json["phase"], "hold");
        assert_eq!(ev.phase_started(), Some((BreathPhase::Hold, 7)));
    }

    #[test]
    fn stop_reason_is_snake_case() {
        let json = serde_json::to_string(&StopReason::TimerExpired).unwrap();
        assert_eq!(json, "\"timer_expired\"");
    }
}

mod scale;
mod scheduler;

use serde::{Deserialize, Serialize};

pub use scale::{phase_scale, BreathScale};
pub use scheduler::{BreathCycleScheduler, BreathEvent, BreathTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BreathPhase {
    #[default]
    Idle,
    Inhale,
    Hold,
    Exhale,
}

impl BreathPhase {
    /// Phases of one cycle, in order.
    pub const CYCLE: [BreathPhase; 3] = [BreathPhase::Inhale, BreathPhase::Hold, BreathPhase::Exhale];

    /// Phase entered when this one ends. `Idle` stays idle.
    pub fn next(self) -> Self {
        match self {
            BreathPhase::Idle => BreathPhase::Idle,
            BreathPhase::Inhale => BreathPhase::Hold,
            BreathPhase::Hold => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::Inhale,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BreathPhase::Idle => "idle",
            BreathPhase::Inhale => "inhale",
            BreathPhase::Hold => "hold",
            BreathPhase::Exhale => "exhale",
        }
    }
}

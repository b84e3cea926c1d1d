//! Visual scale of the breathing circle.

use serde::{Deserialize, Serialize};

use super::BreathPhase;
use crate::rhythm::Rhythm;

/// Circle diameter while a session runs, in logical pixels.
pub const RUNNING_BASE_DIAMETER: f32 = 180.0;
/// Extra diameter per inhale second beyond the first.
pub const DIAMETER_PER_INHALE_SEC: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathScale {
    pub min_scale: f32,
    pub max_scale: f32,
}

impl BreathScale {
    /// Longer inhales grow the circle further.
    pub fn for_rhythm(rhythm: &Rhythm) -> Self {
        let inhale = rhythm.inhale_secs.max(1) as f32;
        let max_diameter = RUNNING_BASE_DIAMETER + (inhale - 1.0) * DIAMETER_PER_INHALE_SEC;
        Self {
            min_scale: 1.0,
            max_scale: max_diameter / RUNNING_BASE_DIAMETER,
        }
    }
}

/// Scale factor for the circle given the live phase countdown.
///
/// Inhale grows linearly to `max_scale`, Hold stays there, Exhale shrinks
/// back to `min_scale`. Idle and zero-length phases render at 1.0.
pub fn phase_scale(rhythm: &Rhythm, phase: BreathPhase, remaining_secs: u32, total_secs: u32) -> f32 {
    if total_secs == 0 {
        return 1.0;
    }
    let BreathScale {
        min_scale,
        max_scale,
    } = BreathScale::for_rhythm(rhythm);
    let progress = 1.0 - (remaining_secs as f32 / total_secs as f32).clamp(0.0, 1.0);
    match phase {
        BreathPhase::Idle => 1.0,
        BreathPhase::Inhale => min_scale + (max_scale - min_scale) * progress,
        BreathPhase::Hold => max_scale,
        BreathPhase::Exhale => max_scale - (max_scale - min_scale) * progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_scale_grows_with_inhale() {
        let s = BreathScale::for_rhythm(&Rhythm::new(4, 4, 6));
        assert!((s.max_scale - 225.0 / 180.0).abs() < 1e-6);
        let s = BreathScale::for_rhythm(&Rhythm::new(1, 4, 6));
        assert!((s.max_scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn inhale_grows_and_exhale_shrinks() {
        let r = Rhythm::new(4, 4, 4);
        let max = BreathScale::for_rhythm(&r).max_scale;
        assert!((phase_scale(&r, BreathPhase::Inhale, 4, 4) - 1.0).abs() < 1e-6);
        assert!((phase_scale(&r, BreathPhase::Inhale, 0, 4) - max).abs() < 1e-6);
        assert!((phase_scale(&r, BreathPhase::Hold, 2, 4) - max).abs() < 1e-6);
        assert!((phase_scale(&r, BreathPhase::Exhale, 0, 4) - 1.0).abs() < 1e-6);
        let mid = phase_scale(&r, BreathPhase::Exhale, 2, 4);
        assert!(mid > 1.0 && mid < max);
    }

    #[test]
    fn idle_is_unit_scale() {
        let r = Rhythm::default();
        assert_eq!(phase_scale(&r, BreathPhase::Idle, 0, 4), 1.0);
        assert_eq!(phase_scale(&r, BreathPhase::Inhale, 0, 0), 1.0);
    }
}

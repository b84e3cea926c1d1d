//! Sleep countdown.
//!
//! Counts whole seconds down on a [`Timeline`], one chained timer per
//! second. Ticks are urgent timers, so expiry beats any other timer due on
//! the same millisecond. The owner reacts to [`CountdownTick::Expired`] by
//! stopping the session.

use serde::{Deserialize, Serialize};

use super::timeline::{TimerId, Timeline};

/// Countdown lengths offered by the timer picker, in minutes.
pub const TIMER_OPTIONS_MIN: [u32; 6] = [10, 20, 30, 60, 240, 480];

const TICK_MS: u64 = 1_000;

/// Timeline payload for a countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownTick {
    Running { remaining_secs: u32 },
    Expired,
}

#[derive(Debug, Default)]
pub struct Countdown {
    remaining_secs: Option<u32>,
    handle: Option<TimerId>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining_secs(&self) -> Option<u32> {
        self.remaining_secs
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Start counting down from `minutes * 60` seconds, replacing any
    /// countdown already running. Zero minutes disarms.
    pub fn arm<T: From<CountdownTimer>>(&mut self, minutes: u32, timeline: &mut Timeline<T>) {
        self.cancel(timeline);
        let secs = minutes.saturating_mul(60);
        if secs == 0 {
            return;
        }
        self.remaining_secs = Some(secs);
        self.handle = Some(timeline.schedule_urgent(TICK_MS, CountdownTimer.into()));
    }

    /// Cancel the pending tick and clear the remaining time.
    /// Returns whether a countdown was armed.
    pub fn cancel<T>(&mut self, timeline: &mut Timeline<T>) -> bool {
        self.remaining_secs = None;
        match self.handle.take() {
            Some(id) => {
                timeline.cancel(id);
                true
            }
            None => false,
        }
    }

    /// Handle a fired countdown timer. Timers this countdown no longer owns
    /// are ignored.
    pub fn on_tick<T: From<CountdownTimer>>(
        &mut self,
        id: TimerId,
        timeline: &mut Timeline<T>,
    ) -> Option<CountdownTick> {
        if self.handle != Some(id) {
            return None;
        }
        self.handle = None;
        let remaining = self.remaining_secs?.saturating_sub(1);
        self.remaining_secs = Some(remaining);
        if remaining == 0 {
            return Some(CountdownTick::Expired);
        }
        self.handle = Some(timeline.schedule_urgent(TICK_MS, CountdownTimer.into()));
        Some(CountdownTick::Running {
            remaining_secs: remaining,
        })
    }
}

/// Render seconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(cd: &mut Countdown, tl: &mut Timeline<CountdownTimer>, until: u64) -> Vec<CountdownTick> {
        let mut ticks = Vec::new();
        while let Some((id, _)) = tl.pop_due(until) {
            if let Some(t) = cd.on_tick(id, tl) {
                ticks.push(t);
            }
        }
        tl.settle(until);
        ticks
    }

    #[test]
    fn one_minute_expires_after_sixty_ticks() {
        let mut tl = Timeline::new();
        let mut cd = Countdown::new();
        cd.arm(1, &mut tl);
        assert_eq!(cd.remaining_secs(), Some(60));

        let ticks = drain(&mut cd, &mut tl, 59_000);
        assert_eq!(ticks.len(), 59);
        assert_eq!(cd.remaining_secs(), Some(1));

        let ticks = drain(&mut cd, &mut tl, 60_000);
        assert_eq!(ticks, vec![CountdownTick::Expired]);
        assert!(!cd.is_armed());
        assert_eq!(tl.pending(), 0);
    }

    #[test]
    fn cancel_clears_pending_tick() {
        let mut tl = Timeline::new();
        let mut cd = Countdown::new();
        cd.arm(10, &mut tl);
        assert!(cd.cancel(&mut tl));
        assert!(!cd.cancel(&mut tl));
        assert!(drain(&mut cd, &mut tl, 3_600_000).is_empty());
        assert_eq!(cd.remaining_secs(), None);
    }

    #[test]
    fn rearm_replaces_previous_countdown() {
        let mut tl = Timeline::new();
        let mut cd = Countdown::new();
        cd.arm(10, &mut tl);
        drain(&mut cd, &mut tl, 5_000);
        cd.arm(1, &mut tl);
        assert_eq!(cd.remaining_secs(), Some(60));
        assert_eq!(tl.pending(), 1);
    }

    #[test]
    fn zero_minutes_disarms() {
        let mut tl: Timeline<CountdownTimer> = Timeline::new();
        let mut cd = Countdown::new();
        cd.arm(0, &mut tl);
        assert!(!cd.is_armed());
        assert_eq!(tl.pending(), 0);
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(480 * 60), "480:00");
    }
}

//! Breath cycle scheduler.
//!
//! Drives `Inhale -> Hold -> Exhale -> Inhale ...` on a [`Timeline`]. Each
//! phase entry schedules exactly one boundary timer for the next phase plus
//! a chained one-second tick for the live countdown. Every handle lives in
//! `handles` and is cancelled when the phase is left, on `stop()` and on
//! `update_rhythm()`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -start-> Inhale -> Hold -> Exhale -> Inhale ...
//!   ^                                          |
//!   +------------------- stop -----------------+
//! ```

use serde::{Deserialize, Serialize};

use super::BreathPhase;
use crate::error::SessionError;
use crate::rhythm::Rhythm;
use crate::timer::{TimerId, Timeline};

const SECOND_MS: u64 = 1_000;

/// Timeline payloads owned by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathTimer {
    /// Current phase is over; enter the next one.
    Boundary,
    /// One more second of the current phase has elapsed.
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreathEvent {
    PhaseStarted {
        phase: BreathPhase,
        duration_secs: u32,
        cycle: u64,
        at_ms: u64,
    },
    PhaseTick {
        phase: BreathPhase,
        remaining_secs: u32,
        at_ms: u64,
    },
}

#[derive(Debug, Default)]
pub struct BreathCycleScheduler {
    rhythm: Rhythm,
    phase: BreathPhase,
    remaining_secs: u32,
    cycle: u64,
    phase_started_ms: u64,
    handles: Vec<TimerId>,
}

impl BreathCycleScheduler {
    pub fn new(rhythm: Rhythm) -> Self {
        Self {
            rhythm,
            ..Self::default()
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn rhythm(&self) -> Rhythm {
        self.rhythm
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != BreathPhase::Idle
    }

    /// Whole cycles completed since the last (re)start.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Seconds left in the current phase, as shown by the live countdown.
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn phase_total_secs(&self) -> u32 {
        self.rhythm.duration_secs(self.phase)
    }

    pub fn phase_elapsed_secs(&self) -> u32 {
        self.phase_total_secs().saturating_sub(self.remaining_secs)
    }

    pub fn phase_started_ms(&self) -> u64 {
        self.phase_started_ms
    }

    /// Timers this scheduler is still waiting on.
    pub fn pending_timers(&self) -> usize {
        self.handles.len()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh cycle at `Inhale`, returning its `PhaseStarted` event.
    pub fn start<T: From<BreathTimer>>(
        &mut self,
        rhythm: Rhythm,
        timeline: &mut Timeline<T>,
    ) -> Result<BreathEvent, SessionError> {
        rhythm.validate()?;
        self.rhythm = rhythm;
        self.cycle = 0;
        Ok(self.enter(BreathPhase::Inhale, timeline))
    }

    /// Return to `Idle` and cancel every pending timer.
    /// Returns whether the scheduler was running.
    pub fn stop<T>(&mut self, timeline: &mut Timeline<T>) -> bool {
        let was_running = self.is_running();
        self.clear_timers(timeline);
        self.phase = BreathPhase::Idle;
        self.remaining_secs = 0;
        if was_running {
            tracing::debug!(cycle = self.cycle, "breath cycle stopped");
        }
        was_running
    }

    /// Swap the rhythm. A running cycle is abandoned and restarted at
    /// `Inhale` with the new durations; an idle scheduler just stores it.
    pub fn update_rhythm<T: From<BreathTimer>>(
        &mut self,
        rhythm: Rhythm,
        timeline: &mut Timeline<T>,
    ) -> Result<Option<BreathEvent>, SessionError> {
        rhythm.validate()?;
        if !self.is_running() {
            self.rhythm = rhythm;
            return Ok(None);
        }
        self.start(rhythm, timeline).map(Some)
    }

    /// Handle a fired timer. Timers the scheduler no longer owns (already
    /// cancelled, or from an earlier cycle) are ignored.
    pub fn on_timer<T: From<BreathTimer>>(
        &mut self,
        id: TimerId,
        timer: BreathTimer,
        timeline: &mut Timeline<T>,
    ) -> Option<BreathEvent> {
        let pos = self.handles.iter().position(|h| *h == id)?;
        self.handles.swap_remove(pos);
        if !self.is_running() {
            return None;
        }

        match timer {
            BreathTimer::Boundary => {
                let next = self.phase.next();
                if next == BreathPhase::Inhale {
                    self.cycle += 1;
                }
                Some(self.enter(next, timeline))
            }
            BreathTimer::Second => {
                self.remaining_secs = self.remaining_secs.saturating_sub(1);
                if self.remaining_secs > 1 {
                    self.handles
                        .push(timeline.schedule(SECOND_MS, BreathTimer::Second.into()));
                }
                Some(BreathEvent::PhaseTick {
                    phase: self.phase,
                    remaining_secs: self.remaining_secs,
                    at_ms: timeline.now_ms(),
                })
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter<T: From<BreathTimer>>(
        &mut self,
        phase: BreathPhase,
        timeline: &mut Timeline<T>,
    ) -> BreathEvent {
        self.clear_timers(timeline);
        let duration_secs = self.rhythm.duration_secs(phase);
        self.phase = phase;
        self.remaining_secs = duration_secs;
        self.phase_started_ms = timeline.now_ms();

        self.handles.push(timeline.schedule(
            self.rhythm.duration_ms(phase),
            BreathTimer::Boundary.into(),
        ));
        if duration_secs > 1 {
            self.handles
                .push(timeline.schedule(SECOND_MS, BreathTimer::Second.into()));
        }

        tracing::debug!(
            phase = phase.as_str(),
            duration_secs,
            cycle = self.cycle,
            "breath phase started"
        );
        BreathEvent::PhaseStarted {
            phase,
            duration_secs,
            cycle: self.cycle,
            at_ms: self.phase_started_ms,
        }
    }

    fn clear_timers<T>(&mut self, timeline: &mut Timeline<T>) {
        for id in self.handles.drain(..) {
            timeline.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until(
        s: &mut BreathCycleScheduler,
        tl: &mut Timeline<BreathTimer>,
        until_ms: u64,
    ) -> Vec<BreathEvent> {
        let mut events = Vec::new();
        while let Some((id, timer)) = tl.pop_due(until_ms) {
            if let Some(ev) = s.on_timer(id, timer, tl) {
                events.push(ev);
            }
        }
        tl.settle(until_ms);
        events
    }

    fn phases(events: &[BreathEvent]) -> Vec<(BreathPhase, u32, u64)> {
        events
            .iter()
            .filter_map(|e| match *e {
                BreathEvent::PhaseStarted {
                    phase,
                    duration_secs,
                    at_ms,
                    ..
                } => Some((phase, duration_secs, at_ms)),
                BreathEvent::PhaseTick { .. } => None,
            })
            .collect()
    }

    #[test]
    fn start_enters_inhale_immediately() {
        let mut tl: Timeline<BreathTimer> = Timeline::new();
        let mut s = BreathCycleScheduler::default();
        let ev = s.start(Rhythm::new(4, 4, 6), &mut tl).unwrap();
        assert_eq!(
            ev,
            BreathEvent::PhaseStarted {
                phase: BreathPhase::Inhale,
                duration_secs: 4,
                cycle: 0,
                at_ms: 0,
            }
        );
        assert_eq!(s.phase(), BreathPhase::Inhale);
        assert_eq!(s.remaining_secs(), 4);
    }

    #[test]
    fn phases_follow_rhythm_durations() {
        let mut tl = Timeline::new();
        let mut s = BreathCycleScheduler::default();
        s.start(Rhythm::new(4, 7, 8), &mut tl).unwrap();

        let got = phases(&run_until(&mut s, &mut tl, 19_000));
        assert_eq!(
            got,
            vec![
                (BreathPhase::Hold, 7, 4_000),
                (BreathPhase::Exhale, 8, 11_000),
                (BreathPhase::Inhale, 4, 19_000),
            ]
        );
        assert_eq!(s.cycle(), 1);
    }

    #[test]
    fn live_countdown_ticks_once_per_second() {
        let mut tl = Timeline::new();
        let mut s = BreathCycleScheduler::default();
        s.start(Rhythm::new(4, 4, 4), &mut tl).unwrap();

        let ticks: Vec<u32> = run_until(&mut s, &mut tl, 3_500)
            .into_iter()
            .filter_map(|e| match e {
                BreathEvent::PhaseTick { remaining_secs, .. } => Some(remaining_secs),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![3, 2, 1]);
        assert_eq!(s.phase_elapsed_secs(), 3);
    }

    #[test]
    fn stop_cancels_every_timer() {
        let mut tl = Timeline::new();
        let mut s = BreathCycleScheduler::default();
        s.start(Rhythm::new(4, 4, 6), &mut tl).unwrap();
        run_until(&mut s, &mut tl, 5_500);

        assert!(s.stop(&mut tl));
        assert_eq!(tl.pending(), 0);
        assert!(run_until(&mut s, &mut tl, 120_000).is_empty());
        assert_eq!(s.phase(), BreathPhase::Idle);
        assert!(!s.stop(&mut tl));
    }

    #[test]
    fn update_rhythm_restarts_at_inhale() {
        let mut tl = Timeline::new();
        let mut s = BreathCycleScheduler::default();
        s.start(Rhythm::new(4, 4, 6), &mut tl).unwrap();
        run_until(&mut s, &mut tl, 2_000);

        let ev = s.update_rhythm(Rhythm::new(5, 5, 5), &mut tl).unwrap();
        assert_eq!(
            ev,
            Some(BreathEvent::PhaseStarted {
                phase: BreathPhase::Inhale,
                duration_secs: 5,
                cycle: 0,
                at_ms: 2_000,
            })
        );
        // The old 4s boundary must not fire at t=4s.
        let got = phases(&run_until(&mut s, &mut tl, 6_999));
        assert!(got.is_empty());
        let got = phases(&run_until(&mut s, &mut tl, 7_000));
        assert_eq!(got, vec![(BreathPhase::Hold, 5, 7_000)]);
    }

    #[test]
    fn update_rhythm_while_idle_only_stores() {
        let mut tl: Timeline<BreathTimer> = Timeline::new();
        let mut s = BreathCycleScheduler::default();
        assert_eq!(s.update_rhythm(Rhythm::new(3, 3, 3), &mut tl).unwrap(), None);
        assert_eq!(s.rhythm(), Rhythm::new(3, 3, 3));
        assert_eq!(tl.pending(), 0);
    }

    #[test]
    fn invalid_rhythm_schedules_nothing() {
        let mut tl: Timeline<BreathTimer> = Timeline::new();
        let mut s = BreathCycleScheduler::default();
        assert!(s.start(Rhythm::new(0, 4, 4), &mut tl).is_err());
        assert_eq!(tl.pending(), 0);
        assert!(!s.is_running());
    }

    #[test]
    fn stale_timer_is_ignored() {
        let mut tl = Timeline::new();
        let mut s = BreathCycleScheduler::default();
        s.start(Rhythm::new(4, 4, 4), &mut tl).unwrap();
        let foreign = tl.schedule(10, BreathTimer::Boundary);
        let (id, timer) = tl.pop_due(10).unwrap();
        assert_eq!(id, foreign);
        assert!(s.on_timer(id, timer, &mut tl).is_none());
        assert_eq!(s.phase(), BreathPhase::Inhale);
    }
}

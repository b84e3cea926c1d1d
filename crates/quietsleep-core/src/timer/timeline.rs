//! Single logical timeline for delayed callbacks.
//!
//! The timeline is a virtual millisecond clock plus a queue of pending
//! timers. It does not use internal threads - the owner advances it and
//! pops due timers one at a time, so exactly one callback runs at a time.
//!
//! ## Ordering
//!
//! ```text
//! earlier deadline first, then urgent timers, then earlier schedule() call first
//! ```
//!
//! A late `advance` only delays delivery; it never reorders timers.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Handle returned by [`Timeline::schedule`], used to cancel the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    pub fn get(self) -> u64 {
        self.0
    }
}

const URGENT: u8 = 0;
const NORMAL: u8 = 1;

#[derive(Debug, Clone)]
pub struct Timeline<T> {
    now_ms: u64,
    next_id: u64,
    queue: BTreeMap<(u64, u8, TimerId), T>,
    deadlines: HashMap<TimerId, (u64, u8)>,
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<u64> {
        self.deadlines.get(&id).map(|&(deadline, _)| deadline)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.keys().next().map(|(deadline, _, _)| *deadline)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Fire `payload` once, `delay_ms` after the current time.
    pub fn schedule(&mut self, delay_ms: u64, payload: T) -> TimerId {
        self.insert(delay_ms, NORMAL, payload)
    }

    /// Like [`schedule`](Self::schedule), but fires before every
    /// non-urgent timer sharing its deadline.
    pub fn schedule_urgent(&mut self, delay_ms: u64, payload: T) -> TimerId {
        self.insert(delay_ms, URGENT, payload)
    }

    fn insert(&mut self, delay_ms: u64, lane: u8, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now_ms.saturating_add(delay_ms);
        self.queue.insert((deadline, lane, id), payload);
        self.deadlines.insert(id, (deadline, lane));
        id
    }

    /// Remove a pending timer. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some((deadline, lane)) => self.queue.remove(&(deadline, lane, id)).is_some(),
            None => false,
        }
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock
    /// to its deadline.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, T)> {
        let (&(deadline, lane, id), _) = self.queue.first_key_value()?;
        if deadline > until_ms {
            return None;
        }
        let payload = self.queue.remove(&(deadline, lane, id))?;
        self.deadlines.remove(&id);
        self.now_ms = self.now_ms.max(deadline);
        Some((id, payload))
    }

    /// Move the clock forward to `until_ms` once every due timer is drained.
    /// The clock never moves backwards.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_deadline_then_schedule_order() {
        let mut tl = Timeline::new();
        tl.schedule(2_000, "b");
        tl.schedule(1_000, "a");
        tl.schedule(2_000, "c");

        let mut fired = Vec::new();
        while let Some((_, p)) = tl.pop_due(5_000) {
            fired.push((tl.now_ms(), p));
        }
        assert_eq!(fired, vec![(1_000, "a"), (2_000, "b"), (2_000, "c")]);
    }

    #[test]
    fn urgent_timer_wins_a_tied_deadline() {
        let mut tl = Timeline::new();
        tl.schedule(1_000, "boundary");
        let urgent = tl.schedule_urgent(1_000, "expiry");
        tl.schedule(500, "early");
        assert_eq!(tl.deadline(urgent), Some(1_000));

        let mut fired = Vec::new();
        while let Some((_, p)) = tl.pop_due(1_000) {
            fired.push(p);
        }
        assert_eq!(fired, vec!["early", "expiry", "boundary"]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut tl = Timeline::new();
        let id = tl.schedule(1_000, ());
        assert!(tl.cancel(id));
        assert!(!tl.cancel(id));
        assert!(tl.pop_due(u64::MAX).is_none());
        assert_eq!(tl.pending(), 0);
    }

    #[test]
    fn timers_not_yet_due_stay_queued() {
        let mut tl = Timeline::new();
        let id = tl.schedule(1_500, ());
        assert!(tl.pop_due(1_499).is_none());
        assert!(tl.is_pending(id));
        tl.settle(1_499);
        assert_eq!(tl.now_ms(), 1_499);
        assert_eq!(tl.next_deadline(), Some(1_500));
    }

    #[test]
    fn settle_never_rewinds() {
        let mut tl: Timeline<()> = Timeline::new();
        tl.settle(10);
        tl.settle(5);
        assert_eq!(tl.now_ms(), 10);
    }
}

//! Cancellable one-shot timers on a caller-driven millisecond clock.
//!
//! Nothing here sleeps: the owner advances time and pops whatever fell due.
//! Timers due at the same instant fire in the order they were scheduled.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    pending: BTreeMap<(u64, u64), K>,
    next_seq: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self { pending: BTreeMap::new(), next_seq: 0 }
    }
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, kind: K) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((due_ms, seq), kind);
        TimerId(seq)
    }

    /// Returns the cancelled timer's payload, or `None` if it already fired.
    pub fn cancel(&mut self, id: TimerId) -> Option<K> {
        let key = self.pending.keys().find(|(_, seq)| *seq == id.0).copied()?;
        self.pending.remove(&key)
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Remove and return the earliest timer due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, TimerId, K)> {
        let (&(due, seq), _) = self.pending.iter().next()?;
        if due > now_ms {
            return None;
        }
        let kind = self.pending.remove(&(due, seq))?;
        Some((due, TimerId(seq), kind))
    }

    pub fn next_due(&self) -> Option<u64> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

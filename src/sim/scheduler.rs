//! Virtual-clock task queue
//!
//! Deferred actions (level transition delays, staggered pilot hints) are
//! queued against simulation time rather than wall time. Every task belongs to
//! an owner epoch; bumping the epoch on level teardown makes the old level's
//! leftovers stale, so they are dropped instead of fired.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use serde::{Deserialize, Serialize};

/// Handle for cancelling a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskToken(u64);

#[derive(Clone)]
struct Entry<A> {
    fire_at: f32,
    /// Insertion order, tie-break for equal fire times
    seq: u64,
    token: TaskToken,
    owner: u32,
    action: A,
}

impl<A> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<A> Eq for Entry<A> {}

impl<A> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Entry<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (earliest fire time = highest priority)
        other
            .fire_at
            .partial_cmp(&self.fire_at)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of (fire time, token, action) with cancellation
#[derive(Clone)]
pub struct Scheduler<A> {
    queue: BinaryHeap<Entry<A>>,
    cancelled: HashSet<TaskToken>,
    /// Owners whose tasks must never fire
    retired_below: u32,
    next_seq: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            cancelled: HashSet::new(),
            retired_below: 0,
            next_seq: 0,
        }
    }

    /// Queue `action` to fire once the clock reaches `fire_at`
    pub fn schedule_at(&mut self, fire_at: f32, owner: u32, action: A) -> TaskToken {
        let seq = self.next_seq;
        self.next_seq += 1;
        let token = TaskToken(seq);
        let fire_at = if fire_at.is_finite() { fire_at } else { f32::MAX };
        self.queue.push(Entry {
            fire_at,
            seq,
            token,
            owner,
            action,
        });
        token
    }

    /// Queue `action` to fire `delay` seconds after `now`
    pub fn schedule_in(&mut self, now: f32, delay: f32, owner: u32, action: A) -> TaskToken {
        self.schedule_at(now + delay.max(0.0), owner, action)
    }

    /// Cancel one task; returns false if it is unknown or already fired
    pub fn cancel(&mut self, token: TaskToken) -> bool {
        if self.queue.iter().any(|e| e.token == token) {
            self.cancelled.insert(token)
        } else {
            false
        }
    }

    /// Drop every task owned by an epoch older than `epoch`
    pub fn retire_owners_before(&mut self, epoch: u32) {
        self.retired_below = self.retired_below.max(epoch);
    }

    /// Remove and return the earliest live action due at `now`
    ///
    /// Liveness is checked at pop time, so an action that retires its own
    /// owner's siblings stops them from firing within the same drain.
    pub fn pop_due(&mut self, now: f32) -> Option<A> {
        while let Some(entry) = self.queue.peek() {
            if entry.fire_at > now {
                return None;
            }
            let entry = self.queue.pop()?;
            if self.cancelled.remove(&entry.token) {
                continue;
            }
            if entry.owner < self.retired_below {
                log::debug!("Skipping stale task from epoch {}", entry.owner);
                continue;
            }
            return Some(entry.action);
        }
        None
    }

    /// Remove and return every live action due at `now`, earliest first
    pub fn drain_due(&mut self, now: f32) -> Vec<A> {
        std::iter::from_fn(|| self.pop_due(now)).collect()
    }

    /// Number of tasks that can still fire
    pub fn pending(&self) -> usize {
        self.queue
            .iter()
            .filter(|e| !self.cancelled.contains(&e.token) && e.owner >= self.retired_below)
            .count()
    }
}

impl<A> std::fmt::Debug for Scheduler<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("queued", &self.queue.len())
            .field("pending", &self.pending())
            .field("retired_below", &self.retired_below)
            .finish()
    }
}

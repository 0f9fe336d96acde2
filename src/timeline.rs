/// Bucketed event store and simulated clock.
///
/// Events are grouped by the absolute moment they resolve to. Within a
/// bucket, events keep the order in which they were scheduled. The clock
/// only moves forward: it jumps straight to the next non-empty bucket
/// (`advance`) or, for bounded runs, steps one second at a time
/// (`step_until`).

use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::event::Event;
use crate::time::{Epoch, Moment};

/// Pending events plus the clock that walks over them.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    /// Absolute moment → FIFO of events due then.
    buckets: BTreeMap<Moment, VecDeque<Event>>,

    epoch: Epoch,

    now: Moment,

    /// Distinct clock values moved into since construction.
    intervals: u64,
}

impl Timeline {
    /// Create an empty timeline with its clock at moment zero.
    pub fn new(epoch: Epoch) -> Self {
        Timeline {
            buckets: BTreeMap::new(),
            epoch,
            now: Moment::ZERO,
            intervals: 0,
        }
    }

    /// Store `event` in the bucket for `now + event.delay`.
    ///
    /// Returns the absolute moment the event was filed under, or `None`
    /// when that moment lies before the current clock value. A delay of
    /// zero lands in the current bucket and is picked up by the ongoing
    /// drain.
    pub fn schedule(&mut self, event: Event) -> Option<Moment> {
        let at = match self.now.offset(event.delay) {
            Some(at) if !at.is_before(self.now) => at,
            _ => {
                debug!(now = %self.now, delay = event.delay, event = %event.name, "dropping stale event");
                return None;
            }
        };
        self.buckets.entry(at).or_default().push_back(event);
        Some(at)
    }

    /// Move the clock to the earliest bucket strictly after it.
    ///
    /// Returns `false` and leaves the clock untouched when no such
    /// bucket exists.
    pub fn advance(&mut self) -> bool {
        let next = self
            .buckets
            .range((Bound::Excluded(self.now), Bound::Unbounded))
            .next()
            .map(|(at, _)| *at);
        match next {
            Some(at) => {
                self.move_to(at);
                true
            }
            None => false,
        }
    }

    /// Move the clock forward by exactly one second, unless it already
    /// sits at or beyond `horizon`.
    pub fn step_until(&mut self, horizon: Moment) -> bool {
        if !self.now.is_before(horizon) {
            return false;
        }
        match self.now.next() {
            Some(at) => {
                self.move_to(at);
                true
            }
            None => false,
        }
    }

    fn move_to(&mut self, at: Moment) {
        // Buckets left behind were filled at the moment they became due
        // and drained then; nothing behind the clock can fire any more.
        self.buckets = self.buckets.split_off(&at);
        self.now = at;
        self.intervals += 1;
    }

    /// Take the oldest event due at the current moment.
    ///
    /// The bucket is re-read on every call, so events scheduled with zero
    /// delay while earlier ones are being dispatched are handed out before
    /// this returns `None`. The bucket is dropped once empty.
    pub fn next_due(&mut self) -> Option<Event> {
        let bucket = self.buckets.get_mut(&self.now)?;
        let event = bucket.pop_front();
        if bucket.is_empty() {
            self.buckets.remove(&self.now);
        }
        event
    }

    /// Drain the current bucket as an iterator.
    ///
    /// Equivalent to calling [`next_due`](Self::next_due) until it returns
    /// `None`. Callers that need to schedule while draining should use
    /// `next_due` directly.
    pub fn due_events(&mut self) -> DueEvents<'_> {
        DueEvents { timeline: self }
    }

    /// Current clock value.
    pub fn now(&self) -> Moment {
        self.now
    }

    /// Calendar timestamp of the current clock value.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.epoch.timestamp(self.now)
    }

    pub fn epoch(&self) -> &Epoch {
        &self.epoch
    }

    /// Number of clock values moved into so far.
    pub fn intervals(&self) -> u64 {
        self.intervals
    }

    /// Total number of events waiting, including the current bucket.
    pub fn pending_count(&self) -> usize {
        self.buckets.values().map(VecDeque::len).sum()
    }

    /// Number of non-empty buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Earliest moment strictly after the clock that holds events.
    pub fn next_moment(&self) -> Option<Moment> {
        self.buckets
            .range((Bound::Excluded(self.now), Bound::Unbounded))
            .next()
            .map(|(at, _)| *at)
    }

    /// Events waiting at `at`, in dispatch order.
    pub fn bucket(&self, at: Moment) -> impl Iterator<Item = &Event> {
        self.buckets.get(&at).into_iter().flatten()
    }
}

/// Iterator returned by [`Timeline::due_events`].
pub struct DueEvents<'a> {
    timeline: &'a mut Timeline,
}

impl Iterator for DueEvents<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.timeline.next_due()
    }
}

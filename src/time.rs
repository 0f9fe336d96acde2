/// Simulated time.
///
/// A `Moment` is an integer count of simulated seconds since the start
/// instant of a run. The `Epoch` pins moment zero to a calendar timestamp
/// and maps every later moment onto the calendar.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// A point on the simulated clock, in whole seconds since the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Moment(u64);

impl Moment {
    /// The start instant.
    pub const ZERO: Moment = Moment(0);

    #[inline]
    pub fn new(seconds: u64) -> Self {
        Moment(seconds)
    }

    /// Raw number of seconds since the start instant.
    #[inline]
    pub fn seconds(self) -> u64 {
        self.0
    }

    /// Resolve a signed delay relative to `self`.
    ///
    /// Returns `None` when the result would fall before moment zero or
    /// overflow.
    #[inline]
    pub fn offset(self, delay: i64) -> Option<Moment> {
        self.0.checked_add_signed(delay).map(Moment)
    }

    /// The moment immediately after `self`.
    #[inline]
    pub fn next(self) -> Option<Moment> {
        self.0.checked_add(1).map(Moment)
    }

    #[inline]
    pub fn is_before(self, other: Moment) -> bool {
        self.0 < other.0
    }
}

impl std::fmt::Display for Moment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t={}", self.0)
    }
}

/// Calendar anchor of a run.
///
/// Moment `m` corresponds to `start + m * scale` seconds. The scale only
/// stretches the calendar; it never paces the run against the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    start: NaiveDateTime,
    scale: u32,
}

impl Epoch {
    /// An epoch where one simulated second is one calendar second.
    pub fn new(start: NaiveDateTime) -> Self {
        Epoch { start, scale: 1 }
    }

    /// An epoch where one simulated second covers `scale` calendar seconds.
    /// A zero scale is clamped to 1; configuration rejects it earlier.
    pub fn with_scale(start: NaiveDateTime, scale: u32) -> Self {
        Epoch {
            start,
            scale: scale.max(1),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Calendar timestamp of `moment`, saturating at `NaiveDateTime::MAX`.
    pub fn timestamp(&self, moment: Moment) -> NaiveDateTime {
        i64::try_from(moment.seconds())
            .ok()
            .and_then(|secs| secs.checked_mul(i64::from(self.scale)))
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| self.start.checked_add_signed(delta))
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// Number of whole moments between the start and `end`.
    ///
    /// Returns `None` if `end` is not strictly after the start.
    pub fn moments_until(&self, end: NaiveDateTime) -> Option<Moment> {
        if end <= self.start {
            return None;
        }
        // Partial moments round down; a span under one moment yields zero.
        let span = end.signed_duration_since(self.start).num_seconds().max(0);
        Some(Moment(span as u64 / u64::from(self.scale)))
    }
}

impl Default for Epoch {
    fn default() -> Self {
        Epoch::new(NaiveDateTime::default())
    }
}

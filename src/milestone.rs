//! The per-moment summary yielded by a run.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::time::Moment;

/// Summary of one moment's dispatch activity.
///
/// `moment` and `timestamp` name the instant that just finished, not the
/// one the clock moved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub moment: Moment,
    pub timestamp: NaiveDateTime,
    /// Events their target reported as handled.
    pub processed: u64,
    /// Events rejected by their target or addressed to an unknown entity.
    pub ignored: u64,
}

impl Milestone {
    /// Total events dispatched during the moment.
    pub fn dispatched(&self) -> u64 {
        self.processed + self.ignored
    }
}

impl std::fmt::Display for Milestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} @ {}] processed={} ignored={}",
            self.moment,
            self.timestamp.format("%Y-%m-%dT%H:%M:%S"),
            self.processed,
            self.ignored,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_display() {
        let m = Milestone {
            moment: Moment::new(3),
            timestamp: NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 3)
                .unwrap(),
            processed: 4,
            ignored: 1,
        };
        assert_eq!(m.to_string(), "[t=3 @ 2020-01-01T00:00:03] processed=4 ignored=1");
        assert_eq!(m.dispatched(), 5);
    }
}

//! Dispatch trace: one record per event the simulator handed out.

use serde::{Deserialize, Serialize};

use crate::time::Moment;

/// How the target reacted to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The target handled the event.
    Processed,
    /// The target did not recognize the event.
    Rejected,
    /// No entity is registered under the target name.
    UnknownTarget,
}

impl Outcome {
    pub fn is_processed(self) -> bool {
        matches!(self, Outcome::Processed)
    }
}

/// A record of a single dispatch.
///
/// Recording is opt-in (`SimulatorBuilder::record_trace`); the trace is
/// useful for test assertions and post-mortem debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub moment: Moment,
    pub name: String,
    pub target: String,
    pub issuer: Option<String>,
    pub outcome: Outcome,
}

impl std::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} → {} ({:?})",
            self.moment, self.name, self.target, self.outcome,
        )
    }
}

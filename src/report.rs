/// Run reports for external consumption.
///
/// A `RunReport` gathers the milestones of one run together with totals
/// and exports them as JSON for CLI tools and dashboards.

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::milestone::Milestone;
use crate::time::Moment;
use crate::trace::TraceEntry;

/// Everything one call to `Simulator::run` produced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub milestones: Vec<Milestone>,
    /// Sum of `processed` over all milestones.
    pub processed: u64,
    /// Sum of `ignored` over all milestones.
    pub ignored: u64,
    /// The run stopped on a cancellation request rather than running out.
    pub cancelled: bool,
}

impl RunReport {
    pub fn new(milestones: Vec<Milestone>, cancelled: bool) -> Self {
        let processed = milestones.iter().map(|m| m.processed).sum();
        let ignored = milestones.iter().map(|m| m.ignored).sum();
        RunReport {
            milestones,
            processed,
            ignored,
            cancelled,
        }
    }

    /// Moment of the last milestone, if any was yielded.
    pub fn final_moment(&self) -> Option<Moment> {
        self.milestones.last().map(|m| m.moment)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Pretty-printed JSON of the report plus a dispatch trace.
    pub fn to_json_with_trace(&self, trace: &[TraceEntry]) -> SimResult<String> {
        #[derive(Serialize)]
        struct Snapshot<'a> {
            report: &'a RunReport,
            trace: &'a [TraceEntry],
        }

        Ok(serde_json::to_string_pretty(&Snapshot {
            report: self,
            trace,
        })?)
    }
}

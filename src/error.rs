//! Structured error types.
//!
//! Only configuration and initialization can fail. Dispatch-time
//! anomalies (stale scheduling, unknown targets, rejected events) are
//! counted, not raised.

use chrono::NaiveDateTime;
use thiserror::Error;

/// The top-level error type for building and preparing a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    // ── Configuration errors ──────────────────────────────

    /// The end of the simulation is not strictly after its start.
    #[error("simulation must end after it starts (start {start}, end {end})")]
    InvalidTimeRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// A time scale of zero calendar seconds per simulated second.
    #[error("time scale must be at least 1 second per moment")]
    InvalidScale,

    /// A bounded run whose final moment is the start instant.
    #[error("final moment must be after moment zero")]
    EmptyHorizon,

    /// A JSON configuration or report could not be (de)serialized.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    // ── Lifecycle errors ──────────────────────────────────

    /// An entity reported failure from its initialization hook.
    #[error("entity {entity:?} failed to initialize")]
    InitializationFailed { entity: String },
}

/// Convenience alias for `Result<T, SimulationError>`.
pub type SimResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_display_time_range() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let e = SimulationError::InvalidTimeRange { start, end: start };
        let s = e.to_string();
        assert!(s.contains("2020-01-01 00:00:00"));
        assert!(s.contains("end after"));
    }

    #[test]
    fn test_display_initialization_failed() {
        let e = SimulationError::InitializationFailed { entity: "Room".into() };
        assert_eq!(e.to_string(), "entity \"Room\" failed to initialize");
    }

    #[test]
    fn test_json_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{");
        let e: SimulationError = parse.unwrap_err().into();
        assert!(matches!(e, SimulationError::Config(_)));
    }

    #[test]
    fn test_error_is_std_error() {
        let e: Box<dyn std::error::Error> = Box::new(SimulationError::EmptyHorizon);
        assert!(!e.to_string().is_empty());
    }
}

/// Simulation configuration and the fluent builder.
///
/// A configuration pins the start instant and says when the run stops.
/// It is validated once, when the simulator is built; a simulator that
/// exists is always runnable.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{SimResult, SimulationError};
use crate::simulator::Simulator;
use crate::time::{Epoch, Moment};

// ── Termination ───────────────────────────────────────────────────────

/// When a run stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// Run until no future events remain. The clock jumps from one
    /// non-empty moment to the next.
    #[default]
    Exhaustion,

    /// Visit every second up to and including `moment`.
    FinalMoment { moment: u64 },

    /// Visit every second until the calendar reaches `end`, where one
    /// simulated second spans `scale` calendar seconds.
    EndTimestamp {
        end: NaiveDateTime,
        #[serde(default = "default_scale")]
        scale: u32,
    },
}

fn default_scale() -> u32 {
    1
}

// ── SimulationConfig ─────────────────────────────────────────────────

/// Everything needed to construct a [`Simulator`] apart from its entities.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Calendar timestamp of moment zero.
    #[serde(default)]
    pub start: NaiveDateTime,

    #[serde(default)]
    pub termination: Termination,

    /// Keep a [`TraceEntry`](crate::trace::TraceEntry) for every dispatch.
    #[serde(default)]
    pub record_trace: bool,
}

impl SimulationConfig {
    /// Parse a configuration from JSON, e.g.
    /// `{"start": "2020-01-01T00:00:00", "termination": {"kind": "final_moment", "moment": 10}}`.
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate and derive the calendar anchor plus the last moment a
    /// bounded run visits (`None` for runs that end on exhaustion).
    pub(crate) fn resolve(&self) -> SimResult<(Epoch, Option<Moment>)> {
        match self.termination {
            Termination::Exhaustion => Ok((Epoch::new(self.start), None)),
            Termination::FinalMoment { moment: 0 } => Err(SimulationError::EmptyHorizon),
            Termination::FinalMoment { moment } => {
                Ok((Epoch::new(self.start), Some(Moment::new(moment))))
            }
            Termination::EndTimestamp { scale: 0, .. } => Err(SimulationError::InvalidScale),
            Termination::EndTimestamp { end, scale } => {
                let epoch = Epoch::with_scale(self.start, scale);
                match epoch.moments_until(end) {
                    None => Err(SimulationError::InvalidTimeRange {
                        start: self.start,
                        end,
                    }),
                    Some(Moment::ZERO) => Err(SimulationError::EmptyHorizon),
                    Some(horizon) => Ok((epoch, Some(horizon))),
                }
            }
        }
    }
}

// ── SimulatorBuilder ─────────────────────────────────────────────────

/// Fluent builder for a [`Simulator`].
///
/// # Example
/// ```rust
/// use tempo::config::SimulatorBuilder;
/// use tempo::entities::{Room, Visitors};
///
/// let sim = SimulatorBuilder::new()
///     .entity("Room", Room::new(2))
///     .entity("Visitors", Visitors::new(5, "Room"))
///     .record_trace()
///     .build()
///     .unwrap();
/// assert_eq!(sim.entity_count(), 2);
/// ```
pub struct SimulatorBuilder {
    config: SimulationConfig,
    entities: Vec<(String, Box<dyn Entity>)>,
}

impl SimulatorBuilder {
    pub fn new() -> Self {
        SimulatorBuilder {
            config: SimulationConfig::default(),
            entities: Vec::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Calendar timestamp of moment zero.
    pub fn start(mut self, start: NaiveDateTime) -> Self {
        self.config.start = start;
        self
    }

    /// Stop after visiting `moment`.
    pub fn until_moment(mut self, moment: u64) -> Self {
        self.config.termination = Termination::FinalMoment { moment };
        self
    }

    /// Stop when the calendar reaches `end`.
    pub fn until(mut self, end: NaiveDateTime, scale: u32) -> Self {
        self.config.termination = Termination::EndTimestamp { end, scale };
        self
    }

    /// Run until no future events remain (the default).
    pub fn until_exhausted(mut self) -> Self {
        self.config.termination = Termination::Exhaustion;
        self
    }

    pub fn record_trace(mut self) -> Self {
        self.config.record_trace = true;
        self
    }

    /// Register an entity. A later entity with the same name replaces an
    /// earlier one.
    pub fn entity(self, name: impl Into<String>, entity: impl Entity + 'static) -> Self {
        self.boxed_entity(name, Box::new(entity))
    }

    pub fn boxed_entity(mut self, name: impl Into<String>, entity: Box<dyn Entity>) -> Self {
        self.entities.push((name.into(), entity));
        self
    }

    /// Validate the configuration and assemble the simulator.
    pub fn build(self) -> SimResult<Simulator> {
        let mut sim = Simulator::new(&self.config)?;
        for (name, entity) in self.entities {
            sim.register(name, entity);
        }
        Ok(sim)
    }
}

impl Default for SimulatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulation driver.
///
/// Owns the timeline and the entity registry, seeds initial events
/// through `prepare`, and drives the dispatch loop through `run`, which
/// yields one [`Milestone`] per visited moment. The loop is synchronous
/// and single-threaded: exactly one entity handler runs at a time.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::{debug, info, trace, warn};

use crate::cancel::CancellationToken;
use crate::config::SimulationConfig;
use crate::entity::{Entity, SchedulingContext};
use crate::error::{SimResult, SimulationError};
use crate::event::{Arguments, Event};
use crate::milestone::Milestone;
use crate::report::RunReport;
use crate::time::Moment;
use crate::timeline::Timeline;
use crate::trace::{Outcome, TraceEntry};

// ── RunState ──────────────────────────────────────────────────────────

/// Lifecycle of a simulator.
///
/// `Idle → Preparing → Idle`, then `Running → Draining → Idle` for each
/// run, with `Cancelling` entered from `Running` when cancellation is
/// observed at a dispatch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Preparing,
    Running,
    Cancelling,
    Draining,
}

// ── Simulator ─────────────────────────────────────────────────────────

/// Top-level simulation driver.
///
/// Build one with [`SimulatorBuilder`](crate::config::SimulatorBuilder)
/// or [`Simulator::new`] plus [`register`](Self::register), call
/// [`prepare`](Self::prepare) once, then iterate [`run`](Self::run).
pub struct Simulator {
    timeline: Timeline,

    /// Registration order is initialization order.
    entities: Vec<(String, Box<dyn Entity>)>,

    /// Entity name → slot in `entities`.
    index: HashMap<String, usize>,

    /// Last moment a bounded run visits; `None` runs to exhaustion.
    horizon: Option<Moment>,

    token: CancellationToken,

    state: RunState,

    /// Moment of the last milestone handed out, across runs.
    last_reported: Option<Moment>,

    trace: Option<Vec<TraceEntry>>,
}

impl Simulator {
    /// Create a simulator with no entities.
    ///
    /// Fails if the configuration's end does not come after its start.
    pub fn new(config: &SimulationConfig) -> SimResult<Self> {
        let (epoch, horizon) = config.resolve()?;
        Ok(Simulator {
            timeline: Timeline::new(epoch),
            entities: Vec::new(),
            index: HashMap::new(),
            horizon,
            token: CancellationToken::new(),
            state: RunState::Idle,
            last_reported: None,
            trace: config.record_trace.then(Vec::new),
        })
    }

    /// Register an entity under `name`.
    ///
    /// Registering a name twice replaces the earlier entity but keeps its
    /// position in initialization order.
    pub fn register(&mut self, name: impl Into<String>, entity: Box<dyn Entity>) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&slot) => {
                debug!(entity = %name, "replacing registered entity");
                self.entities[slot].1 = entity;
            }
            None => {
                self.index.insert(name.clone(), self.entities.len());
                self.entities.push((name, entity));
            }
        }
    }

    /// Number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Registered names in initialization order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|(name, _)| name.as_str())
    }

    /// Downcast an entity reference for inspection.
    ///
    /// Returns `None` if the name is not registered or has a wrong type.
    pub fn entity<T: Entity + 'static>(&self, name: &str) -> Option<&T> {
        let slot = *self.index.get(name)?;
        self.entities[slot].1.as_any().downcast_ref::<T>()
    }

    /// Downcast a mutable entity reference.
    pub fn entity_mut<T: Entity + 'static>(&mut self, name: &str) -> Option<&mut T> {
        let slot = *self.index.get(name)?;
        self.entities[slot].1.as_any_mut().downcast_mut::<T>()
    }

    /// Let every entity seed its initial events, in registration order.
    ///
    /// Stops at the first entity that reports failure and returns `false`.
    pub fn prepare(&mut self) -> bool {
        self.try_prepare().is_ok()
    }

    /// Like [`prepare`](Self::prepare), but names the entity that failed.
    pub fn try_prepare(&mut self) -> SimResult<()> {
        self.state = RunState::Preparing;
        info!(entities = self.entities.len(), "preparing simulation");

        let mut failed = None;
        for (name, entity) in self.entities.iter_mut() {
            let mut ctx = SchedulingContext::new(&mut self.timeline, Some(name.as_str()));
            if !entity.initialize(&mut ctx) {
                warn!(entity = %name, "entity failed to initialize");
                failed = Some(name.clone());
                break;
            }
        }

        self.state = RunState::Idle;
        match failed {
            Some(entity) => Err(SimulationError::InitializationFailed { entity }),
            None => {
                debug!(pending = self.timeline.pending_count(), "simulation prepared");
                Ok(())
            }
        }
    }

    /// Schedule an event from outside any entity handler.
    ///
    /// Returns the absolute moment the event was filed under, or `None`
    /// when the delay is negative.
    pub fn schedule(
        &mut self,
        issuer: Option<&str>,
        name: impl Into<String>,
        target: impl Into<String>,
        arguments: impl Into<Arguments>,
        delay: i64,
    ) -> Option<Moment> {
        let event = Event::new(
            issuer.map(str::to_owned),
            name,
            target,
            arguments.into(),
            delay,
        );
        self.timeline.schedule(event)
    }

    /// Request cancellation of the current or next run.
    ///
    /// Takes effect before the next dispatch, never during one.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// A handle that cancels this simulator's runs. Entities may hold a
    /// clone to stop the run from inside a handler.
    pub fn cancel_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Start (or resume) the dispatch loop.
    ///
    /// The returned iterator yields a milestone each time the clock moves
    /// on, then a final one for the last moment visited. Calling `run`
    /// again after it finishes resumes from the current clock value; a
    /// moment already reported is not reported again unless something new
    /// was dispatched at it.
    pub fn run(&mut self) -> Run<'_> {
        info!(now = %self.timeline.now(), pending = self.timeline.pending_count(), "simulation running");
        self.state = RunState::Running;
        Run {
            sim: self,
            finished: false,
            cancelled: false,
        }
    }

    /// Drive a full run and collect its milestones.
    pub fn run_to_end(&mut self) -> RunReport {
        let mut run = self.run();
        let milestones: Vec<Milestone> = run.by_ref().collect();
        RunReport::new(milestones, run.was_cancelled())
    }

    /// Current clock value.
    pub fn now(&self) -> Moment {
        self.timeline.now()
    }

    /// Calendar timestamp of the current clock value.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timeline.timestamp()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Last moment a bounded run visits.
    pub fn horizon(&self) -> Option<Moment> {
        self.horizon
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    /// Recorded dispatches; empty unless tracing was enabled.
    pub fn trace(&self) -> &[TraceEntry] {
        self.trace.as_deref().unwrap_or(&[])
    }

    /// Dispatch every event due at the current moment.
    ///
    /// Returns `(processed, ignored)`, or `None` if cancellation was
    /// observed before one of the dispatches.
    fn drain_current(&mut self) -> Option<(u64, u64)> {
        let (mut processed, mut ignored) = (0, 0);
        loop {
            if self.token.is_cancelled() {
                return None;
            }
            let Some(event) = self.timeline.next_due() else {
                return Some((processed, ignored));
            };
            if self.dispatch(event).is_processed() {
                processed += 1;
            } else {
                ignored += 1;
            }
        }
    }

    fn dispatch(&mut self, event: Event) -> Outcome {
        let outcome = match self.index.get(&event.target) {
            Some(&slot) => {
                let (name, entity) = &mut self.entities[slot];
                let mut ctx = SchedulingContext::new(&mut self.timeline, Some(name.as_str()));
                if entity.handle(&mut ctx, &event) {
                    Outcome::Processed
                } else {
                    Outcome::Rejected
                }
            }
            None => {
                debug!(target_entity = %event.target, event = %event.name, "no entity registered for event");
                Outcome::UnknownTarget
            }
        };

        trace!(now = %self.timeline.now(), event = %event, ?outcome, "dispatched");
        if let Some(entries) = self.trace.as_mut() {
            entries.push(TraceEntry {
                moment: self.timeline.now(),
                name: event.name,
                target: event.target,
                issuer: event.issuer,
                outcome,
            });
        }
        outcome
    }

    /// Move the clock to the next moment worth visiting.
    fn advance_clock(&mut self) -> bool {
        match self.horizon {
            Some(horizon) => self.timeline.step_until(horizon),
            None => self.timeline.advance(),
        }
    }

    fn milestone(&self, moment: Moment, processed: u64, ignored: u64) -> Milestone {
        Milestone {
            moment,
            timestamp: self.timeline.epoch().timestamp(moment),
            processed,
            ignored,
        }
    }
}

// ── Run ───────────────────────────────────────────────────────────────

/// Iterator over the milestones of one run. Created by [`Simulator::run`].
pub struct Run<'a> {
    sim: &'a mut Simulator,
    finished: bool,
    cancelled: bool,
}

impl Run<'_> {
    /// Request cancellation; observed before the next dispatch.
    pub fn cancel(&self) {
        self.sim.cancel();
    }

    /// Whether the run ended because of a cancellation request.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Read access to the simulator between milestones.
    pub fn simulator(&self) -> &Simulator {
        &*self.sim
    }
}

impl Iterator for Run<'_> {
    type Item = Milestone;

    fn next(&mut self) -> Option<Milestone> {
        if self.finished {
            return None;
        }
        loop {
            let moment = self.sim.timeline.now();
            let Some((processed, ignored)) = self.sim.drain_current() else {
                self.sim.state = RunState::Cancelling;
                info!(now = %moment, "simulation cancelled");
                self.sim.token.reset();
                self.sim.state = RunState::Idle;
                self.finished = true;
                self.cancelled = true;
                return None;
            };

            let milestone = self.sim.milestone(moment, processed, ignored);
            let repeat = milestone.dispatched() == 0 && self.sim.last_reported == Some(moment);
            if self.sim.advance_clock() {
                // The start instant only counts once something happened there.
                if repeat || (moment == Moment::ZERO && milestone.dispatched() == 0) {
                    continue;
                }
                debug!(%milestone, "milestone");
                self.sim.last_reported = Some(moment);
                return Some(milestone);
            }

            self.sim.state = RunState::Draining;
            info!(intervals = self.sim.timeline.intervals(), "simulation finished");
            self.sim.state = RunState::Idle;
            self.finished = true;
            if repeat {
                return None;
            }
            debug!(%milestone, "final milestone");
            self.sim.last_reported = Some(moment);
            return Some(milestone);
        }
    }
}

impl Drop for Run<'_> {
    fn drop(&mut self) {
        self.sim.state = RunState::Idle;
    }
}

//! # Tempo: Discrete-Event Simulation Kernel
//!
//! Advances a logical clock from event to event instead of tick by tick,
//! dispatching scheduled events to named entities and reporting progress
//! as a sequence of per-moment milestones. Single-threaded, no wall-clock
//! pacing: the same inputs always produce the same run.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────┐
//! │        Simulator           │ ← prepare / run / cancel
//! │  ┌──────────────────────┐  │
//! │  │   Entity registry     │  │ ← name → Box<dyn Entity>
//! │  └──────────────────────┘  │
//! │  ┌──────────────────────┐  │
//! │  │      Timeline         │  │ ← moment → FIFO bucket of events
//! │  │  ┌────────────────┐   │  │
//! │  │  │     Events      │   │  │ ← immutable records
//! │  │  └────────────────┘   │  │
//! │  │  ┌────────────────┐   │  │
//! │  │  │ Moment / Epoch  │   │  │ ← logical clock + calendar anchor
//! │  │  └────────────────┘   │  │
//! │  └──────────────────────┘  │
//! └───────────────────────────┘
//!          │ yields
//!          ▼
//!      Milestone per moment
//! ```

pub mod cancel;
pub mod config;
pub mod entities;
pub mod entity;
pub mod error;
pub mod event;
pub mod milestone;
pub mod report;
pub mod simulator;
pub mod time;
pub mod timeline;
pub mod trace;

// Re-exports for convenience.
pub use cancel::CancellationToken;
pub use config::{SimulationConfig, SimulatorBuilder, Termination};
pub use entity::{Entity, FnEntity, SchedulingContext};
pub use error::{SimResult, SimulationError};
pub use event::{Arguments, Event, Record};
pub use milestone::Milestone;
pub use report::RunReport;
pub use simulator::{Run, RunState, Simulator};
pub use time::{Epoch, Moment};
pub use timeline::Timeline;
pub use trace::{Outcome, TraceEntry};

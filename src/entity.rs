//! `Entity` trait and the scheduling handle entities receive.

use std::any::Any;

use chrono::NaiveDateTime;

use crate::event::{Arguments, Event};
use crate::time::Moment;
use crate::timeline::Timeline;

// ── SchedulingContext ─────────────────────────────────────────────────

/// Handle passed to entities on initialization and on every dispatch.
///
/// Exposes the current moment and timestamp and lets the entity schedule
/// follow-up events. Events scheduled through the context are stamped
/// with the entity's registry name as issuer.
pub struct SchedulingContext<'a> {
    pub(crate) timeline: &'a mut Timeline,
    pub(crate) issuer: Option<&'a str>,
}

impl<'a> SchedulingContext<'a> {
    pub(crate) fn new(timeline: &'a mut Timeline, issuer: Option<&'a str>) -> Self {
        SchedulingContext { timeline, issuer }
    }

    /// Current clock value.
    #[inline]
    pub fn now(&self) -> Moment {
        self.timeline.now()
    }

    /// Calendar timestamp of the current clock value.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timeline.timestamp()
    }

    /// Registry name of the entity holding this context.
    pub fn issuer(&self) -> Option<&str> {
        self.issuer
    }

    /// Schedule `name` for `target`, `delay` seconds from now.
    ///
    /// A zero delay is folded into the moment currently being dispatched.
    /// Returns the absolute moment, or `None` if the delay is negative.
    pub fn schedule(
        &mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        arguments: impl Into<Arguments>,
        delay: i64,
    ) -> Option<Moment> {
        let event = Event::new(
            self.issuer.map(str::to_owned),
            name,
            target,
            arguments.into(),
            delay,
        );
        self.timeline.schedule(event)
    }

    /// Number of events waiting on the timeline.
    pub fn pending_count(&self) -> usize {
        self.timeline.pending_count()
    }
}

// ── Entity ────────────────────────────────────────────────────────────

/// Trait implemented by every simulated entity.
///
/// # Contract
///
/// Implementations **must**:
/// - Keep their state to themselves; all interaction goes through events.
/// - Return `false` from `handle` for event names they do not recognize.
///   That is not an error; the simulator counts the event as ignored.
///
/// # Example
///
/// ```rust
/// use tempo::{Entity, Event, SchedulingContext};
///
/// struct Counter { seen: u32 }
///
/// impl Entity for Counter {
///     fn handle(&mut self, _ctx: &mut SchedulingContext, event: &Event) -> bool {
///         if event.name == "count" {
///             self.seen += 1;
///             return true;
///         }
///         false
///     }
///     fn as_any(&self) -> &dyn std::any::Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
/// }
/// ```
pub trait Entity {
    /// Seed initial events. Returning `false` aborts preparation.
    fn initialize(&mut self, _ctx: &mut SchedulingContext) -> bool {
        true
    }

    /// React to a dispatched event.
    fn handle(&mut self, ctx: &mut SchedulingContext, event: &Event) -> bool;

    /// Used by `Simulator::entity::<T>()`.
    fn as_any(&self) -> &dyn Any;
    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// An entity backed by a closure.
pub struct FnEntity<F> {
    handler: F,
}

impl<F> FnEntity<F>
where
    F: FnMut(&mut SchedulingContext, &Event) -> bool + 'static,
{
    pub fn new(handler: F) -> Self {
        FnEntity { handler }
    }
}

impl<F> Entity for FnEntity<F>
where
    F: FnMut(&mut SchedulingContext, &Event) -> bool + 'static,
{
    fn handle(&mut self, ctx: &mut SchedulingContext, event: &Event) -> bool {
        (self.handler)(ctx, event)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Epoch;

    #[test]
    fn test_context_stamps_issuer() {
        let mut tl = Timeline::new(Epoch::default());
        let mut ctx = SchedulingContext::new(&mut tl, Some("Room"));

        assert_eq!(ctx.schedule("left", "Visitors", Arguments::empty(), 2), Some(Moment::new(2)));
        assert_eq!(ctx.pending_count(), 1);

        let issuers: Vec<_> = tl.bucket(Moment::new(2)).map(|e| e.issuer.clone()).collect();
        assert_eq!(issuers, vec![Some("Room".to_string())]);
    }

    #[test]
    fn test_context_rejects_negative_delay() {
        let mut tl = Timeline::new(Epoch::default());
        let mut ctx = SchedulingContext::new(&mut tl, None);
        assert_eq!(ctx.schedule("late", "X", Arguments::empty(), -1), None);
        assert_eq!(ctx.pending_count(), 0);
    }

    #[test]
    fn test_fn_entity_delegates() {
        let mut tl = Timeline::new(Epoch::default());
        let mut entity = FnEntity::new(|ctx: &mut SchedulingContext, event: &Event| {
            ctx.schedule("echo", event.target.clone(), Arguments::empty(), 1);
            event.name == "ping"
        });

        let ping = Event::new(None, "ping", "Echo", Arguments::empty(), 0);
        let mut ctx = SchedulingContext::new(&mut tl, Some("Echo"));
        assert!(entity.initialize(&mut ctx));
        assert!(entity.handle(&mut ctx, &ping));
        assert_eq!(tl.pending_count(), 1);
    }
}

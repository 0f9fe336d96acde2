//! Admits visitors up to a fixed capacity.

use std::collections::BTreeMap;

use tracing::debug;

use crate::entity::{Entity, SchedulingContext};
use crate::event::{Arguments, Event};

use super::{PARTY, VISITOR};

/// A room that holds at most `capacity` visitors at once.
///
/// On `enter`, an admitted visitor is confirmed with `entered` and
/// scheduled to `leave` after `stay` seconds; a visitor arriving at a
/// full room is told to `wait` and the `enter` counts as not handled.
/// On `leave`, the sender is told the visitor `left`. Replies go to the
/// entity that issued the `enter`.
#[derive(Debug, Clone)]
pub struct Room {
    pub capacity: u32,
    /// Seconds an admitted visitor stays.
    pub stay: i64,
    /// Visitor → entity to notify when they leave.
    pub present: BTreeMap<String, Option<String>>,
    /// Total admissions over the run.
    pub admitted: u64,
    /// Highest occupancy observed.
    pub peak: usize,
}

impl Room {
    pub fn new(capacity: u32) -> Self {
        Room {
            capacity,
            stay: 5,
            present: BTreeMap::new(),
            admitted: 0,
            peak: 0,
        }
    }

    pub fn with_stay(mut self, stay: i64) -> Self {
        self.stay = stay;
        self
    }

    pub fn occupancy(&self) -> usize {
        self.present.len()
    }

    fn is_full(&self) -> bool {
        self.present.len() >= self.capacity as usize
    }

    /// Returns `true` only if the visitor was admitted.
    fn enter(&mut self, ctx: &mut SchedulingContext, visitor: &str, party: Option<&str>) -> bool {
        if self.present.contains_key(visitor) {
            return false;
        }
        if self.is_full() {
            if let Some(party) = party {
                ctx.schedule("wait", party, Arguments::single(VISITOR, visitor), 0);
            }
            return false;
        }

        self.present
            .insert(visitor.to_owned(), party.map(str::to_owned));
        self.admitted += 1;
        self.peak = self.peak.max(self.present.len());
        debug!(%visitor, occupancy = self.present.len(), now = %ctx.now(), "visitor admitted");

        if let Some(party) = party {
            ctx.schedule("entered", party, Arguments::single(VISITOR, visitor), 0);
        }
        if let Some(me) = ctx.issuer().map(str::to_owned) {
            ctx.schedule("leave", me, Arguments::single(VISITOR, visitor), self.stay);
        }
        true
    }

    fn leave(&mut self, ctx: &mut SchedulingContext, visitor: &str) -> bool {
        let Some(party) = self.present.remove(visitor) else {
            return false;
        };
        debug!(%visitor, occupancy = self.present.len(), now = %ctx.now(), "visitor left");
        if let Some(party) = party {
            ctx.schedule("left", party, Arguments::single(VISITOR, visitor), 0);
        }
        true
    }
}

impl Entity for Room {
    fn handle(&mut self, ctx: &mut SchedulingContext, event: &Event) -> bool {
        let Some(visitor) = event.arguments.get_str(VISITOR) else {
            return false;
        };
        match event.name.as_str() {
            "enter" => {
                let party = event
                    .arguments
                    .get_str(PARTY)
                    .or(event.issuer.as_deref());
                self.enter(ctx, visitor, party)
            }
            "leave" => self.leave(ctx, visitor),
            _ => false,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

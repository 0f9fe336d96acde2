//! A group of people taking turns in a room.

use std::collections::{BTreeSet, VecDeque};

use tracing::debug;

use crate::entity::{Entity, SchedulingContext};
use crate::event::{Arguments, Event};

use super::VISITOR;

/// `count` visitors named `visitor_1..=visitor_count`.
///
/// All of them try to `enter` the room one second after the start. Those
/// told to `wait` queue up; whenever someone leaves, the longest-waiting
/// visitor tries again in the same instant.
#[derive(Debug, Clone)]
pub struct Visitors {
    pub count: u32,
    /// Registry name of the room.
    pub room: String,
    pub waiting: VecDeque<String>,
    pub present: BTreeSet<String>,
    /// Confirmed entries over the run.
    pub entries: u64,
    /// Largest number of visitors inside at once.
    pub peak_present: usize,
}

impl Visitors {
    pub fn new(count: u32, room: impl Into<String>) -> Self {
        Visitors {
            count,
            room: room.into(),
            waiting: VecDeque::new(),
            present: BTreeSet::new(),
            entries: 0,
            peak_present: 0,
        }
    }

    fn name(i: u32) -> String {
        format!("visitor_{}", i)
    }
}

impl Entity for Visitors {
    fn initialize(&mut self, ctx: &mut SchedulingContext) -> bool {
        debug!(count = self.count, room = %self.room, "visitors arriving");
        for i in 1..=self.count {
            ctx.schedule(
                "enter",
                self.room.clone(),
                Arguments::single(VISITOR, Self::name(i)),
                1,
            );
        }
        true
    }

    fn handle(&mut self, ctx: &mut SchedulingContext, event: &Event) -> bool {
        let Some(visitor) = event.arguments.get_str(VISITOR) else {
            return false;
        };
        match event.name.as_str() {
            "entered" => {
                if !self.present.insert(visitor.to_owned()) {
                    return false;
                }
                self.entries += 1;
                self.peak_present = self.peak_present.max(self.present.len());
                true
            }
            "wait" => {
                self.waiting.push_back(visitor.to_owned());
                true
            }
            "left" => {
                self.present.remove(visitor);
                if let Some(next) = self.waiting.pop_front() {
                    ctx.schedule("enter", self.room.clone(), Arguments::single(VISITOR, next), 0);
                }
                true
            }
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

//! Cooperative cancellation for a running simulation.

use std::cell::Cell;
use std::rc::Rc;

/// Cancellation flag shared by all clones.
///
/// The simulator polls it before every dispatch; setting it never
/// interrupts a handler that is already running. Each simulator owns its
/// own token, so independent simulators never observe each other's
/// cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Clear a previous request so the owner can run again.
    pub(crate) fn reset(&self) {
        self.cancelled.set(false);
    }
}

//! Reference entities: a room with limited capacity and the visitors
//! queueing for it.
//!
//! These are small models used for demonstration and for exercising the
//! engine end to end.
//!
//! | Entity | Reacts to | Emits |
//! |---|---|---|
//! | [`Room`] | `enter`, `leave` | `entered`, `wait`, `left` to the sender; `leave` to itself |
//! | [`Visitors`] | `entered`, `wait`, `left` | `enter` to the room |

pub mod room;
pub mod visitors;

pub use room::Room;
pub use visitors::Visitors;

/// Argument key naming the visitor an event is about.
pub const VISITOR: &str = "visitor";

/// Argument key naming the entity a room reports back to.
pub const PARTY: &str = "party";

#[cfg(test)]
mod tests;

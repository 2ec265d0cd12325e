//! Decision making for entities no client controls.

pub mod ai;

pub use ai::{NpcBehavior, NpcDecision};

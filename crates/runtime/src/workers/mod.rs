//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the [`crate::GameServer`] and is the only task
//! that ever touches the level state.

mod simulation;

pub use simulation::{Command, SimulationWorker};

//! Authoritative server runtime for the dungeon crawl.
//!
//! This crate owns the tick loop around [`game_core::GameEngine`]: client
//! inboxes, NPC behavior, outbound state sync and the async worker that
//! serializes every mutation. Consumers embed [`Runtime`] and talk to it
//! through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`server`] holds the synchronous tick procedure and client inboxes
//! - [`providers`] decides what autonomous entities do on their turn
//! - [`sync`] builds snapshot/delta messages and the client-side mirror
//! - [`transport`] is the seam outbound messages leave through
//! - [`events`] provides a topic-based event bus for in-process observers
//! - [`runtime`] hosts the orchestrator and builder
pub mod api;
pub mod events;
pub mod providers;
pub mod runtime;
pub mod server;
pub mod sync;
pub mod transport;

mod utils;
mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{Event, EventBus, GameStateEvent, SyncEvent, Topic, TurnEvent};
pub use providers::{NpcBehavior, NpcDecision};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use server::{ClientInbox, GameServer, TickReport};
pub use sync::{
    ClientMirror, EntityUpdate, LevelChanged, LevelSnapshot, MirrorError, SyncMessage, TileUpdate,
};
pub use transport::{ChannelTransport, Transport};
pub use utils::hash::state_digest;

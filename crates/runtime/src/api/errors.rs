//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, level construction and outbound
//! transports so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{ClientId, LevelError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a level catalog or an initial state before building")]
    MissingLevel,

    #[error("failed to build level")]
    Level(#[from] LevelError),

    #[error("client {0} is not connected")]
    UnknownClient(ClientId),

    #[error("client {client} submitted an event on behalf of client {claimed}")]
    ClientMismatch { client: ClientId, claimed: ClientId },

    #[error("failed to encode game state")]
    Encode(#[source] bincode::Error),

    #[error("transport to client {client} is closed")]
    TransportClosed { client: ClientId },
}

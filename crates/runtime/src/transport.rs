//! Outbound seam between the server and whatever carries messages to clients.
//!
//! Wire formats and sockets live behind [`Transport`]; the runtime only hands
//! it finished [`SyncMessage`]s after each tick.
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use game_core::ClientId;

use crate::api::{Result, RuntimeError};
use crate::sync::{LevelChanged, LevelSnapshot, SyncMessage};

/// Delivers sync messages to connected clients.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the whole level to one client.
    async fn send_full_state(&self, client: ClientId, snapshot: &LevelSnapshot) -> Result<()>;

    /// Broadcasts the objects changed during a tick to every client.
    async fn send_delta(&self, delta: &LevelChanged) -> Result<()>;
}

/// In-process transport backed by one unbounded channel per client.
///
/// Messages for clients that never opened a channel are skipped.
#[derive(Default)]
pub struct ChannelTransport {
    clients: Mutex<BTreeMap<ClientId, mpsc::UnboundedSender<SyncMessage>>>,
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or replaces) the channel for `client`.
    pub async fn open(&self, client: ClientId) -> mpsc::UnboundedReceiver<SyncMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.lock().await.insert(client, tx);
        rx
    }

    pub async fn close(&self, client: ClientId) {
        self.clients.lock().await.remove(&client);
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send_full_state(&self, client: ClientId, snapshot: &LevelSnapshot) -> Result<()> {
        let clients = self.clients.lock().await;
        let Some(tx) = clients.get(&client) else {
            tracing::trace!(%client, "no channel open, snapshot skipped");
            return Ok(());
        };
        tx.send(SyncMessage::Snapshot(snapshot.clone()))
            .map_err(|_| RuntimeError::TransportClosed { client })
    }

    async fn send_delta(&self, delta: &LevelChanged) -> Result<()> {
        let clients = self.clients.lock().await;
        let mut closed = None;
        for (client, tx) in clients.iter() {
            if tx.send(SyncMessage::Delta(delta.clone())).is_err() {
                closed.get_or_insert(*client);
            }
        }
        match closed {
            Some(client) => Err(RuntimeError::TransportClosed { client }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{GameState, TileField};

    #[tokio::test]
    async fn snapshots_reach_only_their_client() {
        let transport = ChannelTransport::new();
        let mut first = transport.open(ClientId(1)).await;
        let mut second = transport.open(ClientId(2)).await;

        let state = GameState::new(TileField::new(2, 2), 0);
        let snapshot = LevelSnapshot::capture(&state, 4).unwrap();
        transport
            .send_full_state(ClientId(1), &snapshot)
            .await
            .unwrap();

        assert_eq!(first.recv().await.unwrap().tick(), 4);
        assert!(second.try_recv().is_err());

        // unknown clients are skipped
        transport
            .send_full_state(ClientId(9), &snapshot)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn closed_receiver_is_reported() {
        let transport = ChannelTransport::new();
        drop(transport.open(ClientId(3)).await);

        let state = GameState::new(TileField::new(2, 2), 0);
        let delta =
            LevelChanged::from_changes(&state, &game_core::ChangeSet::new(), 1).unwrap();
        assert!(matches!(
            transport.send_delta(&delta).await,
            Err(RuntimeError::TransportClosed {
                client: ClientId(3)
            })
        ));
    }
}

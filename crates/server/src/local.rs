//! Loop-back client that plays through the same channel a remote client would.
//!
//! It mirrors the level from sync messages and hands its turn back as soon as
//! it gets one, so enemies keep moving while the server runs headless.
use anyhow::Result;
use tokio::sync::mpsc;

use game_core::{ClientId, Event, GameState};
use runtime::{ChannelTransport, ClientMirror, RuntimeHandle, SyncMessage};

pub struct LocalClient {
    handle: RuntimeHandle,
    client: ClientId,
    inbound: mpsc::UnboundedReceiver<SyncMessage>,
    mirror: ClientMirror,
    forfeit_pending: bool,
}

impl LocalClient {
    /// Connects, opens a channel on `transport` and queues a join.
    pub async fn join(
        handle: RuntimeHandle,
        transport: &ChannelTransport,
        name: &str,
    ) -> Result<Self> {
        let client = handle.connect().await?;
        let inbound = transport.open(client).await;
        handle.submit(client, Event::join(client, name)).await?;
        tracing::info!(%client, name, "local player queued to join");

        Ok(Self {
            handle,
            client,
            inbound,
            mirror: ClientMirror::new(),
            forfeit_pending: false,
        })
    }

    pub async fn run(mut self) {
        while let Some(message) = self.inbound.recv().await {
            if let Err(error) = self.mirror.apply(&message) {
                tracing::warn!(client = %self.client, %error, "mirror rejected sync message");
                continue;
            }
            let Some(state) = self.mirror.state() else {
                continue;
            };
            let Some(event) = next_event(state, self.client, &mut self.forfeit_pending) else {
                continue;
            };
            if let Err(error) = self.handle.submit(self.client, event).await {
                tracing::debug!(client = %self.client, %error, "runtime gone, local client stops");
                break;
            }
        }
    }
}

/// One end-turn per turn held; a second one would sit queued until the next.
fn next_event(state: &GameState, client: ClientId, forfeit_pending: &mut bool) -> Option<Event> {
    let player = state.entities.player_of(client)?;
    if !state.turn.is_active(player.id) {
        *forfeit_pending = false;
        return None;
    }
    if *forfeit_pending {
        return None;
    }
    *forfeit_pending = true;
    Some(Event::end_turn(player.id))
}

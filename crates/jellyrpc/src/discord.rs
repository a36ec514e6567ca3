//! Discord Rich Presence transport.
//!
//! Wraps a blocking `DiscordIpcClient`. The poll loop owns it exclusively and
//! reconnects in place when an update reports [`PresenceError::ConnectionLost`].

use discord_rich_presence::{activity, DiscordIpc, DiscordIpcClient};
use thiserror::Error;

use jellyrpc_core::models::ActivityKind;
use jellyrpc_core::presence::PresencePayload;

#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("could not connect to Discord: {0}")]
    Connect(String),

    #[error("Discord connection lost: {0}")]
    ConnectionLost(String),

    #[error("not connected to Discord")]
    NotConnected,
}

impl PresenceError {
    /// The pipe is gone; the next update needs a fresh connection.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, Self::ConnectionLost(_) | Self::NotConnected)
    }
}

/// A rich-presence sink: connect, update, clear, disconnect.
pub trait PresenceTransport {
    fn connect(&mut self) -> Result<(), PresenceError>;

    fn set_activity(&mut self, payload: &PresencePayload) -> Result<(), PresenceError>;

    /// Remove the activity. Clearing while disconnected is a no-op.
    fn clear(&mut self) -> Result<(), PresenceError>;

    fn close(&mut self);
}

/// Rich presence over Discord's local IPC socket.
pub struct DiscordPresence {
    client: DiscordIpcClient,
    connected: bool,
}

impl DiscordPresence {
    pub fn new(client_id: &str) -> Self {
        Self {
            client: DiscordIpcClient::new(client_id),
            connected: false,
        }
    }
}

impl PresenceTransport for DiscordPresence {
    fn connect(&mut self) -> Result<(), PresenceError> {
        if self.connected {
            let _ = self.client.close();
            self.connected = false;
        }
        self.client
            .connect()
            .map_err(|e| PresenceError::Connect(e.to_string()))?;
        self.connected = true;
        tracing::info!("Connected to Discord IPC");
        Ok(())
    }

    fn set_activity(&mut self, payload: &PresencePayload) -> Result<(), PresenceError> {
        if !self.connected {
            return Err(PresenceError::NotConnected);
        }

        let mut assets = activity::Assets::new()
            .large_text(&payload.large_text)
            .small_text(&payload.small_text);
        if let Some(image) = &payload.large_image {
            assets = assets.large_image(image);
        }

        let buttons: Vec<activity::Button> = payload
            .buttons
            .iter()
            .map(|b| activity::Button::new(&b.label, &b.url))
            .collect();

        let mut presence = activity::Activity::new()
            .activity_type(activity_type(payload.activity))
            .details(&payload.details)
            .state(&payload.state)
            .timestamps(
                activity::Timestamps::new()
                    .start(payload.start)
                    .end(payload.end),
            )
            .assets(assets);
        if !buttons.is_empty() {
            presence = presence.buttons(buttons);
        }

        // IPC writes only fail once the pipe is closed.
        self.client.set_activity(presence).map_err(|e| {
            self.connected = false;
            PresenceError::ConnectionLost(e.to_string())
        })
    }

    fn clear(&mut self) -> Result<(), PresenceError> {
        if !self.connected {
            return Ok(());
        }
        self.client.clear_activity().map_err(|e| {
            self.connected = false;
            PresenceError::ConnectionLost(e.to_string())
        })
    }

    fn close(&mut self) {
        if self.connected {
            if let Err(e) = self.client.close() {
                tracing::debug!(error = %e, "Error closing Discord IPC");
            }
            self.connected = false;
        }
    }
}

fn activity_type(kind: ActivityKind) -> activity::ActivityType {
    match kind {
        ActivityKind::Listening => activity::ActivityType::Listening,
        ActivityKind::Watching => activity::ActivityType::Watching,
        ActivityKind::Playing => activity::ActivityType::Playing,
    }
}

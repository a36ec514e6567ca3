//! The poll loop.
//!
//! [`Bridge`] is the context built once at startup: it owns the session
//! source, the cover resolver and the one chat-client connection. Each tick
//! fetches sessions, extracts what is playing, resolves its cover and either
//! publishes or clears the presence. Nothing is carried over between ticks.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;

use jellyrpc_api::traits::{CoverResolver, SessionSource};
use jellyrpc_core::extract::{normalize, select_session};
use jellyrpc_core::models::{NormalizedPresence, Session};
use jellyrpc_core::presence::{compose, format_time};

use crate::discord::{PresenceError, PresenceTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Connecting,
    Polling,
    Stopped,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Published,
    Cleared,
    /// Something is playing but it could not be shown this time.
    Skipped,
}

pub struct Bridge<S, C, T> {
    sessions: S,
    covers: C,
    transport: T,
    interval: Duration,
    state: LoopState,
}

impl<S, C, T> Bridge<S, C, T>
where
    S: SessionSource,
    C: CoverResolver,
    T: PresenceTransport,
{
    pub fn new(sessions: S, covers: C, transport: T, interval: Duration) -> Self {
        Self {
            sessions,
            covers,
            transport,
            interval,
            state: LoopState::Connecting,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// First connection. Failing here is not fatal; publishing retries.
    pub fn connect(&mut self) {
        if let Err(e) = self.transport.connect() {
            tracing::error!(error = %e, "Failed to connect to Discord RPC");
        }
        self.state = LoopState::Polling;
    }

    /// Re-establish the chat-client connection in place.
    pub fn reconnect(&mut self) {
        tracing::info!("Reconnecting to Discord RPC");
        self.transport.close();
        if let Err(e) = self.transport.connect() {
            tracing::error!(error = %e, "Failed to reconnect to Discord RPC");
        }
    }

    /// Sessions of the configured user; fetch errors count as "none".
    pub async fn fetch(&self) -> Vec<Session> {
        match self.sessions.active_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch sessions");
                Vec::new()
            }
        }
    }

    /// Extraction plus cover resolution.
    pub async fn now_playing(&self, sessions: &[Session]) -> Option<NormalizedPresence> {
        let selection = select_session(sessions)?;
        let mut presence = normalize(&selection);
        presence.image_url = Some(self.covers.resolve(&presence, selection.item).await);
        Some(presence)
    }

    pub fn publish(&mut self, presence: &NormalizedPresence) -> Tick {
        let payload = match compose(presence, Utc::now().timestamp()) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Not updating Discord presence");
                return Tick::Skipped;
            }
        };

        tracing::info!(
            kind = presence.kind.type_name(),
            details = %payload.details,
            state = %payload.state,
            time = %format!(
                "{} / {}",
                format_time(presence.position_ticks),
                format_time(presence.run_time_ticks.unwrap_or_default())
            ),
            "Updating Discord presence"
        );
        tracing::debug!(status = %payload.small_text, image = ?payload.large_image, "Presence details");
        if !payload.buttons.is_empty() {
            let urls: Vec<&str> = payload.buttons.iter().map(|b| b.url.as_str()).collect();
            tracing::debug!(?urls, "Presence buttons");
        }

        match self.transport.set_activity(&payload) {
            Ok(()) => Tick::Published,
            Err(e) => {
                self.handle_publish_error(e);
                Tick::Skipped
            }
        }
    }

    /// Remove any displayed presence. Safe to call repeatedly.
    pub fn clear(&mut self) -> Result<(), PresenceError> {
        self.transport.clear()
    }

    pub async fn tick(&mut self) -> Tick {
        let sessions = self.fetch().await;
        match self.now_playing(&sessions).await {
            Some(presence) => self.publish(&presence),
            None => {
                if let Err(e) = self.clear() {
                    self.handle_publish_error(e);
                }
                Tick::Cleared
            }
        }
    }

    /// Poll until `shutdown` resolves, then clear and disconnect.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        self.connect();
        tracing::info!(state = ?self.state(), interval = ?self.interval, "Polling Jellyfin");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.tick() => {}
            }
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("Stopped by user");
        self.stop();
    }

    pub fn stop(&mut self) {
        if let Err(e) = self.clear() {
            tracing::warn!(error = %e, "Failed to clear presence on shutdown");
        }
        self.transport.close();
        self.state = LoopState::Stopped;
    }

    fn handle_publish_error(&mut self, e: PresenceError) {
        tracing::error!(error = %e, "Failed to update Discord presence");
        if e.is_connection_lost() {
            self.reconnect();
        }
    }
}

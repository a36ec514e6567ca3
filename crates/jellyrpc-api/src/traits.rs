//! Seams between the poll loop and the outside world.
//!
//! The loop only talks to these traits, so tests can swap in fakes.

use std::future::Future;

use jellyrpc_core::models::{NormalizedPresence, NowPlayingItem, Session};

/// Something that can list the active playback sessions of the configured user.
pub trait SessionSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sessions in server order, already filtered to the configured user.
    fn active_sessions(&self) -> impl Future<Output = Result<Vec<Session>, Self::Error>> + Send;
}

/// Produces the large image URL for a presence.
pub trait CoverResolver: Send + Sync {
    /// Always returns a URL. Failures are logged and degrade to a fallback image.
    fn resolve(
        &self,
        presence: &NormalizedPresence,
        item: &NowPlayingItem,
    ) -> impl Future<Output = String> + Send;
}

mod media;
mod session;

pub use media::{ActivityKind, MediaKind, NormalizedPresence};
pub use session::{ExternalUrl, NameIdPair, NowPlayingItem, PlayState, Session};

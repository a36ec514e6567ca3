use serde::{Deserialize, Serialize};

use super::session::ExternalUrl;

/// What is playing, with the fields each kind needs for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Audio {
        artists: Vec<String>,
        album: String,
        track: Option<u32>,
    },
    Movie {
        year: Option<u32>,
        genres: Vec<String>,
    },
    Episode {
        series: String,
        season: Option<u32>,
        episode: Option<u32>,
    },
    /// Anything else Jellyfin can play. Keeps the raw `Type` string.
    Other { kind: String },
}

impl MediaKind {
    pub fn activity(&self) -> ActivityKind {
        match self {
            Self::Audio { .. } => ActivityKind::Listening,
            Self::Movie { .. } | Self::Episode { .. } => ActivityKind::Watching,
            Self::Other { .. } => ActivityKind::Playing,
        }
    }

    /// Jellyfin's name for the kind.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Audio { .. } => "Audio",
            Self::Movie { .. } => "Movie",
            Self::Episode { .. } => "Episode",
            Self::Other { kind } => kind,
        }
    }
}

/// Verb shown by the chat client in front of the activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Listening,
    Watching,
    Playing,
}

/// Presentation record for the one session being shown. Rebuilt every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPresence {
    pub item_id: String,
    pub kind: MediaKind,
    pub title: String,
    pub details: String,
    pub state: String,
    /// Filled in by the cover resolver after extraction.
    pub image_url: Option<String>,
    pub run_time_ticks: Option<i64>,
    pub position_ticks: i64,
    pub is_paused: bool,
    pub is_muted: bool,
    pub client_name: String,
    pub activity: ActivityKind,
    /// All of the item's external links; the publisher keeps at most two.
    pub links: Vec<ExternalUrl>,
}

impl NormalizedPresence {
    /// Caption for the large image: album, else series, else title.
    pub fn caption(&self) -> &str {
        match &self.kind {
            MediaKind::Audio { album, .. } => album,
            MediaKind::Episode { series, .. } => series,
            MediaKind::Movie { .. } | MediaKind::Other { .. } => &self.title,
        }
    }
}

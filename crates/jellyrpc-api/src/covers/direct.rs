use url::Url;

use jellyrpc_core::config::CoversConfig;
use jellyrpc_core::models::{MediaKind, NormalizedPresence, NowPlayingItem};

use super::error::CoverError;
use crate::traits::CoverResolver;

/// Points the chat client straight at the media server's image endpoint.
pub struct DirectCovers {
    base_url: String,
    max_width: u32,
    quality: u32,
    fallback_url: String,
}

impl DirectCovers {
    pub fn new(base_url: &str, config: &CoversConfig) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            max_width: config.max_width,
            quality: config.quality,
            fallback_url: config.fallback_url.clone(),
        }
    }

    /// `{base}/Items/{id}/Images/Primary?maxWidth=..&quality=..`
    pub fn image_url(&self, item_id: &str) -> Result<String, CoverError> {
        let mut url = Url::parse(&format!("{}/Items/{item_id}/Images/Primary", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("maxWidth", &self.max_width.to_string())
            .append_pair("quality", &self.quality.to_string());
        Ok(url.into())
    }
}

/// Which item to take the picture from. Tracks and episodes without their
/// own artwork borrow the album or series image.
pub fn image_item_id<'a>(presence: &'a NormalizedPresence, item: &'a NowPlayingItem) -> &'a str {
    if item.has_primary_image() {
        return &presence.item_id;
    }
    let parent = match presence.kind {
        MediaKind::Audio { .. } => item.album_id.as_deref(),
        MediaKind::Episode { .. } => item.series_id.as_deref(),
        MediaKind::Movie { .. } | MediaKind::Other { .. } => None,
    };
    parent
        .filter(|id| !id.is_empty())
        .unwrap_or(presence.item_id.as_str())
}

impl CoverResolver for DirectCovers {
    async fn resolve(&self, presence: &NormalizedPresence, item: &NowPlayingItem) -> String {
        match self.image_url(image_item_id(presence, item)) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Could not build cover URL, using fallback");
                self.fallback_url.clone()
            }
        }
    }
}

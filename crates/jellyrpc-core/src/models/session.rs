use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

// ── Jellyfin /Sessions response types ───────────────────────────

/// One entry of the `/Sessions` array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Session {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    /// Client application name, e.g. "Jellyfin Web".
    pub client: Option<String>,
    pub device_name: Option<String>,
    pub now_playing_item: Option<NowPlayingItem>,
    pub play_state: Option<PlayState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayState {
    pub position_ticks: Option<i64>,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default)]
    pub is_muted: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NowPlayingItem {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "Type")]
    pub item_type: Option<String>,
    pub run_time_ticks: Option<i64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub artist_items: Vec<NameIdPair>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub album_artists: Vec<NameIdPair>,
    pub album: Option<String>,
    pub album_id: Option<String>,

    pub production_year: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<String>,

    pub series_name: Option<String>,
    pub series_id: Option<String>,
    /// Season number for episodes.
    pub parent_index_number: Option<u32>,
    /// Episode number for episodes, track number for audio.
    pub index_number: Option<u32>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: Vec<ExternalUrl>,
    #[serde(default, deserialize_with = "drop_null_values")]
    pub provider_ids: HashMap<String, String>,
    #[serde(default, deserialize_with = "drop_null_values")]
    pub image_tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NameIdPair {
    pub name: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExternalUrl {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

impl NowPlayingItem {
    /// IMDb id from the provider ids, or from the last path segment of the IMDb link.
    pub fn imdb_id(&self) -> Option<String> {
        if let Some(id) = self
            .provider_ids
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("imdb"))
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
        {
            return Some(id.to_string());
        }

        self.external_urls
            .iter()
            .find(|u| u.name == "IMDb")
            .and_then(|u| u.url.trim_end_matches('/').rsplit('/').next())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    pub fn has_primary_image(&self) -> bool {
        self.image_tags.contains_key("Primary")
    }

    /// Track artists, falling back to album artists.
    pub fn artist_names(&self) -> Vec<String> {
        let names = |pairs: &[NameIdPair]| -> Vec<String> {
            pairs.iter().filter_map(|a| a.name.clone()).collect()
        };
        let artists = names(&self.artist_items);
        if artists.is_empty() {
            names(&self.album_artists)
        } else {
            artists
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// String map whose null values are left out.
fn drop_null_values<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: Option<HashMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(map
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect())
}

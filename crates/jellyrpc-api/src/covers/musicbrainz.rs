use reqwest::Client;
use serde::Deserialize;

use super::error::CoverError;
use super::head_ok;

const SEARCH_URL: &str = "https://musicbrainz.org/ws/2/release/";
const COVER_ART_URL: &str = "https://coverartarchive.org";

#[derive(Debug, Deserialize)]
struct ReleaseSearch {
    #[serde(default)]
    releases: Vec<Release>,
}

#[derive(Debug, Deserialize)]
struct Release {
    id: String,
}

/// Album art via a MusicBrainz release search and the Cover Art Archive.
pub struct MusicBrainzClient {
    user_agent: String,
    search_url: String,
    cover_art_url: String,
    http: Client,
}

impl MusicBrainzClient {
    /// MusicBrainz refuses anonymous clients, so a descriptive user agent is required.
    pub fn new(user_agent: String, http: Client) -> Self {
        Self {
            user_agent,
            search_url: SEARCH_URL.to_string(),
            cover_art_url: COVER_ART_URL.to_string(),
            http,
        }
    }

    pub fn with_endpoints(mut self, search_url: impl Into<String>, cover_art_url: impl Into<String>) -> Self {
        self.search_url = search_url.into();
        self.cover_art_url = cover_art_url.into();
        self
    }

    /// MBID of the best matching release.
    pub async fn find_release(&self, artist: &str, album: &str) -> Result<String, CoverError> {
        let query = format!("release:\"{}\" AND artist:\"{}\"", escape(album), escape(artist));
        let resp = self
            .http
            .get(&self.search_url)
            .header("User-Agent", &self.user_agent)
            .query(&[("query", query.as_str()), ("fmt", "json")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CoverError::Api {
                status: resp.status().as_u16(),
            });
        }

        let body: ReleaseSearch = resp.json().await?;
        body.releases
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| CoverError::NotFound(format!("{artist} - {album}")))
    }

    /// Front cover (500px) for the album, only if the archive has one.
    pub async fn front_cover(&self, artist: &str, album: &str) -> Result<String, CoverError> {
        let mbid = self.find_release(artist, album).await?;
        tracing::debug!(%mbid, artist, album, "Matched MusicBrainz release");

        let url = format!(
            "{}/release/{mbid}/front-500",
            self.cover_art_url.trim_end_matches('/')
        );
        head_ok(&self.http, &url).await?;
        Ok(url)
    }
}

fn escape(term: &str) -> String {
    term.replace('\\', "\\\\").replace('"', "\\\"")
}

//! Cover art resolution.
//!
//! A deployment uses exactly one [`CoverStrategy`]: either the media server's
//! own image endpoint ([`DirectCovers`]) or third-party metadata lookups
//! ([`LookupCovers`]). Neither ever fails the poll; misses become the
//! configured fallback image.

pub mod direct;
pub mod error;
pub mod musicbrainz;
pub mod omdb;

use reqwest::Client;

use jellyrpc_core::config::{AppConfig, CoverStrategy, CoversConfig};
use jellyrpc_core::models::{MediaKind, NormalizedPresence, NowPlayingItem};

use crate::traits::CoverResolver;

pub use direct::DirectCovers;
pub use error::CoverError;
pub use musicbrainz::MusicBrainzClient;
pub use omdb::OmdbClient;

/// HEAD the URL and succeed only on a 2xx.
pub(crate) async fn head_ok(http: &Client, url: &str) -> Result<(), CoverError> {
    let resp = http.head(url).send().await?;
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(CoverError::Api {
            status: resp.status().as_u16(),
        })
    }
}

/// Looks artwork up by metadata: MusicBrainz for audio, OMDb for everything
/// with an IMDb id.
pub struct LookupCovers {
    musicbrainz: MusicBrainzClient,
    /// `None` without an API key; video items then go straight to the fallback.
    omdb: Option<OmdbClient>,
    fallback_url: String,
}

impl LookupCovers {
    pub fn new(config: &CoversConfig, http: Client) -> Self {
        let omdb = config
            .omdb_api_key
            .clone()
            .map(|key| OmdbClient::new(key, config.omdb_height, http.clone()));
        Self {
            musicbrainz: MusicBrainzClient::new(config.musicbrainz_user_agent.clone(), http),
            omdb,
            fallback_url: config.fallback_url.clone(),
        }
    }

    pub fn with_clients(
        musicbrainz: MusicBrainzClient,
        omdb: Option<OmdbClient>,
        fallback_url: String,
    ) -> Self {
        Self {
            musicbrainz,
            omdb,
            fallback_url,
        }
    }

    async fn lookup(
        &self,
        presence: &NormalizedPresence,
        item: &NowPlayingItem,
    ) -> Result<String, CoverError> {
        match &presence.kind {
            MediaKind::Audio { artists, album, .. } => {
                let artist = artists
                    .first()
                    .ok_or_else(|| CoverError::NotFound("track has no artist".into()))?;
                self.musicbrainz.front_cover(artist, album).await
            }
            MediaKind::Movie { .. } | MediaKind::Episode { .. } | MediaKind::Other { .. } => {
                let omdb = self
                    .omdb
                    .as_ref()
                    .ok_or_else(|| CoverError::NotFound("no OMDb API key".into()))?;
                let imdb_id = item
                    .imdb_id()
                    .ok_or_else(|| CoverError::NotFound("item has no IMDb id".into()))?;
                tracing::debug!(%imdb_id, "Looking up OMDb poster");
                omdb.poster(&imdb_id).await
            }
        }
    }
}

impl CoverResolver for LookupCovers {
    async fn resolve(&self, presence: &NormalizedPresence, item: &NowPlayingItem) -> String {
        match self.lookup(presence, item).await {
            Ok(url) => url,
            Err(CoverError::NotFound(reason)) => {
                tracing::debug!(%reason, title = %presence.title, "No cover, using fallback");
                self.fallback_url.clone()
            }
            Err(e) => {
                tracing::warn!(error = %e, title = %presence.title, "Cover lookup failed, using fallback");
                self.fallback_url.clone()
            }
        }
    }
}

/// The strategy picked for this deployment.
pub enum Covers {
    Direct(DirectCovers),
    Lookup(LookupCovers),
}

impl Covers {
    pub fn from_config(config: &AppConfig, http: Client) -> Self {
        match config.covers.strategy {
            CoverStrategy::Direct => Self::Direct(DirectCovers::new(&config.jellyfin.url, &config.covers)),
            CoverStrategy::Lookup => Self::Lookup(LookupCovers::new(&config.covers, http)),
        }
    }
}

impl CoverResolver for Covers {
    async fn resolve(&self, presence: &NormalizedPresence, item: &NowPlayingItem) -> String {
        match self {
            Self::Direct(covers) => covers.resolve(presence, item).await,
            Self::Lookup(covers) => covers.resolve(presence, item).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jellyrpc_core::extract::extract_now_playing;
    use jellyrpc_core::models::{ExternalUrl, NameIdPair, PlayState, Session};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FALLBACK: &str = "https://example.com/fallback.png";

    fn presence_for(item: &NowPlayingItem) -> NormalizedPresence {
        let session = Session {
            now_playing_item: Some(item.clone()),
            play_state: Some(PlayState::default()),
            ..Default::default()
        };
        extract_now_playing(&[session]).unwrap()
    }

    fn movie() -> NowPlayingItem {
        NowPlayingItem {
            id: Some("film".into()),
            name: Some("Inception".into()),
            item_type: Some("Movie".into()),
            external_urls: vec![ExternalUrl {
                name: "IMDb".into(),
                url: "https://www.imdb.com/title/tt1375666".into(),
            }],
            ..Default::default()
        }
    }

    /// A URL nothing listens on.
    fn dead_endpoint() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/")
    }

    fn lookup(omdb: Option<OmdbClient>, musicbrainz_base: &str) -> LookupCovers {
        let musicbrainz = MusicBrainzClient::new("test/1.0".into(), Client::new())
            .with_endpoints(musicbrainz_base, musicbrainz_base);
        LookupCovers::with_clients(musicbrainz, omdb, FALLBACK.into())
    }

    #[tokio::test]
    async fn test_network_error_returns_fallback() {
        let dead = dead_endpoint();
        let omdb = OmdbClient::new("k".into(), 300, Client::new()).with_poster_url(dead.clone());
        let covers = lookup(Some(omdb), &dead);

        let item = movie();
        assert_eq!(covers.resolve(&presence_for(&item), &item).await, FALLBACK);

        let track = NowPlayingItem {
            id: Some("t".into()),
            item_type: Some("Audio".into()),
            album: Some("Discovery".into()),
            artist_items: vec![NameIdPair {
                name: Some("Daft Punk".into()),
                id: None,
            }],
            ..Default::default()
        };
        assert_eq!(covers.resolve(&presence_for(&track), &track).await, FALLBACK);
    }

    #[tokio::test]
    async fn test_server_error_returns_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let omdb = OmdbClient::new("k".into(), 300, Client::new()).with_poster_url(server.uri());
        let covers = lookup(Some(omdb), &server.uri());
        let item = movie();
        assert_eq!(covers.resolve(&presence_for(&item), &item).await, FALLBACK);
    }

    #[tokio::test]
    async fn test_found_poster_is_used() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let omdb = OmdbClient::new("k".into(), 300, Client::new()).with_poster_url(server.uri());
        let covers = lookup(Some(omdb), &server.uri());
        let item = movie();
        let url = covers.resolve(&presence_for(&item), &item).await;
        assert!(url.contains("i=tt1375666"));
    }

    #[tokio::test]
    async fn test_without_key_or_id_returns_fallback() {
        let covers = lookup(None, &dead_endpoint());
        let item = movie();
        assert_eq!(covers.resolve(&presence_for(&item), &item).await, FALLBACK);

        let omdb = OmdbClient::new("k".into(), 300, Client::new()).with_poster_url(dead_endpoint());
        let covers = lookup(Some(omdb), &dead_endpoint());
        let mut no_id = movie();
        no_id.external_urls.clear();
        assert_eq!(covers.resolve(&presence_for(&no_id), &no_id).await, FALLBACK);
    }

    #[tokio::test]
    async fn test_strategy_from_config() {
        let mut config = AppConfig::default();
        config.jellyfin.url = "http://media.local".into();
        let item = movie();

        let direct = Covers::from_config(&config, Client::new());
        assert!(matches!(direct, Covers::Direct(_)));
        assert_eq!(
            direct.resolve(&presence_for(&item), &item).await,
            "http://media.local/Items/film/Images/Primary?maxWidth=300&quality=90"
        );

        config.covers.strategy = CoverStrategy::Lookup;
        assert!(matches!(Covers::from_config(&config, Client::new()), Covers::Lookup(_)));
    }
}

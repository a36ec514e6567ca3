use reqwest::Client;
use url::Url;

use super::error::CoverError;
use super::head_ok;

const POSTER_URL: &str = "http://img.omdbapi.com/";

/// OMDb poster API, keyed by IMDb id.
pub struct OmdbClient {
    api_key: String,
    height: u32,
    poster_url: String,
    http: Client,
}

impl OmdbClient {
    pub fn new(api_key: String, height: u32, http: Client) -> Self {
        Self {
            api_key,
            height,
            poster_url: POSTER_URL.to_string(),
            http,
        }
    }

    /// Point at another poster endpoint (mock servers in tests).
    pub fn with_poster_url(mut self, url: impl Into<String>) -> Self {
        self.poster_url = url.into();
        self
    }

    /// Poster URL for `imdb_id`, only if the image actually exists.
    ///
    /// The URL carries the API key as a query parameter, so anyone who can see
    /// the published presence image can read the key.
    pub async fn poster(&self, imdb_id: &str) -> Result<String, CoverError> {
        let mut url = Url::parse(&self.poster_url)?;
        url.query_pairs_mut()
            .append_pair("i", imdb_id)
            .append_pair("h", &self.height.to_string())
            .append_pair("apikey", &self.api_key);
        let url = String::from(url);

        head_ok(&self.http, &url).await?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_poster_found() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(query_param("i", "tt1375666"))
            .and(query_param("h", "300"))
            .and(query_param("apikey", "k"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let omdb = OmdbClient::new("k".into(), 300, Client::new())
            .with_poster_url(format!("{}/", server.uri()));
        let url = omdb.poster("tt1375666").await.unwrap();
        assert_eq!(url, format!("{}/?i=tt1375666&h=300&apikey=k", server.uri()));
    }

    #[tokio::test]
    async fn test_poster_missing() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let omdb = OmdbClient::new("k".into(), 300, Client::new()).with_poster_url(server.uri());
        let err = omdb.poster("tt0000000").await.unwrap_err();
        assert!(matches!(err, CoverError::Api { status: 404 }));
    }
}

use reqwest::Client;

use jellyrpc_core::config::JellyfinConfig;
use jellyrpc_core::models::Session;

use super::error::JellyfinError;
use crate::traits::SessionSource;

/// Jellyfin REST client, scoped to one user.
pub struct JellyfinClient {
    base_url: String,
    api_key: String,
    user_id: String,
    active_within_seconds: u32,
    http: Client,
}

impl JellyfinClient {
    pub fn new(config: &JellyfinConfig, http: Client) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            user_id: config.user_id.clone(),
            active_within_seconds: config.active_within_seconds,
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, JellyfinError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(JellyfinError::Api {
                status,
                message: body,
            })
        }
    }

    /// Every session active in the last `active_within_seconds`, for all users.
    pub async fn get_sessions(&self) -> Result<Vec<Session>, JellyfinError> {
        let resp = self
            .http
            .get(format!("{}/Sessions", self.base_url))
            .header("X-Emby-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("activeWithinSeconds", self.active_within_seconds.to_string())])
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| JellyfinError::Parse(e.to_string()))
    }

    /// Sessions belonging to the configured user, in server order.
    pub async fn get_user_sessions(&self) -> Result<Vec<Session>, JellyfinError> {
        let sessions = self.get_sessions().await?;
        let total = sessions.len();
        let mine: Vec<Session> = sessions
            .into_iter()
            .filter(|s| s.user_id.as_deref() == Some(self.user_id.as_str()))
            .collect();
        tracing::debug!(total, matching = mine.len(), "Fetched Jellyfin sessions");
        Ok(mine)
    }
}

impl SessionSource for JellyfinClient {
    type Error = JellyfinError;

    async fn active_sessions(&self) -> Result<Vec<Session>, JellyfinError> {
        self.get_user_sessions().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jellyrpc_core::extract::extract_now_playing;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: &str) -> JellyfinClient {
        let config = JellyfinConfig {
            url: format!("{uri}/"),
            api_key: "secret".into(),
            user_id: "u1".into(),
            active_within_seconds: 1,
        };
        JellyfinClient::new(&config, Client::new())
    }

    #[tokio::test]
    async fn test_user_sessions_are_filtered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Sessions"))
            .and(query_param("activeWithinSeconds", "1"))
            .and(header("X-Emby-Token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "Id": "a", "UserId": "u2", "NowPlayingItem": { "Id": "x", "Name": "Other" } },
                { "Id": "b", "UserId": "u1", "Client": "Jellyfin Web" },
                { "Id": "c", "UserId": "u1", "NowPlayingItem": { "Id": "y", "Name": "Mine" } }
            ])))
            .mount(&server)
            .await;

        let client = client(&server.uri());
        assert_eq!(client.base_url(), server.uri());

        let sessions = client.active_sessions().await.unwrap();
        let ids: Vec<_> = sessions.iter().filter_map(|s| s.id.as_deref()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_nulls_in_other_session_keep_user_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "Id": "a",
                    "UserId": "u2",
                    "PlayState": {},
                    "NowPlayingItem": {
                        "Id": "x",
                        "Type": "Episode",
                        "ExternalUrls": [{ "Name": "Trakt", "Url": null }],
                        "ProviderIds": { "Imdb": null },
                        "ImageTags": { "Primary": null }
                    }
                },
                {
                    "Id": "b",
                    "UserId": "u1",
                    "PlayState": { "PositionTicks": 0 },
                    "NowPlayingItem": { "Id": "y", "Name": "Mine", "Type": "Movie", "RunTimeTicks": 10 }
                }
            ])))
            .mount(&server)
            .await;

        let sessions = client(&server.uri()).active_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);

        let presence = extract_now_playing(&sessions).unwrap();
        assert_eq!(presence.item_id, "y");
        assert_eq!(presence.title, "Mine");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Sessions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).active_sessions().await.unwrap_err();
        assert!(matches!(err, JellyfinError::Api { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).active_sessions().await.unwrap_err();
        assert!(matches!(err, JellyfinError::Parse(_)));
    }
}

pub mod covers;
pub mod jellyfin;
pub mod traits;

use std::time::Duration;

use reqwest::Client;

/// How long any single request may take before the poll gives up on it.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared HTTP client for every outbound call.
pub fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("jellyrpc/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}

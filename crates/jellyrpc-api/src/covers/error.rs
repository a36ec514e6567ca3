use thiserror::Error;

/// Why a cover lookup produced nothing. Never leaves the resolver.
#[derive(Debug, Error)]
pub enum CoverError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image request failed (status {status})")]
    Api { status: u16 },

    #[error("no cover found: {0}")]
    NotFound(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

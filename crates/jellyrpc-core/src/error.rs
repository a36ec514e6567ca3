use thiserror::Error;

#[derive(Debug, Error)]
pub enum JellyrpcError {
    #[error("config error: {0}")]
    Config(String),

    #[error("missing timing information for {0}")]
    MissingTiming(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub mod client;
pub mod error;

pub use client::JellyfinClient;
pub use error::JellyfinError;

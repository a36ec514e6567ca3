pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod presence;

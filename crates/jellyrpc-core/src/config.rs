use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::JellyrpcError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub jellyfin: JellyfinConfig,
    pub discord: DiscordConfig,
    pub covers: CoversConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Seconds between two polls of the media server.
    pub poll_interval: u64,
    pub log_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JellyfinConfig {
    pub url: String,
    pub api_key: String,
    pub user_id: String,
    pub active_within_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoversConfig {
    pub strategy: CoverStrategy,
    pub fallback_url: String,
    pub max_width: u32,
    pub quality: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omdb_api_key: Option<String>,
    pub omdb_height: u32,
    pub musicbrainz_user_agent: String,
}

/// Where cover art comes from. One strategy per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverStrategy {
    /// Image URL on the media server itself.
    Direct,
    /// Third-party metadata services (MusicBrainz, OMDb).
    Lookup,
}

impl FromStr for CoverStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "lookup" => Ok(Self::Lookup),
            other => Err(format!("unknown cover strategy '{other}' (expected direct or lookup)")),
        }
    }
}

impl fmt::Display for CoverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Lookup => f.write_str("lookup"),
        }
    }
}

/// Values that override whatever the config file says, usually coming
/// from the command line or the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub jellyfin_url: Option<String>,
    pub jellyfin_api_key: Option<String>,
    pub jellyfin_user_id: Option<String>,
    pub discord_client_id: Option<String>,
    pub omdb_api_key: Option<String>,
    pub poll_interval: Option<u64>,
    pub cover_strategy: Option<CoverStrategy>,
}

impl AppConfig {
    /// Load config: user file (if exists) over built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, JellyrpcError> {
        let user_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        if user_path.exists() {
            tracing::debug!(path = %user_path.display(), "Loading config file");
            let user_str = std::fs::read_to_string(&user_path)?;
            toml::from_str(&user_str).map_err(|e| JellyrpcError::Config(e.to_string()))
        } else if path.is_some() {
            Err(JellyrpcError::Config(format!(
                "config file not found: {}",
                user_path.display()
            )))
        } else {
            toml::from_str(DEFAULT_CONFIG).map_err(|e| JellyrpcError::Config(e.to_string()))
        }
    }

    /// Apply overrides on top of the loaded values. Empty strings are ignored.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        fn set(target: &mut String, value: Option<String>) {
            if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                *target = v;
            }
        }

        set(&mut self.jellyfin.url, overrides.jellyfin_url);
        set(&mut self.jellyfin.api_key, overrides.jellyfin_api_key);
        set(&mut self.jellyfin.user_id, overrides.jellyfin_user_id);
        set(&mut self.discord.client_id, overrides.discord_client_id);

        if let Some(key) = overrides.omdb_api_key.filter(|k| !k.trim().is_empty()) {
            self.covers.omdb_api_key = Some(key);
        }
        if let Some(interval) = overrides.poll_interval {
            self.general.poll_interval = interval;
        }
        if let Some(strategy) = overrides.cover_strategy {
            self.covers.strategy = strategy;
        }
    }

    /// Check that everything needed to start is present and normalize the server URL.
    pub fn validate(&mut self) -> Result<(), JellyrpcError> {
        let missing: Vec<&str> = [
            ("JELLYFIN_URL", &self.jellyfin.url),
            ("JELLYFIN_API_KEY", &self.jellyfin.api_key),
            ("JELLYFIN_USER_ID", &self.jellyfin.user_id),
            ("DISCORD_CLIENT_ID", &self.discord.client_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(JellyrpcError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.general.poll_interval == 0 {
            return Err(JellyrpcError::Config("poll_interval must be at least 1 second".into()));
        }

        self.jellyfin.url = self.jellyfin.url.trim().trim_end_matches('/').to_string();
        if self.covers.omdb_api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.covers.omdb_api_key = None;
        }
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Directory holding the log file.
    pub fn log_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_local_dir().join("logs"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "jellyrpc")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

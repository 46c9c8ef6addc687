//! Bootstrap configuration loading and config file resolution
//!
//! The TOML file is bootstrap-only: it is read once at startup and the service
//! must restart to pick up changes. A missing file is never fatal; every field
//! has a built-in default.
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `MOODTUNES_CONFIG` environment variable
//! 3. `<platform config dir>/moodtunes/moodtunes.toml`

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MOODTUNES_CONFIG";

/// Config file name inside the platform config directory
const CONFIG_FILE_NAME: &str = "moodtunes.toml";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
    pub video: VideoConfig,
    pub pipeline: PipelineConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5790,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Music catalog (search + client-credentials auth) settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Client id; `MOODTUNES_CATALOG_CLIENT_ID` takes priority
    pub client_id: Option<String>,
    /// Client secret; `MOODTUNES_CATALOG_CLIENT_SECRET` takes priority
    pub client_secret: Option<String>,
    pub auth_url: String,
    pub api_base_url: String,
    /// Market code sent with every search
    pub market: String,
    /// Results requested per search (more than the final track count)
    pub search_limit: u32,
    pub request_timeout_secs: u64,
    /// Searches in flight at once during a retrieval pass
    pub max_concurrent_queries: usize,
    /// Track count returned per resolution
    pub default_track_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            auth_url: "https://accounts.spotify.com/api/token".to_string(),
            api_base_url: "https://api.spotify.com/v1".to_string(),
            market: "US".to_string(),
            search_limit: 50,
            request_timeout_secs: 10,
            max_concurrent_queries: 4,
            default_track_limit: 20,
        }
    }
}

/// Video matching settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Live search key; `MOODTUNES_VIDEO_API_KEY` takes priority.
    /// Absent means static-catalog matching only.
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Results requested per live search call
    pub max_results: u32,
    /// Per-track lookups in flight at once
    pub max_concurrent_lookups: usize,
    /// Live search calls allowed per second
    pub requests_per_second: u32,
    /// Replacement static catalog (`[[entry]]` tables)
    pub catalog_path: Option<PathBuf>,
    pub weights: RelevanceWeights,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            request_timeout_secs: 8,
            max_results: 8,
            max_concurrent_lookups: 4,
            requests_per_second: 5,
            catalog_path: None,
            weights: RelevanceWeights::default(),
        }
    }
}

/// Live video search ranking weights
///
/// Defaults reproduce the established ranking; every weight can be tuned from
/// `[video.weights]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RelevanceWeights {
    pub title_has_track: i32,
    pub title_has_artist: i32,
    pub title_official: i32,
    pub title_music_video: i32,
    pub title_mv: i32,
    pub channel_has_artist: i32,
    pub channel_official: i32,
    pub channel_vevo: i32,
    pub channel_records: i32,
    /// 2 to 8 minutes
    pub duration_ideal: i32,
    /// 1 to 10 minutes
    pub duration_acceptable: i32,
    /// Over 15 minutes (normally negative)
    pub duration_too_long: i32,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            title_has_track: 10,
            title_has_artist: 10,
            title_official: 5,
            title_music_video: 5,
            title_mv: 3,
            channel_has_artist: 8,
            channel_official: 3,
            channel_vevo: 7,
            channel_records: 2,
            duration_ideal: 5,
            duration_acceptable: 2,
            duration_too_long: -5,
        }
    }
}

/// Whole-request settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Overall budget for one resolution; partial results are returned after it
    pub request_budget_secs: u64,
    /// Pair resolved tracks with videos
    pub match_videos: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_budget_secs: 25,
            match_videos: true,
        }
    }
}

/// Default config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("moodtunes").join(CONFIG_FILE_NAME))
}

/// Resolve which config file to read
///
/// Returns `None` only when no explicit path was given and the platform has no
/// config directory.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path()
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load config, falling back to built-in defaults when the file is missing
///
/// A file that exists but does not parse is a configuration error.
pub fn load_config_or_default(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        warn!("No config directory available, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file not found: {} (using built-in defaults)",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let config = load_toml_config(path)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// User-Agent sent by every outbound HTTP client
pub fn get_user_agent() -> String {
    format!("MoodTunes/{}", env!("CARGO_PKG_VERSION"))
}

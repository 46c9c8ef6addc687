//! Credential resolution for moodtunes-resolver
//!
//! Credentials resolve with ENV → TOML priority. Blank values count as absent,
//! and a warning is logged when more than one source defines the same key.

use crate::catalog::CatalogCredentials;
use moodtunes_common::config::TomlConfig;
use tracing::{info, warn};

pub const CATALOG_CLIENT_ID_ENV: &str = "MOODTUNES_CATALOG_CLIENT_ID";
pub const CATALOG_CLIENT_SECRET_ENV: &str = "MOODTUNES_CATALOG_CLIENT_SECRET";
pub const VIDEO_API_KEY_ENV: &str = "MOODTUNES_VIDEO_API_KEY";

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve one credential from the environment, then TOML
///
/// `name` is used only in log messages; values are never logged.
pub fn resolve_credential(name: &str, env_var: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            credential = name,
            "Credential found in both environment and TOML config. Using environment (highest priority)."
        );
    }

    if let Some(value) = env_value {
        info!(credential = name, source = "environment", "Credential loaded");
        return Some(value.trim().to_string());
    }

    if let Some(value) = toml_value {
        info!(credential = name, source = "TOML", "Credential loaded");
        return Some(value.trim().to_string());
    }

    None
}

/// Catalog client id and secret; both must be present
///
/// Absence is not fatal at startup: every resolution then fails with a
/// configuration error until the service is reconfigured.
pub fn resolve_catalog_credentials(config: &TomlConfig) -> Option<CatalogCredentials> {
    let client_id = resolve_credential(
        "catalog client id",
        CATALOG_CLIENT_ID_ENV,
        config.catalog.client_id.as_deref(),
    );
    let client_secret = resolve_credential(
        "catalog client secret",
        CATALOG_CLIENT_SECRET_ENV,
        config.catalog.client_secret.as_deref(),
    );

    match (client_id, client_secret) {
        (Some(id), Some(secret)) => Some(CatalogCredentials::new(id, secret)),
        (None, None) => {
            warn!(
                "Catalog credentials not configured. Set {} and {}, or [catalog] client_id/client_secret in TOML.",
                CATALOG_CLIENT_ID_ENV, CATALOG_CLIENT_SECRET_ENV
            );
            None
        }
        _ => {
            warn!("Only one of catalog client id / client secret is configured; both are required");
            None
        }
    }
}

/// Live video search key; absence means static-catalog matching only
pub fn resolve_video_api_key(config: &TomlConfig) -> Option<String> {
    let key = resolve_credential(
        "video API key",
        VIDEO_API_KEY_ENV,
        config.video.api_key.as_deref(),
    );
    if key.is_none() {
        info!("No video API key configured, using static video catalog only");
    }
    key
}

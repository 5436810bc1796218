//! Client configuration loader for profchat.
//!
//! Reads `config.toml` from the config directory (`~/.profchat/` by default)
//! and deserializes it into [`ClientConfig`]. Falls back to defaults when the
//! file is missing or malformed, then applies environment overrides.

use std::path::{Path, PathBuf};

use profchat_types::config::ClientConfig;

/// Overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "PROFCHAT_CONFIG_DIR";
/// Overrides `chat.url`.
pub const CHAT_URL_ENV: &str = "PROFCHAT_CHAT_URL";
/// Overrides `analytics.base_url`.
pub const ANALYTICS_URL_ENV: &str = "PROFCHAT_ANALYTICS_URL";

const CONFIG_FILE: &str = "config.toml";

/// Resolve the config directory.
///
/// Uses `$PROFCHAT_CONFIG_DIR` if set, then `~/.profchat`, then
/// `./.profchat` as a last resort.
pub fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".profchat");
    }

    PathBuf::from(".profchat")
}

/// Path of `config.toml` inside the resolved config directory.
pub fn default_config_path() -> PathBuf {
    resolve_config_dir().join(CONFIG_FILE)
}

/// Load configuration from the file at `path`.
///
/// - If the file does not exist, returns [`ClientConfig::default()`].
/// - If the file exists but cannot be read or parsed, logs a warning and
///   returns the default.
pub async fn load_config_file(path: &Path) -> ClientConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            ClientConfig::default()
        }
    }
}

/// Apply endpoint overrides looked up through `var`.
///
/// Empty values are ignored.
pub fn apply_overrides(config: &mut ClientConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(url) = var(CHAT_URL_ENV).filter(|v| !v.trim().is_empty()) {
        tracing::debug!(%url, "Chat URL overridden from environment");
        config.chat.url = url;
    }
    if let Some(url) = var(ANALYTICS_URL_ENV).filter(|v| !v.trim().is_empty()) {
        tracing::debug!(%url, "Analytics URL overridden from environment");
        config.analytics.base_url = url;
    }
}

/// Load the effective configuration.
///
/// Reads `explicit` if given, otherwise `config.toml` in the resolved config
/// directory, then applies the process environment overrides.
pub async fn load_config(explicit: Option<&Path>) -> ClientConfig {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => default_config_path(),
    };
    let mut config = load_config_file(&path).await;
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

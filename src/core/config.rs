//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.jobportal/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::choreography::EasingProfile;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NavigationConfig {
    pub progress_steps: Option<[i32; 3]>,
    pub settle_ms: Option<u64>,
    pub navigate_delay_ms: Option<u64>,
    pub complete_delay_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_url: String,
    pub easing: EasingProfile,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.jobportal/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".jobportal").join("config.toml"))
}

/// Load config from `~/.jobportal/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `PortalConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<PortalConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(PortalConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(PortalConfig::default());
    }

    load_config_from(&path)
}

/// Parses a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<PortalConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: PortalConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Job Portal client configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [api]
# base_url = "http://localhost:8000"   # Or set API_URL env var

# [navigation]
# progress_steps = [30, 60, 90]         # progress while the page data loads
# settle_ms = 300                       # last step → 100%
# navigate_delay_ms = 400               # 100% → route change
# complete_delay_ms = 500               # route change → bar hidden
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_api_url` comes from the `--api-url` flag (None = not specified).
pub fn resolve(config: &PortalConfig, cli_api_url: Option<&str>) -> ResolvedConfig {
    resolve_with_env(config, cli_api_url, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env(
    config: &PortalConfig,
    cli_api_url: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // API URL: CLI → env → config → default
    let api_url = cli_api_url
        .map(|s| s.to_string())
        .or_else(|| env("API_URL"))
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    ResolvedConfig {
        api_url,
        easing: resolve_easing(&config.navigation),
    }
}

fn resolve_easing(nav: &NavigationConfig) -> EasingProfile {
    let defaults = EasingProfile::default();
    EasingProfile {
        progress_steps: nav.progress_steps.unwrap_or(defaults.progress_steps),
        settle: nav
            .settle_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.settle),
        navigate_delay: nav
            .navigate_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.navigate_delay),
        complete_delay: nav
            .complete_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.complete_delay),
    }
}

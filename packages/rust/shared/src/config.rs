//! Application configuration for the roundup generator.
//!
//! User config lives at `~/.roundup/roundup.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoundupError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "roundup.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".roundup";

/// Tag applied to bookmarks destined for the weekly roundup.
pub const DEFAULT_TAG: &str = "twis";

// ---------------------------------------------------------------------------
// Config structs (matching roundup.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Roundup generation settings.
    #[serde(default)]
    pub roundup: RoundupConfig,

    /// Pinboard API settings.
    #[serde(default)]
    pub pinboard: PinboardConfig,
}

/// `[roundup]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundupConfig {
    /// Case-insensitive href substrings whose bookmarks lead the roundup.
    #[serde(default)]
    pub priority_hrefs: Vec<String>,

    /// Tag whose bookmarks are marked as processed after a run.
    #[serde(default = "default_twi_tag")]
    pub twi_tag: String,

    /// Where `generate` writes the report unless `--output`/`--stdout` is given.
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

impl Default for RoundupConfig {
    fn default() -> Self {
        Self {
            priority_hrefs: Vec::new(),
            twi_tag: default_twi_tag(),
            output_file: default_output_file(),
        }
    }
}

fn default_twi_tag() -> String {
    DEFAULT_TAG.into()
}
fn default_output_file() -> String {
    "~/Desktop/report.md".into()
}

/// `[pinboard]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinboardConfig {
    /// API root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the env var holding the `user:TOKEN` auth token (never store the token itself).
    #[serde(default = "default_api_token_env")]
    pub api_token_env: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PinboardConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token_env: default_api_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.pinboard.in/v1".into()
}
fn default_api_token_env() -> String {
    "PINBOARD_API_TOKEN".into()
}
fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.roundup/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| RoundupError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.roundup/roundup.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RoundupError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| RoundupError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| RoundupError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| RoundupError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| RoundupError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the Pinboard auth token from the env var named in the config.
pub fn resolve_api_token(config: &AppConfig) -> Result<String> {
    let var_name = &config.pinboard.api_token_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
        _ => Err(RoundupError::config(format!(
            "Pinboard API token not found. Set the {var_name} environment variable.\n\
             Find yours at https://pinboard.in/settings/password"
        ))),
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            let home = dirs::home_dir()
                .ok_or_else(|| RoundupError::config("could not determine home directory"))?;
            Ok(home.join(rest.trim_start_matches('/')))
        }
        _ => Ok(PathBuf::from(path)),
    }
}

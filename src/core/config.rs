//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `<config dir>/slackline/config.json` unless `--config`
//! points elsewhere. If missing on first run, a template listing every
//! option is written there so users can discover them.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::keymap::KeyMap;

// ============================================================================
// Config Structs (all fields Option<T> for sparse JSON)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SlacklineConfig {
    pub slack_token: Option<String>,
    pub theme: Option<Theme>,
    pub sidebar_width: Option<u16>,
    pub emacs_mode: Option<bool>,
    /// mode → key string → action name
    #[serde(default)]
    pub key_map: HashMap<String, HashMap<String, String>>,
    pub history_count: Option<usize>,
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SIDEBAR_WIDTH: u16 = 1;
pub const DEFAULT_HISTORY_COUNT: usize = 50;
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;
/// Columns of the layout grid shared by the sidebar and the main pane.
pub const GRID_COLUMNS: u16 = 12;

const TEMPLATE: &str = r#"{
  "slack_token": "",
  "theme": "dark",
  "sidebar_width": 1,
  "emacs_mode": false,
  "history_count": 50,
  "debounce_ms": 250,
  "key_map": {
    "command": {},
    "insert": {},
    "search": {}
  }
}
"#;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub slack_token: String,
    pub theme: Theme,
    pub sidebar_width: u16,
    pub emacs_mode: bool,
    pub key_map: KeyMap,
    pub history_count: usize,
    pub debounce: Duration,
}

impl ResolvedConfig {
    /// Grid columns left for the transcript.
    pub fn main_width(&self) -> u16 {
        GRID_COLUMNS - self.sidebar_width
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    /// No token in the file, the environment, or on the command line.
    MissingToken(PathBuf),
    Invalid(String),
    UnknownAction {
        mode: String,
        key: String,
        action: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::MissingToken(path) => write!(
                f,
                "no slack_token configured: set it in {}, export SLACK_TOKEN, or pass --token",
                path.display()
            ),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
            ConfigError::UnknownAction { mode, key, action } => write!(
                f,
                "key_map.{mode}.{key:?}: unknown action {action:?}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the default config path, `<config dir>/slackline/config.json`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("slackline").join("config.json"))
}

/// Load config from `path`.
///
/// If the file doesn't exist, writes the template and returns
/// `SlacklineConfig::default()`; resolution then fails with `MissingToken`
/// unless the token comes from the environment or the CLI.
pub fn load_config(path: &Path) -> Result<SlacklineConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, writing template to {}", path.display());
        write_template(path);
        return Ok(SlacklineConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<SlacklineConfig, ConfigError> {
    serde_json::from_str(contents).map_err(ConfigError::Parse)
}

fn write_template(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, TEMPLATE) {
        warn!("Failed to write config template: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config: defaults → config file → `SLACK_TOKEN` → CLI.
///
/// `path` is only used to point the user at the file in error messages.
pub fn resolve(
    config: &SlacklineConfig,
    cli_token: Option<&str>,
    path: &Path,
) -> Result<ResolvedConfig, ConfigError> {
    let env_token = std::env::var("SLACK_TOKEN").ok();
    resolve_with_env(config, cli_token, env_token.as_deref(), path)
}

fn resolve_with_env(
    config: &SlacklineConfig,
    cli_token: Option<&str>,
    env_token: Option<&str>,
    path: &Path,
) -> Result<ResolvedConfig, ConfigError> {
    // Token: CLI → env → config; blank counts as unset
    let slack_token = [cli_token, env_token, config.slack_token.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingToken(path.to_path_buf()))?;

    let sidebar_width = config.sidebar_width.unwrap_or(DEFAULT_SIDEBAR_WIDTH);
    if !(1..GRID_COLUMNS).contains(&sidebar_width) {
        return Err(ConfigError::Invalid(format!(
            "sidebar_width must be between 1 and {}, got {sidebar_width}",
            GRID_COLUMNS - 1
        )));
    }

    let history_count = config.history_count.unwrap_or(DEFAULT_HISTORY_COUNT);
    if history_count == 0 {
        return Err(ConfigError::Invalid("history_count must be positive".to_string()));
    }

    let emacs_mode = config.emacs_mode.unwrap_or(false);
    let mut key_map = KeyMap::defaults();
    if emacs_mode {
        key_map = key_map.with_emacs();
    }
    key_map.merge(&config.key_map)?;

    let resolved = ResolvedConfig {
        slack_token,
        theme: config.theme.unwrap_or_default(),
        sidebar_width,
        emacs_mode,
        key_map,
        history_count,
        debounce: Duration::from_millis(config.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)),
    };
    debug!(
        "Resolved config: theme={:?} sidebar={} emacs={} history={} debounce={:?}",
        resolved.theme,
        resolved.sidebar_width,
        resolved.emacs_mode,
        resolved.history_count,
        resolved.debounce
    );
    Ok(resolved)
}

//! Configuration for adminkit screens.
//!
//! TOML defaults plus per-screen overrides, layered with `ADMINKIT_`
//! environment variables and translated into `adminkit_core::EngineConfig`.
//! The core never touches the filesystem; only the CLI loads this.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use adminkit_core::EngineConfig;

/// Longest debounce window a screen may configure.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Settings every screen starts from.
    #[serde(default)]
    pub defaults: ScreenSettings,

    /// Named per-screen overrides, e.g. `[screens.users]`.
    #[serde(default)]
    pub screens: HashMap<String, ScreenOverrides>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScreenSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<u32>,

    #[serde(default = "default_true")]
    pub tree_expanded: bool,

    #[serde(default)]
    pub propagate_to_ancestors: bool,

    #[serde(default)]
    pub selection_disabled: bool,

    #[serde(default = "default_item_type")]
    pub item_type: String,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            tree_expanded: true,
            propagate_to_ancestors: false,
            selection_disabled: false,
            item_type: default_item_type(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}
fn default_page_size() -> u32 {
    10
}
fn default_page_size_options() -> Vec<u32> {
    vec![10, 25, 50, 100]
}
fn default_true() -> bool {
    true
}
fn default_item_type() -> String {
    "item".into()
}

/// Per-screen overrides. Unset fields inherit from `defaults`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScreenOverrides {
    pub debounce_ms: Option<u64>,
    pub page_size: Option<u32>,
    pub page_size_options: Option<Vec<u32>>,
    pub tree_expanded: Option<bool>,
    pub propagate_to_ancestors: Option<bool>,
    pub selection_disabled: Option<bool>,
    pub item_type: Option<String>,
}

impl ScreenSettings {
    /// Apply `overrides` on top of these settings.
    pub fn overlay(&self, overrides: &ScreenOverrides) -> Self {
        Self {
            debounce_ms: overrides.debounce_ms.unwrap_or(self.debounce_ms),
            page_size: overrides.page_size.unwrap_or(self.page_size),
            page_size_options: overrides
                .page_size_options
                .clone()
                .unwrap_or_else(|| self.page_size_options.clone()),
            tree_expanded: overrides.tree_expanded.unwrap_or(self.tree_expanded),
            propagate_to_ancestors: overrides
                .propagate_to_ancestors
                .unwrap_or(self.propagate_to_ancestors),
            selection_disabled: overrides
                .selection_disabled
                .unwrap_or(self.selection_disabled),
            item_type: overrides
                .item_type
                .clone()
                .unwrap_or_else(|| self.item_type.clone()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Validation {
                field: "page_size".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.page_size_options.contains(&0) {
            return Err(ConfigError::Validation {
                field: "page_size_options".into(),
                reason: "page sizes must be at least 1".into(),
            });
        }
        if !self.page_size_options.is_empty() && !self.page_size_options.contains(&self.page_size)
        {
            return Err(ConfigError::Validation {
                field: "page_size".into(),
                reason: format!(
                    "{} is not one of the offered sizes {:?}",
                    self.page_size, self.page_size_options
                ),
            });
        }
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Validation {
                field: "debounce_ms".into(),
                reason: format!("must be at most {MAX_DEBOUNCE_MS} ms, got {}", self.debounce_ms),
            });
        }
        Ok(())
    }

    /// Validate and translate into the engine's runtime config.
    pub fn to_engine_config(&self) -> Result<EngineConfig, ConfigError> {
        self.validate()?;
        Ok(EngineConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            page_size: self.page_size,
            page_size_options: self.page_size_options.clone(),
            tree_expanded: self.tree_expanded,
            propagate_to_ancestors: self.propagate_to_ancestors,
            selection_disabled: self.selection_disabled,
            item_type: self.item_type.clone(),
        })
    }
}

impl Config {
    /// Effective settings for `screen`: defaults overlaid with that screen's
    /// overrides. Unknown screens get the defaults.
    pub fn screen_settings(&self, screen: &str) -> ScreenSettings {
        match self.screens.get(screen) {
            Some(overrides) => self.defaults.overlay(overrides),
            None => self.defaults.clone(),
        }
    }

    /// Validated `EngineConfig` for `screen`.
    pub fn screen_config(&self, screen: &str) -> Result<EngineConfig, ConfigError> {
        self.screen_settings(screen)
            .to_engine_config()
            .map_err(|err| match err {
                ConfigError::Validation { field, reason } => ConfigError::Validation {
                    field: format!("screens.{screen}.{field}"),
                    reason,
                },
                other => other,
            })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "adminkit", "adminkit").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("adminkit");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is not an
/// error; the serialized defaults apply.
///
/// Environment keys use `__` as the nesting separator so field names can
/// keep their underscores: `ADMINKIT_DEFAULTS__PAGE_SIZE=25`,
/// `ADMINKIT_SCREENS__USERS__ITEM_TYPE=user`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ADMINKIT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

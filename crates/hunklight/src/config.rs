//! Configuration loading
//!
//! Config lives in `~/.config/hunklight/config.toml` unless a path is given
//! on the command line:
//!
//! ```toml
//! [highlight]
//! style = "background"
//! added = "30;42"
//! removed = "30;41"
//! close = "39;49"
//! enabled = true
//! ```

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use hunklight_core::escape::is_sgr_params;
use hunklight_core::HighlightStyle;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid SGR parameters for `highlight.{field}`: {value:?}")]
    InvalidSgr { field: &'static str, value: String },
}

/// Built-in highlight decorations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StyleName {
    /// Reverse video
    #[default]
    Reverse,
    /// Black on green / black on red
    Background,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub highlight: HighlightConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    /// Turn intra-line highlighting off entirely
    pub enabled: bool,
    pub style: StyleName,
    /// SGR parameters that open the highlight on added lines
    pub added: Option<String>,
    /// SGR parameters that open the highlight on removed lines
    pub removed: Option<String>,
    /// SGR parameters that close the highlight on both sides
    pub close: Option<String>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            style: StyleName::default(),
            added: None,
            removed: None,
            close: None,
        }
    }
}

impl HighlightConfig {
    /// Resolve the decorations, with `style` taking precedence over the
    /// configured preset. Custom SGR parameters apply on top of either.
    pub fn resolve(&self, style: Option<StyleName>) -> HighlightStyle {
        let mut resolved = match style.unwrap_or(self.style) {
            StyleName::Reverse => HighlightStyle::reverse(),
            StyleName::Background => HighlightStyle::background(),
        };
        if let Some(open) = &self.added {
            resolved.added.open = open.clone();
        }
        if let Some(open) = &self.removed {
            resolved.removed.open = open.clone();
        }
        if let Some(close) = &self.close {
            resolved.added.close = close.clone();
            resolved.removed.close = close.clone();
        }
        resolved
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("added", &self.added),
            ("removed", &self.removed),
            ("close", &self.close),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                if !is_sgr_params(value) {
                    return Err(ConfigError::InvalidSgr {
                        field,
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hunklight").join("config.toml"))
    }

    /// Load from `explicit` if given, else from the default location.
    /// A missing default file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => {
                log::debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.highlight.validate()?;
        Ok(config)
    }
}

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use thiserror::Error;
use tracing::{debug, warn};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

static COMPILED_DEFAULT: LazyLock<Config> =
    LazyLock::new(|| toml::from_str(DEFAULT_CONFIG).unwrap_or_default());

/// Errors that can occur when loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub serializer: SerializerConfig,
    pub mentions: MentionConfig,
    pub emoji: EmojiConfig,
}

/// Marker written in front of each bullet list item
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
pub enum BulletMarker {
    #[default]
    #[serde(rename = "•")]
    Dot,
    #[serde(rename = "-")]
    Dash,
}

impl BulletMarker {
    pub fn as_str(self) -> &'static str {
        match self {
            BulletMarker::Dot => "•",
            BulletMarker::Dash => "-",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SerializerConfig {
    pub bullet: BulletMarker,
    pub max_heading_level: u8,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            bullet: BulletMarker::Dot,
            max_heading_level: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MentionConfig {
    /// Upper bound on resolver candidates; 0 means unbounded
    pub max_options: usize,
    /// Offer `@here`, `@channel` and `@everyone`
    pub broadcast: bool,
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            max_options: 8,
            broadcast: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EmojiConfig {
    pub search_limit: usize,
    /// Shortlist returned for an empty search query
    pub common: Vec<String>,
}

impl Config {
    /// The defaults embedded from `default_config.toml`.
    pub fn compiled_default() -> &'static Config {
        &COMPILED_DEFAULT
    }

    /// Load config from a TOML file, or return defaults if not found.
    ///
    /// An unreadable or invalid file also falls back to the defaults; the
    /// problem is logged rather than returned.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(ConfigError::Io { .. }) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Self::compiled_default().clone()
            }
            Err(e) => {
                warn!(error = %e, "ignoring config file");
                Self::compiled_default().clone()
            }
        }
    }

    /// Load config from a TOML file. Keys missing from the file take the
    /// compiled defaults.
    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config text layered over the compiled defaults.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let mut merged: toml::Table =
            toml::from_str(DEFAULT_CONFIG).unwrap_or_default();
        let overrides: toml::Table = toml::from_str(content)?;
        merge_tables(&mut merged, overrides);
        toml::Value::Table(merged).try_into()
    }
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(override_table)) => {
                merge_tables(base_table, override_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

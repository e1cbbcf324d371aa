//! Configuration loading for the dashboard services
//!
//! Resolution priority (highest first):
//! 1. Command-line argument (clap also folds in `MDASH_*` environment variables)
//! 2. TOML config file
//! 3. OS-dependent compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default HTTP bind address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5780";

/// Default tracing filter directive
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default upper bound on breadcrumb trail length
pub const DEFAULT_MAX_BREADCRUMB_DEPTH: usize = 32;

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// SQLite database holding `entity_info` and `metric`
    pub database_path: PathBuf,
    /// Address the HTTP listener binds to
    pub bind_addr: String,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Maximum number of levels the breadcrumb walk visits
    pub max_breadcrumb_depth: usize,
    /// Fail the whole layout call on malformed graph layout JSON
    pub strict_graph_layout: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            max_breadcrumb_depth: DEFAULT_MAX_BREADCRUMB_DEPTH,
            strict_graph_layout: false,
        }
    }
}

/// On-disk TOML representation; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub log_level: Option<String>,
    pub layout: LayoutSection,
}

/// `[layout]` table of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LayoutSection {
    pub max_breadcrumb_depth: Option<usize>,
    pub strict_graph_layout: Option<bool>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// Values supplied on the command line (or via environment through clap)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub log_level: Option<String>,
    pub max_breadcrumb_depth: Option<usize>,
    pub strict_graph_layout: Option<bool>,
}

impl ServiceConfig {
    /// Resolve the configuration from overrides, config file and defaults
    ///
    /// An explicitly named config file must exist. The default config file
    /// location is optional: when it is missing the compiled defaults apply.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let toml_config = match &overrides.config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                TomlConfig::load(path)?
            }
            None => match default_config_file() {
                Some(path) if path.exists() => {
                    debug!("Loading config file {}", path.display());
                    TomlConfig::load(&path)?
                }
                _ => {
                    debug!("No config file found, using compiled defaults");
                    TomlConfig::default()
                }
            },
        };

        Ok(Self::merge(overrides, toml_config))
    }

    /// Merge overrides over TOML values over compiled defaults
    pub fn merge(overrides: ConfigOverrides, toml_config: TomlConfig) -> Self {
        let defaults = Self::default();

        let mut max_depth = overrides
            .max_breadcrumb_depth
            .or(toml_config.layout.max_breadcrumb_depth)
            .unwrap_or(defaults.max_breadcrumb_depth);
        if max_depth == 0 {
            warn!(
                "max_breadcrumb_depth = 0 is not usable, falling back to {}",
                DEFAULT_MAX_BREADCRUMB_DEPTH
            );
            max_depth = DEFAULT_MAX_BREADCRUMB_DEPTH;
        }

        Self {
            database_path: overrides
                .database_path
                .or(toml_config.database_path)
                .unwrap_or(defaults.database_path),
            bind_addr: overrides
                .bind_addr
                .or(toml_config.bind_addr)
                .unwrap_or(defaults.bind_addr),
            log_level: overrides
                .log_level
                .or(toml_config.log_level)
                .unwrap_or(defaults.log_level),
            max_breadcrumb_depth: max_depth,
            strict_graph_layout: overrides
                .strict_graph_layout
                .or(toml_config.layout.strict_graph_layout)
                .unwrap_or(defaults.strict_graph_layout),
        }
    }
}

/// Per-user config file location (`~/.config/mdash/config.toml` on Linux)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mdash").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("mdash"))
        .unwrap_or_else(|| PathBuf::from("./mdash_data"))
        .join("mdash.db")
}

//! Tab configuration for konsole-tabs.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.konsoleTabs`
//! - The `TabSpec` list and the shared command list driving a run
//!
//! # Configuration File
//!
//! ```toml
//! # Sent to every tab, in order
//! common_commands = ["source commonStartup.sh"]
//!
//! [[tabs]]
//! name = "compile"
//! commands = []            # run in this tab only
//! history = ["make -j8"]   # pre-loaded into this tab's shell history
//!
//! [[tabs]]
//! name = "System"
//! commands = ["stopSystem.sh"]
//! history = ["startSystem.sh"]
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Config file name, relative to the home directory
pub const CONFIG_FILENAME: &str = ".konsoleTabs";

/// Printed when the config is missing required data
pub const EXAMPLE_CONFIG: &str = r#"common_commands = ["source commonStartup.sh"]

[[tabs]]
name = "compile"
commands = []
history = ["make -j8"]

[[tabs]]
name = "System"
commands = ["stopSystem.sh"]
history = ["startSystem.sh"]
"#;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("HOME is not set; cannot locate ~/.konsoleTabs")]
    NoHome,

    #[error("Error reading {}; either the file doesn't exist or it couldn't be read: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Required key `{0}` is not defined in the config (run with --help for an example)")]
    MissingKey(&'static str),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// One tab to create
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TabSpec {
    /// Tab title
    pub name: String,
    /// Commands typed into this tab after the common commands
    #[serde(default)]
    pub commands: Vec<String>,
    /// Entries seeded into this tab's shell history
    #[serde(default)]
    pub history: Vec<String>,
}

impl TabSpec {
    #[cfg(test)]
    pub fn new(name: &str, commands: &[&str], history: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            commands: commands.iter().map(|s| s.to_string()).collect(),
            history: history.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// On-disk shape; both keys are optional here so a missing one gets its own error
#[derive(Deserialize)]
struct RawConfig {
    tabs: Option<Vec<TabSpec>>,
    common_commands: Option<Vec<String>>,
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Tabs in creation order
    pub tabs: Vec<TabSpec>,
    /// Commands broadcast to every tab
    pub common_commands: Vec<String>,
}

impl Config {
    /// Load `~/.konsoleTabs` under the given home directory
    pub fn load(home: &Path) -> Result<Self> {
        Self::load_from(&Self::config_path(home))
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_at(&content, path)
    }

    /// Parse configuration text
    #[cfg(test)]
    pub fn parse(content: &str) -> Result<Self> {
        Self::parse_at(content, Path::new("<inline>"))
    }

    fn parse_at(content: &str, path: &Path) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            tabs: raw.tabs.ok_or(ConfigError::MissingKey("tabs"))?,
            common_commands: raw
                .common_commands
                .ok_or(ConfigError::MissingKey("common_commands"))?,
        })
    }

    /// Get config file path
    pub fn config_path(home: &Path) -> PathBuf {
        home.join(CONFIG_FILENAME)
    }
}

/// Get home directory
pub fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::NoHome)
}

// YAML configuration for the tasklist front end

use crate::edit::CommitPolicy;
use crate::entry::EntryDefaults;
use crate::filter::Filter;
use crate::store::StoreOptions;
use crate::task::Priority;
use chrono::format::{Item, StrftimeItems};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Settings read from `config.yaml`; missing keys take their defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Priority given to newly added tasks
    pub default_priority: Priority,
    /// chrono format string for task timestamps
    pub timestamp_format: String,
    /// Behavior of a commit with a blank edit buffer
    pub empty_commit: CommitPolicy,
    /// Filter active at startup
    pub default_filter: Filter,
    /// Log level used when neither -v nor RUST_LOG is given
    pub log_level: String,
    /// File this config was loaded from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_priority: Priority::Normal,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            empty_commit: CommitPolicy::KeepOpen,
            default_filter: Filter::All,
            log_level: "info".to_string(),
            source: None,
        }
    }
}

impl Config {
    /// Location of the per-user config file, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tasklist").join("config.yaml"))
    }

    /// Resolve the config to use
    ///
    /// An explicit path must exist. Without one, the per-user file is used when
    /// present, otherwise the built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config =
            Self::from_yaml(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file deserializes as null rather than an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.timestamp_format.is_empty() {
            return Err(eyre!("timestamp_format cannot be empty"));
        }
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(eyre!("Invalid timestamp_format: {}", self.timestamp_format));
        }

        self.log_level
            .parse::<tracing::Level>()
            .map_err(|_| eyre!("Invalid log_level: {} (expected trace, debug, info, warn or error)", self.log_level))?;

        Ok(())
    }

    /// Replace file values with any given on the command line
    pub fn with_overrides(
        mut self,
        priority: Option<Priority>,
        filter: Option<Filter>,
        empty_commit: Option<CommitPolicy>,
    ) -> Self {
        if let Some(priority) = priority {
            self.default_priority = priority;
        }
        if let Some(filter) = filter {
            self.default_filter = filter;
        }
        if let Some(empty_commit) = empty_commit {
            self.empty_commit = empty_commit;
        }
        self
    }

    /// Store settings derived from this config
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            defaults: EntryDefaults {
                priority: self.default_priority,
            },
            commit_policy: self.empty_commit,
            filter: self.default_filter,
        }
    }
}

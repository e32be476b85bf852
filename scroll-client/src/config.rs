//! Configuration loading for the window store.
//!
//! Configuration is loaded from a TOML file; every key is optional.
//!
//! ```toml
//! [paging]
//! initial_load = 30
//! page_size = 10
//! prefetch_threshold = 5
//!
//! [follower]
//! unhandled_changes = "ignore"
//! ```

use scroll_core::PrefetchPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration for a [`WindowStore`](crate::WindowStore).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WindowConfig {
    /// Backward paging configuration.
    #[serde(default)]
    pub paging: PagingConfig,
    /// Live follower configuration.
    #[serde(default)]
    pub follower: FollowerConfig,
}

/// Backward paging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PagingConfig {
    /// Entries requested when the window is empty (default: 30).
    #[serde(default = "default_initial_load")]
    pub initial_load: usize,
    /// Entries requested by every later backward load (default: 10).
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Prefetch when the first visible index is below this (default: 5).
    #[serde(default = "default_prefetch_threshold")]
    pub prefetch_threshold: usize,
}

/// Live follower configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FollowerConfig {
    /// What to do with change kinds other than additions (default: ignore).
    #[serde(default)]
    pub unhandled_changes: UnhandledChanges,
}

/// Policy for changed / removed / moved deliveries.
///
/// The window only grows, so these kinds can never be applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnhandledChanges {
    /// Drop them and log at debug level.
    #[default]
    Ignore,
    /// Report them on the failure channel.
    Fail,
}

// Default value functions
fn default_initial_load() -> usize {
    30
}

fn default_page_size() -> usize {
    10
}

fn default_prefetch_threshold() -> usize {
    5
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            initial_load: default_initial_load(),
            page_size: default_page_size(),
            prefetch_threshold: default_prefetch_threshold(),
        }
    }
}

impl PagingConfig {
    /// The prefetch policy these settings describe.
    pub fn policy(&self) -> PrefetchPolicy {
        PrefetchPolicy::new(self.initial_load, self.page_size, self.prefetch_threshold)
    }
}

impl WindowConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paging.initial_load == 0 {
            return Err(ConfigError::Invalid {
                field: "paging.initial_load",
                reason: "must be at least 1",
            });
        }
        if self.paging.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "paging.page_size",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Set the initial page size.
    pub fn with_initial_load(mut self, initial_load: usize) -> Self {
        self.paging.initial_load = initial_load;
        self
    }

    /// Set the incremental page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.paging.page_size = page_size;
        self
    }

    /// Set the unhandled change policy.
    pub fn with_unhandled_changes(mut self, policy: UnhandledChanges) -> Self {
        self.follower.unhandled_changes = policy;
        self
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid config value {field}: {reason}")]
    Invalid {
        /// Dotted name of the offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! TOML configuration.
//!
//! ```toml
//! [catalog]
//! mirror = "http://libgen.is"
//! timeout_secs = 10
//! fetch_limit = 50
//!
//! [ranking]
//! substring_bonus = 0.5
//! min_token_len = 2
//! fold_diacritics = true
//!
//! [export]
//! output_dir = "output"
//! summary_dir = "summaries"
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::catalog::CatalogConfig;
use crate::error::ConfigError;
use crate::export::ExportConfig;
use crate::scoring::RankerConfig;

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_ENV: &str = "BOOKRANK_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub ranking: RankerConfig,
    pub export: ExportConfig,
}

impl Config {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse TOML text; `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Reject values that parse but break ranking.
    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |key, message: &str| ConfigError::Invalid {
            path: path.to_path_buf(),
            key,
            message: message.to_string(),
        };
        let bonus = self.ranking.substring_bonus;
        if !bonus.is_finite() || bonus < 0.0 {
            return Err(invalid(
                "ranking.substring_bonus",
                "must be a finite number of 0 or more",
            ));
        }
        if self.ranking.tokenizer.min_token_len == 0 {
            return Err(invalid("ranking.min_token_len", "must be at least 1"));
        }
        Ok(())
    }

    /// Load the explicit path, else `$BOOKRANK_CONFIG`, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        match path {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

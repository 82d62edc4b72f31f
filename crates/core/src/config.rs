// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file loading.
//!
//! The configuration is a TOML file with one section per work kind, naming
//! the worker implementation and, for kinds that execute an external
//! program, the analysis command:
//!
//! ```toml
//! [ONTRunData]
//! class = "ONTRunDataWorker"
//! command = "/opt/pipelines/artic_nextflow"
//! archive_root = "/archive/workbot"
//! staging_root = "/scratch/workbot"
//!
//! [ONTRunMetadataUpdate]
//! class = "ONTRunMetadataWorker"
//! ```

use crate::kind::WorkKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for in each candidate directory.
pub const CONFIG_FILE: &str = "workbot.toml";

/// Environment variable overriding the configuration file path.
pub const CONFIG_ENV: &str = "WORKBOT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration file found in: {searched:?}")]
    NotFound { searched: Vec<PathBuf> },
    #[error("failed to read configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("configuration has no [{0}] section")]
    MissingSection(String),
    #[error("configuration section [{0}] does not name a work kind")]
    UnknownSection(String),
    #[error("[{kind}] declares no {key}")]
    MissingKey { kind: String, key: String },
    #[error("[{kind}] names unknown worker class {class}")]
    UnknownClass { kind: String, class: String },
}

/// One work-kind section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KindConfig {
    /// Worker implementation name, checked against the registry at startup.
    pub class: String,
    /// Shell command template for the analysis subprocess.
    pub command: Option<String>,
    /// Root collection (an archive path) under which results are archived.
    pub archive_root: Option<String>,
    /// Root of the local scratch area.
    pub staging_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Config {
    sections: BTreeMap<String, KindConfig>,
}

impl Config {
    /// Candidate paths, most specific first.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(override_path) = std::env::var(CONFIG_ENV) {
            paths.push(PathBuf::from(override_path));
        }

        paths.push(PathBuf::from(CONFIG_FILE));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".workbot").join(CONFIG_FILE));
        }
        if let Some(data) = dirs::data_dir() {
            paths.push(data.join("workbot").join(CONFIG_FILE));
        }

        paths
    }

    /// Load the first configuration file found on the search path.
    pub fn load() -> Result<Self, ConfigError> {
        let searched = Self::search_paths();
        for path in &searched {
            if path.is_file() {
                return Self::load_from(path);
            }
        }
        Err(ConfigError::NotFound { searched })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// The section for a work kind; absence is a startup error.
    pub fn section(&self, kind: WorkKind) -> Result<&KindConfig, ConfigError> {
        self.sections
            .get(kind.as_str())
            .ok_or_else(|| ConfigError::MissingSection(kind.as_str().to_string()))
    }

    /// The analysis command for a kind that must have one.
    pub fn command(&self, kind: WorkKind) -> Result<&str, ConfigError> {
        self.section(kind)?
            .command
            .as_deref()
            .ok_or_else(|| ConfigError::MissingKey {
                kind: kind.as_str().to_string(),
                key: "command".to_string(),
            })
    }

    /// Section names present in the file, in lexical order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

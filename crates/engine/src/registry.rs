// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The work-kind registry.
//!
//! Maps each kind to its worker constructor, the kind's end states, and the
//! configured analysis command. The mapping from the configuration's `class`
//! key to a constructor is a compile-time table; an unknown class is a
//! startup error, not a runtime surprise.

use crate::{EngineError, OntRunDataWorker, OntRunMetadataWorker, Worker};
use std::sync::Arc;
use wb_adapters::{ArchiveClient, WarehouseClient};
use wb_core::{Config, ConfigError, WorkKind, WorkState};
use wb_storage::StateStore;

/// Worker class names accepted in the configuration.
pub const ONT_RUN_DATA_CLASS: &str = "ONTRunDataWorker";
pub const ONT_RUN_METADATA_CLASS: &str = "ONTRunMetadataWorker";

/// Builds workers for work kinds from shared client handles.
pub struct WorkerRegistry {
    config: Config,
    store: StateStore,
    archive: Arc<dyn ArchiveClient>,
    warehouse: Arc<dyn WarehouseClient>,
}

impl WorkerRegistry {
    pub fn new(
        config: Config,
        store: StateStore,
        archive: Arc<dyn ArchiveClient>,
        warehouse: Arc<dyn WarehouseClient>,
    ) -> Self {
        Self {
            config,
            store,
            archive,
            warehouse,
        }
    }

    /// Check every configured section up front: the section must name a
    /// known kind and a known class, and the class must match the kind.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in self.config.section_names() {
            let kind: WorkKind = name
                .parse()
                .map_err(|_| ConfigError::UnknownSection(name.to_string()))?;
            let class = expected_class(kind);
            let section = self.config.section(kind)?;
            if section.class != class {
                return Err(ConfigError::UnknownClass {
                    kind: name.to_string(),
                    class: section.class.clone(),
                });
            }
        }
        Ok(())
    }

    /// States that conclude a dataset for a kind.
    pub fn end_states(&self, kind: WorkKind) -> &'static [WorkState] {
        kind.end_states()
    }

    /// Construct the worker for a kind from its configuration section.
    pub fn worker(&self, kind: WorkKind) -> Result<Box<dyn Worker>, EngineError> {
        let section = self.config.section(kind)?;
        match section.class.as_str() {
            ONT_RUN_DATA_CLASS => {
                let command = self.config.command(kind)?.to_string();
                let archive_root = section
                    .archive_root
                    .clone()
                    .ok_or_else(|| missing_key(kind, "archive_root"))?;
                let staging_root = section
                    .staging_root
                    .clone()
                    .ok_or_else(|| missing_key(kind, "staging_root"))?;
                Ok(Box::new(OntRunDataWorker::new(
                    self.archive.clone(),
                    self.store.clone(),
                    archive_root,
                    staging_root,
                    command,
                )))
            }
            ONT_RUN_METADATA_CLASS => Ok(Box::new(OntRunMetadataWorker::new(
                self.archive.clone(),
                self.warehouse.clone(),
                self.store.clone(),
            ))),
            other => Err(ConfigError::UnknownClass {
                kind: kind.as_str().to_string(),
                class: other.to_string(),
            }
            .into()),
        }
    }
}

fn expected_class(kind: WorkKind) -> &'static str {
    match kind {
        WorkKind::OntRunData => ONT_RUN_DATA_CLASS,
        WorkKind::OntRunMetadataUpdate => ONT_RUN_METADATA_CLASS,
    }
}

fn missing_key(kind: WorkKind, key: &str) -> ConfigError {
    ConfigError::MissingKey {
        kind: kind.as_str().to_string(),
        key: key.to_string(),
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

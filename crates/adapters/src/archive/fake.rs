// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory archive for tests.
//!
//! Collections and data objects live in plain maps; transfers read and write
//! the real local filesystem so workers can be exercised end to end without
//! an archive server.

use crate::archive::{ArchiveClient, ArchiveError, MetaScope, TransferOptions, NO_SUCH_PATH};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use wb_core::Avu;

#[derive(Debug, Default)]
struct FakeArchiveState {
    collections: BTreeSet<String>,
    data_objects: BTreeMap<String, Vec<u8>>,
    metadata: BTreeMap<String, BTreeSet<Avu>>,
}

/// A fake archive backed by in-memory maps.
#[derive(Debug, Clone, Default)]
pub struct FakeArchive {
    state: Arc<Mutex<FakeArchiveState>>,
}

fn missing(path: &str) -> ArchiveError {
    ArchiveError::Rods {
        message: format!("Path '{path}' does not exist"),
        code: NO_SUCH_PATH,
    }
}

fn parent(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(dir, _)| dir).filter(|dir| !dir.is_empty())
}

fn ancestors(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = path;
    loop {
        out.push(current.to_string());
        match parent(current) {
            Some(dir) => current = dir,
            None => break,
        }
    }
    out
}

impl FakeArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a data object, creating its parent collections.
    pub fn add_data_object(&self, path: &str, content: &[u8]) {
        let mut state = self.state.lock();
        if let Some(dir) = parent(path) {
            state.collections.extend(ancestors(dir));
        }
        state.data_objects.insert(path.to_string(), content.to_vec());
    }

    /// Seed a collection, creating parents.
    pub fn add_collection(&self, path: &str) {
        let mut state = self.state.lock();
        state.collections.extend(ancestors(path));
    }

    /// Remove a seeded data object (used to model incomplete runs).
    pub fn remove_data_object(&self, path: &str) {
        let mut state = self.state.lock();
        state.data_objects.remove(path);
    }

    fn exists_locked(state: &FakeArchiveState, path: &str) -> bool {
        state.collections.contains(path) || state.data_objects.contains_key(path)
    }
}

#[async_trait]
impl ArchiveClient for FakeArchive {
    async fn exists(&self, path: &str) -> Result<bool, ArchiveError> {
        let state = self.state.lock();
        Ok(Self::exists_locked(&state, path))
    }

    async fn list_contents(&self, path: &str) -> Result<Vec<String>, ArchiveError> {
        let state = self.state.lock();
        if !state.collections.contains(path) {
            return Err(missing(path));
        }
        let mut contents: Vec<String> = state
            .collections
            .iter()
            .chain(state.data_objects.keys())
            .filter(|child| parent(child) == Some(path))
            .cloned()
            .collect();
        contents.sort();
        Ok(contents)
    }

    async fn create_collection(&self, path: &str) -> Result<(), ArchiveError> {
        self.add_collection(path);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), ArchiveError> {
        let mut state = self.state.lock();
        let prefix = format!("{path}/");
        state
            .collections
            .retain(|p| p != path && !p.starts_with(&prefix));
        state
            .data_objects
            .retain(|p, _| p != path && !p.starts_with(&prefix));
        state
            .metadata
            .retain(|p, _| p != path && !p.starts_with(&prefix));
        Ok(())
    }

    async fn get(
        &self,
        remote: &str,
        local: &Path,
        _options: TransferOptions,
    ) -> Result<(), ArchiveError> {
        let state = self.state.lock();
        if !Self::exists_locked(&state, remote) {
            return Err(missing(remote));
        }

        let leaf = remote.rsplit('/').next().unwrap_or(remote);
        let dest_root = local.join(leaf);
        std::fs::create_dir_all(&dest_root)?;

        let prefix = format!("{remote}/");
        for (path, content) in &state.data_objects {
            if let Some(relative) = path.strip_prefix(&prefix) {
                let dest = dest_root.join(relative);
                if let Some(dir) = dest.parent() {
                    std::fs::create_dir_all(dir)?;
                }
                std::fs::write(dest, content)?;
            }
        }
        Ok(())
    }

    async fn put(
        &self,
        local: &Path,
        remote: &str,
        _options: TransferOptions,
    ) -> Result<(), ArchiveError> {
        {
            let state = self.state.lock();
            if !state.collections.contains(remote) {
                return Err(missing(remote));
            }
        }

        let leaf = local
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| missing(&local.display().to_string()))?;
        let dest_root = format!("{remote}/{leaf}");
        self.add_collection(&dest_root);

        let mut pending = vec![local.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                let relative = path
                    .strip_prefix(local)
                    .map_err(|_| missing(&path.display().to_string()))?
                    .to_string_lossy()
                    .replace(std::path::MAIN_SEPARATOR, "/");
                if path.is_dir() {
                    self.add_collection(&format!("{dest_root}/{relative}"));
                    pending.push(path);
                } else {
                    let content = std::fs::read(&path)?;
                    self.add_data_object(&format!("{dest_root}/{relative}"), &content);
                }
            }
        }
        Ok(())
    }

    async fn metadata(&self, path: &str) -> Result<Vec<Avu>, ArchiveError> {
        let state = self.state.lock();
        if !Self::exists_locked(&state, path) {
            return Err(missing(path));
        }
        Ok(state
            .metadata
            .get(path)
            .map(|avus| avus.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn meta_add(&self, path: &str, avus: &[Avu]) -> Result<usize, ArchiveError> {
        let mut state = self.state.lock();
        if !Self::exists_locked(&state, path) {
            return Err(missing(path));
        }
        let tags = state.metadata.entry(path.to_string()).or_default();
        let mut added = 0;
        for avu in avus {
            if tags.insert(avu.clone()) {
                added += 1;
            }
        }
        Ok(added)
    }

    async fn meta_remove(&self, path: &str, avus: &[Avu]) -> Result<usize, ArchiveError> {
        let mut state = self.state.lock();
        if !Self::exists_locked(&state, path) {
            return Err(missing(path));
        }
        let tags = state.metadata.entry(path.to_string()).or_default();
        let mut removed = 0;
        for avu in avus {
            if tags.remove(avu) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn meta_supersede(
        &self,
        path: &str,
        avus: &[Avu],
    ) -> Result<(usize, usize), ArchiveError> {
        let mut state = self.state.lock();
        if !Self::exists_locked(&state, path) {
            return Err(missing(path));
        }
        let tags = state.metadata.entry(path.to_string()).or_default();
        let attributes: BTreeSet<&str> = avus.iter().map(|avu| avu.attribute.as_str()).collect();

        let stale: Vec<Avu> = tags
            .iter()
            .filter(|tag| attributes.contains(tag.attribute.as_str()) && !avus.contains(tag))
            .cloned()
            .collect();
        let removed = stale.len();
        for tag in &stale {
            tags.remove(tag);
        }

        let mut added = 0;
        for avu in avus {
            if tags.insert(avu.clone()) {
                added += 1;
            }
        }
        Ok((removed, added))
    }

    async fn meta_query(
        &self,
        avus: &[Avu],
        scope: MetaScope,
        zone: Option<&str>,
    ) -> Result<Vec<String>, ArchiveError> {
        let state = self.state.lock();
        let mut found: Vec<String> = state
            .metadata
            .iter()
            .filter(|(_, tags)| avus.iter().all(|avu| tags.contains(avu)))
            .map(|(path, _)| path.clone())
            .filter(|path| match scope {
                MetaScope::Collections => state.collections.contains(path),
                MetaScope::DataObjects => state.data_objects.contains_key(path),
            })
            .filter(|path| match zone {
                Some(zone) => path.starts_with(&format!("/{zone}/")),
                None => true,
            })
            .collect();
        found.sort();
        Ok(found)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

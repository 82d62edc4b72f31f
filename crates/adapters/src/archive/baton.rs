// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production archive client.
//!
//! Metadata and listing operations go over the baton JSON wire protocol: one
//! request envelope per line to a long-lived `baton-do` child, one response
//! envelope per line back. Recursive data transfers and collection
//! create/remove shell out to the icommand-style binaries.

use crate::archive::{ArchiveClient, ArchiveError, MetaScope, TransferOptions};
use crate::subprocess::{run_with_timeout, COLLECTION_TIMEOUT, TRANSFER_TIMEOUT};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use wb_core::Avu;

const BATON_PROGRAM: &str = "baton-do";
const GET_PROGRAM: &str = "iget";
const PUT_PROGRAM: &str = "iput";
const MKDIR_PROGRAM: &str = "imkdir";
const REMOVE_PROGRAM: &str = "irm";

/// One request on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub operation: String,
    pub arguments: serde_json::Value,
    pub target: Target,
}

impl Envelope {
    pub fn new(operation: &str, arguments: serde_json::Value, target: Target) -> Self {
        Self {
            operation: operation.to_string(),
            arguments,
            target,
        }
    }
}

/// The target item of a request: a collection, a data object within one, or
/// a bag of query tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avus: Option<Vec<Avu>>,
}

impl Target {
    pub fn collection(path: &str) -> Self {
        Self {
            collection: Some(path.to_string()),
            ..Self::default()
        }
    }

    pub fn with_avus(mut self, avus: Vec<Avu>) -> Self {
        self.avus = Some(avus);
        self
    }
}

/// One response off the wire.
#[derive(Debug, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub result: Option<ResultBody>,
    #[serde(default)]
    pub error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
pub enum ResultBody {
    #[serde(rename = "single")]
    Single(serde_json::Value),
    #[serde(rename = "multiple")]
    Multiple(Vec<serde_json::Value>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    pub message: String,
    pub code: i64,
}

struct BatonProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Archive client over a baton-style child process plus icommand shims.
pub struct BatonArchive {
    program: String,
    session: Mutex<Option<BatonProcess>>,
    transfer_timeout: Duration,
}

impl Default for BatonArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl BatonArchive {
    pub fn new() -> Self {
        Self::with_program(BATON_PROGRAM)
    }

    /// Use a different client binary (exercised by tests with a stub).
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
            session: Mutex::new(None),
            transfer_timeout: TRANSFER_TIMEOUT,
        }
    }

    /// Terminate the child process, if one is running.
    pub async fn stop(&self) -> Result<(), ArchiveError> {
        let mut session = self.session.lock().await;
        if let Some(mut process) = session.take() {
            process.child.start_kill()?;
        }
        Ok(())
    }

    fn spawn(&self) -> Result<BatonProcess, ArchiveError> {
        let mut child = Command::new(&self.program)
            .arg("--unbuffered")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ArchiveError::Protocol("no stdin on archive client".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ArchiveError::Protocol("no stdout on archive client".to_string()))?;

        tracing::debug!(program = %self.program, "started archive client");
        Ok(BatonProcess {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// One request/response exchange; the child is started on demand and
    /// dropped on any wire fault so the next call starts clean.
    async fn execute(
        &self,
        operation: &str,
        arguments: serde_json::Value,
        target: Target,
    ) -> Result<ResultBody, ArchiveError> {
        let mut session = self.session.lock().await;
        if session.is_none() {
            *session = Some(self.spawn()?);
        }
        let process = match session.as_mut() {
            Some(process) => process,
            None => return Err(ArchiveError::Protocol("archive client not running".to_string())),
        };

        let envelope = Envelope::new(operation, arguments, target);
        let encoded = serde_json::to_string(&envelope)?;
        tracing::debug!(request = %encoded, "sending");

        let exchange = async {
            process.stdin.write_all(encoded.as_bytes()).await?;
            process.stdin.write_all(b"\n").await?;
            process.stdin.flush().await?;

            let mut line = String::new();
            let read = process.stdout.read_line(&mut line).await?;
            Ok::<(usize, String), std::io::Error>((read, line))
        };

        let (read, line) = match exchange.await {
            Ok(result) => result,
            Err(io_err) => {
                *session = None;
                return Err(ArchiveError::Io(io_err));
            }
        };
        if read == 0 {
            *session = None;
            return Err(ArchiveError::Protocol(
                "archive client closed the stream".to_string(),
            ));
        }
        tracing::debug!(response = %line.trim_end(), "received");

        let response: Response = serde_json::from_str(&line)?;
        if let Some(error) = response.error {
            return Err(ArchiveError::Rods {
                message: error.message,
                code: error.code,
            });
        }
        response.result.ok_or_else(|| {
            ArchiveError::Protocol(format!("{operation} response carried no result"))
        })
    }

    async fn list_item(
        &self,
        path: &str,
        avu: bool,
        contents: bool,
    ) -> Result<serde_json::Value, ArchiveError> {
        let arguments = json!({
            "acl": false,
            "avu": avu,
            "contents": contents,
            "size": false,
            "timestamp": false,
        });
        match self.execute("list", arguments, Target::collection(path)).await? {
            ResultBody::Single(item) => Ok(item),
            ResultBody::Multiple(_) => Err(ArchiveError::Protocol(
                "list returned multiple results for one target".to_string(),
            )),
        }
    }

    async fn metamod(&self, operation: &str, path: &str, avus: Vec<Avu>) -> Result<(), ArchiveError> {
        self.execute(
            "metamod",
            json!({ "operation": operation }),
            Target::collection(path).with_avus(avus),
        )
        .await
        .map(|_| ())
    }

    async fn transfer(
        &self,
        program: &str,
        args: Vec<String>,
        timeout: Duration,
    ) -> Result<(), ArchiveError> {
        let mut cmd = Command::new(program);
        cmd.args(&args);
        let output = run_with_timeout(cmd, timeout, program)
            .await
            .map_err(|message| ArchiveError::Command {
                command: program.to_string(),
                message,
            })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ArchiveError::Command {
                command: program.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            })
        }
    }
}

fn transfer_args(options: TransferOptions) -> Vec<String> {
    let mut args = Vec::new();
    if options.force {
        args.push("-f".to_string());
    }
    if options.verify_checksum {
        args.push("-K".to_string());
    }
    if options.recurse {
        args.push("-r".to_string());
    }
    args
}

fn item_to_path(item: &serde_json::Value) -> Result<String, ArchiveError> {
    let collection = item
        .get("collection")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            ArchiveError::Protocol(format!("collection key missing from {item}"))
        })?;
    Ok(match item.get("data_object").and_then(|v| v.as_str()) {
        Some(name) => format!("{collection}/{name}"),
        None => collection.to_string(),
    })
}

#[async_trait]
impl ArchiveClient for BatonArchive {
    async fn exists(&self, path: &str) -> Result<bool, ArchiveError> {
        match self.list_item(path, false, false).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_missing_path() => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn list_contents(&self, path: &str) -> Result<Vec<String>, ArchiveError> {
        let item = self.list_item(path, false, true).await?;
        let contents = item
            .get("contents")
            .and_then(|v| v.as_array())
            .ok_or_else(|| ArchiveError::Protocol(format!("contents key missing from {item}")))?;
        contents.iter().map(item_to_path).collect()
    }

    async fn create_collection(&self, path: &str) -> Result<(), ArchiveError> {
        let args = vec!["-p".to_string(), path.to_string()];
        self.transfer(MKDIR_PROGRAM, args, COLLECTION_TIMEOUT).await
    }

    async fn remove(&self, path: &str) -> Result<(), ArchiveError> {
        let args = vec!["-f".to_string(), "-r".to_string(), path.to_string()];
        self.transfer(REMOVE_PROGRAM, args, COLLECTION_TIMEOUT).await
    }

    async fn get(
        &self,
        remote: &str,
        local: &Path,
        options: TransferOptions,
    ) -> Result<(), ArchiveError> {
        let mut args = transfer_args(options);
        args.push(remote.to_string());
        args.push(local.display().to_string());
        self.transfer(GET_PROGRAM, args, self.transfer_timeout).await
    }

    async fn put(
        &self,
        local: &Path,
        remote: &str,
        options: TransferOptions,
    ) -> Result<(), ArchiveError> {
        let mut args = transfer_args(options);
        args.push(local.display().to_string());
        args.push(remote.to_string());
        self.transfer(PUT_PROGRAM, args, self.transfer_timeout).await
    }

    async fn metadata(&self, path: &str) -> Result<Vec<Avu>, ArchiveError> {
        let item = self.list_item(path, true, false).await?;
        let avus = item
            .get("avus")
            .cloned()
            .ok_or_else(|| ArchiveError::Protocol(format!("avus key missing from {item}")))?;
        let mut avus: Vec<Avu> = serde_json::from_value(avus)?;
        avus.sort();
        Ok(avus)
    }

    async fn meta_add(&self, path: &str, avus: &[Avu]) -> Result<usize, ArchiveError> {
        let current = self.metadata(path).await?;
        let to_add: Vec<Avu> = avus
            .iter()
            .filter(|avu| !current.contains(avu))
            .cloned()
            .collect();
        let added = to_add.len();
        if !to_add.is_empty() {
            self.metamod("add", path, to_add).await?;
        }
        Ok(added)
    }

    async fn meta_remove(&self, path: &str, avus: &[Avu]) -> Result<usize, ArchiveError> {
        let current = self.metadata(path).await?;
        let to_remove: Vec<Avu> = avus
            .iter()
            .filter(|avu| current.contains(avu))
            .cloned()
            .collect();
        let removed = to_remove.len();
        if !to_remove.is_empty() {
            self.metamod("rem", path, to_remove).await?;
        }
        Ok(removed)
    }

    async fn meta_supersede(
        &self,
        path: &str,
        avus: &[Avu],
    ) -> Result<(usize, usize), ArchiveError> {
        let current = self.metadata(path).await?;
        let attributes: BTreeSet<&str> =
            avus.iter().map(|avu| avu.attribute.as_str()).collect();

        let stale: Vec<Avu> = current
            .iter()
            .filter(|avu| attributes.contains(avu.attribute.as_str()) && !avus.contains(avu))
            .cloned()
            .collect();
        let removed = stale.len();
        if !stale.is_empty() {
            self.metamod("rem", path, stale).await?;
        }

        let to_add: Vec<Avu> = avus
            .iter()
            .filter(|avu| !current.contains(avu))
            .cloned()
            .collect();
        let added = to_add.len();
        if !to_add.is_empty() {
            self.metamod("add", path, to_add).await?;
        }

        Ok((removed, added))
    }

    async fn meta_query(
        &self,
        avus: &[Avu],
        scope: MetaScope,
        zone: Option<&str>,
    ) -> Result<Vec<String>, ArchiveError> {
        let arguments = match scope {
            MetaScope::Collections => json!({ "collection": true }),
            MetaScope::DataObjects => json!({ "object": true }),
        };
        let target = Target {
            // Zone hint travels in the collection slot.
            collection: zone.map(str::to_string),
            data_object: None,
            avus: Some(avus.to_vec()),
        };
        match self.execute("metaquery", arguments, target).await? {
            ResultBody::Multiple(items) => items.iter().map(item_to_path).collect(),
            ResultBody::Single(item) => Err(ArchiveError::Protocol(format!(
                "metaquery returned a single result: {item}"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "baton_tests.rs"]
mod tests;

// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Replays a target recorded as TOML:
//!
//! ```toml
//! [transport]
//! kind = "mock"
//!
//! [commands."uname -s"]
//! stdout = "Linux"
//!
//! [files."/etc/os-release"]
//! content = """
//! ID=ubuntu
//! """
//! ```

use super::{CommandOutput, Transport, TransportKind, unsupported};
use crate::error::{PlatformError, Result};
use crate::models::platform::PlatformKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingMeta {
    #[serde(default)]
    pub kind: Option<TransportKind>,
    #[serde(default)]
    pub arch: Option<String>,
    #[serde(default)]
    pub platform_kind: Option<PlatformKind>,
    #[serde(default)]
    pub runtime: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedCommand {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub exit_status: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFile {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub transport: RecordingMeta,
    #[serde(default)]
    pub commands: BTreeMap<String, RecordedCommand>,
    #[serde(default)]
    pub files: BTreeMap<String, RecordedFile>,
}

impl Recording {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PlatformError::InvalidRecording(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PlatformError::InvalidRecording(e.to_string()))
    }
}

/// Transport backed by a [`Recording`].
///
/// Every command and file access is counted, which lets callers assert that
/// cached lookups did not reach the target again.
pub struct RecordingTransport {
    recording: Recording,
    kind: TransportKind,
    io_calls: AtomicUsize,
}

impl RecordingTransport {
    pub fn new(recording: Recording) -> Self {
        let kind = recording.transport.kind.unwrap_or(TransportKind::Mock);
        Self {
            recording,
            kind,
            io_calls: AtomicUsize::new(0),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(Self::new(Recording::from_toml(content)?))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let transport = Self::from_toml(&content)?;
        log::debug!(
            "Loaded recording {path:?} with {} commands and {} files",
            transport.recording.commands.len(),
            transport.recording.files.len()
        );
        Ok(transport)
    }

    /// Number of command runs and file reads served so far.
    pub fn io_calls(&self) -> usize {
        self.io_calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.io_calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Transport for RecordingTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    fn run_command(&self, command: &str) -> Result<CommandOutput> {
        self.count();
        if !self.kind.can_run_commands() {
            return Err(unsupported(self.kind, "run command"));
        }

        let recorded = self.recording.commands.get(command).ok_or_else(|| {
            PlatformError::CommandFailed {
                command: command.to_string(),
                message: "command not found in recording".to_string(),
            }
        })?;

        if recorded.exit_status != 0 {
            return Err(PlatformError::CommandFailed {
                command: command.to_string(),
                message: format!(
                    "exit status {}: {}",
                    recorded.exit_status,
                    recorded.stderr.trim()
                ),
            });
        }

        Ok(CommandOutput {
            stdout: recorded.stdout.clone(),
            stderr: recorded.stderr.clone(),
            exit_status: recorded.exit_status,
        })
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        self.count();
        self.recording
            .files
            .get(path)
            .map(|file| file.content.clone().into_bytes())
            .ok_or_else(|| PlatformError::FileNotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.count();
        self.recording.files.contains_key(path)
    }

    fn declared_arch(&self) -> Option<String> {
        self.recording.transport.arch.clone()
    }

    fn platform_kind(&self) -> Option<PlatformKind> {
        self.recording.transport.platform_kind
    }

    fn runtime(&self) -> Option<String> {
        self.recording.transport.runtime.clone()
    }
}

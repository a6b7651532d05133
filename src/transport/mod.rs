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

//! Access to the target being inspected.
//!
//! Detectors only ever read through a [`Transport`]: they run commands and
//! read files. Which of the two a transport offers is fixed by its
//! [`TransportKind`].

mod api;
mod filesystem;
mod local;
mod paths;
mod probe;
mod recording;
mod tar;

pub use api::ApiTransport;
pub use filesystem::FsTransport;
pub use local::LocalTransport;
pub use probe::ReleaseProbe;
pub use recording::{RecordedCommand, RecordedFile, Recording, RecordingTransport};
pub use tar::TarTransport;

use crate::error::{PlatformError, Result};
use crate::models::platform::{Platform, PlatformKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    Local,
    /// A remote shell. Connections are implemented outside this crate;
    /// recordings of such hosts declare `kind = "ssh"`.
    Ssh,
    Mock,
    Tar,
    ContainerImage,
    Filesystem,
    Api,
}

impl TransportKind {
    /// Whether the target can execute processes.
    pub fn can_run_commands(&self) -> bool {
        matches!(
            self,
            TransportKind::Local | TransportKind::Ssh | TransportKind::Mock
        )
    }

    /// File-only access to an image or mounted filesystem.
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            TransportKind::Tar | TransportKind::ContainerImage | TransportKind::Filesystem
        )
    }

    /// Self-describing targets that never enter the OS resolver tree.
    pub fn is_api(&self) -> bool {
        matches!(self, TransportKind::Api)
    }
}

impl FromStr for TransportKind {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "local" => Ok(TransportKind::Local),
            "ssh" => Ok(TransportKind::Ssh),
            "mock" => Ok(TransportKind::Mock),
            "tar" => Ok(TransportKind::Tar),
            "container-image" | "docker-image" => Ok(TransportKind::ContainerImage),
            "filesystem" | "fs" => Ok(TransportKind::Filesystem),
            "api" => Ok(TransportKind::Api),
            _ => Err(PlatformError::InvalidConfig(format!(
                "Unknown transport kind: {s}"
            ))),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            TransportKind::Local => "local",
            TransportKind::Ssh => "ssh",
            TransportKind::Mock => "mock",
            TransportKind::Tar => "tar",
            TransportKind::ContainerImage => "container-image",
            TransportKind::Filesystem => "filesystem",
            TransportKind::Api => "api",
        };
        write!(f, "{kind}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

/// Read-only access to a target.
pub trait Transport: Send + Sync {
    /// Capability kind, decided when the transport is constructed.
    fn kind(&self) -> TransportKind;

    /// Run a shell command on the target.
    ///
    /// A non-zero exit status is reported as [`PlatformError::CommandFailed`].
    fn run_command(&self, command: &str) -> Result<CommandOutput>;

    /// Read a whole file from the target.
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Whether `path` exists on the target.
    fn exists(&self, path: &str) -> bool {
        self.read_file(path).is_ok()
    }

    /// Architecture declared by the transport itself (image manifests).
    fn declared_arch(&self) -> Option<String> {
        None
    }

    /// Platform of a self-describing target. OS-like transports return
    /// `Ok(None)` and are resolved through the tree.
    fn synthesize_platform(&self) -> Result<Option<Platform>> {
        Ok(None)
    }

    fn platform_kind(&self) -> Option<PlatformKind> {
        None
    }

    fn runtime(&self) -> Option<String> {
        None
    }
}

/// Error for operations a file-only transport cannot perform.
pub(crate) fn unsupported(kind: TransportKind, operation: &str) -> PlatformError {
    PlatformError::Unsupported {
        transport: kind.to_string(),
        operation: operation.to_string(),
    }
}

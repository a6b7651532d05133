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

use super::paths::resolve_links;
use super::{CommandOutput, Transport, TransportKind, unsupported};
use crate::error::{PlatformError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A mounted or unpacked image filesystem rooted at a host directory.
///
/// Symlinks are resolved against the image root, so an absolute link inside
/// the image never reaches the host's own files.
pub struct FsTransport {
    root: PathBuf,
    arch: Option<String>,
}

impl FsTransport {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(PlatformError::InvalidConfig(format!(
                "Filesystem root is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self { root, arch: None })
    }

    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, image_path: &str) -> PathBuf {
        self.root.join(image_path.trim_start_matches('/'))
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let resolved = resolve_links(path, |candidate| {
            let host = self.host_path(candidate);
            let metadata = fs::symlink_metadata(&host).ok()?;
            if !metadata.file_type().is_symlink() {
                return None;
            }
            fs::read_link(&host)
                .ok()
                .map(|target| target.to_string_lossy().replace('\\', "/"))
        })?;
        Some(self.host_path(&resolved))
    }
}

impl Transport for FsTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Filesystem
    }

    fn run_command(&self, _command: &str) -> Result<CommandOutput> {
        Err(unsupported(TransportKind::Filesystem, "run command"))
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let host = self
            .resolve(path)
            .ok_or_else(|| PlatformError::FileNotFound(path.to_string()))?;
        fs::read(&host).map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::IsADirectory => {
                PlatformError::FileNotFound(path.to_string())
            }
            _ => PlatformError::Io(e),
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|host| host.exists())
    }

    fn declared_arch(&self) -> Option<String> {
        self.arch.clone()
    }
}

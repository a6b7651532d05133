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

use super::paths::{clean_path, escapes_root, resolve_links};
use super::{CommandOutput, Transport, TransportKind, unsupported};
use crate::error::{PlatformError, Result};
use crate::models::platform::PlatformKind;
use flate2::read::GzDecoder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use tar::{Archive, EntryType};

const DOCKER_IMAGE_RUNTIME: &str = "docker-image";
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Files the detectors read. Their contents are kept once the archive is
/// indexed; any other member is streamed from the archive on request.
const PROBE_PATHS: &[&str] = &[
    "/etc/os-release",
    "/usr/lib/os-release",
    "/etc/lsb-release",
    "/etc/redhat-release",
    "/etc/oracle-release",
    "/etc/centos-release",
    "/etc/almalinux-release",
    "/etc/rocky-release",
    "/etc/fedora-release",
    "/etc/debian_version",
    "/etc/arch-release",
    "/etc/SuSE-release",
    "/etc/alpine-release",
    "/etc/gentoo-release",
    "/etc/openwrt_release",
    "/etc/plcnext/arpversion",
    "/etc/release",
    "/bin/busybox",
    "/System/Library/CoreServices/SystemVersion.plist",
];

type ArchiveOpener = Box<dyn Fn() -> Result<Box<dyn Read>> + Send + Sync>;

enum TarEntry {
    File,
    Directory,
    Symlink(String),
    Hardlink(String),
}

fn invalid_archive(err: std::io::Error) -> PlatformError {
    PlatformError::InvalidArchive(err.to_string())
}

/// Member name as an image path, or `None` for names climbing out of the
/// image root.
fn member_name(raw: &[u8]) -> Option<String> {
    let raw_path = String::from_utf8_lossy(raw);
    if escapes_root(&raw_path) {
        log::warn!("Skipping archive member outside the image root: {raw_path}");
        return None;
    }
    Some(clean_path(&raw_path))
}

fn index_members(reader: Box<dyn Read>) -> Result<HashMap<String, TarEntry>> {
    let mut archive = Archive::new(reader);
    let mut entries = HashMap::new();

    for member in archive.entries().map_err(invalid_archive)? {
        let member = member.map_err(invalid_archive)?;
        let Some(path) = member_name(&member.path_bytes()) else {
            continue;
        };

        let entry = match member.header().entry_type() {
            EntryType::Regular | EntryType::Continuous => TarEntry::File,
            EntryType::Directory => TarEntry::Directory,
            EntryType::Symlink => match member.link_name_bytes() {
                Some(target) => TarEntry::Symlink(String::from_utf8_lossy(&target).into_owned()),
                None => continue,
            },
            EntryType::Link => match member.link_name_bytes() {
                Some(target) => TarEntry::Hardlink(clean_path(&String::from_utf8_lossy(&target))),
                None => continue,
            },
            _ => continue,
        };
        entries.insert(path, entry);
    }
    Ok(entries)
}

/// A filesystem exported as tar (`docker export`, `podman export`, rootfs
/// tarballs). Only member headers are indexed; file contents are read from
/// the archive when asked for. Commands cannot be run against it.
pub struct TarTransport {
    entries: HashMap<String, TarEntry>,
    preloaded: HashMap<String, Vec<u8>>,
    open_archive: ArchiveOpener,
    kind: TransportKind,
    arch: Option<String>,
}

impl TarTransport {
    /// Open a tar file, gzip-compressed or not.
    pub fn open(path: &Path) -> Result<Self> {
        log::debug!("Indexing image tar {path:?}");
        let path = path.to_path_buf();
        Self::load(Box::new(move || -> Result<Box<dyn Read>> {
            let mut file = File::open(&path)?;
            let mut magic_bytes = [0u8; 2];
            let read = file.read(&mut magic_bytes)?;
            file.seek(SeekFrom::Start(0))?;

            if read == 2 && magic_bytes == GZIP_MAGIC {
                Ok(Box::new(GzDecoder::new(file)) as Box<dyn Read>)
            } else {
                Ok(Box::new(file) as Box<dyn Read>)
            }
        }))
    }

    /// An archive already in memory, gzip-compressed or not.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let bytes: Arc<[u8]> = bytes.into();
        Self::load(Box::new(move || -> Result<Box<dyn Read>> {
            let reader = Cursor::new(Arc::clone(&bytes));
            if bytes.starts_with(&GZIP_MAGIC) {
                Ok(Box::new(GzDecoder::new(reader)) as Box<dyn Read>)
            } else {
                Ok(Box::new(reader) as Box<dyn Read>)
            }
        }))
    }

    fn load(open_archive: ArchiveOpener) -> Result<Self> {
        let entries = index_members(open_archive()?)?;
        let mut transport = Self {
            entries,
            preloaded: HashMap::new(),
            open_archive,
            kind: TransportKind::Tar,
            arch: None,
        };

        let wanted: HashSet<String> = PROBE_PATHS
            .iter()
            .filter_map(|path| transport.member_path(path))
            .collect();
        if !wanted.is_empty() {
            transport.preloaded = transport.read_members(&wanted)?;
        }

        log::debug!(
            "Indexed {} archive members, kept {} probe files",
            transport.entries.len(),
            transport.preloaded.len()
        );
        Ok(transport)
    }

    /// Architecture from the image manifest.
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Treat the archive as a container image rather than a plain rootfs.
    pub fn as_container_image(mut self) -> Self {
        self.kind = TransportKind::ContainerImage;
        self
    }

    fn resolve(&self, path: &str) -> Option<String> {
        resolve_links(path, |candidate| match self.entries.get(candidate) {
            Some(TarEntry::Symlink(target)) => Some(target.clone()),
            _ => None,
        })
    }

    fn lookup(&self, path: &str) -> Option<&TarEntry> {
        let resolved = self.resolve(path)?;
        match self.entries.get(&resolved)? {
            TarEntry::Hardlink(target) => self.entries.get(target),
            entry => Some(entry),
        }
    }

    /// Archive member holding the content of `path`, after links.
    fn member_path(&self, path: &str) -> Option<String> {
        let resolved = self.resolve(path)?;
        match self.entries.get(&resolved)? {
            TarEntry::File => Some(resolved),
            TarEntry::Hardlink(target) => match self.entries.get(target)? {
                TarEntry::File => Some(target.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Stream the archive once and collect the contents of `wanted`.
    fn read_members(&self, wanted: &HashSet<String>) -> Result<HashMap<String, Vec<u8>>> {
        let mut archive = Archive::new((self.open_archive)()?);
        let mut contents = HashMap::new();

        for member in archive.entries().map_err(invalid_archive)? {
            let mut member = member.map_err(invalid_archive)?;
            if !matches!(
                member.header().entry_type(),
                EntryType::Regular | EntryType::Continuous
            ) {
                continue;
            }
            let Some(path) = member_name(&member.path_bytes()) else {
                continue;
            };
            if !wanted.contains(&path) {
                continue;
            }

            let mut content = Vec::new();
            member
                .read_to_end(&mut content)
                .map_err(|e| PlatformError::InvalidArchive(format!("{path}: {e}")))?;
            contents.insert(path, content);
        }
        Ok(contents)
    }
}

impl Transport for TarTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    fn run_command(&self, _command: &str) -> Result<CommandOutput> {
        Err(unsupported(self.kind, "run command"))
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let member = self
            .member_path(path)
            .ok_or_else(|| PlatformError::FileNotFound(path.to_string()))?;
        if let Some(content) = self.preloaded.get(&member) {
            return Ok(content.clone());
        }

        log::debug!("Streaming {member} from the image archive");
        self.read_members(&HashSet::from([member.clone()]))?
            .remove(&member)
            .ok_or_else(|| PlatformError::FileNotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    fn declared_arch(&self) -> Option<String> {
        self.arch.clone()
    }

    fn platform_kind(&self) -> Option<PlatformKind> {
        match self.kind {
            TransportKind::ContainerImage => Some(PlatformKind::ContainerImage),
            _ => None,
        }
    }

    fn runtime(&self) -> Option<String> {
        match self.kind {
            TransportKind::ContainerImage => Some(DOCKER_IMAGE_RUNTIME.to_string()),
            _ => None,
        }
    }
}

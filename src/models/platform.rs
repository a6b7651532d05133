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

use crate::error::{PlatformError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

pub const FAMILY_OS: &str = "os";
pub const FAMILY_UNIX: &str = "unix";
pub const FAMILY_LINUX: &str = "linux";
pub const FAMILY_BSD: &str = "bsd";
pub const FAMILY_DARWIN: &str = "darwin";
pub const FAMILY_WINDOWS: &str = "windows";

pub const SCRATCH: &str = "scratch";
pub const UNKNOWN_OS: &str = "unknown-os";

/// Label carrying the raw `ID` field of `/etc/os-release`.
pub const LABEL_DISTRO_ID: &str = "distro-id";

/// Deployment shape of an asset, assigned by the transport rather than the
/// resolver tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformKind {
    BareMetal,
    VirtualMachine,
    Container,
    ContainerImage,
    Api,
    Unknown,
}

impl FromStr for PlatformKind {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bare-metal" | "baremetal" => Ok(PlatformKind::BareMetal),
            "virtual-machine" | "vm" => Ok(PlatformKind::VirtualMachine),
            "container" => Ok(PlatformKind::Container),
            "container-image" => Ok(PlatformKind::ContainerImage),
            "api" => Ok(PlatformKind::Api),
            "unknown" => Ok(PlatformKind::Unknown),
            _ => Err(PlatformError::InvalidConfig(format!(
                "Unknown platform kind: {s}"
            ))),
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            PlatformKind::BareMetal => "bare-metal",
            PlatformKind::VirtualMachine => "virtual-machine",
            PlatformKind::Container => "container",
            PlatformKind::ContainerImage => "container-image",
            PlatformKind::Api => "api",
            PlatformKind::Unknown => "unknown",
        };
        write!(f, "{kind}")
    }
}

/// A resolved platform.
///
/// `family` lists the lineage from the broadest family (`"os"`) down to the
/// family directly above the matched leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub build: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default)]
    pub family: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PlatformKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

impl Platform {
    /// The degenerate platform of an image without any recognizable OS files.
    pub fn scratch(arch: impl Into<String>) -> Self {
        Platform {
            name: SCRATCH.to_string(),
            arch: arch.into(),
            ..Default::default()
        }
    }

    pub fn is_family(&self, family: &str) -> bool {
        self.family.iter().any(|f| f == family)
    }

    pub fn is_scratch(&self) -> bool {
        self.name == SCRATCH
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_OS
    }

    /// Immediate parent family of the leaf, if any.
    pub fn parent_family(&self) -> Option<&str> {
        self.family.last().map(String::as_str)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        };
        write!(f, "{label}")?;
        if !self.version.is_empty() {
            write!(f, " {}", self.version)?;
        }
        if !self.arch.is_empty() {
            write!(f, " ({})", self.arch)?;
        }
        Ok(())
    }
}

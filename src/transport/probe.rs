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

use super::{Transport, TransportKind};
use crate::error::Result;
use crate::parsers;
use std::collections::HashMap;

pub const OS_RELEASE: &str = "/etc/os-release";
pub const LSB_RELEASE: &str = "/etc/lsb-release";

/// Evidence helpers over a transport, shared by all detectors.
pub struct ReleaseProbe<'a> {
    transport: &'a dyn Transport,
}

impl<'a> ReleaseProbe<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    pub fn kind(&self) -> TransportKind {
        self.transport.kind()
    }

    pub fn can_run_commands(&self) -> bool {
        self.transport.kind().can_run_commands()
    }

    /// Trimmed stdout of `command`.
    pub fn command(&self, command: &str) -> Result<String> {
        let output = self.transport.run_command(command)?;
        let stdout = output.stdout.trim().to_string();
        log::trace!("probe> {command:?} -> {stdout:?}");
        Ok(stdout)
    }

    pub fn read_string(&self, path: &str) -> Result<String> {
        let content = self.transport.read_file(path)?;
        log::trace!("probe> read {path} ({} bytes)", content.len());
        Ok(String::from_utf8_lossy(&content).into_owned())
    }

    pub fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        self.transport.read_file(path)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.transport.exists(path)
    }

    pub fn os_release(&self) -> Result<HashMap<String, String>> {
        parsers::parse_os_release(&self.read_string(OS_RELEASE)?)
    }

    pub fn lsb_release(&self) -> Result<HashMap<String, String>> {
        parsers::parse_lsb_release(&self.read_string(LSB_RELEASE)?)
    }

    pub fn uname_s(&self) -> Result<String> {
        self.command("uname -s")
    }

    pub fn uname_m(&self) -> Result<String> {
        self.command("uname -m")
    }

    pub fn uname_r(&self) -> Result<String> {
        self.command("uname -r")
    }

    pub fn sw_vers(&self) -> Result<HashMap<String, String>> {
        parsers::parse_darwin_release(&self.command("sw_vers")?)
    }
}

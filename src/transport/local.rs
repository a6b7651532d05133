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

use super::{CommandOutput, Transport, TransportKind};
use crate::config::{DetectionConfig, default_shell};
use crate::error::{PlatformError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

/// The machine this process runs on.
pub struct LocalTransport {
    shell: Vec<String>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self {
            shell: default_shell(),
        }
    }

    /// Use `shell` (program plus leading arguments) to run commands.
    pub fn with_shell(shell: Vec<String>) -> Self {
        if shell.is_empty() {
            return Self::new();
        }
        Self { shell }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::with_shell(config.local.shell.clone())
    }
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for LocalTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Local
    }

    fn run_command(&self, command: &str) -> Result<CommandOutput> {
        let (program, args) = match self.shell.split_first() {
            Some(split) => split,
            None => {
                return Err(PlatformError::InvalidConfig(
                    "local shell is not configured".to_string(),
                ));
            }
        };

        log::trace!("local> {program} {args:?} {command:?}");
        let output = Command::new(program)
            .args(args)
            .arg(command)
            .output()
            .map_err(|e| PlatformError::CommandFailed {
                command: command.to_string(),
                message: format!("failed to start {program}: {e}"),
            })?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_status: output.status.code().unwrap_or(-1),
        };

        if !output.status.success() {
            return Err(PlatformError::CommandFailed {
                command: command.to_string(),
                message: format!(
                    "exit status {}: {}",
                    result.exit_status,
                    result.stderr.trim()
                ),
            });
        }

        Ok(result)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PlatformError::FileNotFound(path.to_string()),
            _ => PlatformError::Io(e),
        })
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

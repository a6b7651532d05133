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

use crate::error::PlatformError;
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a PlatformError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a PlatformError) -> Self {
        let (suggestion, details) = match error {
            PlatformError::MissingTransport => (
                Some(
                    "Pass a transport (--tar, --fs or --recording) or run without flags to \
                     inspect the local system."
                        .to_string(),
                ),
                None,
            ),
            PlatformError::Parse { format, message } => (
                None,
                Some(format!("The {format} content could not be understood: {message}")),
            ),
            PlatformError::CommandFailed { command, .. } => (
                Some(format!(
                    "Check that '{command}' is available on the target and can be run by the \
                     current user."
                )),
                None,
            ),
            PlatformError::FileNotFound(path) => (
                None,
                Some(format!("Expected file is missing on the target: {path}")),
            ),
            PlatformError::Unsupported { transport, .. } => (
                Some(format!(
                    "The {transport} transport only offers file access. Use a live transport \
                     to run commands."
                )),
                None,
            ),
            PlatformError::ResolutionExhausted(_) => (
                Some(
                    "Run with -vv to see which detectors were tried. Unsupported systems can be \
                     reported together with their /etc/os-release and 'uname -a' output."
                        .to_string(),
                ),
                None,
            ),
            PlatformError::InvalidArchive(msg) => (
                Some(
                    "Provide an uncompressed or gzip-compressed tar of the image filesystem \
                     (e.g. the output of 'docker export')."
                        .to_string(),
                ),
                Some(format!("Archive error: {msg}")),
            ),
            PlatformError::InvalidRecording(msg) => (
                Some(
                    "A recording needs [commands.\"<cmd>\"] tables with 'stdout' and \
                     [files.\"<path>\"] tables with 'content'."
                        .to_string(),
                ),
                Some(format!("Recording error: {msg}")),
            ),
            PlatformError::ConfigError(msg) | PlatformError::InvalidConfig(msg) => (
                Some(
                    "Check config.toml in the cnquery home directory or the CNQUERY_* \
                     environment variables."
                        .to_string(),
                ),
                Some(format!("Configuration problem: {msg}")),
            ),
            PlatformError::Config(err) => (
                Some(
                    "Check config.toml in the cnquery home directory or the CNQUERY_* \
                     environment variables."
                        .to_string(),
                ),
                Some(err.to_string()),
            ),
            PlatformError::Io(err) => {
                let suggestion = match err.kind() {
                    std::io::ErrorKind::PermissionDenied => Some(if cfg!(windows) {
                        "Run the command from an Administrator prompt.".to_string()
                    } else {
                        "Run the command with sudo or as the owner of the target files."
                            .to_string()
                    }),
                    std::io::ErrorKind::NotFound => {
                        Some("Check that the given path exists.".to_string())
                    }
                    _ => None,
                };
                (suggestion, None)
            }
            PlatformError::Json(_) => (None, None),
        };

        Self {
            error,
            suggestion,
            details,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

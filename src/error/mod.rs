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

mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::{format_error_chain, format_error_with_color};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("cannot detect platform without a transport")]
    MissingTransport,

    #[error("Failed to parse {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Not supported by {transport} transport: {operation}")]
    Unsupported {
        transport: String,
        operation: String,
    },

    #[error("could not determine {0}")]
    ResolutionExhausted(String),

    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("Invalid recording: {0}")]
    InvalidRecording(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl PlatformError {
    pub fn parse(format: &'static str, message: impl Into<String>) -> Self {
        PlatformError::Parse {
            format,
            message: message.into(),
        }
    }

    /// True for errors that only say "this evidence is not available here".
    pub fn is_missing_evidence(&self) -> bool {
        matches!(
            self,
            PlatformError::FileNotFound(_)
                | PlatformError::CommandFailed { .. }
                | PlatformError::Unsupported { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

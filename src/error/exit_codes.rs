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

pub fn get_exit_code(error: &PlatformError) -> i32 {
    match error {
        PlatformError::InvalidConfig(_)
        | PlatformError::ConfigError(_)
        | PlatformError::Config(_)
        | PlatformError::InvalidArchive(_)
        | PlatformError::InvalidRecording(_) => 2,

        PlatformError::MissingTransport => 3,

        PlatformError::ResolutionExhausted(_) => 4,

        PlatformError::Io(err) if err.kind() == std::io::ErrorKind::PermissionDenied => 13,

        _ => 1,
    }
}

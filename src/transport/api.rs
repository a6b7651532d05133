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

use super::{CommandOutput, Transport, TransportKind, unsupported};
use crate::error::{PlatformError, Result};
use crate::models::platform::{Platform, PlatformKind};

type VersionProbe = Box<dyn Fn() -> Result<String> + Send + Sync>;

/// A self-describing API target (cloud account, cluster, SaaS tenant).
///
/// Its platform is built from static metadata plus an optional live version
/// query and never goes through the OS resolver tree.
pub struct ApiTransport {
    platform: Platform,
    version_probe: Option<VersionProbe>,
}

impl ApiTransport {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            platform: Platform {
                name: name.into(),
                title: title.into(),
                kind: Some(PlatformKind::Api),
                ..Default::default()
            },
            version_probe: None,
        }
    }

    pub fn with_family(mut self, family: &[&str]) -> Self {
        self.platform.family = family.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.platform.runtime = Some(runtime.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.platform.version = version.into();
        self
    }

    /// Live call yielding the version, e.g. a cluster server-version query.
    pub fn with_version_probe<F>(mut self, probe: F) -> Self
    where
        F: Fn() -> Result<String> + Send + Sync + 'static,
    {
        self.version_probe = Some(Box::new(probe));
        self
    }
}

impl Transport for ApiTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Api
    }

    fn run_command(&self, _command: &str) -> Result<CommandOutput> {
        Err(unsupported(TransportKind::Api, "run command"))
    }

    fn read_file(&self, _path: &str) -> Result<Vec<u8>> {
        Err(unsupported(TransportKind::Api, "read file"))
    }

    fn exists(&self, _path: &str) -> bool {
        false
    }

    fn synthesize_platform(&self) -> Result<Option<Platform>> {
        let mut platform = self.platform.clone();

        if let Some(probe) = &self.version_probe {
            platform.version = probe().map_err(|e| {
                log::debug!("Version query for {} failed: {e}", platform.name);
                PlatformError::ResolutionExhausted(format!("{} version", platform.name))
            })?;
        }

        Ok(Some(platform))
    }

    fn platform_kind(&self) -> Option<PlatformKind> {
        Some(PlatformKind::Api)
    }

    fn runtime(&self) -> Option<String> {
        self.platform.runtime.clone()
    }
}

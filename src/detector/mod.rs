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

mod cache;

pub use cache::LocalPlatformCache;

use crate::config::DetectionConfig;
use crate::error::{PlatformError, Result};
use crate::models::platform::Platform;
use crate::resolver::{self, ResolverNode};
use crate::transport::{Transport, TransportKind};
use std::sync::{Arc, LazyLock, Mutex};

static OPERATING_SYSTEMS: LazyLock<Arc<ResolverNode>> =
    LazyLock::new(|| Arc::new(resolver::operating_systems()));

/// Answers "what platform is behind this transport".
///
/// Self-describing transports provide their platform directly; everything
/// else is resolved through the operating system tree. A successful result
/// is kept for the lifetime of the detector.
pub struct Detector {
    transport: Option<Arc<dyn Transport>>,
    tree: Arc<ResolverNode>,
    shared_local: Option<Arc<LocalPlatformCache>>,
    memoize: bool,
    cached: Mutex<Option<Platform>>,
}

impl Detector {
    pub fn new(transport: Option<Arc<dyn Transport>>, tree: Arc<ResolverNode>) -> Self {
        Self {
            transport,
            tree,
            shared_local: None,
            memoize: true,
            cached: Mutex::new(None),
        }
    }

    /// Detector over the built-in operating system tree.
    pub fn for_transport(transport: Arc<dyn Transport>) -> Self {
        Self::new(Some(transport), Arc::clone(&OPERATING_SYSTEMS))
    }

    pub fn from_config(transport: Arc<dyn Transport>, config: &DetectionConfig) -> Self {
        let detector = Self::for_transport(transport).with_memoize(config.detection.memoize);
        if config.detection.share_local_detection {
            detector.with_shared_cache(LocalPlatformCache::process_wide())
        } else {
            detector
        }
    }

    /// Share local-machine results with other detectors holding `cache`.
    /// Only consulted for [`TransportKind::Local`] transports.
    pub fn with_shared_cache(mut self, cache: Arc<LocalPlatformCache>) -> Self {
        self.shared_local = Some(cache);
        self
    }

    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    pub fn transport(&self) -> Option<&Arc<dyn Transport>> {
        self.transport.as_ref()
    }

    pub fn platform(&self) -> Result<Platform> {
        let transport = self
            .transport
            .as_ref()
            .ok_or(PlatformError::MissingTransport)?;

        if !self.memoize {
            return self.detect(transport.as_ref());
        }

        let mut cached = self
            .cached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(platform) = cached.as_ref() {
            return Ok(platform.clone());
        }

        let platform = self.detect(transport.as_ref())?;
        *cached = Some(platform.clone());
        Ok(platform)
    }

    fn detect(&self, transport: &dyn Transport) -> Result<Platform> {
        let mut platform = match transport.synthesize_platform()? {
            Some(platform) => {
                log::debug!("{} transport describes itself as {}", transport.kind(), platform.name);
                platform
            }
            None => self.resolve(transport)?,
        };

        if let Some(kind) = transport.platform_kind() {
            platform.kind = Some(kind);
        }
        if let Some(runtime) = transport.runtime() {
            platform.runtime = Some(runtime);
        }

        log::info!(
            "Detected platform {} {} ({})",
            platform.name,
            platform.version,
            platform.family.join("/")
        );
        Ok(platform)
    }

    fn resolve(&self, transport: &dyn Transport) -> Result<Platform> {
        match (&self.shared_local, transport.kind()) {
            (Some(cache), TransportKind::Local) => {
                cache.get_or_resolve(|| resolver::resolve_platform(&self.tree, transport))
            }
            _ => resolver::resolve_platform(&self.tree, transport),
        }
    }
}

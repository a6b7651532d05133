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

use crate::error::Result;
use crate::models::platform::Platform;
use std::sync::{Arc, LazyLock, Mutex};

static PROCESS_CACHE: LazyLock<Arc<LocalPlatformCache>> =
    LazyLock::new(|| Arc::new(LocalPlatformCache::new()));

/// Platform of the local machine, resolved at most once and shared by every
/// detector that holds it.
///
/// Only successful resolutions are kept, so a failure is retried by the
/// next caller.
#[derive(Debug, Default)]
pub struct LocalPlatformCache {
    platform: Mutex<Option<Platform>>,
}

impl LocalPlatformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by all detectors of this process.
    pub fn process_wide() -> Arc<LocalPlatformCache> {
        Arc::clone(&PROCESS_CACHE)
    }

    /// Cached platform, or the result of `resolve` which is then cached.
    ///
    /// The lock is held while resolving: concurrent callers wait for the
    /// first resolution instead of repeating it.
    pub fn get_or_resolve<F>(&self, resolve: F) -> Result<Platform>
    where
        F: FnOnce() -> Result<Platform>,
    {
        let mut cached = self
            .platform
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(platform) = cached.as_ref() {
            log::debug!("Using cached local platform {}", platform.name);
            return Ok(platform.clone());
        }

        let platform = resolve()?;
        *cached = Some(platform.clone());
        Ok(platform)
    }

    pub fn get(&self) -> Option<Platform> {
        self.platform
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        *self
            .platform
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

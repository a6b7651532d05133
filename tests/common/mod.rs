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

//! Recorded targets under `tests/fixtures`.
//!
//! A fixture is a recording plus an `[expected]` table describing the
//! platform it must resolve to.

use cnquery::models::platform::{Platform, PlatformKind};
use cnquery::transport::RecordingTransport;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Expected {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub build: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default)]
    pub family: Vec<String>,
    #[serde(default)]
    pub kind: Option<PlatformKind>,
    #[serde(default)]
    pub runtime: Option<String>,
}

#[derive(Deserialize)]
struct FixtureFile {
    expected: Expected,
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(format!("detect-{name}.toml"))
}

/// Load `tests/fixtures/detect-{name}.toml`.
pub fn load_fixture(name: &str) -> (RecordingTransport, Expected) {
    let path = fixtures_dir().join(format!("detect-{name}.toml"));
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read fixture {}: {e}", path.display()));
    let fixture: FixtureFile = toml::from_str(&content)
        .unwrap_or_else(|e| panic!("invalid expectations in {}: {e}", path.display()));
    let transport = RecordingTransport::from_toml(&content)
        .unwrap_or_else(|e| panic!("invalid recording in {}: {e}", path.display()));
    (transport, fixture.expected)
}

/// Compare every field, reporting the fixture name on mismatch.
#[allow(dead_code)]
pub fn assert_platform(fixture: &str, platform: &Platform, expected: &Expected) {
    assert_eq!(platform.name, expected.name, "{fixture}: name");
    assert_eq!(platform.title, expected.title, "{fixture}: title");
    assert_eq!(platform.version, expected.version, "{fixture}: version");
    assert_eq!(platform.build, expected.build, "{fixture}: build");
    assert_eq!(platform.arch, expected.arch, "{fixture}: arch");
    assert_eq!(platform.family, expected.family, "{fixture}: family");
    if expected.kind.is_some() {
        assert_eq!(platform.kind, expected.kind, "{fixture}: kind");
    }
    if expected.runtime.is_some() {
        assert_eq!(platform.runtime, expected.runtime, "{fixture}: runtime");
    }
}

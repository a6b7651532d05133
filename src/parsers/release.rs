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

//! Parsers for Unix release files and release banners.

use crate::error::{PlatformError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

// One grammar serves os-release, lsb-release and openwrt_release: an
// identifier key, optional quotes around the value, surrounding whitespace
// ignored. Comment and blank lines never match the key shape. Whitespace
// classes stay within the line so an empty value never reaches the next one.
static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*([A-Za-z0-9_]+)[ \t]*=[ \t]*['"]?(.*?)['"]?[ \t]*\r?$"#)
        .expect("valid key=value regex")
});

static RHEL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(.+?)\s+release\b").expect("valid rhel name regex"));

static RHEL_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\brelease\s+([\d.]+)").expect("valid rhel version regex"));

static SUSE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(.+?)\s*\(([^)]*)\)").expect("valid suse title regex")
});

static SUSE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*VERSION[ \t]*=[ \t]*"?([^"\s]+)"?[ \t]*\r?$"#)
        .expect("valid suse version regex")
});

static SUSE_PATCHLEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*PATCHLEVEL[ \t]*=[ \t]*"?([^"\s]+)"?[ \t]*\r?$"#)
        .expect("valid suse patchlevel regex")
});

static SOLARIS_RELEASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(\w*\s*Solaris)\s+([\w.]+)").expect("valid solaris release regex")
});

static ESXI_RELEASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^VMware ESXi\s(.*)\s*$").expect("valid esxi regex"));

fn parse_key_values(format: &'static str, content: &str) -> Result<HashMap<String, String>> {
    if content.trim().is_empty() {
        return Err(PlatformError::parse(format, "empty content"));
    }

    let values = KEY_VALUE
        .captures_iter(content)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();
    Ok(values)
}

/// Parse `/etc/os-release` into its `KEY=VALUE` pairs.
///
/// Lines that do not have the key/value shape are skipped; only empty
/// content is an error.
pub fn parse_os_release(content: &str) -> Result<HashMap<String, String>> {
    parse_key_values("os-release", content)
}

/// Parse `/etc/lsb-release` (and OpenWrt's `/etc/openwrt_release`).
///
/// Shares the os-release grammar, which already covers the single-quoted
/// values OpenWrt writes.
pub fn parse_lsb_release(content: &str) -> Result<HashMap<String, String>> {
    parse_key_values("lsb-release", content)
}

/// Split a RHEL style release line into product name and release.
///
/// `"CentOS Linux release 7.4.1708 (Core)"` yields
/// `("CentOS Linux", "7.4.1708")`.
pub fn parse_rhel_version(content: &str) -> Result<(String, String)> {
    let line = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| PlatformError::parse("redhat-release", "empty content"))?;

    let name = RHEL_NAME
        .captures(line)
        .map(|caps| caps[1].trim().to_string())
        .ok_or_else(|| PlatformError::parse("redhat-release", format!("no product name in '{line}'")))?;

    let release = RHEL_VERSION
        .captures(line)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| PlatformError::parse("redhat-release", format!("no release in '{line}'")))?;

    Ok((name, release))
}

/// Title and codename from the first line of `/etc/SuSE-release`.
///
/// `"openSUSE 13.2 (Harlequin) (x86_64)"` yields `("openSUSE 13.2", "Harlequin")`.
/// The codename is empty when the line carries no parenthesis.
pub fn parse_suse_title(content: &str) -> Result<(String, String)> {
    let line = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| PlatformError::parse("SuSE-release", "empty content"))?;

    match SUSE_TITLE.captures(line) {
        Some(caps) => Ok((caps[1].to_string(), caps[2].trim().to_string())),
        None => Ok((line.to_string(), String::new())),
    }
}

/// `VERSION` and `PATCHLEVEL` from `/etc/SuSE-release`, joined as
/// `"{VERSION}.{PATCHLEVEL}"` when both are present.
pub fn parse_suse_version(content: &str) -> Result<String> {
    let version = SUSE_VERSION
        .captures(content)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| PlatformError::parse("SuSE-release", "no VERSION entry"))?;

    match SUSE_PATCHLEVEL.captures(content) {
        Some(caps) => Ok(format!("{version}.{}", &caps[1])),
        None => Ok(version),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolarisRelease {
    pub id: String,
    pub title: String,
    pub release: String,
}

/// Parse the banner of Solaris' `/etc/release`.
pub fn parse_solaris_release(content: &str) -> Result<SolarisRelease> {
    let caps = SOLARIS_RELEASE
        .captures(content)
        .ok_or_else(|| PlatformError::parse("solaris release", "no '<title> Solaris <version>' line"))?;

    let title = caps[1].trim().to_string();
    let id = title
        .to_lowercase()
        .replace("oracle", "")
        .split_whitespace()
        .collect::<String>();

    Ok(SolarisRelease {
        id,
        title,
        release: caps[2].to_string(),
    })
}

/// Version from the `vmware -v` banner.
pub fn parse_esxi_release(content: &str) -> Result<String> {
    let line = content.trim_end();
    ESXI_RELEASE
        .captures(line)
        .map(|caps| caps[1].trim().to_string())
        .ok_or_else(|| PlatformError::parse("esxi banner", "missing 'VMware ESXi' prefix"))
}

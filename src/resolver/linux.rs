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

//! Detectors for the linux family and its distributions.

use super::Evidence;
use crate::error::Result;
use crate::models::platform::LABEL_DISTRO_ID;
use crate::parsers;
use crate::transport::ReleaseProbe;
use std::collections::HashMap;

const REDHAT_RELEASE: &str = "/etc/redhat-release";
const ORACLE_RELEASE: &str = "/etc/oracle-release";
const CENTOS_RELEASE: &str = "/etc/centos-release";
const ALMALINUX_RELEASE: &str = "/etc/almalinux-release";
const ROCKY_RELEASE: &str = "/etc/rocky-release";
const FEDORA_RELEASE: &str = "/etc/fedora-release";
const DEBIAN_VERSION: &str = "/etc/debian_version";
const ARCH_RELEASE: &str = "/etc/arch-release";
const SUSE_RELEASE: &str = "/etc/SuSE-release";
const ALPINE_RELEASE: &str = "/etc/alpine-release";
const GENTOO_RELEASE: &str = "/etc/gentoo-release";
const OPENWRT_RELEASE: &str = "/etc/openwrt_release";
const PLCNEXT_VERSION: &str = "/etc/plcnext/arpversion";
const BUSYBOX_BINARY: &str = "/bin/busybox";

const BUSYBOX_BANNER_COMMAND: &str = "ls --help 2>&1 | head -1";

fn non_empty<'a>(values: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    values
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

/// Gate for every linux distribution.
///
/// Clears any name from earlier siblings, then collects what lsb-release and
/// os-release say. os-release wins where both speak.
pub(super) fn detect_linux_family(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let mut detected = false;
    evidence.name.clear();
    evidence.title.clear();

    match probe.lsb_release() {
        Ok(lsb) => {
            if let Some(id) = non_empty(&lsb, "DISTRIB_ID") {
                evidence.name = id.to_lowercase();
                evidence.title = id.to_string();
            }
            if let Some(description) = non_empty(&lsb, "DISTRIB_DESCRIPTION") {
                evidence.title = description.to_string();
            }
            if let Some(release) = non_empty(&lsb, "DISTRIB_RELEASE") {
                evidence.version = release.to_string();
            }
            detected = true;
        }
        Err(err) => log::trace!("platform> no usable lsb-release: {err}"),
    }

    match probe.os_release() {
        Ok(os_release) => {
            if let Some(id) = non_empty(&os_release, "ID") {
                evidence.name = id.to_string();
                evidence
                    .labels
                    .insert(LABEL_DISTRO_ID.to_string(), id.to_string());
            }
            if let Some(pretty_name) = non_empty(&os_release, "PRETTY_NAME") {
                evidence.title = pretty_name.to_string();
            }
            if let Some(version_id) = non_empty(&os_release, "VERSION_ID") {
                evidence.version = version_id.to_string();
            }
            if let Some(build_id) = non_empty(&os_release, "BUILD_ID") {
                evidence.build = build_id.to_string();
            }
            detected = true;
        }
        Err(err) => log::trace!("platform> no usable os-release: {err}"),
    }

    // SLES 11 and openSUSE 13 predate os-release
    if !detected {
        if let Ok(content) = probe.read_string(SUSE_RELEASE) {
            detected = apply_suse_release(evidence, &content);
        }
    }

    if !detected && (probe.exists(REDHAT_RELEASE) || probe.exists(BUSYBOX_BINARY)) {
        detected = true;
    }

    if let Ok(arch) = probe.uname_m() {
        evidence.arch = arch;
    }

    if detected {
        return Ok(true);
    }

    let unames = probe.uname_s()?;
    Ok(unames.to_lowercase().contains("linux"))
}

fn apply_suse_release(evidence: &mut Evidence, content: &str) -> bool {
    let title = match parsers::parse_suse_title(content) {
        Ok((title, _codename)) => title,
        Err(err) => {
            log::debug!("platform> cannot parse SuSE-release: {err}");
            return false;
        }
    };

    let lower = title.to_lowercase();
    evidence.name = if lower.contains("opensuse") {
        "opensuse"
    } else if lower.contains("enterprise server") {
        "sles"
    } else if lower.contains("enterprise desktop") {
        "sled"
    } else {
        "suse"
    }
    .to_string();
    evidence.title = title;

    if let Ok(version) = parsers::parse_suse_version(content) {
        evidence.version = version;
    }
    true
}

/// Leaves identified by the os-release `ID` the linux family already read.
macro_rules! name_leaf {
    ($detect:ident, $($name:literal),+) => {
        pub(super) fn $detect(evidence: &mut Evidence, _probe: &ReleaseProbe<'_>) -> Result<bool> {
            Ok(matches!(evidence.name.as_str(), $($name)|+))
        }
    };
}

name_leaf!(detect_eurolinux, "eurolinux");
name_leaf!(detect_ubuntu, "ubuntu");
name_leaf!(detect_raspbian, "raspbian");
name_leaf!(detect_kali, "kali");
name_leaf!(detect_linuxmint, "linuxmint");
name_leaf!(detect_pop, "pop");
name_leaf!(detect_opensuse, "opensuse", "opensuse-leap", "opensuse-tumbleweed");
name_leaf!(detect_sles, "sles");
name_leaf!(detect_suse_microos, "suse-microos");
name_leaf!(detect_photon, "photon");
name_leaf!(detect_wrlinux, "wrlinux");
name_leaf!(detect_ubios, "ubios");
name_leaf!(detect_arch, "arch");
name_leaf!(detect_manjaro, "manjaro");

/// Red Hat derivatives all carry `/etc/redhat-release`; its product line is
/// authoritative for the version.
pub(super) fn detect_redhat_family(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let content = match probe.read_string(REDHAT_RELEASE) {
        Ok(content) if !content.trim().is_empty() => content,
        _ => return Ok(false),
    };

    match parsers::parse_rhel_version(&content) {
        Ok((title, release)) => {
            log::debug!("platform> redhat-release: {title} {release}");
            if evidence.title.is_empty() {
                evidence.title = title;
            }
            evidence.version = release;
            Ok(true)
        }
        Err(err) => {
            log::debug!("platform> cannot parse redhat-release: {err}");
            Ok(false)
        }
    }
}

/// Oracle Linux ships a Red Hat compatible release file, so it is checked
/// before redhat itself.
pub(super) fn detect_oracle(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    if evidence.name == "ol" {
        evidence.name = "oraclelinux".to_string();
        return Ok(true);
    }

    match probe.read_string(ORACLE_RELEASE) {
        Ok(content) if !content.trim().is_empty() => {
            if evidence.name.is_empty() {
                evidence.name = "oraclelinux".to_string();
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub(super) fn detect_redhat(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    if evidence.title.contains("Red Hat") || evidence.name == "redhat" || evidence.name == "rhel" {
        evidence.name = "redhat".to_string();
        return Ok(true);
    }

    let content = probe.read_string(REDHAT_RELEASE)?;
    if content.contains("Red Hat") {
        evidence.name = "redhat".to_string();
        return Ok(true);
    }
    Ok(false)
}

/// CentOS and its rebuild successors.
pub(super) fn detect_centos(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    if evidence.title.contains("CentOS") || evidence.name == "centos" {
        evidence.name = "centos".to_string();
        return Ok(true);
    }

    if evidence.name == "rocky" {
        evidence.name = "rockylinux".to_string();
        return Ok(true);
    }

    if evidence.name == "almalinux" {
        return Ok(probe.exists(ALMALINUX_RELEASE));
    }

    if evidence.name == "rockylinux" {
        return Ok(probe.exists(ROCKY_RELEASE));
    }

    if !probe.exists(CENTOS_RELEASE) {
        return Ok(false);
    }
    if evidence.name.is_empty() {
        evidence.name = "centos".to_string();
    }
    Ok(true)
}

pub(super) fn detect_fedora(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    if evidence.title.contains("Fedora") || evidence.name == "fedora" {
        evidence.name = "fedora".to_string();
        return Ok(true);
    }

    if !probe.exists(FEDORA_RELEASE) {
        return Ok(false);
    }
    if evidence.name.is_empty() {
        evidence.name = "fedora".to_string();
    }
    Ok(true)
}

pub(super) fn detect_scientific(evidence: &mut Evidence, _probe: &ReleaseProbe<'_>) -> Result<bool> {
    if evidence.name == "scientific" || evidence.title.contains("Scientific Linux") {
        evidence.name = "scientific".to_string();
        return Ok(true);
    }
    Ok(false)
}

/// Debian proper, as opposed to its derivatives that also ship
/// `/etc/debian_version`.
pub(super) fn detect_debian(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let content = match probe.read_string(DEBIAN_VERSION) {
        Ok(content) if !content.trim().is_empty() => content,
        _ => return Ok(false),
    };

    let os_release = match probe.os_release() {
        Ok(os_release) => os_release,
        Err(_) => return Ok(false),
    };
    if non_empty(&os_release, "ID") != Some("debian") {
        return Ok(false);
    }

    evidence.version = content.trim().to_string();
    if let Ok(arch) = probe.uname_m() {
        evidence.arch = arch;
    }
    Ok(true)
}

pub(super) fn detect_arch_family(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let content = match probe.read_string(ARCH_RELEASE) {
        Ok(content) => content,
        Err(_) => return Ok(false),
    };

    if evidence.name.is_empty() {
        if content.to_lowercase().contains("manjaro") {
            evidence.name = "manjaro".to_string();
            evidence.title = content.trim().to_string();
        } else {
            evidence.name = "arch".to_string();
            evidence.title = "Arch Linux".to_string();
        }
    }
    Ok(true)
}

pub(super) fn detect_amazonlinux(evidence: &mut Evidence, _probe: &ReleaseProbe<'_>) -> Result<bool> {
    if evidence.name == "amzn" {
        evidence.name = "amazonlinux".to_string();
        return Ok(true);
    }
    Ok(false)
}

/// Alpine's edge channel has no stable release number; the snapshot id from
/// `VERSION_ID` becomes the build.
pub(super) fn detect_alpine(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    if let Ok(os_release) = probe.os_release() {
        if non_empty(&os_release, "PRETTY_NAME") == Some("Alpine Linux edge") {
            evidence.name = "alpine".to_string();
            evidence.version = "edge".to_string();
            evidence.build = non_empty(&os_release, "VERSION_ID")
                .unwrap_or_default()
                .to_string();
            return Ok(true);
        }
    }

    if evidence.name == "alpine" {
        return Ok(true);
    }

    match probe.read_string(ALPINE_RELEASE) {
        Ok(content) if !content.trim().is_empty() => {
            evidence.name = "alpine".to_string();
            if evidence.version.is_empty() {
                evidence.version = content.trim().to_string();
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub(super) fn detect_gentoo(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let content = match probe.read_string(GENTOO_RELEASE) {
        Ok(content) if !content.trim().is_empty() => content,
        _ => return Ok(false),
    };

    match parsers::parse_rhel_version(&content) {
        Ok((title, release)) => {
            if evidence.title.is_empty() {
                evidence.title = title;
            }
            if evidence.version.is_empty() {
                evidence.version = release;
            }
        }
        Err(err) => log::debug!("platform> cannot parse gentoo-release: {err}"),
    }

    if evidence.name.is_empty() {
        evidence.name = "gentoo".to_string();
    }
    Ok(true)
}

/// BusyBox prints its banner on `--help` of any applet. Static images fall
/// back to reading the banner out of the binary itself.
pub(super) fn detect_busybox(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    if probe.can_run_commands() {
        match probe.command(BUSYBOX_BANNER_COMMAND) {
            Ok(line) => {
                if let Some((title, release)) = parsers::parse_busybox_banner(&line) {
                    if title.eq_ignore_ascii_case("busybox") {
                        apply_busybox(evidence, title, release);
                        return Ok(true);
                    }
                }
                return Ok(false);
            }
            Err(err) => log::debug!("platform> cannot read busybox banner: {err}"),
        }
    }

    let binary = match probe.read_bytes(BUSYBOX_BINARY) {
        Ok(binary) => binary,
        Err(_) => return Ok(false),
    };
    match parsers::scan_busybox_binary(&binary) {
        Some((title, release)) => {
            apply_busybox(evidence, title, release);
            Ok(true)
        }
        None => Ok(false),
    }
}

fn apply_busybox(evidence: &mut Evidence, title: String, release: String) {
    evidence.name = title.to_lowercase();
    evidence.title = title;
    evidence.version = release;
}

/// OpenWrt writes its identity in lsb-release syntax under another name.
pub(super) fn detect_openwrt(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let content = match probe.read_string(OPENWRT_RELEASE) {
        Ok(content) => content,
        Err(_) => return Ok(false),
    };

    let release = match parsers::parse_lsb_release(&content) {
        Ok(release) => release,
        Err(err) => {
            log::debug!("platform> cannot parse openwrt_release: {err}");
            return Ok(false);
        }
    };

    if let Some(id) = non_empty(&release, "DISTRIB_ID") {
        evidence.name = id.to_lowercase();
        evidence.title = id.to_string();
    }
    if let Some(version) = non_empty(&release, "DISTRIB_RELEASE") {
        evidence.version = version.to_string();
    }
    Ok(true)
}

pub(super) fn detect_plcnext(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let content = match probe.read_string(PLCNEXT_VERSION) {
        Ok(content) => content,
        Err(_) => return Ok(false),
    };

    match parsers::parse_plcnext_version(&content) {
        Some((version, build)) => {
            evidence.name = "plcnext".to_string();
            evidence.title = "PLCnext".to_string();
            evidence.version = version;
            if let Some(build) = build {
                evidence.build = build;
            }
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Catch-all: a confirmed linux is never left without a leaf.
pub(super) fn detect_generic_linux(_evidence: &mut Evidence, _probe: &ReleaseProbe<'_>) -> Result<bool> {
    log::debug!("platform> no specific linux distribution matched");
    Ok(true)
}

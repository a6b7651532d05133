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

//! Detectors for the non-linux unix systems, gated on `uname -s`.

use super::Evidence;
use crate::error::Result;
use crate::parsers;
use crate::transport::ReleaseProbe;
use regex::Regex;
use std::sync::LazyLock;

const MACOS_SYSTEM_VERSION: &str = "/System/Library/CoreServices/SystemVersion.plist";
const SOLARIS_RELEASE: &str = "/etc/release";

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

fn darwin_slug(product_name: &str) -> String {
    let slug = NON_SLUG
        .replace_all(&product_name.to_lowercase(), "_")
        .trim_matches('_')
        .to_string();
    match slug.as_str() {
        "mac_os_x" => "macos".to_string(),
        _ => slug,
    }
}

/// Any system answering `uname -s`. Linux passes here too and is discarded
/// once no bsd child claims it.
pub(super) fn detect_bsd_family(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let unames = probe.uname_s()?;
    if let Ok(arch) = probe.uname_m() {
        evidence.arch = arch;
    }

    if unames.is_empty() {
        return Ok(false);
    }
    evidence.name = unames.to_lowercase();
    evidence.title = unames;
    Ok(true)
}

pub(super) fn detect_darwin_family(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    if !evidence.name.contains("darwin") {
        return Ok(false);
    }

    match probe.sw_vers() {
        Ok(values) => {
            if let Some(product) = values.get("ProductName") {
                evidence.name = darwin_slug(product);
                evidence.title = product.clone();
            }
            if let Some(version) = values.get("ProductVersion") {
                evidence.version = version.clone();
            }
        }
        Err(err) => log::debug!("platform> cannot run sw_vers: {err}"),
    }
    Ok(true)
}

pub(super) fn detect_macos(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let content = probe.read_string(MACOS_SYSTEM_VERSION)?;
    let values = parsers::parse_macos_system_version(&content)?;

    evidence.name = "macos".to_string();
    if let Some(title) = values.get("ProductName") {
        evidence.title = title.clone();
    }
    if let Some(version) = values.get("ProductVersion") {
        evidence.version = version.clone();
    }
    if let Some(build) = values.get("ProductBuildVersion") {
        evidence.build = build.clone();
    }
    Ok(true)
}

/// Darwin without a readable system version, e.g. a bare Darwin kernel.
pub(super) fn detect_darwin(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    if evidence.version.is_empty() {
        if let Ok(release) = probe.uname_r() {
            evidence.version = release;
        }
    }
    Ok(true)
}

fn detect_bsd_variant(
    evidence: &mut Evidence,
    probe: &ReleaseProbe<'_>,
    needle: &str,
    name: &str,
) -> Result<bool> {
    if !evidence.name.contains(needle) {
        return Ok(false);
    }

    evidence.name = name.to_string();
    if let Ok(release) = probe.uname_r() {
        evidence.version = release;
    }
    Ok(true)
}

pub(super) fn detect_netbsd(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    detect_bsd_variant(evidence, probe, "netbsd", "netbsd")
}

pub(super) fn detect_freebsd(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    detect_bsd_variant(evidence, probe, "freebsd", "freebsd")
}

pub(super) fn detect_openbsd(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    detect_bsd_variant(evidence, probe, "openbsd", "openbsd")
}

pub(super) fn detect_dragonflybsd(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    detect_bsd_variant(evidence, probe, "dragonfly", "dragonflybsd")
}

/// ESXi ships BusyBox, so it has to be claimed before the linux family.
pub(super) fn detect_esx_family(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let unames = probe.uname_s()?;
    if !unames.to_lowercase().contains("vmkernel") {
        return Ok(false);
    }

    evidence.name = "esxi".to_string();
    evidence.title = "VMware ESXi".to_string();
    if let Ok(arch) = probe.uname_m() {
        evidence.arch = arch;
    }
    Ok(true)
}

pub(super) fn detect_esxi(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    match probe
        .command("vmware -v")
        .and_then(|banner| parsers::parse_esxi_release(&banner))
    {
        Ok(version) => evidence.version = version,
        Err(err) => log::debug!("platform> cannot read esxi version: {err}"),
    }
    Ok(true)
}

pub(super) fn detect_solaris(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let unames = probe.uname_s()?;
    if !unames.to_lowercase().contains("sunos") {
        return Ok(false);
    }

    if let Ok(arch) = probe.uname_m() {
        evidence.arch = arch;
    }
    evidence.name = "solaris".to_string();

    let content = match probe.read_string(SOLARIS_RELEASE) {
        Ok(content) => content,
        Err(err) => {
            log::debug!("platform> sunos without /etc/release: {err}");
            return Ok(false);
        }
    };

    match parsers::parse_solaris_release(&content) {
        Ok(release) => {
            evidence.name = release.id;
            evidence.title = release.title;
            evidence.version = release.release;
        }
        Err(err) => log::debug!("platform> cannot parse /etc/release: {err}"),
    }
    Ok(true)
}

pub(super) fn detect_aix(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let unames = probe.uname_s()?;
    if !unames.to_lowercase().contains("aix") {
        return Ok(false);
    }

    evidence.name = "aix".to_string();
    evidence.title = "AIX".to_string();

    match probe.command("uname -rvp") {
        Ok(output) => {
            if let Some((version, arch)) = parsers::parse_aix_uname(&output) {
                evidence.version = version;
                evidence.arch = arch;
            }
        }
        Err(err) => log::debug!("platform> cannot run uname -rvp: {err}"),
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RecordingTransport;

    #[test]
    fn test_darwin_slug() {
        assert_eq!(darwin_slug("Mac OS X"), "macos");
        assert_eq!(darwin_slug("macOS"), "macos");
        assert_eq!(darwin_slug("Darwin Kernel"), "darwin_kernel");
    }

    #[test]
    fn test_bsd_family_records_uname() {
        let transport = RecordingTransport::from_toml(
            r#"
[commands."uname -s"]
stdout = "FreeBSD\n"

[commands."uname -m"]
stdout = "amd64\n"

[commands."uname -r"]
stdout = "12.0-CURRENT\n"
"#,
        )
        .unwrap();
        let probe = ReleaseProbe::new(&transport);
        let mut evidence = Evidence::default();

        assert!(detect_bsd_family(&mut evidence, &probe).unwrap());
        assert_eq!(evidence.name, "freebsd");
        assert_eq!(evidence.title, "FreeBSD");
        assert_eq!(evidence.arch, "amd64");

        assert!(!detect_darwin_family(&mut evidence, &probe).unwrap());
        assert!(!detect_netbsd(&mut evidence, &probe).unwrap());
        assert!(detect_freebsd(&mut evidence, &probe).unwrap());
        assert_eq!(evidence.version, "12.0-CURRENT");
    }

    #[test]
    fn test_static_target_fails_uname_gates() {
        let transport = RecordingTransport::from_toml("[transport]\nkind = \"tar\"\n").unwrap();
        let probe = ReleaseProbe::new(&transport);
        assert!(detect_bsd_family(&mut Evidence::default(), &probe).is_err());
        assert!(detect_solaris(&mut Evidence::default(), &probe).is_err());
    }

    #[test]
    fn test_aix() {
        let transport = RecordingTransport::from_toml(
            r#"
[commands."uname -s"]
stdout = "AIX\n"

[commands."uname -rvp"]
stdout = "1 7 powerpc\n"
"#,
        )
        .unwrap();
        let mut evidence = Evidence::default();
        assert!(detect_aix(&mut evidence, &ReleaseProbe::new(&transport)).unwrap());
        assert_eq!(evidence.version, "7.1");
        assert_eq!(evidence.arch, "powerpc");
    }
}

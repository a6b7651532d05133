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

use regex::Regex;
use std::sync::LazyLock;

static BUSYBOX_BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(.+?)\s(v[\d.]+)\s*\((.*)\).*$").expect("valid busybox banner regex")
});

static AIX_UNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+(\d+)\s+(.*)").expect("valid aix uname regex"));

static PLCNEXT_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Arpversion:\s+(.*?)\s*$").expect("valid arpversion regex"));

static PLCNEXT_BUILD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^GIT Commit Hash:\s+(.*?)\s*$").expect("valid commit hash regex")
});

/// Split a `BusyBox v1.34.1 (2021-11-23 15:31:21 UTC) multi-call binary.`
/// banner into `(title, release)`.
pub fn parse_busybox_banner(line: &str) -> Option<(String, String)> {
    let caps = BUSYBOX_BANNER.captures(line.trim_end())?;
    Some((caps[1].trim().to_string(), caps[2].to_string()))
}

/// Find the BusyBox banner inside the NUL separated strings of a static
/// busybox binary.
pub fn scan_busybox_binary(content: &[u8]) -> Option<(String, String)> {
    content
        .split(|byte| *byte == 0)
        .filter(|chunk| !chunk.is_empty())
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .filter_map(parse_busybox_banner)
        .find(|(title, _)| title.eq_ignore_ascii_case("busybox"))
}

/// `uname -rvp` on AIX prints release, version and processor:
/// `"1 7 powerpc"` yields `("7.1", "powerpc")`.
pub fn parse_aix_uname(content: &str) -> Option<(String, String)> {
    let caps = AIX_UNAME.captures(content.trim())?;
    Some((format!("{}.{}", &caps[2], &caps[1]), caps[3].trim().to_string()))
}

/// Version and optional commit hash from `/etc/plcnext/arpversion`.
pub fn parse_plcnext_version(content: &str) -> Option<(String, Option<String>)> {
    let version = PLCNEXT_VERSION.captures(content)?[1].to_string();
    let build = PLCNEXT_BUILD
        .captures(content)
        .map(|caps| caps[1].to_string());
    Some((version, build))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busybox_banner() {
        let (title, release) =
            parse_busybox_banner("BusyBox v1.34.1 (2021-11-23 15:31:21 UTC) multi-call binary.\n")
                .unwrap();
        assert_eq!(title, "BusyBox");
        assert_eq!(release, "v1.34.1");

        assert!(parse_busybox_banner("Usage: ls [OPTION]... [FILE]...").is_none());
    }

    #[test]
    fn test_scan_busybox_binary() {
        let mut binary = b"\x7fELF\x02\x01\x01\0\0\0garbage\0".to_vec();
        binary.extend_from_slice(b"Toybox v0.8.0 (2019-01-01)\0");
        binary.extend_from_slice(b"BusyBox v1.31.1 (2020-01-07 20:47:31 UTC)\0more\0");

        let (title, release) = scan_busybox_binary(&binary).unwrap();
        assert_eq!(title, "BusyBox");
        assert_eq!(release, "v1.31.1");

        assert!(scan_busybox_binary(b"\0\0nothing here\0").is_none());
    }

    #[test]
    fn test_aix_uname() {
        assert_eq!(
            parse_aix_uname("1 7 powerpc\n"),
            Some(("7.1".to_string(), "powerpc".to_string()))
        );
        assert!(parse_aix_uname("AIX").is_none());
    }

    #[test]
    fn test_plcnext_version() {
        let content = "Arpversion: 23.0.0.65\nGIT Commit Hash: d755854b5b21ecb8dca26b0a560e6842a0c638d7\nBuild Job: 1234\n";
        let (version, build) = parse_plcnext_version(content).unwrap();
        assert_eq!(version, "23.0.0.65");
        assert_eq!(
            build.as_deref(),
            Some("d755854b5b21ecb8dca26b0a560e6842a0c638d7")
        );

        let (_, build) = parse_plcnext_version("Arpversion: 22.0.4.144\n").unwrap();
        assert!(build.is_none());
        assert!(parse_plcnext_version("Version: 1\n").is_none());
    }
}

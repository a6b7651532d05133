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

mod common;

use cnquery::Detector;
use common::{assert_platform, fixtures_dir, load_fixture};
use std::fs;
use std::sync::Arc;

fn check_fixture(name: &str) {
    let (transport, expected) = load_fixture(name);
    let detector = Detector::for_transport(Arc::new(transport));
    let platform = detector
        .platform()
        .unwrap_or_else(|e| panic!("{name}: detection failed: {e}"));
    assert_platform(name, &platform, &expected);
}

macro_rules! detect_fixtures {
    ($($test:ident => $fixture:literal),+ $(,)?) => {
        $(
            #[test]
            fn $test() {
                check_fixture($fixture);
            }
        )+
    };
}

detect_fixtures! {
    test_rhel6 => "rhel6",
    test_rhel7 => "rhel7",
    test_rhel8 => "rhel8",
    test_rhel9 => "rhel9",
    test_centos6 => "centos6",
    test_centos7 => "centos7",
    test_centos8_stream => "centos8-stream",
    test_almalinux8 => "almalinux8",
    test_rocky8 => "rocky8",
    test_fedora29 => "fedora29",
    test_oracle6 => "oracle6",
    test_oracle7 => "oracle7",
    test_scientific7 => "scientific7",
    test_eurolinux8 => "eurolinux8",
    test_amazonlinux1 => "amazonlinux1",
    test_amazonlinux2 => "amazonlinux2",
    test_ubuntu1604 => "ubuntu1604",
    test_ubuntu1804 => "ubuntu1804",
    test_ubuntu1804_empty_values => "ubuntu1804-variant",
    test_debian7 => "debian7",
    test_debian9 => "debian9",
    test_debian10 => "debian10",
    test_raspbian10 => "raspbian10",
    test_kali => "kali",
    test_linuxmint19 => "linuxmint19",
    test_pop2004 => "pop2004",
    test_opensuse13 => "opensuse13",
    test_opensuse_leap15 => "opensuse-leap15",
    test_opensuse_tumbleweed => "opensuse-tumbleweed",
    test_sles11 => "sles11",
    test_sles12 => "sles12",
    test_suse_microos => "suse-microos",
    test_arch => "arch",
    test_manjaro => "manjaro",
    test_gentoo => "gentoo",
    test_alpine37 => "alpine37",
    test_alpine_edge => "alpine-edge",
    test_busybox => "busybox",
    test_photon3 => "photon3",
    test_wrlinux => "wrlinux",
    test_openwrt => "openwrt",
    test_ubios => "ubios",
    test_plcnext => "plcnext",
    test_buildroot => "buildroot",
    test_flatcar => "flatcar",
    test_debian10_image => "debian10-image",
    test_busybox_image => "busybox-image",
    test_scratch => "scratch",
    test_macos => "macos",
    test_darwin => "darwin",
    test_netbsd9 => "netbsd9",
    test_freebsd12 => "freebsd12",
    test_openbsd68 => "openbsd68",
    test_dragonflybsd58 => "dragonflybsd58",
    test_solaris11 => "solaris11",
    test_aix => "aix",
    test_esxi67 => "esxi67",
    test_windows2016 => "windows2016",
    test_windows2019 => "windows2019",
    test_unknown_os => "unknown",
}

/// Fixtures added without a dedicated test still have to resolve.
#[test]
fn test_every_fixture_resolves() {
    let mut names: Vec<String> = fs::read_dir(fixtures_dir())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter_map(|file| {
            file.strip_prefix("detect-")
                .and_then(|rest| rest.strip_suffix(".toml"))
                .map(str::to_string)
        })
        .collect();
    names.sort();

    assert!(names.len() >= 60);
    for name in &names {
        check_fixture(name);
    }
}

#[test]
fn test_os_release_id_is_kept_as_label() {
    let (transport, _) = load_fixture("oracle7");
    let platform = Detector::for_transport(Arc::new(transport))
        .platform()
        .unwrap();
    assert_eq!(platform.name, "oraclelinux");
    assert_eq!(platform.labels.get("distro-id").map(String::as_str), Some("ol"));
}

#[test]
fn test_oracle_release_file_alone_beats_redhat() {
    let (transport, _) = load_fixture("oracle6");
    let platform = Detector::for_transport(Arc::new(transport))
        .platform()
        .unwrap();
    assert_eq!(platform.name, "oraclelinux");
    assert!(platform.labels.is_empty());
}

#[test]
fn test_leaf_is_last_family_member() {
    let (transport, _) = load_fixture("ubuntu1804");
    let platform = Detector::for_transport(Arc::new(transport))
        .platform()
        .unwrap();
    assert_eq!(platform.parent_family(), Some("debian"));
    assert!(platform.is_family("linux"));
    assert!(!platform.is_family("redhat"));
}

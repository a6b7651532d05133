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

use cnquery::operating_systems;
use cnquery::parsers::{parse_os_release, parse_rhel_version, parse_win_wmic_os};
use cnquery::resolver::resolve_platform;
use cnquery::transport::RecordingTransport;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::fs;
use std::path::PathBuf;

const OS_RELEASE: &str = r#"NAME="Ubuntu"
VERSION="18.04.2 LTS (Bionic Beaver)"
ID=ubuntu
ID_LIKE=debian
PRETTY_NAME="Ubuntu 18.04.2 LTS"
VERSION_ID="18.04"
HOME_URL="https://www.ubuntu.com/"
SUPPORT_URL="https://help.ubuntu.com/"
VERSION_CODENAME=bionic
UBUNTU_CODENAME=bionic
"#;

const WMIC_2019: &str = "\r\r\nNode,BuildNumber,Caption,OSArchitecture,ProductType,Version\r\r\nWIN-ABC,17763,Microsoft Windows Server 2019 Datacenter,64-bit,3,10.0.17763\r\r\n";

fn load_recording(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("detect-{name}.toml"));
    fs::read_to_string(path).unwrap()
}

pub fn bench_parsers(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsers");

    group.bench_function("os_release", |b| {
        b.iter(|| parse_os_release(black_box(OS_RELEASE)))
    });

    let release_lines = vec![
        ("rhel", "Red Hat Enterprise Linux Server release 7.6 (Maipo)"),
        ("centos", "CentOS Linux release 7.6.1810 (Core)"),
        ("fedora", "Fedora release 29 (Twenty Nine)"),
    ];
    for (name, line) in release_lines {
        group.bench_with_input(BenchmarkId::new("rhel_version", name), &line, |b, line| {
            b.iter(|| parse_rhel_version(black_box(line)))
        });
    }

    group.bench_function("wmic_os", |b| {
        b.iter(|| parse_win_wmic_os(black_box(WMIC_2019.as_bytes())))
    });

    group.finish();
}

pub fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    let tree = operating_systems();

    for name in ["ubuntu1804", "rhel8", "alpine37", "windows2019", "scratch"] {
        let recording = load_recording(name);
        group.bench_with_input(BenchmarkId::new("resolve", name), &recording, |b, recording| {
            b.iter(|| {
                let transport = RecordingTransport::from_toml(recording).unwrap();
                resolve_platform(&tree, &transport)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parsers, bench_resolution);
criterion_main!(benches);

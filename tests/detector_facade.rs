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

use cnquery::error::{PlatformError, Result, get_exit_code};
use cnquery::models::platform::PlatformKind;
use cnquery::resolver::{Evidence, ResolverNode};
use cnquery::transport::{
    ApiTransport, FsTransport, RecordingTransport, ReleaseProbe, TarTransport, Transport,
    TransportKind,
};
use cnquery::{Detector, LocalPlatformCache, operating_systems};
use common::load_fixture;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::io::Write;
use std::sync::Arc;
use std::thread;
use tar::{Builder, EntryType, Header};
use tempfile::TempDir;

fn append_file<W: Write>(builder: &mut Builder<W>, path: &str, content: &[u8]) {
    let mut header = Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, path, content).unwrap();
}

fn append_symlink<W: Write>(builder: &mut Builder<W>, path: &str, target: &str) {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Symlink);
    header.set_size(0);
    builder.append_link(&mut header, path, target).unwrap();
}

#[test]
fn test_second_call_does_no_io() {
    let (transport, _) = load_fixture("centos7");
    let transport = Arc::new(transport);
    let detector = Detector::for_transport(transport.clone());

    let first = detector.platform().unwrap();
    let calls = transport.io_calls();
    assert!(calls > 0);

    let second = detector.platform().unwrap();
    assert_eq!(first, second);
    assert_eq!(transport.io_calls(), calls);
}

#[test]
fn test_concurrent_callers_resolve_once() {
    let (baseline, _) = load_fixture("debian10");
    let baseline = Arc::new(baseline);
    Detector::for_transport(baseline.clone()).platform().unwrap();
    let single_run = baseline.io_calls();

    let (transport, _) = load_fixture("debian10");
    let transport = Arc::new(transport);
    let detector = Arc::new(Detector::for_transport(transport.clone()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let detector = Arc::clone(&detector);
            thread::spawn(move || detector.platform().unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().name, "debian");
    }
    assert_eq!(transport.io_calls(), single_run);
}

#[test]
fn test_missing_transport() {
    let detector = Detector::new(None, Arc::new(operating_systems()));
    let err = detector.platform().unwrap_err();
    assert!(matches!(err, PlatformError::MissingTransport));
    assert_eq!(get_exit_code(&err), 3);
}

#[test]
fn test_empty_image_tar_is_scratch() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("image.tar");

    let mut builder = Builder::new(Vec::new());
    append_file(&mut builder, "hello", b"\x7fELF static binary");
    fs::write(&path, builder.into_inner().unwrap()).unwrap();

    let transport = TarTransport::open(&path)
        .unwrap()
        .with_arch("arm64")
        .as_container_image();
    let platform = Detector::for_transport(Arc::new(transport))
        .platform()
        .unwrap();

    assert!(platform.is_scratch());
    assert_eq!(platform.arch, "arm64");
    assert!(platform.family.is_empty());
    assert_eq!(platform.kind, Some(PlatformKind::ContainerImage));
    assert_eq!(platform.runtime.as_deref(), Some("docker-image"));
}

#[test]
fn test_alpine_image_tar_through_symlinks() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("alpine.tar.gz");

    let mut builder = Builder::new(Vec::new());
    append_file(
        &mut builder,
        "usr/lib/os-release",
        b"NAME=\"Alpine Linux\"\nID=alpine\nVERSION_ID=3.19.1\nPRETTY_NAME=\"Alpine Linux v3.19\"\n",
    );
    append_symlink(&mut builder, "etc/os-release", "../usr/lib/os-release");
    append_file(&mut builder, "etc/alpine-release", b"3.19.1\n");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&builder.into_inner().unwrap()).unwrap();
    fs::write(&path, encoder.finish().unwrap()).unwrap();

    let transport = TarTransport::open(&path).unwrap().with_arch("amd64");
    let platform = Detector::for_transport(Arc::new(transport))
        .platform()
        .unwrap();

    assert_eq!(platform.name, "alpine");
    assert_eq!(platform.title, "Alpine Linux v3.19");
    assert_eq!(platform.version, "3.19.1");
    assert_eq!(platform.arch, "amd64");
    assert_eq!(platform.family, vec!["os", "unix", "linux"]);
    assert_eq!(platform.kind, None);
}

#[test]
fn test_unpacked_image_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("etc")).unwrap();
    fs::write(
        temp_dir.path().join("etc/os-release"),
        "PRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\nID=debian\nVERSION_ID=\"12\"\n",
    )
    .unwrap();
    fs::write(temp_dir.path().join("etc/debian_version"), "12.5\n").unwrap();

    let transport = FsTransport::new(temp_dir.path()).unwrap().with_arch("s390x");
    let platform = Detector::for_transport(Arc::new(transport))
        .platform()
        .unwrap();

    assert_eq!(platform.name, "debian");
    assert_eq!(platform.version, "12.5");
    assert_eq!(platform.arch, "s390x");
    assert_eq!(platform.family, vec!["os", "unix", "linux", "debian"]);
}

#[test]
fn test_api_transport_bypasses_tree() {
    let transport = ApiTransport::new("github-org", "GitHub Organization")
        .with_family(&["github"])
        .with_runtime("github");
    let platform = Detector::for_transport(Arc::new(transport))
        .platform()
        .unwrap();

    assert_eq!(platform.name, "github-org");
    assert_eq!(platform.family, vec!["github"]);
    assert_eq!(platform.kind, Some(PlatformKind::Api));
    assert_eq!(platform.runtime.as_deref(), Some("github"));
}

#[test]
fn test_api_version_failure_surfaces() {
    let transport = ApiTransport::new("k8s-cluster", "Kubernetes Cluster").with_version_probe(|| {
        Err(PlatformError::CommandFailed {
            command: "GET /version".to_string(),
            message: "connection refused".to_string(),
        })
    });
    let err = Detector::for_transport(Arc::new(transport))
        .platform()
        .unwrap_err();

    assert_eq!(err.to_string(), "could not determine k8s-cluster version");
    assert_eq!(get_exit_code(&err), 4);
}

#[test]
fn test_shared_cache_resolves_local_machine_once() {
    let local = |os_release: &str| {
        RecordingTransport::from_toml(&format!(
            "[transport]\nkind = \"local\"\n\n[commands.\"uname -s\"]\nstdout = \"Linux\"\n\n[files.\"/etc/os-release\"]\ncontent = '''\n{os_release}'''\n"
        ))
        .unwrap()
    };

    let cache = Arc::new(LocalPlatformCache::new());
    let first = Arc::new(local("ID=ubuntu\nVERSION_ID=\"22.04\"\n"));
    let second = Arc::new(local("ID=fedora\nVERSION_ID=39\n"));

    let platform = Detector::for_transport(first.clone())
        .with_shared_cache(cache.clone())
        .platform()
        .unwrap();
    assert_eq!(platform.name, "ubuntu");

    let platform = Detector::for_transport(second.clone())
        .with_shared_cache(cache.clone())
        .platform()
        .unwrap();
    assert_eq!(platform.name, "ubuntu");
    assert_eq!(second.io_calls(), 0);

    let platform = Detector::for_transport(second).platform().unwrap();
    assert_eq!(platform.name, "fedora");
}

#[test]
fn test_shared_cache_ignores_remote_transports() {
    let cache = Arc::new(LocalPlatformCache::new());
    cache
        .get_or_resolve(|| Ok(cnquery::Platform::scratch("amd64")))
        .unwrap();

    let (transport, expected) = load_fixture("sles12");
    let platform = Detector::for_transport(Arc::new(transport))
        .with_shared_cache(cache)
        .platform()
        .unwrap();
    assert_eq!(platform.name, expected.name);
}

#[test]
fn test_recorded_ssh_host_is_resolved_per_detector() {
    let cache = Arc::new(LocalPlatformCache::new());
    cache
        .get_or_resolve(|| Ok(cnquery::Platform::scratch("amd64")))
        .unwrap();

    let transport = RecordingTransport::from_toml(
        "[transport]\nkind = \"ssh\"\n\n[commands.\"uname -s\"]\nstdout = \"Linux\"\n\n[files.\"/etc/os-release\"]\ncontent = \"ID=alpine\\nVERSION_ID=3.18.4\\n\"\n",
    )
    .unwrap();
    assert_eq!(transport.kind(), TransportKind::Ssh);

    let platform = Detector::for_transport(Arc::new(transport))
        .with_shared_cache(cache)
        .platform()
        .unwrap();
    assert_eq!(platform.name, "alpine");
    assert_eq!(platform.version, "3.18.4");
}

fn detect_appliance(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    let version = probe.read_string("/etc/appliance-version")?;
    evidence.name = "appliance".to_string();
    evidence.version = version.trim().to_string();
    Ok(true)
}

fn detect_root(_evidence: &mut Evidence, _probe: &ReleaseProbe<'_>) -> Result<bool> {
    Ok(true)
}

fn detect_nothing(_evidence: &mut Evidence, _probe: &ReleaseProbe<'_>) -> Result<bool> {
    Ok(false)
}

#[test]
fn test_custom_tree() {
    let tree = ResolverNode::family(
        "os",
        detect_root,
        vec![
            ResolverNode::leaf("never", detect_nothing),
            ResolverNode::leaf("appliance", detect_appliance),
        ],
    );
    let transport: Arc<dyn Transport> = Arc::new(
        RecordingTransport::from_toml("[files.\"/etc/appliance-version\"]\ncontent = \"4.2\\n\"\n")
            .unwrap(),
    );

    let platform = Detector::new(Some(transport), Arc::new(tree))
        .platform()
        .unwrap();
    assert_eq!(platform.name, "appliance");
    assert_eq!(platform.version, "4.2");
    assert_eq!(platform.family, vec!["os"]);
}

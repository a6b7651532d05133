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

use super::{Evidence, ResolverNode, always, linux, unix, windows};
use crate::error::Result;
use crate::models::platform::{
    FAMILY_BSD, FAMILY_DARWIN, FAMILY_LINUX, FAMILY_OS, FAMILY_UNIX, FAMILY_WINDOWS, UNKNOWN_OS,
};
use crate::transport::ReleaseProbe;

/// Build the operating system resolver tree.
///
/// Child order is the tie-break order. Specific distributions come before
/// the generic ones they resemble (Oracle before Red Hat, ESXi before
/// linux), and every family that must always produce an answer ends in a
/// catch-all leaf.
pub fn operating_systems() -> ResolverNode {
    ResolverNode::family(
        FAMILY_OS,
        always,
        vec![
            unix_family(),
            ResolverNode::family(
                FAMILY_WINDOWS,
                always,
                vec![ResolverNode::leaf("windows", windows::detect_windows)],
            ),
            ResolverNode::leaf(UNKNOWN_OS, detect_unknown_os),
        ],
    )
}

fn unix_family() -> ResolverNode {
    ResolverNode::family(
        FAMILY_UNIX,
        always,
        vec![
            bsd_family(),
            ResolverNode::family(
                "esx",
                unix::detect_esx_family,
                vec![ResolverNode::leaf("esxi", unix::detect_esxi)],
            ),
            linux_family(),
            ResolverNode::leaf("solaris", unix::detect_solaris),
            ResolverNode::leaf("aix", unix::detect_aix),
        ],
    )
}

fn bsd_family() -> ResolverNode {
    ResolverNode::family(
        FAMILY_BSD,
        unix::detect_bsd_family,
        vec![
            ResolverNode::family(
                FAMILY_DARWIN,
                unix::detect_darwin_family,
                vec![
                    ResolverNode::leaf("macos", unix::detect_macos),
                    ResolverNode::leaf("darwin", unix::detect_darwin),
                ],
            ),
            ResolverNode::leaf("netbsd", unix::detect_netbsd),
            ResolverNode::leaf("freebsd", unix::detect_freebsd),
            ResolverNode::leaf("openbsd", unix::detect_openbsd),
            ResolverNode::leaf("dragonflybsd", unix::detect_dragonflybsd),
        ],
    )
}

fn linux_family() -> ResolverNode {
    ResolverNode::family(
        FAMILY_LINUX,
        linux::detect_linux_family,
        vec![
            ResolverNode::family(
                "arch",
                linux::detect_arch_family,
                vec![
                    ResolverNode::leaf("arch", linux::detect_arch),
                    ResolverNode::leaf("manjaro", linux::detect_manjaro),
                ],
            ),
            ResolverNode::family(
                "redhat",
                linux::detect_redhat_family,
                vec![
                    ResolverNode::leaf("oracle", linux::detect_oracle),
                    ResolverNode::leaf("redhat", linux::detect_redhat),
                    ResolverNode::leaf("centos", linux::detect_centos),
                    ResolverNode::leaf("fedora", linux::detect_fedora),
                    ResolverNode::leaf("scientific", linux::detect_scientific),
                    ResolverNode::leaf("eurolinux", linux::detect_eurolinux),
                ],
            ),
            ResolverNode::family(
                "debian",
                always,
                vec![
                    ResolverNode::leaf("debian", linux::detect_debian),
                    ResolverNode::leaf("ubuntu", linux::detect_ubuntu),
                    ResolverNode::leaf("raspbian", linux::detect_raspbian),
                    ResolverNode::leaf("kali", linux::detect_kali),
                    ResolverNode::leaf("linuxmint", linux::detect_linuxmint),
                    ResolverNode::leaf("pop", linux::detect_pop),
                ],
            ),
            ResolverNode::family(
                "suse",
                always,
                vec![
                    ResolverNode::leaf("opensuse", linux::detect_opensuse),
                    ResolverNode::leaf("sles", linux::detect_sles),
                    ResolverNode::leaf("suse-microos", linux::detect_suse_microos),
                ],
            ),
            ResolverNode::leaf("amazonlinux", linux::detect_amazonlinux),
            ResolverNode::leaf("alpine", linux::detect_alpine),
            ResolverNode::leaf("gentoo", linux::detect_gentoo),
            ResolverNode::leaf("busybox", linux::detect_busybox),
            ResolverNode::leaf("photon", linux::detect_photon),
            ResolverNode::leaf("wrlinux", linux::detect_wrlinux),
            ResolverNode::leaf("openwrt", linux::detect_openwrt),
            ResolverNode::leaf("ubios", linux::detect_ubios),
            ResolverNode::leaf("plcnext", linux::detect_plcnext),
            ResolverNode::leaf("generic-linux", linux::detect_generic_linux),
        ],
    )
}

/// Last resort. Static images keep an empty name so they resolve as
/// scratch.
fn detect_unknown_os(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    log::debug!("platform> operating system is not known");
    if !probe.kind().is_static() {
        evidence.name = UNKNOWN_OS.to_string();
    }
    Ok(true)
}

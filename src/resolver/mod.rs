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

//! Platform resolution.
//!
//! A [`ResolverNode`] tree is walked depth first. Every node's detector
//! inspects the target and writes what it learns into a shared
//! [`Evidence`] record. The first leaf that matches ends the walk, and the
//! names of the family nodes above it become the platform's lineage.

mod linux;
mod tree;
mod unix;
mod windows;

pub use tree::operating_systems;

use crate::error::{PlatformError, Result};
use crate::models::platform::Platform;
use crate::transport::{ReleaseProbe, Transport};
use std::collections::BTreeMap;

/// Identification gathered while walking the tree.
///
/// Detectors run strictly in sequence and later ones read what earlier ones
/// wrote. Field ownership:
///
/// * `name`, `title`: set provisionally by the bsd and linux families (the
///   linux family clears them first), refined or renamed by leaves.
/// * `version`: linux family from lsb/os-release, overridden by the redhat
///   family and by leaves that read a more precise source.
/// * `build`: linux family (`BUILD_ID`), alpine edge, macos, plcnext, windows.
/// * `arch`: `uname -m` in the bsd, linux, solaris and esx gates, aix and
///   windows leaves. Static images get the transport's declared arch
///   afterwards.
/// * `labels`: linux family only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence {
    pub name: String,
    pub title: String,
    pub version: String,
    pub build: String,
    pub arch: String,
    pub labels: BTreeMap<String, String>,
}

impl Evidence {
    pub fn into_platform(self, family: Vec<String>) -> Platform {
        Platform {
            name: self.name,
            title: self.title,
            version: self.version,
            build: self.build,
            arch: self.arch,
            family,
            labels: self.labels,
            kind: None,
            runtime: None,
        }
    }
}

/// Detector of a node. `Ok(false)` means "not this node"; errors are
/// treated the same way by the walk but are logged.
pub type DetectFn = fn(&mut Evidence, &ReleaseProbe<'_>) -> Result<bool>;

pub enum NodeKind {
    /// Children in tie-break order: the first child that resolves wins.
    Family(Vec<ResolverNode>),
    Leaf,
}

pub struct ResolverNode {
    pub name: &'static str,
    pub kind: NodeKind,
    detect: DetectFn,
}

impl ResolverNode {
    pub fn family(name: &'static str, detect: DetectFn, children: Vec<ResolverNode>) -> Self {
        Self {
            name,
            kind: NodeKind::Family(children),
            detect,
        }
    }

    pub fn leaf(name: &'static str, detect: DetectFn) -> Self {
        Self {
            name,
            kind: NodeKind::Leaf,
            detect,
        }
    }

    pub fn is_family(&self) -> bool {
        matches!(self.kind, NodeKind::Family(_))
    }

    pub fn children(&self) -> &[ResolverNode] {
        match &self.kind {
            NodeKind::Family(children) => children,
            NodeKind::Leaf => &[],
        }
    }

    pub fn child_names(&self) -> Vec<&'static str> {
        self.children().iter().map(|child| child.name).collect()
    }

    /// First family node named `name`, depth first.
    pub fn find_family(&self, name: &str) -> Option<&ResolverNode> {
        if self.is_family() && self.name == name {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find_family(name))
    }

    pub fn detect(&self, evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
        (self.detect)(evidence, probe)
    }
}

/// Outcome of a successful walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Name of the leaf node that matched.
    pub leaf: &'static str,
    /// Family names from the root down to the leaf's parent.
    pub family: Vec<String>,
    pub evidence: Evidence,
}

struct Lineage {
    leaf: &'static str,
    family: Vec<String>,
}

fn walk(node: &ResolverNode, evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Option<Lineage> {
    let matched = match node.detect(evidence, probe) {
        Ok(matched) => matched,
        Err(err) if err.is_missing_evidence() => {
            log::trace!("platform> {} not applicable: {err}", node.name);
            return None;
        }
        Err(err) => {
            log::debug!("platform> {} detection failed: {err}", node.name);
            return None;
        }
    };

    if !matched {
        log::trace!("platform> {} did not match", node.name);
        return None;
    }

    match &node.kind {
        NodeKind::Leaf => {
            log::debug!("platform> matched {}", node.name);
            Some(Lineage {
                leaf: node.name,
                family: Vec::new(),
            })
        }
        NodeKind::Family(children) => {
            for child in children {
                if let Some(mut lineage) = walk(child, evidence, probe) {
                    lineage.family.insert(0, node.name.to_string());
                    return Some(lineage);
                }
            }
            log::debug!("platform> {} matched but none of its children did", node.name);
            None
        }
    }
}

/// Walk `root` against the target behind `probe`.
///
/// Returns `None` when no leaf matched. Evidence always starts empty.
pub fn resolve(root: &ResolverNode, probe: &ReleaseProbe<'_>) -> Option<Resolution> {
    let mut evidence = Evidence::default();
    let lineage = walk(root, &mut evidence, probe)?;
    Some(Resolution {
        leaf: lineage.leaf,
        family: lineage.family,
        evidence,
    })
}

/// Resolve the platform behind an OS-like transport.
///
/// Static images report the architecture they declare, since `uname -m`
/// cannot run there. An image in which nothing set a name is `scratch`.
pub fn resolve_platform(root: &ResolverNode, transport: &dyn Transport) -> Result<Platform> {
    let probe = ReleaseProbe::new(transport);
    let kind = transport.kind();

    let Resolution {
        leaf,
        family,
        mut evidence,
    } = resolve(root, &probe)
        .ok_or_else(|| PlatformError::ResolutionExhausted("operating system".to_string()))?;

    if kind.is_static() {
        if let Some(arch) = transport.declared_arch() {
            evidence.arch = arch;
        }
    }

    if evidence.name.is_empty() {
        if kind.is_static() {
            log::debug!("platform> no operating system files found, using scratch");
            return Ok(Platform::scratch(evidence.arch));
        }
        evidence.name = leaf.to_string();
    }

    Ok(evidence.into_platform(family))
}

/// Detector for umbrella families that only group their children.
pub(crate) fn always(_evidence: &mut Evidence, _probe: &ReleaseProbe<'_>) -> Result<bool> {
    Ok(true)
}

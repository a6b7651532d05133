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

use crate::config::DetectionConfig;
use crate::detector::Detector;
use crate::error::Result;
use crate::models::platform::Platform;
use crate::transport::{FsTransport, LocalTransport, RecordingTransport, TarTransport, Transport};
use colored::Colorize;
use comfy_table::{Table, presets::UTF8_FULL};
use std::path::PathBuf;
use std::sync::Arc;

/// Target of a `detect` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectTarget {
    Local,
    Tar {
        path: PathBuf,
        arch: Option<String>,
        container_image: bool,
    },
    Filesystem {
        root: PathBuf,
        arch: Option<String>,
    },
    Recording(PathBuf),
}

pub struct DetectCommand<'a> {
    config: &'a DetectionConfig,
}

impl<'a> DetectCommand<'a> {
    pub fn new(config: &'a DetectionConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self, target: &DetectTarget, json: bool) -> Result<()> {
        let transport = self.open_transport(target)?;
        let detector = Detector::from_config(transport, self.config);
        let platform = detector.platform()?;

        if json {
            println!("{}", serde_json::to_string_pretty(&platform)?);
        } else {
            print_platform(&platform);
        }
        Ok(())
    }

    pub fn open_transport(&self, target: &DetectTarget) -> Result<Arc<dyn Transport>> {
        let transport: Arc<dyn Transport> = match target {
            DetectTarget::Local => Arc::new(LocalTransport::from_config(self.config)),
            DetectTarget::Tar {
                path,
                arch,
                container_image,
            } => {
                let mut transport = TarTransport::open(path)?;
                if let Some(arch) = arch {
                    transport = transport.with_arch(arch.clone());
                }
                if *container_image {
                    transport = transport.as_container_image();
                }
                Arc::new(transport)
            }
            DetectTarget::Filesystem { root, arch } => {
                let mut transport = FsTransport::new(root.clone())?;
                if let Some(arch) = arch {
                    transport = transport.with_arch(arch.clone());
                }
                Arc::new(transport)
            }
            DetectTarget::Recording(path) => Arc::new(RecordingTransport::load(path)?),
        };

        log::debug!("Detecting platform through {} transport", transport.kind());
        Ok(transport)
    }
}

fn print_platform(platform: &Platform) {
    if platform.is_scratch() {
        println!("{}", "Image contains no operating system (scratch)".yellow());
    } else if platform.is_unknown() {
        println!("{}", "Operating system could not be identified".yellow());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);
    for (field, value) in platform_rows(platform) {
        table.add_row(vec![field.to_string(), value]);
    }

    println!("{}", "Detected platform:".bold());
    println!("{table}");
}

/// Table rows for `platform`. Empty fields other than the name are left out.
fn platform_rows(platform: &Platform) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Name", platform.name.clone()),
        ("Title", platform.title.clone()),
        ("Version", platform.version.clone()),
        ("Build", platform.build.clone()),
        ("Arch", platform.arch.clone()),
        ("Family", platform.family.join(" > ")),
        (
            "Kind",
            platform.kind.map(|kind| kind.to_string()).unwrap_or_default(),
        ),
        ("Runtime", platform.runtime.clone().unwrap_or_default()),
    ];
    rows.extend(
        platform
            .labels
            .iter()
            .map(|(key, value)| ("Label", format!("{key}={value}"))),
    );

    rows.retain(|(field, value)| *field == "Name" || !value.is_empty());
    rows
}

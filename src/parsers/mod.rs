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

//! Stateless parsers for the files and command outputs detectors read.
//!
//! Every parser either returns a complete record or an error; callers never
//! receive partially filled results.

mod banner;
mod darwin;
mod release;
mod windows;

pub use banner::{parse_aix_uname, parse_busybox_banner, parse_plcnext_version, scan_busybox_binary};
pub use darwin::{parse_darwin_release, parse_macos_system_version};
pub use release::{
    SolarisRelease, parse_esxi_release, parse_lsb_release, parse_os_release, parse_rhel_version,
    parse_solaris_release, parse_suse_title, parse_suse_version,
};
pub use windows::{
    WindowsCurrentVersion, WmicOs, parse_win_cim_os, parse_win_current_version, parse_win_wmic_os,
};

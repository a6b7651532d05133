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

use super::Evidence;
use crate::error::Result;
use crate::parsers::{self, WmicOs};
use crate::transport::ReleaseProbe;

const WMIC_OS: &str = "wmic os get * /format:csv";

const CIM_OS: &str = "Get-CimInstance -ClassName Win32_OperatingSystem | \
     Select-Object Caption,BuildNumber,OSArchitecture,Version,ProductType | ConvertTo-Json";

const CURRENT_VERSION: &str = "Get-ItemProperty -Path \
     'HKLM:\\SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion' -Name CurrentBuild, UBR | ConvertTo-Json";

fn query_operating_system(probe: &ReleaseProbe<'_>) -> Option<WmicOs> {
    match probe
        .command(WMIC_OS)
        .and_then(|output| parsers::parse_win_wmic_os(output.as_bytes()))
    {
        Ok(os) => return Some(os),
        Err(err) => log::debug!("platform> wmic unavailable: {err}"),
    }

    match probe
        .command(CIM_OS)
        .and_then(|output| parsers::parse_win_cim_os(output.as_bytes()))
    {
        Ok(os) => Some(os),
        Err(err) => {
            log::debug!("platform> Win32_OperatingSystem unavailable: {err}");
            None
        }
    }
}

/// Windows is identified from `Win32_OperatingSystem`, which needs a live
/// target. The update build revision comes from the registry.
pub(super) fn detect_windows(evidence: &mut Evidence, probe: &ReleaseProbe<'_>) -> Result<bool> {
    if !probe.can_run_commands() {
        log::debug!("platform> windows detection needs command access");
        return Ok(false);
    }

    let Some(os) = query_operating_system(probe) else {
        return Ok(false);
    };

    evidence.name = "windows".to_string();
    evidence.title = os.caption;
    evidence.version = os.build_number;
    evidence.arch = os.os_architecture;

    match probe
        .command(CURRENT_VERSION)
        .and_then(|output| parsers::parse_win_current_version(output.as_bytes()))
    {
        Ok(current) if current.ubr > 0 => evidence.build = current.ubr.to_string(),
        Ok(_) => {}
        Err(err) => log::debug!("platform> cannot read update build revision: {err}"),
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RecordingTransport;

    #[test]
    fn test_cim_fallback_without_wmic() {
        let transport = RecordingTransport::from_toml(&format!(
            r#"
[commands."{WMIC_OS}"]
stderr = "'wmic' is not recognized as an internal or external command"
exit_status = 1

[commands."{CIM_OS}"]
stdout = '{{"Caption": "Microsoft Windows 11 Pro", "BuildNumber": "22631", "OSArchitecture": "64-bit", "Version": "10.0.22631", "ProductType": 1}}'
"#
        ))
        .unwrap();

        let mut evidence = Evidence::default();
        assert!(detect_windows(&mut evidence, &ReleaseProbe::new(&transport)).unwrap());
        assert_eq!(evidence.name, "windows");
        assert_eq!(evidence.title, "Microsoft Windows 11 Pro");
        assert_eq!(evidence.version, "22631");
        assert!(evidence.build.is_empty());
    }

    #[test]
    fn test_static_target_is_not_windows() {
        let transport = RecordingTransport::from_toml("[transport]\nkind = \"tar\"\n").unwrap();
        assert!(!detect_windows(&mut Evidence::default(), &ReleaseProbe::new(&transport)).unwrap());
        assert_eq!(transport.io_calls(), 0);
    }
}

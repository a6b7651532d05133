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

//! Parsers for the Windows operating system queries.

use crate::error::{PlatformError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

/// The `Win32_OperatingSystem` fields used for detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WmicOs {
    pub node: String,
    pub name: String,
    pub caption: String,
    pub manufacturer: String,
    #[serde(rename = "OSArchitecture")]
    pub os_architecture: String,
    pub version: String,
    pub build_number: String,
    pub description: String,
    #[serde(rename = "OSType", deserialize_with = "string_or_number")]
    pub os_type: String,
    #[serde(deserialize_with = "string_or_number")]
    pub product_type: String,
}

/// `CurrentBuild` and update build revision from the registry key
/// `HKLM:\SOFTWARE\Microsoft\Windows NT\CurrentVersion`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WindowsCurrentVersion {
    #[serde(rename = "CurrentBuild", default)]
    pub current_build: String,
    #[serde(rename = "UBR", default)]
    pub ubr: u32,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn read_all(mut input: impl Read, format: &'static str) -> Result<String> {
    let mut content = String::new();
    input
        .read_to_string(&mut content)
        .map_err(|err| PlatformError::parse(format, err.to_string()))?;
    Ok(content)
}

/// Split one CSV record. Double-quoted fields may contain commas, and `""`
/// inside them is a literal quote.
fn split_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            other => field.push(other),
        }
    }
    fields.push(field);
    fields
}

/// Parse `wmic os get * /format:csv`.
///
/// wmic writes `\r\r\n` line endings and a leading blank line. Columns are
/// looked up by header name and exactly one data row is accepted. wmic does
/// not quote values, so surplus fields from commas in the free-text
/// `Description` are folded back into that column.
pub fn parse_win_wmic_os(input: impl Read) -> Result<WmicOs> {
    let content = read_all(input, "wmic csv")?;
    let normalized = content.replace('\r', "\n");
    let mut lines = normalized.lines().filter(|line| !line.trim().is_empty());

    let header = split_csv_row(
        lines
            .next()
            .ok_or_else(|| PlatformError::parse("wmic csv", "missing header row"))?,
    );
    let columns: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim(), idx))
        .collect();

    let mut rows: Vec<Vec<String>> = lines.map(split_csv_row).collect();
    if rows.len() != 1 {
        return Err(PlatformError::parse(
            "wmic csv",
            format!("unexpected amount of rows: {}", rows.len()),
        ));
    }
    let mut row = rows.remove(0);

    let surplus = row.len().saturating_sub(header.len());
    if surplus > 0 {
        if let Some(&idx) = columns.get("Description") {
            let merged = row[idx..=idx + surplus].join(",");
            row.drain(idx + 1..=idx + surplus);
            row[idx] = merged;
        }
    }

    let field = |name: &str| -> String {
        columns
            .get(name)
            .and_then(|idx| row.get(*idx))
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    };

    Ok(WmicOs {
        node: field("Node"),
        name: field("Name"),
        caption: field("Caption"),
        manufacturer: field("Manufacturer"),
        os_architecture: field("OSArchitecture"),
        version: field("Version"),
        build_number: field("BuildNumber"),
        description: field("Description"),
        os_type: field("OSType"),
        product_type: field("ProductType"),
    })
}

/// Parse `Get-CimInstance Win32_OperatingSystem | ConvertTo-Json`, used
/// where wmic has been removed from the system.
pub fn parse_win_cim_os(input: impl Read) -> Result<WmicOs> {
    let content = read_all(input, "Win32_OperatingSystem json")?;
    serde_json::from_str(&content)
        .map_err(|err| PlatformError::parse("Win32_OperatingSystem json", err.to_string()))
}

/// Parse the `ConvertTo-Json` output of the CurrentVersion registry key.
pub fn parse_win_current_version(input: impl Read) -> Result<WindowsCurrentVersion> {
    let content = read_all(input, "CurrentVersion json")?;
    serde_json::from_str(&content)
        .map_err(|err| PlatformError::parse("CurrentVersion json", err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WMIC_2019: &str = "\r\r\nNode,BootDevice,BuildNumber,BuildType,Caption,CodeSet,CountryCode,Manufacturer,Name,OSArchitecture,OSType,ProductType,Version,Description\r\r\nWIN-ABC,\\Device\\HarddiskVolume1,17763,Multiprocessor Free,Microsoft Windows Server 2019 Datacenter Evaluation,1252,1,Microsoft Corporation,Microsoft Windows Server 2019 Datacenter Evaluation|C:\\Windows|\\Device\\Harddisk0\\Partition2,64-bit,18,3,10.0.17763,\r\r\n";

    #[test]
    fn test_wmic_single_row() {
        let os = parse_win_wmic_os(WMIC_2019.as_bytes()).unwrap();
        assert_eq!(os.node, "WIN-ABC");
        assert_eq!(os.caption, "Microsoft Windows Server 2019 Datacenter Evaluation");
        assert_eq!(os.build_number, "17763");
        assert_eq!(os.os_architecture, "64-bit");
        assert_eq!(os.version, "10.0.17763");
        assert_eq!(os.os_type, "18");
        assert_eq!(os.product_type, "3");
        assert_eq!(os.manufacturer, "Microsoft Corporation");
        assert!(os.description.is_empty());
    }

    #[test]
    fn test_wmic_column_order_irrelevant() {
        let content = "Version,Caption,BuildNumber,OSArchitecture\n10.0.14393,Microsoft Windows Server 2016 Standard Evaluation,14393,64-bit\n";
        let os = parse_win_wmic_os(content.as_bytes()).unwrap();
        assert_eq!(os.caption, "Microsoft Windows Server 2016 Standard Evaluation");
        assert_eq!(os.build_number, "14393");
        assert!(os.node.is_empty());
    }

    #[test]
    fn test_wmic_quoted_field_with_comma() {
        let content = "Node,Description,Caption,BuildNumber\r\r\nWIN-ABC,\"Build agent, rack 4 \"\"east\"\"\",Microsoft Windows Server 2019 Standard,17763\r\r\n";
        let os = parse_win_wmic_os(content.as_bytes()).unwrap();
        assert_eq!(os.description, "Build agent, rack 4 \"east\"");
        assert_eq!(os.caption, "Microsoft Windows Server 2019 Standard");
        assert_eq!(os.build_number, "17763");
    }

    #[test]
    fn test_wmic_unquoted_description_with_commas() {
        let content = "Node,BuildNumber,Caption,Description,OSArchitecture,Version\nWIN-ABC,17763,Microsoft Windows Server 2019 Standard,web, db, cache,64-bit,10.0.17763\n";
        let os = parse_win_wmic_os(content.as_bytes()).unwrap();
        assert_eq!(os.description, "web, db, cache");
        assert_eq!(os.os_architecture, "64-bit");
        assert_eq!(os.version, "10.0.17763");
        assert_eq!(os.caption, "Microsoft Windows Server 2019 Standard");
    }

    #[test]
    fn test_wmic_row_count() {
        let header_only = "Node,Caption,BuildNumber\r\r\n";
        let err = parse_win_wmic_os(header_only.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("unexpected amount of rows"));

        let two_rows = "Node,Caption\nA,Windows\nB,Windows\n";
        let err = parse_win_wmic_os(two_rows.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("unexpected amount of rows"));

        assert!(parse_win_wmic_os("".as_bytes()).is_err());
    }

    #[test]
    fn test_cim_json() {
        let content = r#"{
    "Caption":  "Microsoft Windows 11 Pro",
    "BuildNumber":  "22631",
    "OSArchitecture":  "64-bit",
    "Version":  "10.0.22631",
    "ProductType":  1
}"#;
        let os = parse_win_cim_os(content.as_bytes()).unwrap();
        assert_eq!(os.caption, "Microsoft Windows 11 Pro");
        assert_eq!(os.build_number, "22631");
        assert_eq!(os.product_type, "1");
        assert!(os.os_type.is_empty());
    }

    #[test]
    fn test_current_version() {
        let content = r#"{
    "CurrentBuild":  "17763",
    "UBR":  720,
    "PSPath":  "Microsoft.PowerShell.Core\\Registry::HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion"
}"#;
        let cv = parse_win_current_version(content.as_bytes()).unwrap();
        assert_eq!(cv.current_build, "17763");
        assert_eq!(cv.ubr, 720);
        assert!(parse_win_current_version("not json".as_bytes()).is_err());
    }
}

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

use crate::error::{PlatformError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static SW_VERS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*([A-Za-z]+)[ \t]*:[ \t]*(.+?)[ \t]*\r?$").expect("valid sw_vers regex")
});

/// Parse `sw_vers` output (`ProductName:\tMac OS X`).
pub fn parse_darwin_release(content: &str) -> Result<HashMap<String, String>> {
    if content.trim().is_empty() {
        return Err(PlatformError::parse("sw_vers", "empty content"));
    }

    Ok(SW_VERS_LINE
        .captures_iter(content)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect())
}

#[derive(PartialEq)]
enum Slot {
    None,
    Key,
    Value,
}

/// Flatten the `<key>`/`<string>` pairs of `SystemVersion.plist`.
///
/// Non-string values (`<true/>`, `<integer>`, nested dicts) are skipped
/// together with their key.
pub fn parse_macos_system_version(content: &str) -> Result<HashMap<String, String>> {
    if content.trim().is_empty() {
        return Err(PlatformError::parse("SystemVersion.plist", "empty content"));
    }

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut values = HashMap::new();
    let mut buf = Vec::new();
    let mut slot = Slot::None;
    let mut pending_key: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                slot = match e.name().local_name().as_ref() {
                    b"key" => Slot::Key,
                    b"string" => Slot::Value,
                    _ => {
                        pending_key = None;
                        Slot::None
                    }
                };
            }
            Ok(Event::Empty(_)) => {
                pending_key = None;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| PlatformError::parse("SystemVersion.plist", err.to_string()))?
                    .into_owned();
                match slot {
                    Slot::Key => pending_key = Some(text),
                    Slot::Value => {
                        if let Some(key) = pending_key.take() {
                            values.insert(key, text);
                        }
                    }
                    Slot::None => {}
                }
            }
            Ok(Event::End(_)) => slot = Slot::None,
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(PlatformError::parse(
                    "SystemVersion.plist",
                    format!("error at position {}: {err}", reader.buffer_position()),
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    if values.is_empty() {
        return Err(PlatformError::parse(
            "SystemVersion.plist",
            "no key/string pairs",
        ));
    }
    Ok(values)
}

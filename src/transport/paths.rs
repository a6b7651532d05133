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

//! Path handling for transports that serve an image filesystem.
//!
//! Image paths always use `/` and are resolved against the image root, never
//! the host root, so links such as `/bin -> usr/bin` stay inside the image.

use std::collections::VecDeque;

const MAX_LINK_HOPS: usize = 40;

/// Normalize `path` to an absolute image path. `..` never climbs above `/`.
pub fn clean_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Whether an archive member name tries to climb out of the image.
pub fn escapes_root(path: &str) -> bool {
    path.split('/').any(|part| part == "..")
}

fn components(path: &str) -> VecDeque<String> {
    path.split('/')
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

/// Resolve every symlink along `path`.
///
/// `read_link` returns the link target of an image path, or `None` when the
/// path is not a symlink. Returns `None` on link loops.
pub fn resolve_links<F>(path: &str, read_link: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut pending = components(&clean_path(path));
    let mut resolved = String::new();
    let mut hops = 0;

    while let Some(part) = pending.pop_front() {
        let candidate = format!("{resolved}/{part}");
        match read_link(&candidate) {
            Some(target) => {
                hops += 1;
                if hops > MAX_LINK_HOPS {
                    log::debug!("Too many levels of symbolic links resolving {path}");
                    return None;
                }
                let base = if target.starts_with('/') {
                    String::new()
                } else {
                    resolved.clone()
                };
                let mut next = components(&clean_path(&format!("{base}/{target}")));
                next.extend(pending.drain(..));
                pending = next;
                resolved.clear();
            }
            None => resolved = candidate,
        }
    }

    if resolved.is_empty() {
        Some("/".to_string())
    } else {
        Some(resolved)
    }
}

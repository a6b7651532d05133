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

use crate::error::Result;
use crate::resolver::{ResolverNode, operating_systems};
use std::fmt::Write;

/// Prints the resolver tree in the order nodes are tried.
pub struct TreeCommand;

impl TreeCommand {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    pub fn execute(&self) -> Result<()> {
        print!("{}", render_tree(&operating_systems()));
        Ok(())
    }
}

/// One node per line, indented by depth. Families end in `/`.
pub fn render_tree(root: &ResolverNode) -> String {
    let mut out = String::new();
    render_node(root, 0, &mut out);
    out
}

fn render_node(node: &ResolverNode, depth: usize, out: &mut String) {
    let suffix = if node.is_family() { "/" } else { "" };
    let _ = writeln!(out, "{:indent$}{}{suffix}", "", node.name, indent = depth * 2);
    for child in node.children() {
        render_node(child, depth + 1, out);
    }
}

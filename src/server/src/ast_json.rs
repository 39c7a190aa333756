// Copyright 2026 The TagDex Authors
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

//! Renders a query AST as JSON for `/admin/parse`. Lives here rather than
//! as a `Serialize` impl on `tagdex_query::Node` so that crate stays free
//! of a serde dependency it otherwise has no use for.

use serde_json::{json, Value};
use tagdex_query::ast::{Node, NodeType};

fn type_name(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Query => "query",
        NodeType::And => "and",
        NodeType::Or => "or",
        NodeType::Without => "without",
        NodeType::Not => "not",
    }
}

pub fn node_to_json(node: &Node) -> Value {
    json!({
        "type": type_name(node.node_type),
        "query": node.query,
        "children": node.children.iter().map(node_to_json).collect::<Vec<_>>(),
    })
}

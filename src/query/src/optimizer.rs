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

//! Fixed-point rewriting of the query AST. Each pass walks the tree
//! bottom-up applying every rule in order; the loop stops once a whole
//! pass makes no change, or after [`MAX_PASSES`] passes, whichever comes
//! first.

use crate::ast::{Node, NodeType};

const MAX_PASSES: usize = 16;

pub fn optimize(root: &Node) -> Node {
    let mut root = root.clone();
    root.canonicalize();

    for _ in 0..MAX_PASSES {
        let mut changed = false;
        for rule in RULES {
            root = tree_walk(root, &mut |node| {
                let (out, hit) = rule(node);
                if hit {
                    changed = true;
                }
                out
            });
        }

        if !changed {
            break;
        }
    }

    root
}

type Rule = fn(Node) -> (Node, bool);

const RULES: &[Rule] = &[
    remove_unnecessary_nodes,
    simplify_flags,
    implement_not_using_without,
    combine_hierarchy,
    remove_self_canceling_without,
    simplify_children,
    simplify_canceling_operation_and_without,
    move_without_out_of_and,
];

/// Recurses into every child first (post-order), then applies `transform`
/// to the node itself.
fn tree_walk(mut node: Node, transform: &mut impl FnMut(Node) -> Node) -> Node {
    node.children = node
        .children
        .into_iter()
        .map(|child| tree_walk(child, transform))
        .collect();
    transform(node)
}

fn sorted(mut children: Vec<Node>) -> Vec<Node> {
    children.sort();
    children
}

/// Rules 1 and 3: double negation, empty AND/OR, and single-child nodes.
fn remove_unnecessary_nodes(node: Node) -> (Node, bool) {
    match node.node_type {
        NodeType::And if node.children.is_empty() => (Node::all(), true),
        NodeType::Or if node.children.is_empty() => (Node::empty(), true),
        NodeType::And | NodeType::Or | NodeType::Without if node.children.len() == 1 => {
            (node.children.into_iter().next().unwrap(), true)
        }
        NodeType::Not if node.children[0].node_type == NodeType::Not => {
            let mut inner = node.children.into_iter().next().unwrap();
            (inner.children.remove(0), true)
        }
        NodeType::Without if node.children[0].is_empty_term() => (Node::empty(), true),
        NodeType::Without if node.children[1..].iter().any(Node::is_all) => (Node::empty(), true),
        NodeType::And if node.children.iter().any(Node::is_empty_term) => (Node::empty(), true),
        NodeType::Or if node.children.iter().any(Node::is_all) => (Node::all(), true),
        _ => (node, false),
    }
}

/// Rule 13: the four flag terms `f:sfw`/`f:nsfw`/`f:nsfl`/`f:nsfp`
/// partition every item, so an OR of three of them is a NOT of the fourth.
fn simplify_flags(node: Node) -> (Node, bool) {
    if node.node_type != NodeType::Or || node.children.len() != 3 {
        return (node, false);
    }

    let terms: Vec<&str> = node
        .children
        .iter()
        .map(|c| {
            if c.node_type == NodeType::Query {
                c.query.as_str()
            } else {
                ""
            }
        })
        .collect();

    let has = |names: &[&str]| names.iter().all(|n| terms.contains(n));

    if has(&["f:sfw", "f:nsfw", "f:nsfp"]) {
        (Node::not(Node::query("f:nsfl")), true)
    } else if has(&["f:sfw", "f:nsfw", "f:nsfl"]) {
        (Node::not(Node::query("f:nsfp")), true)
    } else {
        (node, false)
    }
}

/// Rule 2: lowers NOT to WITHOUT(__all, x).
fn implement_not_using_without(node: Node) -> (Node, bool) {
    if node.node_type == NodeType::Not {
        let child = node.children.into_iter().next().unwrap();
        (Node::without(Node::all(), vec![child]), true)
    } else {
        (node, false)
    }
}

/// Rule 4: flattens nested AND/OR. Rule 5: flattens nested WITHOUT.
fn combine_hierarchy(node: Node) -> (Node, bool) {
    match node.node_type {
        NodeType::And | NodeType::Or => {
            if node.children.iter().any(|c| c.node_type == node.node_type) {
                let mut flat = Vec::new();
                for child in node.children {
                    if child.node_type == node.node_type {
                        flat.extend(child.children);
                    } else {
                        flat.push(child);
                    }
                }
                (Node::op(node.node_type, sorted(flat)), true)
            } else {
                (node, false)
            }
        }
        NodeType::Without => {
            let mut children = node.children;
            if children[0].node_type == NodeType::Without {
                let mut minuend_node = children.remove(0);
                minuend_node.children.extend(children);
                let minuend = minuend_node.children.remove(0);
                let subtrahends = sorted(minuend_node.children);
                (Node::without(minuend, subtrahends), true)
            } else {
                (Node::op(NodeType::Without, children), false)
            }
        }
        _ => (node, false),
    }
}

/// Rule 6: `WITHOUT(a, X...)` is `__empty` if some `X` equals `a`.
fn remove_self_canceling_without(node: Node) -> (Node, bool) {
    if node.node_type == NodeType::Without && node.children[1..].iter().any(|x| x == &node.children[0]) {
        (Node::empty(), true)
    } else {
        (node, false)
    }
}

/// Rule 9: drop noop children from OR/AND/WITHOUT-subtrahends and
/// deduplicate.
fn simplify_children(node: Node) -> (Node, bool) {
    let before = node.children.len();

    let after = match node.node_type {
        NodeType::Or => dedup(node.children.into_iter().filter(|c| !c.is_empty_term()).collect()),
        NodeType::And => dedup(node.children.into_iter().filter(|c| !c.is_all()).collect()),
        NodeType::Without => {
            let mut children = node.children;
            let minuend = children.remove(0);
            let mut subtrahends = dedup(children.into_iter().filter(|c| !c.is_empty_term()).collect());
            let mut out = vec![minuend];
            out.append(&mut subtrahends);
            out
        }
        _ => node.children,
    };

    let changed = after.len() != before;
    (Node::op(node.node_type, after), changed)
}

fn dedup(mut children: Vec<Node>) -> Vec<Node> {
    children.sort();
    children.dedup();
    children
}

/// Rules 10 and 11: cross-cancellation between WITHOUT and the AND/OR it
/// sits next to.
fn simplify_canceling_operation_and_without(node: Node) -> (Node, bool) {
    if node.node_type == NodeType::Without && node.children[0].node_type == NodeType::And {
        let minuend = &node.children[0];
        let cancels = node.children[1..].iter().any(|subtrahend| {
            subtrahend.node_type == NodeType::Query
                && minuend.children.iter().any(|c| c == subtrahend)
        });
        if cancels {
            return (Node::empty(), true);
        }
    }

    if node.node_type == NodeType::Or && node.children.iter().any(|c| c.node_type == NodeType::Without) {
        let mut children = node.children;
        let mut changed = false;

        'outer: for term_idx in 0..children.len() {
            if children[term_idx].node_type == NodeType::Without {
                continue;
            }
            let term = children[term_idx].clone();

            for without_idx in 0..children.len() {
                if children[without_idx].node_type != NodeType::Without {
                    continue;
                }
                if children[without_idx].children[1..].iter().any(|s| s == &term) {
                    children[without_idx].children.retain(|s| s != &term);
                    children.retain(|c| c != &term);
                    changed = true;
                    break 'outer;
                }
            }
        }

        return (Node::or(children), changed);
    }

    (node, false)
}

/// Rule 12: `AND(..., WITHOUT(m, s...), Z...) ⇒ WITHOUT(AND(m, Z...), s...)`.
fn move_without_out_of_and(node: Node) -> (Node, bool) {
    if node.node_type != NodeType::And {
        return (node, false);
    }

    if let Some(idx) = node.children.iter().position(|c| c.node_type == NodeType::Without) {
        let mut children = node.children;
        let without_node = children.remove(idx);
        let mut without_children = without_node.children.into_iter();
        let minuend = without_children.next().unwrap();
        let subtrahends: Vec<Node> = without_children.collect();

        children.push(minuend);
        let and_node = Node::and(sorted(children));
        (Node::without(and_node, subtrahends), true)
    } else {
        (node, false)
    }
}

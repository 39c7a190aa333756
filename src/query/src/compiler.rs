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

//! Post-order compilation of an optimized AST into an iterator tree.
//! `NOT` survives the optimizer only if optimization was skipped, so the
//! compiler still knows how to lower it directly via [`crate::ast::ALL_TERM`].

use tagdex_store::{iterator, BoxedIter};

use crate::ast::{Node, NodeType, ALL_TERM};
use crate::error::Result;

/// Resolves a leaf term to its posting-list iterator. Implementations
/// normalize the term (unless it is a reserved or prefixed term) and hash
/// it to a store key, then look up the key's posting list.
pub trait TermResolver {
    fn resolve(&self, term: &str) -> Result<BoxedIter>;
}

pub fn compile(node: &Node, resolver: &dyn TermResolver) -> Result<BoxedIter> {
    match node.node_type {
        NodeType::Query => {
            if node.is_empty_term() {
                Ok(iterator::empty())
            } else {
                resolver.resolve(&node.query)
            }
        }
        NodeType::And => {
            let children = compile_children(&node.children, resolver)?;
            Ok(iterator::and_n(children))
        }
        NodeType::Or => {
            let children = compile_children(&node.children, resolver)?;
            Ok(iterator::or_n(children))
        }
        NodeType::Without => {
            let children = compile_children(&node.children, resolver)?;
            Ok(iterator::diff_n(children))
        }
        NodeType::Not => {
            let all = resolver.resolve(ALL_TERM)?;
            let inner = compile(&node.children[0], resolver)?;
            Ok(iterator::diff_n(vec![all, inner]))
        }
    }
}

fn compile_children(children: &[Node], resolver: &dyn TermResolver) -> Result<Vec<BoxedIter>> {
    children.iter().map(|c| compile(c, resolver)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapResolver {
        lists: HashMap<String, Vec<i32>>,
    }

    impl TermResolver for MapResolver {
        fn resolve(&self, term: &str) -> Result<BoxedIter> {
            Ok(iterator::slice(
                self.lists.get(term).cloned().unwrap_or_default(),
            ))
        }
    }

    fn resolver(pairs: &[(&str, &[i32])]) -> MapResolver {
        MapResolver {
            lists: pairs.iter().map(|(k, v)| (k.to_string(), v.to_vec())).collect(),
        }
    }

    #[test]
    fn compiles_query_leaf() {
        let r = resolver(&[("cat", &[1, 2, 3])]);
        let iter = compile(&Node::query("cat"), &r).unwrap();
        assert_eq!(iterator::to_vec(iter), vec![1, 2, 3]);
    }

    #[test]
    fn compiles_empty_term_without_resolving() {
        let r = resolver(&[]);
        let iter = compile(&Node::empty(), &r).unwrap();
        assert_eq!(iterator::to_vec(iter), Vec::<i32>::new());
    }

    #[test]
    fn compiles_and_as_intersection() {
        let r = resolver(&[("a", &[1, 2, 3]), ("b", &[2, 3, 4])]);
        let node = Node::and(vec![Node::query("a"), Node::query("b")]);
        let iter = compile(&node, &r).unwrap();
        assert_eq!(iterator::to_vec(iter), vec![2, 3]);
    }

    #[test]
    fn compiles_or_as_union() {
        let r = resolver(&[("a", &[1, 3]), ("b", &[2, 3])]);
        let node = Node::or(vec![Node::query("a"), Node::query("b")]);
        let iter = compile(&node, &r).unwrap();
        assert_eq!(iterator::to_vec(iter), vec![1, 2, 3]);
    }

    #[test]
    fn compiles_without_as_difference() {
        let r = resolver(&[("a", &[1, 2, 3]), ("b", &[2])]);
        let node = Node::without(Node::query("a"), vec![Node::query("b")]);
        let iter = compile(&node, &r).unwrap();
        assert_eq!(iterator::to_vec(iter), vec![1, 3]);
    }

    #[test]
    fn compiles_not_via_all_minus_child() {
        let r = resolver(&[(ALL_TERM, &[1, 2, 3, 4]), ("b", &[2])]);
        let node = Node::not(Node::query("b"));
        let iter = compile(&node, &r).unwrap();
        assert_eq!(iterator::to_vec(iter), vec![1, 3, 4]);
    }
}

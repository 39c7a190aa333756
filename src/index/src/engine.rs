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

//! The query engine: lower-case, parse, optionally optimize, compile
//! against the live index, and drain the first 120 results. A panic
//! anywhere in compile/exec is caught at this boundary so a corrupted
//! posting list never takes down the whole process.

use std::panic::{self, AssertUnwindSafe};

use tagdex_query::{ast, compiler, optimizer, parser, Node, TermResolver};
use tagdex_store::{iterator, BoxedIter};

use crate::coordinator::{Coordinator, Live};
use crate::error::{IndexError, Result};
use crate::term_synthesis::{clean_string, hash_word};

const RESULT_LIMIT: usize = 120;

struct LiveResolver<'a> {
    live: &'a Live,
}

impl TermResolver for LiveResolver<'_> {
    fn resolve(&self, term: &str) -> tagdex_query::Result<BoxedIter> {
        let hash = term_hash(term);
        Ok(self.live.store.get_iterator(hash)?)
    }
}

/// Hashes a resolved query term to its store key. `__all` is reserved to
/// key 0; a term shaped like `x:y` (a prefixed label) is hashed as-is,
/// everything else goes through [`clean_string`] first.
fn term_hash(term: &str) -> u32 {
    if term == ast::ALL_TERM {
        return 0;
    }

    let normalized = if term.len() >= 2 && term.as_bytes()[1] == b':' {
        term.to_string()
    } else {
        clean_string(term)
    };

    hash_word(&normalized)
}

pub struct SearchOptions {
    pub older_than: i32,
    pub shuffle: bool,
    pub use_optimizer: bool,
}

pub fn search(coordinator: &Coordinator, query: &str, opts: &SearchOptions) -> Result<Vec<i32>> {
    let lowered = query.to_lowercase();
    let ast = parser::Parser::parse(&lowered)?;

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        run_search(coordinator, &ast, opts)
    }));

    match result {
        Ok(inner) => inner,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(IndexError::SearchInternal(message))
        }
    }
}

fn run_search(coordinator: &Coordinator, ast: &Node, opts: &SearchOptions) -> Result<Vec<i32>> {
    let optimized;
    let effective = if opts.use_optimizer {
        optimized = optimizer::optimize(ast);
        &optimized
    } else {
        ast
    };

    coordinator.with_read(|live| {
        let resolver = LiveResolver { live };
        let mut iter = compiler::compile(effective, &resolver)?;

        if opts.shuffle {
            iter = iterator::ShuffleIter::new(iter);
        } else if opts.older_than > 0 {
            iter.skip_until(-opts.older_than);
        }

        let limited = iterator::LimitIter::new(RESULT_LIMIT, iterator::NegateIter::new(iter));
        Ok(iterator::to_vec(limited))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::StoreState;
    use tagdex_common::Metrics;

    fn coordinator_with(pairs: &[(u32, &[i32])]) -> Coordinator {
        let mut store = tagdex_store::IterStore::new();
        for (key, values) in pairs {
            store.replace(*key, values).unwrap();
        }
        Coordinator::new(store, StoreState::default(), Metrics::new())
    }

    fn opts() -> SearchOptions {
        SearchOptions {
            older_than: 0,
            shuffle: false,
            use_optimizer: true,
        }
    }

    #[test]
    fn search_all_returns_descending_external_ids() {
        let all_hash = 0u32;
        let coordinator = coordinator_with(&[(all_hash, &[-3, -2, -1])]);
        let result = search(&coordinator, "", &opts()).unwrap();
        assert_eq!(result, vec![3, 2, 1]);
    }

    #[test]
    fn search_resolves_term_by_hash() {
        let key = hash_word("cat");
        let coordinator = coordinator_with(&[(key, &[-5, -1])]);
        let result = search(&coordinator, "cat", &opts()).unwrap();
        assert_eq!(result, vec![5, 1]);
    }

    #[test]
    fn search_respects_result_limit() {
        let key = hash_word("cat");
        let values: Vec<i32> = (1..=200).map(|i| -i).collect();
        let coordinator = coordinator_with(&[(key, &values)]);
        let result = search(&coordinator, "cat", &opts()).unwrap();
        assert_eq!(result.len(), RESULT_LIMIT);
        assert_eq!(result[0], 1);
    }

    #[test]
    fn search_with_older_than_skips_newer_ids() {
        let key = hash_word("cat");
        let coordinator = coordinator_with(&[(key, &[-5, -4, -3, -2, -1])]);
        let mut o = opts();
        o.older_than = 3;
        let result = search(&coordinator, "cat", &o).unwrap();
        assert_eq!(result, vec![3, 2, 1]);
    }

    #[test]
    fn malformed_query_surfaces_as_parse_error() {
        let coordinator = coordinator_with(&[]);
        let result = search(&coordinator, "(a", &opts());
        assert!(matches!(result, Err(IndexError::QueryParse(_))));
    }

    #[test]
    fn prefixed_term_is_hashed_without_normalization() {
        let key = hash_word("f:sfw");
        let coordinator = coordinator_with(&[(key, &[-1])]);
        let result = search(&coordinator, "f:sfw", &opts()).unwrap();
        assert_eq!(result, vec![1]);
    }
}

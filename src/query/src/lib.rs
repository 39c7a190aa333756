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

//! The boolean query language: lexer, AST, recursive-descent parser,
//! fixed-point optimizer and AST-to-iterator compiler.

pub mod ast;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod optimizer;
pub mod parser;

pub use ast::Node;
pub use compiler::{compile, TermResolver};
pub use error::{QueryError, Result};
pub use optimizer::optimize;
pub use parser::Parser;

/// Parses, optimizes and compiles `query` in one step.
pub fn compile_query(query: &str, resolver: &dyn TermResolver) -> Result<tagdex_store::BoxedIter> {
    let ast = Parser::parse(query)?;
    let optimized = optimize(&ast);
    compile(&optimized, resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapResolver(HashMap<String, Vec<i32>>);

    impl TermResolver for MapResolver {
        fn resolve(&self, term: &str) -> Result<tagdex_store::BoxedIter> {
            Ok(tagdex_store::iterator::slice(
                self.0.get(term).cloned().unwrap_or_default(),
            ))
        }
    }

    #[test]
    fn end_to_end_parses_optimizes_and_compiles() {
        let mut map = HashMap::new();
        map.insert("cat".to_string(), vec![1, 2, 3]);
        map.insert("dog".to_string(), vec![2, 3, 4]);
        let resolver = MapResolver(map);

        let iter = compile_query("cat & dog", &resolver).unwrap();
        assert_eq!(tagdex_store::iterator::to_vec(iter), vec![2, 3]);
    }

    #[test]
    fn double_not_optimizes_away_before_compiling() {
        let mut map = HashMap::new();
        map.insert(ast::ALL_TERM.to_string(), vec![1, 2, 3]);
        map.insert("a".to_string(), vec![1, 2, 3]);
        let resolver = MapResolver(map);

        let iter = compile_query("-(-a)", &resolver).unwrap();
        assert_eq!(tagdex_store::iterator::to_vec(iter), vec![1, 2, 3]);
    }
}

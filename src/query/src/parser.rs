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

//! Recursive-descent parser, one function per precedence level, low to
//! high: `without > or > and > base`. Juxtaposition of two base
//! expressions (no explicit `&`) is implicit AND.

use crate::ast::Node;
use crate::error::{QueryError, Result};
use crate::lexer::{Lexer, Token};

pub struct Parser {
    lexer: Lexer,
    next: Token,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer::new(input);
        let next = lexer.scan();
        Self { lexer, next }
    }

    pub fn parse(input: &str) -> Result<Node> {
        let mut parser = Parser::new(input);
        if parser.next == Token::Eof {
            return Ok(Node::all());
        }

        let node = parser.parse_without_expr()?;
        parser.expect(Token::Eof)?;
        Ok(node)
    }

    fn advance(&mut self) {
        if self.next != Token::Eof {
            self.next = self.lexer.scan();
        }
    }

    fn expect(&mut self, expect: Token) -> Result<()> {
        if self.next != expect {
            return Err(QueryError::UnexpectedToken {
                found: self.next.to_string(),
                expected: expect.to_string(),
            });
        }
        self.advance();
        Ok(())
    }

    fn parse_without_expr(&mut self) -> Result<Node> {
        let mut result = self.parse_or_expr()?;

        let mut subtrahends = Vec::new();
        while self.next == Token::OpWithout {
            self.advance();
            subtrahends.push(self.parse_or_expr()?);
        }

        if !subtrahends.is_empty() {
            result = Node::without(result, subtrahends);
        }

        Ok(result)
    }

    fn parse_or_expr(&mut self) -> Result<Node> {
        let mut children = vec![self.parse_and_expr()?];

        while self.next == Token::OpOr {
            self.advance();
            children.push(self.parse_and_expr()?);
        }

        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            Node::or(children)
        })
    }

    fn parse_and_expr(&mut self) -> Result<Node> {
        let mut children = vec![self.parse_base_expr()?];

        loop {
            match &self.next {
                Token::OpAnd => {
                    self.advance();
                    children.push(self.parse_base_expr()?);
                }
                Token::ParOpen | Token::Word(_) | Token::OpNot => {
                    children.push(self.parse_base_expr()?);
                }
                _ => break,
            }
        }

        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            Node::and(children)
        })
    }

    fn parse_base_expr(&mut self) -> Result<Node> {
        match self.next.clone() {
            Token::ParOpen => {
                self.advance();
                let node = self.parse_without_expr()?;
                self.expect(Token::ParClose)?;
                Ok(node)
            }
            Token::Word(word) => {
                self.advance();
                Ok(Node::query(word))
            }
            Token::OpWithout => {
                self.advance();
                Ok(Node::not(self.parse_base_expr()?))
            }
            Token::OpNot => {
                self.advance();
                Ok(Node::not(self.parse_base_expr()?))
            }
            other => Err(QueryError::UnexpectedBaseToken(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeType;

    #[test]
    fn empty_query_is_all() {
        assert_eq!(Parser::parse("").unwrap(), Node::all());
    }

    #[test]
    fn single_word_is_a_query_node() {
        assert_eq!(Parser::parse("cat").unwrap(), Node::query("cat"));
    }

    #[test]
    fn juxtaposition_is_implicit_and() {
        let node = Parser::parse("cat dog").unwrap();
        assert_eq!(node, Node::and(vec![Node::query("cat"), Node::query("dog")]));
    }

    #[test]
    fn explicit_and_operator() {
        let node = Parser::parse("cat & dog").unwrap();
        assert_eq!(node, Node::and(vec![Node::query("cat"), Node::query("dog")]));
    }

    #[test]
    fn or_binds_looser_than_and() {
        let node = Parser::parse("a b | c").unwrap();
        assert_eq!(
            node,
            Node::or(vec![
                Node::and(vec![Node::query("a"), Node::query("b")]),
                Node::query("c"),
            ])
        );
    }

    #[test]
    fn without_binds_loosest() {
        let node = Parser::parse("a | b - c").unwrap();
        assert_eq!(
            node,
            Node::without(
                Node::or(vec![Node::query("a"), Node::query("b")]),
                vec![Node::query("c")],
            )
        );
    }

    #[test]
    fn unary_minus_is_not() {
        let node = Parser::parse("-cat").unwrap();
        assert_eq!(node.node_type, NodeType::Not);
        assert_eq!(node.children[0], Node::query("cat"));
    }

    #[test]
    fn unary_bang_is_not() {
        let node = Parser::parse("!cat").unwrap();
        assert_eq!(node.node_type, NodeType::Not);
        assert_eq!(node.children[0], Node::query("cat"));
    }

    #[test]
    fn parentheses_override_precedence() {
        let node = Parser::parse("a (b | c)").unwrap();
        assert_eq!(
            node,
            Node::and(vec![Node::query("a"), Node::or(vec![Node::query("b"), Node::query("c")])])
        );
    }

    #[test]
    fn reserved_words_act_as_operators() {
        let node = Parser::parse("a and b").unwrap();
        assert_eq!(node, Node::and(vec![Node::query("a"), Node::query("b")]));

        let node = Parser::parse("a without b").unwrap();
        assert_eq!(node, Node::without(Node::query("a"), vec![Node::query("b")]));
    }

    #[test]
    fn unbalanced_parens_is_an_error() {
        assert!(Parser::parse("(a").is_err());
    }

    #[test]
    fn dangling_operator_is_an_error() {
        assert!(Parser::parse("a &").is_err());
    }

    #[test]
    fn word_with_colon_prefix_parses_whole() {
        assert_eq!(Parser::parse("f:sfw").unwrap(), Node::query("f:sfw"));
    }
}

//! Path expression parsers.
//!
//! [`PathParser`] is the seam between text and [`Selector`] trees;
//! [`LdPathParser`] is the chumsky implementation of the LDPath subset.

pub mod common;
mod grammar;

use crate::ast::Selector;
use crate::error::ParseError;
use crate::prefix::Prefixes;
use chumsky::Parser;
use common::format_errors;

/// Turns path expression text into a selector tree
pub trait PathParser: Send + Sync {
    /// Parse `input`, expanding compact IRIs against `prefixes`
    fn parse(&self, input: &str, prefixes: &Prefixes) -> Result<Selector, ParseError>;
}

/// LDPath-style expression parser
#[derive(Debug, Clone, Copy, Default)]
pub struct LdPathParser;

impl LdPathParser {
    pub fn new() -> Self {
        Self
    }
}

impl PathParser for LdPathParser {
    fn parse(&self, input: &str, prefixes: &Prefixes) -> Result<Selector, ParseError> {
        grammar::path_expression(prefixes.clone())
            .parse(input)
            .into_result()
            .map_err(|errs| {
                let error = ParseError::new(input, format_errors(&errs, input));
                match errs.first() {
                    Some(first) => error.at(first.span().start),
                    None => error,
                }
            })
    }
}

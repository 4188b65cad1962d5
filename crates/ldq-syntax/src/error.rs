//! Parse errors for path expressions.

use thiserror::Error;

/// A path expression could not be parsed.
///
/// `message` is a human-readable diagnostic with line and column
/// information; `offset` is the byte offset of the first error when known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid path expression `{input}`: {message}")]
pub struct ParseError {
    pub input: String,
    pub message: String,
    pub offset: Option<usize>,
}

impl ParseError {
    pub fn new(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            message: message.into(),
            offset: None,
        }
    }

    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Text that cannot be used as an IRI
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid IRI `{iri}`: {reason}")]
pub struct IriError {
    pub iri: String,
    pub reason: String,
}

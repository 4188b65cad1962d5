//! # ldq-syntax
//!
//! The input side of ldq: RDF node types, namespace prefix tables, the path
//! expression syntax tree and a parser for the LDPath subset ldq accepts.
//!
//! The query compiler in `ldq-query` only ever consumes [`Selector`] trees.
//! Text parsing lives behind the [`PathParser`] trait so callers can plug in
//! their own front end.
//!
//! ```rust
//! use ldq_syntax::{LdPathParser, PathParser, Prefixes, Selector};
//!
//! let parser = LdPathParser::new();
//! let selector = parser
//!     .parse("oa:hasBody/rdf:value", &Prefixes::common())
//!     .unwrap();
//!
//! assert!(matches!(selector, Selector::Path(_, _)));
//! ```

pub mod ast;
pub mod error;
pub mod node;
pub mod parser;
pub mod prefix;

pub use ast::{ComparisonOp, Selector, SelectorKind, Test, TestKind};
pub use error::{IriError, ParseError};
pub use node::{vocab, Iri, Literal, Node};
pub use parser::{LdPathParser, PathParser};
pub use prefix::Prefixes;

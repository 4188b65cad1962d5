//! Line-based fixture format.
//!
//! One statement per line, N-Triples / N-Quads style, with prefixed names
//! allowed after an `@prefix` declaration:
//!
//! ```text
//! @prefix ex: <http://example.org/> .
//! # comment
//! ex:e1 ex:hasValue ex:n1 .
//! <http://example.org/n1> ex:value "Value1" .
//! ex:n1 ex:score 42 <http://example.org/graph> .
//! ```

use crate::error::{StoreError, StoreResult};
use crate::quad::Quad;
use chumsky::prelude::*;
use ldq_syntax::parser::common::{format_errors, full_iri, iri, node, Extra};
use ldq_syntax::{Iri, Prefixes};

enum Line {
    Prefix(String, Iri),
    Statement(Quad),
}

fn line<'src>(prefixes: Prefixes) -> impl Parser<'src, &'src str, Line, Extra<'src>> {
    let prefix_name = any()
        .filter(|c: &char| c.is_alphanumeric() || *c == '_' || *c == '-')
        .repeated()
        .to_slice();

    let prefix_decl = just("@prefix")
        .ignore_then(prefix_name.padded())
        .then_ignore(just(':'))
        .then(full_iri().padded())
        .then_ignore(just('.'))
        .map(|(prefix, namespace): (&str, Iri)| Line::Prefix(prefix.to_string(), namespace));

    let statement = iri(prefixes.clone())
        .padded()
        .then(iri(prefixes.clone()).padded())
        .then(node(prefixes.clone()).padded())
        .then(iri(prefixes).padded().or_not())
        .then_ignore(just('.'))
        .map(|(((subject, predicate), object), graph)| {
            Line::Statement(Quad {
                subject,
                predicate,
                object,
                graph,
            })
        });

    prefix_decl.or(statement).padded().then_ignore(end())
}

/// Parse fixture text; `prefixes` seeds the prefix table
pub fn parse_fixture(text: &str, prefixes: &Prefixes) -> StoreResult<Vec<Quad>> {
    let mut prefixes = prefixes.clone();
    let mut quads = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        let parsed = line(prefixes.clone())
            .parse(content)
            .into_result()
            .map_err(|errs| StoreError::Fixture {
                line: index + 1,
                message: format_errors(&errs, content),
            })?;

        match parsed {
            Line::Prefix(prefix, namespace) => prefixes.insert(prefix, namespace.as_str()),
            Line::Statement(quad) => quads.push(quad),
        }
    }
    Ok(quads)
}

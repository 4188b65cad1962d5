//! Shared parser primitives for path expressions.
//!
//! Token-level chumsky parsers (names, IRIs, literals, numbers, keywords)
//! reused by the selector and test grammars.

use crate::node::{vocab, Iri, Literal, Node};
use crate::prefix::Prefixes;
use chumsky::extra;
use chumsky::prelude::*;

/// Extra type for parsers - uses Rich errors for better messages
pub type Extra<'src> = extra::Err<Rich<'src, char>>;

fn is_name_char(c: &char) -> bool {
    c.is_alphanumeric() || *c == '_' || *c == '-'
}

/// Parser for identifiers: alphanumeric + underscore
pub fn ident<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.to_string())
        .labelled("identifier")
}

/// Parser for `<http://...>`
pub fn full_iri<'src>() -> impl Parser<'src, &'src str, Iri, Extra<'src>> + Clone {
    just('<')
        .ignore_then(none_of("<>\" {}|^`\\").repeated().at_least(1).to_slice())
        .then_ignore(just('>'))
        .try_map(|s: &str, span| Iri::parse(s).map_err(|e| Rich::custom(span, e.to_string())))
        .labelled("IRI like <http://example.com/p>")
}

/// Parser for `prefix:local`, expanded against `prefixes`
pub fn prefixed_name<'src>(
    prefixes: Prefixes,
) -> impl Parser<'src, &'src str, Iri, Extra<'src>> + Clone {
    let prefix = any().filter(is_name_char).repeated().to_slice();
    let local = any().filter(is_name_char).repeated().at_least(1).to_slice();

    prefix
        .then_ignore(just(':'))
        .then(local)
        .labelled("prefixed name like oa:hasBody")
        .try_map(move |(prefix, local): (&str, &str), span| {
            let iri = prefixes
                .expand(prefix, local)
                .ok_or_else(|| Rich::custom(span, format!("unknown prefix '{}'", prefix)))?;
            Iri::parse(iri.as_str()).map_err(|e| Rich::custom(span, e.to_string()))
        })
}

/// Parser for either IRI form
pub fn iri<'src>(prefixes: Prefixes) -> impl Parser<'src, &'src str, Iri, Extra<'src>> + Clone {
    full_iri().or(prefixed_name(prefixes))
}

/// Parser for single-quoted string literals: 'value'
pub fn single_quoted_string<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    just('\'')
        .ignore_then(
            none_of("'")
                .repeated()
                .to_slice()
                .map(|s: &str| s.to_string()),
        )
        .then_ignore(just('\''))
        .labelled("single-quoted string")
}

/// Parser for double-quoted string literals: "value"
pub fn double_quoted_string<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    just('"')
        .ignore_then(
            none_of("\"")
                .repeated()
                .to_slice()
                .map(|s: &str| s.to_string()),
        )
        .then_ignore(just('"'))
        .labelled("double-quoted string")
}

/// Parser for string literals (single or double quoted)
pub fn string_literal<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    single_quoted_string()
        .or(double_quoted_string())
        .labelled("string literal")
}

/// Parser for language tags: `en`, `en-GB`
pub fn language_tag<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '-')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.to_string())
        .labelled("language tag like en")
}

/// Parser for integer literals
pub fn integer<'src>() -> impl Parser<'src, &'src str, usize, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .to_slice()
        .try_map(|s: &str, span| {
            s.parse::<usize>()
                .map_err(|_| Rich::custom(span, "integer overflow"))
        })
        .labelled("integer")
}

enum LiteralSuffix {
    Language(String),
    Datatype(Iri),
}

/// Parser for quoted literals with optional `@lang` or `^^datatype`
pub fn quoted_literal<'src>(
    prefixes: Prefixes,
) -> impl Parser<'src, &'src str, Literal, Extra<'src>> + Clone {
    let suffix = choice((
        just('@')
            .ignore_then(language_tag())
            .map(LiteralSuffix::Language),
        just("^^")
            .ignore_then(iri(prefixes))
            .map(LiteralSuffix::Datatype),
    ));

    string_literal()
        .then(suffix.or_not())
        .map(|(value, suffix)| match suffix {
            None => Literal::plain(value),
            Some(LiteralSuffix::Language(tag)) => Literal::lang(value, tag),
            Some(LiteralSuffix::Datatype(dt)) => Literal::typed(value, dt),
        })
}

/// Parser for bare numbers: `42`, `-3`, `2.5`
pub fn numeric_literal<'src>() -> impl Parser<'src, &'src str, Literal, Extra<'src>> + Clone {
    let digits = any().filter(|c: &char| c.is_ascii_digit()).repeated().at_least(1);

    just('-')
        .or_not()
        .then(digits.clone())
        .then(just('.').then(digits).or_not())
        .to_slice()
        .map(|s: &str| {
            if s.contains('.') {
                Literal::typed(s, vocab::XSD_DECIMAL)
            } else {
                Literal::typed(s, vocab::XSD_INTEGER)
            }
        })
        .labelled("number")
}

/// Parser for any literal
pub fn literal<'src>(prefixes: Prefixes) -> impl Parser<'src, &'src str, Literal, Extra<'src>> + Clone {
    quoted_literal(prefixes).or(numeric_literal())
}

/// Parser for a constant node: literal or IRI
pub fn node<'src>(prefixes: Prefixes) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    literal(prefixes.clone())
        .map(Node::from)
        .or(iri(prefixes).map(Node::from))
        .labelled("node")
}

/// Case-insensitive keyword matcher
pub fn kw<'src>(keyword: &'static str) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphabetic())
        .repeated()
        .at_least(1)
        .to_slice()
        .try_map(move |s: &str, span| {
            if s.eq_ignore_ascii_case(keyword) {
                Ok(())
            } else {
                Err(Rich::custom(
                    span,
                    format!("expected keyword '{}'", keyword),
                ))
            }
        })
        .padded()
}

/// Format chumsky errors for humans: one line per error with position
pub fn format_errors(errs: &[Rich<'_, char>], input: &str) -> String {
    errs.iter()
        .map(|e| {
            let start = e.span().start.min(input.len());
            let line = input[..start].lines().count().max(1);
            let col = start - input[..start].rfind('\n').map_or(0, |i| i + 1);

            let found = e
                .found()
                .map_or("end of input".to_string(), |c| format!("'{}'", c));

            format!(
                "Line {}, column {}: {} (found {})",
                line,
                col + 1,
                e.reason(),
                found
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

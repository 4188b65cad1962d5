//! Selector and test grammar.
//!
//! Precedence, loosest first: `|` (union), `&` (intersection), `/` (path),
//! then postfix `[test]`. Inside a test: `or`/`|`, `and`/`&`, `not`/`!`.

use crate::ast::{ComparisonOp, Selector, Test};
use crate::node::Node;
use crate::parser::common::{ident, integer, iri, kw, language_tag, literal, node, Extra};
use crate::prefix::Prefixes;
use chumsky::prelude::*;

/// A complete path expression: nothing may follow the selector
pub fn path_expression<'src>(
    prefixes: Prefixes,
) -> impl Parser<'src, &'src str, Selector, Extra<'src>> {
    selector(prefixes).padded().then_ignore(end())
}

/// Selector grammar (tests are parsed inside it since both recurse into each other)
pub fn selector<'src>(
    prefixes: Prefixes,
) -> impl Parser<'src, &'src str, Selector, Extra<'src>> + Clone {
    recursive(move |selector| {
        // ====================================================================
        // Tests: [ ... ]
        // ====================================================================

        let test = recursive({
            let selector = selector.clone();
            let prefixes = prefixes.clone();
            move |test| {
                let is_a = just("is-a")
                    .padded()
                    .ignore_then(node(prefixes.clone()))
                    .map(|node| Test::IsA(Box::new(Selector::Constant(node))))
                    .labelled("type test like is-a ex:Type");

                let language = just('@')
                    .ignore_then(language_tag())
                    .map(Test::Language)
                    .labelled("language test like @en");

                let datatype = just("^^")
                    .ignore_then(iri(prefixes.clone()))
                    .map(Test::Datatype)
                    .labelled("datatype test like ^^xsd:int");

                let op = choice((
                    just("!=").to(ComparisonOp::Ne),
                    just("<=").to(ComparisonOp::Le),
                    just(">=").to(ComparisonOp::Ge),
                    just("==").to(ComparisonOp::Eq),
                    just('=').to(ComparisonOp::Eq),
                    just('<').to(ComparisonOp::Lt),
                    just('>').to(ComparisonOp::Gt),
                ))
                .padded();

                // Literals on the right are constants; anything else is a path
                let operand = literal(prefixes.clone())
                    .map(|lit| Selector::Constant(Node::from(lit)))
                    .padded()
                    .or(selector.clone());

                let path_test = selector
                    .clone()
                    .then(
                        choice((
                            kw("is")
                                .ignore_then(node(prefixes.clone()).padded())
                                .map(|node| (None, Selector::Constant(node))),
                            op.then(operand).map(|(op, rhs)| (Some(op), rhs)),
                        ))
                        .or_not(),
                    )
                    .map(|(left, rhs)| match rhs {
                        None => Test::PathExists(Box::new(left)),
                        Some((None, right)) => Test::path_equality(left, right),
                        Some((Some(op), right)) => Test::comparison(op, left, right),
                    });

                let primary = choice((
                    is_a,
                    language,
                    datatype,
                    path_test,
                    test.clone().padded().delimited_by(just('('), just(')')),
                ))
                .padded();

                let negation = choice((just('!').ignored(), kw("not"))).padded();

                let unary = negation
                    .repeated()
                    .collect::<Vec<_>>()
                    .then(primary)
                    .map(|(nots, test)| nots.into_iter().fold(test, |inner, _| Test::not(inner)));

                let conjunction = unary
                    .clone()
                    .then(
                        choice((just('&').ignored(), kw("and")))
                            .padded()
                            .ignore_then(unary)
                            .repeated()
                            .collect::<Vec<_>>(),
                    )
                    .map(|(first, rest)| rest.into_iter().fold(first, Test::and));

                conjunction
                    .clone()
                    .then(
                        choice((just('|').ignored(), kw("or")))
                            .padded()
                            .ignore_then(conjunction)
                            .repeated()
                            .collect::<Vec<_>>(),
                    )
                    .map(|(first, rest)| rest.into_iter().fold(first, Test::or))
            }
        });

        // ====================================================================
        // Atoms
        // ====================================================================

        let function = just("fn:")
            .ignore_then(ident())
            .then(
                selector
                    .clone()
                    .padded()
                    .separated_by(just(','))
                    .collect::<Vec<_>>()
                    .delimited_by(just('(').padded(), just(')')),
            )
            .map(|(name, args)| Selector::Function { name, args })
            .labelled("function call like fn:lcase(ex:name)");

        let reverse = just('^')
            .ignore_then(iri(prefixes.clone()))
            .map(Selector::ReverseProperty)
            .labelled("reverse property like ^oa:hasBody");

        // *, +, {m,n}, {m,}, {,n}, {n}
        let quantifier = choice((
            just('*').to((0usize, None::<usize>)),
            just('+').to((1usize, None::<usize>)),
            integer()
                .padded()
                .or_not()
                .then_ignore(just(','))
                .then(integer().padded().or_not())
                .delimited_by(just('{'), just('}'))
                .map(|(min, max)| (min.unwrap_or(0), max)),
            integer()
                .padded()
                .delimited_by(just('{'), just('}'))
                .map(|n| (n, Some(n))),
        ));

        let grouped = selector
            .clone()
            .padded()
            .delimited_by(just('('), just(')'))
            .then(quantifier.or_not())
            .try_map(|(inner, quantifier), span| match quantifier {
                None => Ok(Selector::grouping(inner)),
                Some((min, Some(max))) if max < min => Err(Rich::custom(
                    span,
                    format!("recursion bounds {{{},{}}} are inverted", min, max),
                )),
                Some((min, max)) => Ok(Selector::recursive(inner, min, max)),
            });

        let atom = choice((
            function,
            reverse,
            grouped,
            just('.').to(Selector::SelfNode),
            just('*').to(Selector::Wildcard),
            literal(prefixes.clone()).map(|lit| Selector::Constant(Node::from(lit))),
            iri(prefixes.clone()).map(Selector::Property),
        ))
        .padded();

        // ====================================================================
        // Postfix tests and infix operators
        // ====================================================================

        let step = atom
            .then(
                test.padded()
                    .delimited_by(just('['), just(']'))
                    .padded()
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(atom, tests)| tests.into_iter().fold(atom, Selector::testing));

        let sequence = step
            .clone()
            .then(
                just('/')
                    .padded()
                    .ignore_then(step)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| rest.into_iter().fold(first, Selector::path));

        let intersection = sequence
            .clone()
            .then(
                just('&')
                    .padded()
                    .ignore_then(sequence)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| rest.into_iter().fold(first, Selector::intersection));

        intersection
            .clone()
            .then(
                just('|')
                    .padded()
                    .ignore_then(intersection)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| rest.into_iter().fold(first, Selector::union))
    })
}

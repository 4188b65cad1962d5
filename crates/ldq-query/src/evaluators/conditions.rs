//! Built-in test translations.
//!
//! `And`, `Or` and `Not` are scoped by the translator itself; the leaf tests
//! here append their patterns to the group they are given.

use crate::error::CompileError;
use crate::evaluators::selectors::operand;
use crate::expr::{Builtin, Expr};
use crate::pattern::{GroupPattern, Variable};
use crate::translate::Translator;
use ldq_syntax::{ComparisonOp, Iri, Literal, Node, Selector};

/// `is-a T`: `(ctx, rdf:type, T)`.
///
/// A constant type is purely structural (the expression is `true`). Any
/// other type selector is bound to a fresh type variable and compared.
pub(crate) fn is_a(
    t: &mut Translator<'_>,
    type_selector: &Selector,
    group: &mut GroupPattern,
    context: &Variable,
) -> Result<Expr, CompileError> {
    if let Selector::Constant(Node::Iri { iri }) = type_selector {
        group.add_triple(context, Iri::rdf_type(), iri);
        return Ok(Expr::True);
    }

    let type_var = t.fresh();
    group.add_triple(context, Iri::rdf_type(), &type_var);
    let expected = operand(t, type_selector, group, context)?;
    Ok(Expr::equals(Expr::var(&type_var), expected))
}

/// `left op right`, both sides evaluated from the same context
pub(crate) fn comparison(
    t: &mut Translator<'_>,
    op: ComparisonOp,
    left: &Selector,
    right: &Selector,
    group: &mut GroupPattern,
    context: &Variable,
) -> Result<Expr, CompileError> {
    let left = operand(t, left, group, context)?;
    let right = operand(t, right, group, context)?;
    Ok(Expr::compare(op, left, right))
}

/// `@en`: `langMatches(lang(?ctx), "en")`
pub(crate) fn language(tag: &str, context: &Variable) -> Expr {
    Expr::call(
        Builtin::LangMatches,
        vec![
            Expr::call(Builtin::Lang, vec![Expr::var(context)]),
            Expr::literal(Literal::plain(tag)),
        ],
    )
}

/// `^^dt`: `datatype(?ctx) = dt`
pub(crate) fn datatype(iri: &Iri, context: &Variable) -> Expr {
    Expr::equals(
        Expr::call(Builtin::Datatype, vec![Expr::var(context)]),
        Expr::iri(iri.clone()),
    )
}

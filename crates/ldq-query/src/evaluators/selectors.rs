//! Built-in selector translations.

use crate::error::CompileError;
use crate::expr::Expr;
use crate::pattern::{GroupPattern, Variable};
use crate::translate::Translator;
use ldq_syntax::{Iri, Node, Selector, Test};
use tracing::warn;

/// `p`: `(ctx, p, ?v)`
pub(crate) fn property(
    t: &mut Translator<'_>,
    iri: &Iri,
    group: &mut GroupPattern,
    context: &Variable,
) -> Variable {
    let out = t.fresh();
    group.add_triple(context, iri, &out);
    out
}

/// `^p`: `(?v, p, ctx)`
pub(crate) fn reverse(
    t: &mut Translator<'_>,
    iri: &Iri,
    group: &mut GroupPattern,
    context: &Variable,
) -> Variable {
    let out = t.fresh();
    group.add_triple(&out, iri, context);
    out
}

/// `*`: any property, the predicate is a variable too
pub(crate) fn wildcard(t: &mut Translator<'_>, group: &mut GroupPattern, context: &Variable) -> Variable {
    let predicate = t.fresh();
    let out = t.fresh();
    group.add_triple(context, &predicate, &out);
    out
}

pub(crate) fn constant(t: &mut Translator<'_>, node: &Node, group: &mut GroupPattern) -> Variable {
    let out = t.fresh();
    group.add_bind(Expr::Term(node.into()), out.clone());
    out
}

pub(crate) fn path(
    t: &mut Translator<'_>,
    left: &Selector,
    right: &Selector,
    group: &mut GroupPattern,
    context: &Variable,
) -> Result<Variable, CompileError> {
    let mid = t.selector(left, group, context)?;
    t.selector(right, group, &mid)
}

pub(crate) fn union(
    t: &mut Translator<'_>,
    left: &Selector,
    right: &Selector,
    group: &mut GroupPattern,
    context: &Variable,
) -> Result<Variable, CompileError> {
    let branches = [left, right];
    alternatives(t, group, context, branches.len(), |t, i, branch| {
        t.selector(branches[i], branch, context)
    })
}

pub(crate) fn intersection(
    t: &mut Translator<'_>,
    left: &Selector,
    right: &Selector,
    group: &mut GroupPattern,
    context: &Variable,
) -> Result<Variable, CompileError> {
    let l = t.selector(left, group, context)?;
    let r = t.selector(right, group, context)?;
    if l != r {
        group.add_filter(Expr::equals(Expr::var(&l), Expr::var(&r)));
    }
    Ok(l)
}

/// Unrolls `inner` for every depth in `min..=max`.
///
/// Without an upper bound, `recursion.max_depth` is used (or the query fails
/// when `recursion.strict` is set). No depth may exceed
/// `recursion.max_explicit_depth`.
pub(crate) fn recursive(
    t: &mut Translator<'_>,
    inner: &Selector,
    min: usize,
    max: Option<usize>,
    group: &mut GroupPattern,
    context: &Variable,
) -> Result<Variable, CompileError> {
    let ceiling = t.config().recursion.max_explicit_depth;
    let bound = match max {
        Some(max) if max < min => {
            return Err(CompileError::translation(format!(
                "recursive selector has inverted bounds {{{},{}}}",
                min, max
            )))
        }
        Some(max) => max,
        None => {
            let limit = t.config().recursion.max_depth;
            if t.config().recursion.strict {
                return Err(CompileError::RecursionLimit { min, bound: limit });
            }
            let bound = limit.max(min);
            warn!(
                selector = %inner,
                min,
                bound,
                "Unbounded recursion truncated to configured max_depth"
            );
            bound
        }
    };
    if bound > ceiling {
        return Err(CompileError::RecursionLimit {
            min,
            bound: ceiling,
        });
    }

    if min == bound && min > 0 {
        return repeat(t, inner, min, group, context);
    }
    let count = (bound - min)
        .checked_add(1)
        .ok_or_else(|| CompileError::RecursionLimit { min, bound: ceiling })?;
    alternatives(t, group, context, count, |t, i, branch| {
        repeat(t, inner, min + i, branch, context)
    })
}

/// `inner/inner/...` exactly `depth` times; depth 0 is the context itself
fn repeat(
    t: &mut Translator<'_>,
    inner: &Selector,
    depth: usize,
    group: &mut GroupPattern,
    context: &Variable,
) -> Result<Variable, CompileError> {
    let mut current = context.clone();
    for _ in 0..depth {
        current = t.selector(inner, group, &current)?;
    }
    Ok(current)
}

/// `delegate[test]`: filters the context, does not rebind it
pub(crate) fn testing(
    t: &mut Translator<'_>,
    delegate: &Selector,
    test: &Test,
    group: &mut GroupPattern,
    context: &Variable,
) -> Result<Variable, CompileError> {
    let value = t.selector(delegate, group, context)?;
    let expr = t.test(test, group, &value)?;
    if !expr.is_true() {
        group.add_filter(expr);
    }
    Ok(context.clone())
}

pub(crate) fn function(
    t: &mut Translator<'_>,
    name: &str,
    args: &[Selector],
    group: &mut GroupPattern,
    context: &Variable,
) -> Result<Variable, CompileError> {
    let function = t.registry().function(name)?;

    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(operand(t, arg, group, context)?);
    }

    let expr = function.apply(name, values)?;
    let out = t.fresh();
    group.add_bind(expr, out.clone());
    Ok(out)
}

/// Value of a selector as an expression; constants are inlined
pub(crate) fn operand(
    t: &mut Translator<'_>,
    selector: &Selector,
    group: &mut GroupPattern,
    context: &Variable,
) -> Result<Expr, CompileError> {
    match selector {
        Selector::Constant(node) => Ok(Expr::Term(node.into())),
        other => Ok(Expr::var(&t.selector(other, group, context)?)),
    }
}

/// Translate `count` alternatives into a `UNION` bound to one output variable.
///
/// Each branch gets its own group (sharing `context` with the outer group)
/// and binds its value to the output inside the branch. A branch that yields
/// the context itself first binds the context to any resource of the store,
/// so the branch also matches when nothing outside has bound it yet.
fn alternatives<F>(
    t: &mut Translator<'_>,
    group: &mut GroupPattern,
    context: &Variable,
    count: usize,
    mut translate_branch: F,
) -> Result<Variable, CompileError>
where
    F: FnMut(&mut Translator<'_>, usize, &mut GroupPattern) -> Result<Variable, CompileError>,
{
    let mut branches = Vec::with_capacity(count);
    for i in 0..count {
        let mut branch = GroupPattern::new();
        let value = translate_branch(t, i, &mut branch)?;
        branches.push((branch, value));
    }

    let out = t.fresh();
    let mut groups = Vec::with_capacity(branches.len());
    for (mut branch, value) in branches {
        if value == *context {
            any_resource(t, &mut branch, context);
        }
        branch.add_bind(Expr::var(&value), out.clone());
        groups.push(branch);
    }
    group.add_union(groups);
    Ok(out)
}

/// `{ ?ctx ?p ?o } UNION { ?s ?p ?ctx }`
fn any_resource(t: &mut Translator<'_>, group: &mut GroupPattern, context: &Variable) {
    let mut outgoing = GroupPattern::new();
    let (predicate, object) = (t.fresh(), t.fresh());
    outgoing.add_triple(context, &predicate, &object);

    let mut incoming = GroupPattern::new();
    let (subject, predicate) = (t.fresh(), t.fresh());
    incoming.add_triple(&subject, &predicate, context);

    group.add_union(vec![outgoing, incoming]);
}

//! Query evaluation over a quad snapshot.
//!
//! Groups are evaluated left to right: triple patterns and `BIND` extend the
//! solutions seen so far, nested groups (`{}`, `UNION`, `OPTIONAL`) are
//! evaluated on their own and joined in, and `FILTER`s apply to the whole
//! group once it is complete. Filters of an `OPTIONAL` group act as its join
//! condition instead. `EXISTS` evaluates its group seeded with the current
//! solution.

use crate::quad::Quad;
use ldq_query::{
    Builtin, Direction, Element, ExecutionError, Expr, GroupPattern, OrderCondition, Query,
    Solution, Term, TriplePattern,
};
use ldq_syntax::{vocab, ComparisonOp, Iri, Literal, Node};
use std::cmp::Ordering;
use std::collections::HashSet;

type EvalResult<T> = Result<T, ExecutionError>;

pub(crate) struct Evaluator<'a> {
    quads: Vec<&'a Quad>,
    max_solutions: usize,
}

impl<'a> Evaluator<'a> {
    /// Only quads in `graph` are visible when it is set
    pub(crate) fn new(quads: &'a [Quad], graph: Option<&Iri>, max_solutions: usize) -> Self {
        let quads = quads
            .iter()
            .filter(|q| graph.map_or(true, |g| q.graph.as_ref() == Some(g)))
            .collect();
        Self {
            quads,
            max_solutions,
        }
    }

    pub(crate) fn run(&self, query: &Query) -> EvalResult<Vec<Solution>> {
        let mut rows = self.group(&query.pattern, vec![Solution::new()])?;

        if !query.order_by.is_empty() {
            rows.sort_by(|a, b| order_rows(&query.order_by, a, b));
        }

        let mut projected: Vec<Solution> = rows
            .into_iter()
            .map(|row| {
                row.get(&query.projection)
                    .map(|value| (query.projection.clone(), value.clone()))
                    .into_iter()
                    .collect()
            })
            .collect();

        if query.distinct {
            let mut seen = HashSet::new();
            projected.retain(|row| seen.insert(row.clone()));
        }

        Ok(projected
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }

    fn group(&self, group: &GroupPattern, seed: Vec<Solution>) -> EvalResult<Vec<Solution>> {
        let (rows, filters) = self.patterns(group, seed)?;
        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            if self.passes(&filters, &row)? {
                kept.push(row);
            }
        }
        Ok(kept)
    }

    /// Solutions of `group` before its `FILTER`s, and those filters
    fn patterns<'g>(
        &self,
        group: &'g GroupPattern,
        seed: Vec<Solution>,
    ) -> EvalResult<(Vec<Solution>, Vec<&'g Expr>)> {
        let mut rows = seed;
        let mut filters = Vec::new();

        for element in group.elements() {
            rows = match element {
                Element::Triple(pattern) => self.match_triple(pattern, rows),
                Element::Group(inner) => join(rows, &self.group(inner, vec![Solution::new()])?),
                Element::Union(branches) => {
                    let mut alternatives = Vec::new();
                    for branch in branches {
                        alternatives.extend(self.group(branch, vec![Solution::new()])?);
                    }
                    join(rows, &alternatives)
                }
                Element::Optional(inner) => self.left_join(rows, inner)?,
                Element::Filter(expr) => {
                    filters.push(expr);
                    rows
                }
                Element::Bind { expr, var } => {
                    let mut bound = Vec::with_capacity(rows.len());
                    for mut row in rows {
                        if !row.contains(var) {
                            if let Some(value) = self.eval(expr, &row)? {
                                row.insert(var.clone(), value);
                            }
                        }
                        bound.push(row);
                    }
                    bound
                }
            };

            if rows.len() > self.max_solutions {
                return Err(ExecutionError::new(format!(
                    "intermediate result exceeds {} solutions",
                    self.max_solutions
                )));
            }
        }

        Ok((rows, filters))
    }

    fn passes(&self, filters: &[&Expr], row: &Solution) -> EvalResult<bool> {
        for filter in filters {
            if self.truth(filter, row)? != Some(true) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `OPTIONAL`: the optional group's filters are the join condition and
    /// see the merged solution, outer bindings included
    fn left_join(&self, left: Vec<Solution>, inner: &GroupPattern) -> EvalResult<Vec<Solution>> {
        let (right, filters) = self.patterns(inner, vec![Solution::new()])?;
        let mut out = Vec::new();
        for l in left {
            let before = out.len();
            for r in &right {
                if compatible(&l, r) {
                    let merged = merge(&l, r);
                    if self.passes(&filters, &merged)? {
                        out.push(merged);
                    }
                }
            }
            if out.len() == before {
                out.push(l);
            }
        }
        Ok(out)
    }

    fn match_triple(&self, pattern: &TriplePattern, rows: Vec<Solution>) -> Vec<Solution> {
        let mut out = Vec::new();
        for row in rows {
            for quad in &self.quads {
                let mut candidate = row.clone();
                let subject = Node::from(quad.subject.clone());
                let predicate = Node::from(quad.predicate.clone());
                if unify(&pattern.subject, &subject, &mut candidate)
                    && unify(&pattern.predicate, &predicate, &mut candidate)
                    && unify(&pattern.object, &quad.object, &mut candidate)
                {
                    out.push(candidate);
                }
            }
        }
        out
    }

    /// Effective boolean value; `None` is an evaluation error
    fn truth(&self, expr: &Expr, row: &Solution) -> EvalResult<Option<bool>> {
        let value = match expr {
            Expr::True => Some(true),
            Expr::Not(inner) => self.truth(inner, row)?.map(|b| !b),
            Expr::And(l, r) => match (self.truth(l, row)?, self.truth(r, row)?) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            Expr::Or(l, r) => match (self.truth(l, row)?, self.truth(r, row)?) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            Expr::Compare { op, left, right } => {
                match (self.eval(left, row)?, self.eval(right, row)?) {
                    (Some(l), Some(r)) => compare(*op, &l, &r),
                    _ => None,
                }
            }
            Expr::Exists(group) => Some(!self.group(group, vec![row.clone()])?.is_empty()),
            other => self.eval(other, row)?.as_ref().and_then(effective_boolean),
        };
        Ok(value)
    }

    /// Value of an expression; `None` for unbound or erroneous results
    fn eval(&self, expr: &Expr, row: &Solution) -> EvalResult<Option<Node>> {
        let value = match expr {
            Expr::Term(Term::Var(var)) => row.get(var).cloned(),
            Expr::Term(Term::Iri(iri)) => Some(iri.clone().into()),
            Expr::Term(Term::Literal(literal)) => Some(literal.clone().into()),
            Expr::Coalesce(args) => {
                for arg in args {
                    if let Some(value) = self.eval(arg, row)? {
                        return Ok(Some(value));
                    }
                }
                None
            }
            Expr::Call { function, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    match self.eval(arg, row)? {
                        Some(value) => values.push(value),
                        None => return Ok(None),
                    }
                }
                call(*function, &values)
            }
            boolean => self
                .truth(boolean, row)?
                .map(|b| Literal::boolean(b).into()),
        };
        Ok(value)
    }
}

fn unify(term: &Term, value: &Node, row: &mut Solution) -> bool {
    match term {
        Term::Var(var) => match row.get(var) {
            Some(bound) => bound == value,
            None => {
                row.insert(var.clone(), value.clone());
                true
            }
        },
        Term::Iri(iri) => value.as_iri() == Some(iri),
        Term::Literal(literal) => value.as_literal() == Some(literal),
    }
}

fn compatible(left: &Solution, right: &Solution) -> bool {
    right
        .iter()
        .all(|(var, value)| left.get(var).map_or(true, |bound| bound == value))
}

fn merge(left: &Solution, right: &Solution) -> Solution {
    let mut merged = left.clone();
    for (var, value) in right.iter() {
        merged.insert(var.clone(), value.clone());
    }
    merged
}

fn join(left: Vec<Solution>, right: &[Solution]) -> Vec<Solution> {
    let mut out = Vec::new();
    for l in &left {
        for r in right {
            if compatible(l, r) {
                out.push(merge(l, r));
            }
        }
    }
    out
}

fn is_string(literal: &Literal) -> bool {
    literal.datatype().is_none()
}

fn effective_boolean(value: &Node) -> Option<bool> {
    let literal = value.as_literal()?;
    if literal.datatype().map(Iri::as_str) == Some(vocab::XSD_BOOLEAN) {
        return match literal.value() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        };
    }
    if let Some(n) = literal.as_number() {
        return Some(n != 0.0 && !n.is_nan());
    }
    is_string(literal).then(|| !literal.value().is_empty())
}

fn compare(op: ComparisonOp, left: &Node, right: &Node) -> Option<bool> {
    let ordering = match (number(left), number(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r)?,
        _ => match op {
            ComparisonOp::Eq => return Some(left == right),
            ComparisonOp::Ne => return Some(left != right),
            _ => {
                let (l, r) = (left.as_literal()?, right.as_literal()?);
                if l.effective_datatype() != r.effective_datatype() {
                    return None;
                }
                l.value().cmp(r.value())
            }
        },
    };

    Some(match op {
        ComparisonOp::Eq => ordering == Ordering::Equal,
        ComparisonOp::Ne => ordering != Ordering::Equal,
        ComparisonOp::Lt => ordering == Ordering::Less,
        ComparisonOp::Le => ordering != Ordering::Greater,
        ComparisonOp::Gt => ordering == Ordering::Greater,
        ComparisonOp::Ge => ordering != Ordering::Less,
    })
}

fn number(value: &Node) -> Option<f64> {
    value.as_literal()?.as_number()
}

/// Lexical form of a literal, or the IRI text for `STR`
fn string_value(value: &Node) -> &str {
    match value {
        Node::Iri { iri } => iri.as_str(),
        Node::Literal { literal } => literal.value(),
    }
}

fn with_value(literal: &Literal, value: String) -> Literal {
    match literal.language() {
        Some(lang) => Literal::lang(value, lang),
        None => Literal::plain(value),
    }
}

fn call(function: Builtin, args: &[Node]) -> Option<Node> {
    let first = args.first();
    let literal = first.and_then(Node::as_literal);

    let value: Node = match function {
        Builtin::Str => Literal::plain(string_value(first?)).into(),
        Builtin::LCase => {
            let literal = literal?;
            with_value(literal, literal.value().to_lowercase()).into()
        }
        Builtin::UCase => {
            let literal = literal?;
            with_value(literal, literal.value().to_uppercase()).into()
        }
        Builtin::StrLen => {
            let length = literal?.value().chars().count();
            Literal::integer(i64::try_from(length).ok()?).into()
        }
        Builtin::Concat => {
            let mut joined = String::new();
            for arg in args {
                joined.push_str(arg.as_literal()?.value());
            }
            Literal::plain(joined).into()
        }
        Builtin::Lang => Literal::plain(literal?.language().unwrap_or_default()).into(),
        Builtin::Datatype => literal?.effective_datatype().into(),
        Builtin::LangMatches => {
            let tag = args.first()?.as_literal()?.value().to_ascii_lowercase();
            let range = args.get(1)?.as_literal()?.value().to_ascii_lowercase();
            let matches = if range == "*" {
                !tag.is_empty()
            } else {
                tag == range || tag.starts_with(&format!("{}-", range))
            };
            Literal::boolean(matches).into()
        }
        Builtin::Contains => {
            let haystack = args.first()?.as_literal()?;
            let needle = args.get(1)?.as_literal()?;
            Literal::boolean(haystack.value().contains(needle.value())).into()
        }
    };
    Some(value)
}

/// SPARQL ordering: unbound first, then IRIs, then literals
fn order_rows(keys: &[OrderCondition], a: &Solution, b: &Solution) -> Ordering {
    for key in keys {
        let ordering = match (a.get(&key.var), b.get(&key.var)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(l), Some(r)) => order_nodes(l, r),
        };
        let ordering = match key.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn order_nodes(left: &Node, right: &Node) -> Ordering {
    match (left, right) {
        (Node::Iri { iri: l }, Node::Iri { iri: r }) => l.cmp(r),
        (Node::Iri { .. }, Node::Literal { .. }) => Ordering::Less,
        (Node::Literal { .. }, Node::Iri { .. }) => Ordering::Greater,
        (Node::Literal { literal: l }, Node::Literal { literal: r }) => {
            match (l.as_number(), r.as_number()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => l.value().cmp(r.value()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldq_query::Variable;

    fn ex(local: &str) -> Iri {
        Iri::new(format!("http://example.org/{}", local))
    }

    fn var(name: &str) -> Variable {
        Variable::new(name)
    }

    fn data() -> Vec<Quad> {
        vec![
            Quad::new(ex("e1"), ex("name"), "Alice"),
            Quad::new(ex("e2"), ex("name"), "Bob"),
            Quad::new(ex("e1"), ex("age"), Literal::integer(30)),
            Quad::new(ex("e2"), ex("age"), Literal::integer(9)),
            Quad::new(ex("e3"), ex("name"), "Carol").in_graph(ex("g")),
        ]
    }

    fn select(query: &Query) -> Vec<Node> {
        let quads = data();
        let evaluator = Evaluator::new(&quads, query.graph.as_ref(), 10_000);
        evaluator
            .run(query)
            .unwrap()
            .into_iter()
            .filter_map(|row| row.get(&query.projection).cloned())
            .collect()
    }

    fn by_name() -> GroupPattern {
        let mut group = GroupPattern::new();
        group.add_triple(&var("x"), ex("name"), &var("v0"));
        group
    }

    #[test]
    fn test_triple_match_sees_all_graphs_without_restriction() {
        assert_eq!(select(&Query::new(var("x"), by_name())).len(), 3);
    }

    #[test]
    fn test_graph_restriction() {
        let mut query = Query::new(var("x"), by_name());
        query.graph = Some(ex("g"));
        assert_eq!(select(&query), vec![Node::from(ex("e3"))]);
    }

    #[test]
    fn test_numeric_comparison() {
        let mut group = GroupPattern::new();
        group.add_triple(&var("x"), ex("age"), &var("v0"));
        group.add_filter(Expr::compare(
            ComparisonOp::Gt,
            Expr::var(&var("v0")),
            Expr::literal(Literal::integer(10)),
        ));
        assert_eq!(select(&Query::new(var("x"), group)), vec![Node::from(ex("e1"))]);
    }

    #[test]
    fn test_order_limit_offset() {
        let mut query = Query::new(var("x"), by_name());
        query.order_by.push(OrderCondition {
            var: var("v0"),
            direction: Direction::Desc,
        });
        query.offset = Some(1);
        query.limit = Some(1);
        assert_eq!(select(&query), vec![Node::from(ex("e2"))]);
    }

    #[test]
    fn test_optional_keeps_rows_without_match() {
        let mut optional = GroupPattern::new();
        optional.add_triple(&var("x"), ex("age"), &var("v1"));
        let mut group = by_name();
        group.add_optional(optional);
        assert_eq!(select(&Query::new(var("x"), group)).len(), 3);
    }

    #[test]
    fn test_optional_filter_sees_outer_bindings() {
        let mut optional = GroupPattern::new();
        optional.add_triple(&var("x"), ex("age"), &var("v1"));
        optional.add_filter(Expr::equals(Expr::var(&var("v0")), Expr::literal("Alice")));
        let mut group = by_name();
        group.add_optional(optional);

        assert_eq!(select(&Query::new(var("x"), group.clone())).len(), 3);
        assert_eq!(
            select(&Query::new(var("v1"), group)),
            vec![Node::from(Literal::integer(30))]
        );
    }

    #[test]
    fn test_not_exists_by_substitution() {
        let mut scope = GroupPattern::new();
        scope.add_triple(&var("x"), ex("age"), &var("v1"));
        let mut group = by_name();
        group.add_filter(Expr::not(Expr::Exists(scope)));
        assert_eq!(select(&Query::new(var("x"), group)), vec![Node::from(ex("e3"))]);
    }

    #[test]
    fn test_bind_and_coalesce() {
        let mut group = by_name();
        group.add_bind(
            Expr::Coalesce(vec![Expr::var(&var("missing")), Expr::var(&var("v0"))]),
            var("v1"),
        );
        group.add_filter(Expr::equals(Expr::var(&var("v1")), Expr::literal("Bob")));
        assert_eq!(select(&Query::new(var("x"), group)), vec![Node::from(ex("e2"))]);
    }

    #[test]
    fn test_distinct_projection() {
        let mut group = GroupPattern::new();
        group.add_triple(&var("x"), &var("v0"), &var("v1"));
        let quads = data();
        let query = Query::new(var("x"), group);
        let rows = Evaluator::new(&quads, None, 100).run(&query).unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_solution_limit() {
        let mut group = GroupPattern::new();
        group.add_triple(&var("a"), &var("p"), &var("b"));
        group.add_triple(&var("c"), &var("q"), &var("d"));
        let quads = data();
        let query = Query::new(var("a"), group);
        assert!(Evaluator::new(&quads, None, 10).run(&query).is_err());
    }

    #[test]
    fn test_builtins() {
        let alice = Node::from(Literal::plain("Alice"));
        assert_eq!(
            call(Builtin::LCase, &[alice.clone()]),
            Some(Literal::plain("alice").into())
        );
        assert_eq!(
            call(Builtin::StrLen, &[alice.clone()]),
            Some(Literal::integer(5).into())
        );
        assert_eq!(
            call(Builtin::Str, &[ex("e1").into()]),
            Some(Literal::plain("http://example.org/e1").into())
        );
        assert_eq!(
            call(
                Builtin::LangMatches,
                &[Literal::plain("en-gb").into(), Literal::plain("en").into()]
            ),
            Some(Literal::boolean(true).into())
        );
        assert_eq!(call(Builtin::LCase, &[ex("e1").into()]), None);
    }

    #[test]
    fn test_compare_mixed_kinds() {
        let iri = Node::from(ex("e1"));
        let lit = Node::from(Literal::plain("e1"));
        assert_eq!(compare(ComparisonOp::Eq, &iri, &lit), Some(false));
        assert_eq!(compare(ComparisonOp::Lt, &iri, &lit), None);
        assert_eq!(
            compare(
                ComparisonOp::Eq,
                &Literal::integer(1).into(),
                &Literal::typed("1.0", vocab::XSD_DECIMAL).into()
            ),
            Some(true)
        );
    }
}

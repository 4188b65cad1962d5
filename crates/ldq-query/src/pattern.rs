//! Graph pattern model: the query under construction.
//!
//! A [`GroupPattern`] is an ordered list of [`Element`]s (triple patterns,
//! nested groups, unions, optionals, filters and binds). Evaluators append to
//! the group they are handed; nothing is ever removed.

use crate::expr::Expr;
use ldq_config::QueryConfig;
use ldq_syntax::{Iri, Literal, Node};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A query variable, stored without the leading `?`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// Subject, predicate or object position of a triple pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Var(Variable),
    Iri(Iri),
    Literal(Literal),
}

impl Term {
    pub fn as_var(&self) -> Option<&Variable> {
        match self {
            Term::Var(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(v) => v.fmt(f),
            Term::Iri(iri) => iri.fmt(f),
            Term::Literal(lit) => lit.fmt(f),
        }
    }
}

impl From<Variable> for Term {
    fn from(v: Variable) -> Self {
        Term::Var(v)
    }
}

impl From<&Variable> for Term {
    fn from(v: &Variable) -> Self {
        Term::Var(v.clone())
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<&Iri> for Term {
    fn from(iri: &Iri) -> Self {
        Term::Iri(iri.clone())
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl From<Node> for Term {
    fn from(node: Node) -> Self {
        match node {
            Node::Iri { iri } => Term::Iri(iri),
            Node::Literal { literal } => Term::Literal(literal),
        }
    }
}

impl From<&Node> for Term {
    fn from(node: &Node) -> Self {
        node.clone().into()
    }
}

/// `subject predicate object`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl TriplePattern {
    pub fn new(subject: impl Into<Term>, predicate: impl Into<Term>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// One entry of a group pattern
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Triple(TriplePattern),
    /// Nested `{ ... }`
    Group(GroupPattern),
    /// `{ a } UNION { b } UNION ...`
    Union(Vec<GroupPattern>),
    /// `OPTIONAL { ... }`
    Optional(GroupPattern),
    /// `FILTER(expr)`, scoped to the whole enclosing group
    Filter(Expr),
    /// `BIND(expr AS ?var)`
    Bind { expr: Expr, var: Variable },
}

/// Ordered accumulator of pattern elements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupPattern {
    elements: Vec<Element>,
}

impl GroupPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn add_triple(
        &mut self,
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) {
        self.push(Element::Triple(TriplePattern::new(subject, predicate, object)));
    }

    pub fn add_filter(&mut self, expr: Expr) {
        self.push(Element::Filter(expr));
    }

    pub fn add_bind(&mut self, expr: Expr, var: Variable) {
        self.push(Element::Bind { expr, var });
    }

    pub fn add_group(&mut self, group: GroupPattern) {
        self.push(Element::Group(group));
    }

    pub fn add_union(&mut self, branches: Vec<GroupPattern>) {
        self.push(Element::Union(branches));
    }

    pub fn add_optional(&mut self, group: GroupPattern) {
        self.push(Element::Optional(group));
    }

    /// Append all elements of `other` (conjunction)
    pub fn extend(&mut self, other: GroupPattern) {
        self.elements.extend(other.elements);
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Every triple pattern, including those in nested groups
    pub fn triples(&self) -> Vec<&TriplePattern> {
        let mut out = Vec::new();
        self.collect_triples(&mut out);
        out
    }

    fn collect_triples<'a>(&'a self, out: &mut Vec<&'a TriplePattern>) {
        for element in &self.elements {
            match element {
                Element::Triple(t) => out.push(t),
                Element::Group(g) | Element::Optional(g) => g.collect_triples(out),
                Element::Union(branches) => {
                    for branch in branches {
                        branch.collect_triples(out);
                    }
                }
                Element::Filter(expr) | Element::Bind { expr, .. } => {
                    expr.visit_groups(&mut |g: &'a GroupPattern| g.collect_triples(out))
                }
            }
        }
    }

    /// Variables mentioned anywhere in the group, including inside filters
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    pub(crate) fn collect_variables(&self, out: &mut BTreeSet<Variable>) {
        for element in &self.elements {
            match element {
                Element::Triple(t) => {
                    for term in [&t.subject, &t.predicate, &t.object] {
                        if let Term::Var(v) = term {
                            out.insert(v.clone());
                        }
                    }
                }
                Element::Group(g) | Element::Optional(g) => g.collect_variables(out),
                Element::Union(branches) => {
                    for branch in branches {
                        branch.collect_variables(out);
                    }
                }
                Element::Filter(expr) => expr.collect_variables(out),
                Element::Bind { expr, var } => {
                    expr.collect_variables(out);
                    out.insert(var.clone());
                }
            }
        }
    }
}

/// Hands out fresh variable names for one compiled query
#[derive(Debug, Clone)]
pub struct VarAllocator {
    prefix: String,
    root: Variable,
    next: usize,
}

impl VarAllocator {
    pub fn new(config: &QueryConfig) -> Self {
        Self {
            prefix: config.variable_prefix.clone(),
            root: Variable::new(config.result_variable.clone()),
            next: 0,
        }
    }

    /// The projected result variable
    pub fn root(&self) -> &Variable {
        &self.root
    }

    /// A variable never returned before by this allocator and never equal to the root
    pub fn fresh(&mut self) -> Variable {
        loop {
            let var = Variable::new(format!("{}{}", self.prefix, self.next));
            self.next += 1;
            if var != self.root {
                return var;
            }
        }
    }

    /// Number of fresh variables handed out so far
    pub fn allocated(&self) -> usize {
        self.next
    }
}

//! Boolean and value expressions used in `FILTER` and `BIND`.

use crate::pattern::{GroupPattern, Term, Variable};
use ldq_syntax::{ComparisonOp, Iri, Literal};
use std::collections::BTreeSet;

/// Store-native functions an expression can call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Str,
    LCase,
    UCase,
    StrLen,
    Concat,
    Lang,
    Datatype,
    LangMatches,
    Contains,
}

impl Builtin {
    /// SPARQL function name
    pub fn sparql_name(&self) -> &'static str {
        match self {
            Builtin::Str => "STR",
            Builtin::LCase => "LCASE",
            Builtin::UCase => "UCASE",
            Builtin::StrLen => "STRLEN",
            Builtin::Concat => "CONCAT",
            Builtin::Lang => "LANG",
            Builtin::Datatype => "DATATYPE",
            Builtin::LangMatches => "langMatches",
            Builtin::Contains => "CONTAINS",
        }
    }
}

/// An expression over variables and constants
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Always true; contributed by tests whose constraint is purely structural
    True,
    Term(Term),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `EXISTS { ... }`
    Exists(GroupPattern),
    /// First bound argument
    Coalesce(Vec<Expr>),
    Call {
        function: Builtin,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn var(v: &Variable) -> Self {
        Expr::Term(Term::Var(v.clone()))
    }

    pub fn iri(iri: impl Into<Iri>) -> Self {
        Expr::Term(Term::Iri(iri.into()))
    }

    pub fn literal(lit: impl Into<Literal>) -> Self {
        Expr::Term(Term::Literal(lit.into()))
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Expr::True)
    }

    /// Conjunction; `True` operands are dropped
    pub fn and(left: Expr, right: Expr) -> Self {
        match (left, right) {
            (Expr::True, other) | (other, Expr::True) => other,
            (l, r) => Expr::And(Box::new(l), Box::new(r)),
        }
    }

    /// Disjunction; a `True` operand makes the whole expression true
    pub fn or(left: Expr, right: Expr) -> Self {
        match (left, right) {
            (Expr::True, _) | (_, Expr::True) => Expr::True,
            (l, r) => Expr::Or(Box::new(l), Box::new(r)),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    pub fn compare(op: ComparisonOp, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn equals(left: Expr, right: Expr) -> Self {
        Self::compare(ComparisonOp::Eq, left, right)
    }

    pub fn call(function: Builtin, args: Vec<Expr>) -> Self {
        Expr::Call { function, args }
    }

    /// Call `f` on every group nested in this expression (not recursing into them)
    pub fn visit_groups<'a>(&'a self, f: &mut dyn FnMut(&'a GroupPattern)) {
        match self {
            Expr::True | Expr::Term(_) => {}
            Expr::Not(inner) => inner.visit_groups(f),
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.visit_groups(f);
                r.visit_groups(f);
            }
            Expr::Compare { left, right, .. } => {
                left.visit_groups(f);
                right.visit_groups(f);
            }
            Expr::Exists(group) => f(group),
            Expr::Coalesce(args) | Expr::Call { args, .. } => {
                for arg in args {
                    arg.visit_groups(f);
                }
            }
        }
    }

    pub(crate) fn collect_variables(&self, out: &mut BTreeSet<Variable>) {
        match self {
            Expr::Term(Term::Var(v)) => {
                out.insert(v.clone());
            }
            Expr::True | Expr::Term(_) => {}
            Expr::Not(inner) => inner.collect_variables(out),
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.collect_variables(out);
                r.collect_variables(out);
            }
            Expr::Compare { left, right, .. } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            Expr::Exists(group) => group.collect_variables(out),
            Expr::Coalesce(args) | Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
        }
    }
}

//! Path expression syntax tree.
//!
//! A [`Selector`] navigates from a context resource to a set of values. A
//! [`Test`] is a condition evaluated relative to a context resource and never
//! changes what that context resolves to.
//!
//! Trees are immutable once built; the compiler only borrows them.
//! Every node reports a stable kind tag ([`SelectorKind`], [`TestKind`]) which
//! is what evaluators are registered under.

use crate::node::{Iri, Node};
use std::fmt;

/// Navigation from a context resource to values
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Follow a property forwards: `ex:p`
    Property(Iri),
    /// Follow a property backwards: `^ex:p`
    ReverseProperty(Iri),
    /// Sequential composition: `a/b`
    Path(Box<Selector>, Box<Selector>),
    /// Values of either side: `a | b`
    Union(Box<Selector>, Box<Selector>),
    /// Values of both sides: `a & b`
    Intersection(Box<Selector>, Box<Selector>),
    /// Repeated application: `(a)*`, `(a)+`, `(a){m,n}`
    Recursive {
        inner: Box<Selector>,
        min: usize,
        /// `None` means unbounded
        max: Option<usize>,
    },
    /// Parenthesized selector: `(a)`
    Grouping(Box<Selector>),
    /// Bracketed test: `a[test]`
    Testing {
        delegate: Box<Selector>,
        test: Box<Test>,
    },
    /// Function call: `fn:name(args)`; `name` is stored without the `fn:` prefix
    Function { name: String, args: Vec<Selector> },
    /// The context itself: `.`
    SelfNode,
    /// Any outgoing property: `*`
    Wildcard,
    /// A constant value: `"text"`, `42`, `<iri>` where a node is expected
    Constant(Node),
}

/// Kind tag for [`Selector`] nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SelectorKind {
    Property,
    ReverseProperty,
    Path,
    Union,
    Intersection,
    Recursive,
    Grouping,
    Testing,
    Function,
    SelfNode,
    Wildcard,
    Constant,
}

impl SelectorKind {
    /// Every selector kind, in declaration order
    pub const ALL: [SelectorKind; 12] = [
        SelectorKind::Property,
        SelectorKind::ReverseProperty,
        SelectorKind::Path,
        SelectorKind::Union,
        SelectorKind::Intersection,
        SelectorKind::Recursive,
        SelectorKind::Grouping,
        SelectorKind::Testing,
        SelectorKind::Function,
        SelectorKind::SelfNode,
        SelectorKind::Wildcard,
        SelectorKind::Constant,
    ];

    /// Stable name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorKind::Property => "property",
            SelectorKind::ReverseProperty => "reverse-property",
            SelectorKind::Path => "path",
            SelectorKind::Union => "union",
            SelectorKind::Intersection => "intersection",
            SelectorKind::Recursive => "recursive",
            SelectorKind::Grouping => "grouping",
            SelectorKind::Testing => "testing",
            SelectorKind::Function => "function",
            SelectorKind::SelfNode => "self",
            SelectorKind::Wildcard => "wildcard",
            SelectorKind::Constant => "constant",
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Selector {
    /// Kind tag of this node
    pub fn kind(&self) -> SelectorKind {
        match self {
            Selector::Property(_) => SelectorKind::Property,
            Selector::ReverseProperty(_) => SelectorKind::ReverseProperty,
            Selector::Path(_, _) => SelectorKind::Path,
            Selector::Union(_, _) => SelectorKind::Union,
            Selector::Intersection(_, _) => SelectorKind::Intersection,
            Selector::Recursive { .. } => SelectorKind::Recursive,
            Selector::Grouping(_) => SelectorKind::Grouping,
            Selector::Testing { .. } => SelectorKind::Testing,
            Selector::Function { .. } => SelectorKind::Function,
            Selector::SelfNode => SelectorKind::SelfNode,
            Selector::Wildcard => SelectorKind::Wildcard,
            Selector::Constant(_) => SelectorKind::Constant,
        }
    }

    pub fn property(iri: impl Into<Iri>) -> Self {
        Selector::Property(iri.into())
    }

    pub fn reverse(iri: impl Into<Iri>) -> Self {
        Selector::ReverseProperty(iri.into())
    }

    pub fn path(left: Selector, right: Selector) -> Self {
        Selector::Path(Box::new(left), Box::new(right))
    }

    pub fn union(left: Selector, right: Selector) -> Self {
        Selector::Union(Box::new(left), Box::new(right))
    }

    pub fn intersection(left: Selector, right: Selector) -> Self {
        Selector::Intersection(Box::new(left), Box::new(right))
    }

    pub fn recursive(inner: Selector, min: usize, max: Option<usize>) -> Self {
        Selector::Recursive {
            inner: Box::new(inner),
            min,
            max,
        }
    }

    pub fn grouping(inner: Selector) -> Self {
        Selector::Grouping(Box::new(inner))
    }

    pub fn testing(delegate: Selector, test: Test) -> Self {
        Selector::Testing {
            delegate: Box::new(delegate),
            test: Box::new(test),
        }
    }

    pub fn function(name: impl Into<String>, args: Vec<Selector>) -> Self {
        Selector::Function {
            name: name.into(),
            args,
        }
    }

    pub fn constant(node: impl Into<Node>) -> Self {
        Selector::Constant(node.into())
    }

    /// Chain selectors left to right with [`Selector::Path`]
    pub fn chain(steps: impl IntoIterator<Item = Selector>) -> Option<Self> {
        steps.into_iter().reduce(Selector::path)
    }
}

/// Comparison operators usable in tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    /// SPARQL / LDPath operator symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Condition evaluated relative to a context resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Test {
    /// Context has the given type: `is-a ex:Type`
    IsA(Box<Selector>),
    /// Both hold: `t1 & t2`, `t1 and t2`
    And(Box<Test>, Box<Test>),
    /// Either holds: `t1 | t2`, `t1 or t2`
    Or(Box<Test>, Box<Test>),
    /// Negation: `!t`, `not t`
    Not(Box<Test>),
    /// Compare the values of two selectors: `ex:age > 18`
    Comparison {
        op: ComparisonOp,
        left: Box<Selector>,
        right: Box<Selector>,
    },
    /// The left path yields the right node: `ex:value is "x"`
    PathEquality {
        left: Box<Selector>,
        right: Box<Selector>,
    },
    /// The path yields at least one value: `[ex:p]`
    PathExists(Box<Selector>),
    /// Context is a literal with this language: `@en`
    Language(String),
    /// Context is a literal of this datatype: `^^xsd:int`
    Datatype(Iri),
}

/// Kind tag for [`Test`] nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TestKind {
    IsA,
    And,
    Or,
    Not,
    Comparison,
    PathEquality,
    PathExists,
    Language,
    Datatype,
}

impl TestKind {
    /// Every test kind, in declaration order
    pub const ALL: [TestKind; 9] = [
        TestKind::IsA,
        TestKind::And,
        TestKind::Or,
        TestKind::Not,
        TestKind::Comparison,
        TestKind::PathEquality,
        TestKind::PathExists,
        TestKind::Language,
        TestKind::Datatype,
    ];

    /// Stable name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::IsA => "is-a",
            TestKind::And => "and",
            TestKind::Or => "or",
            TestKind::Not => "not",
            TestKind::Comparison => "comparison",
            TestKind::PathEquality => "path-equality",
            TestKind::PathExists => "path-exists",
            TestKind::Language => "language",
            TestKind::Datatype => "datatype",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Test {
    /// Kind tag of this node
    pub fn kind(&self) -> TestKind {
        match self {
            Test::IsA(_) => TestKind::IsA,
            Test::And(_, _) => TestKind::And,
            Test::Or(_, _) => TestKind::Or,
            Test::Not(_) => TestKind::Not,
            Test::Comparison { .. } => TestKind::Comparison,
            Test::PathEquality { .. } => TestKind::PathEquality,
            Test::PathExists(_) => TestKind::PathExists,
            Test::Language(_) => TestKind::Language,
            Test::Datatype(_) => TestKind::Datatype,
        }
    }

    pub fn is_a(type_iri: impl Into<Iri>) -> Self {
        Test::IsA(Box::new(Selector::Constant(Node::from(type_iri.into()))))
    }

    pub fn and(left: Test, right: Test) -> Self {
        Test::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Test, right: Test) -> Self {
        Test::Or(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Test) -> Self {
        Test::Not(Box::new(inner))
    }

    pub fn comparison(op: ComparisonOp, left: Selector, right: Selector) -> Self {
        Test::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn path_equality(left: Selector, right: Selector) -> Self {
        Test::PathEquality {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

// LDPath-like rendering, used in logs and diagnostics. Compound operands are
// parenthesized so the output reads unambiguously.

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Property(iri) => iri.fmt(f),
            Selector::ReverseProperty(iri) => write!(f, "^{}", iri),
            Selector::Path(l, r) => write!(f, "{}/{}", l, r),
            Selector::Union(l, r) => write!(f, "({} | {})", l, r),
            Selector::Intersection(l, r) => write!(f, "({} & {})", l, r),
            Selector::Recursive { inner, min, max } => match (min, max) {
                (0, None) => write!(f, "({})*", inner),
                (1, None) => write!(f, "({})+", inner),
                (min, None) => write!(f, "({}){{{},}}", inner, min),
                (min, Some(max)) => write!(f, "({}){{{},{}}}", inner, min, max),
            },
            Selector::Grouping(inner) => write!(f, "({})", inner),
            Selector::Testing { delegate, test } => write!(f, "{}[{}]", delegate, test),
            Selector::Function { name, args } => {
                write!(f, "fn:{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.fmt(f)?;
                }
                f.write_str(")")
            }
            Selector::SelfNode => f.write_str("."),
            Selector::Wildcard => f.write_str("*"),
            Selector::Constant(node) => node.fmt(f),
        }
    }
}

impl fmt::Display for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Test::IsA(sel) => write!(f, "is-a {}", sel),
            Test::And(l, r) => write!(f, "({} and {})", l, r),
            Test::Or(l, r) => write!(f, "({} or {})", l, r),
            Test::Not(inner) => write!(f, "not {}", inner),
            Test::Comparison { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Test::PathEquality { left, right } => write!(f, "{} is {}", left, right),
            Test::PathExists(sel) => sel.fmt(f),
            Test::Language(lang) => write!(f, "@{}", lang),
            Test::Datatype(iri) => write!(f, "^^{}", iri),
        }
    }
}

//! # ldq-query
//!
//! Compiles LDPath criteria into SPARQL graph patterns.
//!
//! ## Architecture
//!
//! ```text
//! QuerySession::add_criterion("oa:hasBody/rdf:value", "Value1")
//!     │
//!     ▼
//! PathParser ──> Selector tree
//!     │
//!     ▼
//! Translator (dispatch through EvaluatorRegistry)
//!     │   selectors append triple patterns, tests return FILTER expressions
//!     ▼
//! GroupPattern ──> Query ──> StoreConnector::select / SparqlRenderer
//! ```
//!
//! Built-in selector, test and function kinds are handled by an exhaustive
//! match; the registry decides which kinds are enabled and holds extension
//! evaluators that override a built-in for one kind.
//!
//! ```rust
//! use ldq_query::{EvaluatorRegistry, GroupPattern, Translator};
//! use ldq_config::QueryConfig;
//! use ldq_syntax::{LdPathParser, PathParser, Prefixes};
//!
//! let selector = LdPathParser::new()
//!     .parse("oa:hasBody/rdf:value", &Prefixes::common())
//!     .unwrap();
//!
//! let registry = EvaluatorRegistry::builtin();
//! let config = QueryConfig::default();
//! let mut translator = Translator::new(&registry, &config);
//! let root = translator.root();
//! let mut group = GroupPattern::new();
//! translator.selector(&selector, &mut group, &root).unwrap();
//!
//! assert_eq!(group.triples().len(), 2);
//! ```

pub mod connector;
pub mod criteria;
pub mod error;
pub mod evaluators;
pub mod expr;
pub mod pattern;
pub mod query;
pub mod registry;
pub mod render;
pub mod translate;

pub use connector::{Solution, StoreConnector};
pub use criteria::{Criterion, CriterionOp, QueryService, QuerySession};
pub use error::{CompileError, ExecutionError, QueryError, QueryResult};
pub use expr::{Builtin, Expr};
pub use pattern::{Element, GroupPattern, Term, TriplePattern, VarAllocator, Variable};
pub use query::{Direction, OrderCondition, Query};
pub use registry::{
    EvaluatorRegistry, EvaluatorRegistryBuilder, FunctionEvaluator, Resolved, SelectorEvaluator,
    TestEvaluator,
};
pub use render::{QueryRenderer, SparqlRenderer};
pub use translate::Translator;

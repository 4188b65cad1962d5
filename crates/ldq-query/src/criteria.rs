//! Criteria builder: turns (path, value) pairs into one query and runs it.
//!
//! ```text
//! QueryService (long-lived, shared)
//!   └─> QuerySession (one per query)
//!         ├─> PathParser        (path text -> Selector)
//!         ├─> Translator        (Selector -> GroupPattern)
//!         └─> StoreConnector    (Query -> solutions)
//! ```

use crate::connector::StoreConnector;
use crate::error::QueryResult;
use crate::expr::{Builtin, Expr};
use crate::pattern::{GroupPattern, Variable};
use crate::query::{Direction, OrderCondition, Query};
use crate::registry::EvaluatorRegistry;
use crate::translate::Translator;
use ldq_config::QueryConfig;
use ldq_syntax::{ComparisonOp, Iri, LdPathParser, Literal, Node, PathParser, Prefixes, Selector};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// How a criterion's value is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CriterionOp {
    #[default]
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Substring match on the string form of the value
    Contains,
}

impl CriterionOp {
    fn comparison(self) -> Option<ComparisonOp> {
        match self {
            CriterionOp::Eq => Some(ComparisonOp::Eq),
            CriterionOp::Ne => Some(ComparisonOp::Ne),
            CriterionOp::Lt => Some(ComparisonOp::Lt),
            CriterionOp::Le => Some(ComparisonOp::Le),
            CriterionOp::Gt => Some(ComparisonOp::Gt),
            CriterionOp::Ge => Some(ComparisonOp::Ge),
            CriterionOp::Contains => None,
        }
    }
}

/// A parsed path and, optionally, the value it must match
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub selector: Selector,
    pub constraint: Option<(CriterionOp, Node)>,
}

impl Criterion {
    /// The path must resolve to something
    pub fn path(selector: Selector) -> Self {
        Self {
            selector,
            constraint: None,
        }
    }

    /// The path must resolve to `value`
    pub fn equals(selector: Selector, value: impl Into<Node>) -> Self {
        Self::new(selector, CriterionOp::Eq, value)
    }

    pub fn new(selector: Selector, op: CriterionOp, value: impl Into<Node>) -> Self {
        Self {
            selector,
            constraint: Some((op, value.into())),
        }
    }

    fn filter(&self, value: &Variable) -> Option<Expr> {
        let (op, expected) = self.constraint.as_ref()?;
        let filter = match op.comparison() {
            Some(cmp) => Expr::compare(cmp, Expr::var(value), Expr::Term(expected.into())),
            None => {
                let needle = match expected {
                    Node::Iri { iri } => Literal::plain(iri.as_str()),
                    Node::Literal { literal } => Literal::plain(literal.value()),
                };
                Expr::call(
                    Builtin::Contains,
                    vec![
                        Expr::call(Builtin::Str, vec![Expr::var(value)]),
                        Expr::literal(needle),
                    ],
                )
            }
        };
        Some(filter)
    }
}

/// Long-lived query factory.
///
/// Holds the sealed registry, configuration, parser and connector; every
/// [`session`](Self::session) shares them read-only.
#[derive(Clone)]
pub struct QueryService {
    registry: Arc<EvaluatorRegistry>,
    config: Arc<QueryConfig>,
    parser: Arc<dyn PathParser>,
    connector: Arc<dyn StoreConnector>,
}

impl QueryService {
    /// Built-in evaluators, default configuration, LDPath parser
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            registry: Arc::new(EvaluatorRegistry::builtin()),
            config: Arc::new(QueryConfig::default()),
            parser: Arc::new(LdPathParser::new()),
            connector,
        }
    }

    pub fn with_registry(mut self, registry: Arc<EvaluatorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the configuration; rejected when it does not validate
    pub fn with_config(mut self, config: QueryConfig) -> QueryResult<Self> {
        config.validate()?;
        self.config = Arc::new(config);
        Ok(self)
    }

    pub fn with_parser(mut self, parser: Arc<dyn PathParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn registry(&self) -> &EvaluatorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// A new, empty builder session over the whole store
    pub fn session(&self) -> QuerySession {
        let mut prefixes = Prefixes::common();
        for (prefix, namespace) in &self.config.prefixes {
            prefixes.insert(prefix.clone(), namespace.clone());
        }

        QuerySession {
            registry: Arc::clone(&self.registry),
            config: Arc::clone(&self.config),
            parser: Arc::clone(&self.parser),
            connector: Arc::clone(&self.connector),
            prefixes,
            graph: None,
            types: Vec::new(),
            criteria: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// A session restricted to one named graph
    pub fn session_in_graph(&self, graph: impl Into<Iri>) -> QuerySession {
        let mut session = self.session();
        session.graph = Some(graph.into());
        session
    }
}

/// Criteria for one query.
///
/// Criteria are conjoined. The session is consumed by [`build`](Self::build)
/// or [`execute`](Self::execute) and cannot be reused.
pub struct QuerySession {
    registry: Arc<EvaluatorRegistry>,
    config: Arc<QueryConfig>,
    parser: Arc<dyn PathParser>,
    connector: Arc<dyn StoreConnector>,
    prefixes: Prefixes,
    graph: Option<Iri>,
    types: Vec<Iri>,
    criteria: Vec<Criterion>,
    order_by: Vec<(Selector, Direction)>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl fmt::Debug for QuerySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySession")
            .field("graph", &self.graph)
            .field("types", &self.types)
            .field("criteria", &self.criteria)
            .field("order_by", &self.order_by)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl QuerySession {
    /// Make `prefix:` usable in paths added after this call
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> &mut Self {
        self.prefixes.insert(prefix, namespace);
        self
    }

    /// `path` must resolve to `value`
    pub fn add_criterion(&mut self, path: &str, value: impl Into<Node>) -> QueryResult<&mut Self> {
        self.add_criterion_with(path, value, CriterionOp::Eq)
    }

    /// `path` must resolve to something matching `value` under `op`
    pub fn add_criterion_with(
        &mut self,
        path: &str,
        value: impl Into<Node>,
        op: CriterionOp,
    ) -> QueryResult<&mut Self> {
        let selector = self.parser.parse(path, &self.prefixes)?;
        Ok(self.add_selector(Criterion::new(selector, op, value)))
    }

    /// `path` must resolve to at least one value
    pub fn add_path(&mut self, path: &str) -> QueryResult<&mut Self> {
        let selector = self.parser.parse(path, &self.prefixes)?;
        Ok(self.add_selector(Criterion::path(selector)))
    }

    /// Add a criterion over an already parsed selector
    pub fn add_selector(&mut self, criterion: Criterion) -> &mut Self {
        self.criteria.push(criterion);
        self
    }

    /// Results must have `rdf:type` `type_iri`
    pub fn restrict_type(&mut self, type_iri: impl Into<Iri>) -> &mut Self {
        self.types.push(type_iri.into());
        self
    }

    /// Sort by the value of `path`; results without it are kept
    pub fn order_by(&mut self, path: &str, direction: Direction) -> QueryResult<&mut Self> {
        let selector = self.parser.parse(path, &self.prefixes)?;
        self.order_by.push((selector, direction));
        Ok(self)
    }

    pub fn limit(&mut self, limit: usize) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: usize) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn prefixes(&self) -> &Prefixes {
        &self.prefixes
    }

    /// Compile every criterion into one query.
    ///
    /// Fails as a whole on the first criterion that cannot be translated.
    pub fn build(self) -> QueryResult<Query> {
        let mut translator = Translator::new(&self.registry, &self.config);
        let root = translator.root();
        let mut pattern = GroupPattern::new();

        for type_iri in &self.types {
            pattern.add_triple(&root, Iri::rdf_type(), type_iri);
        }

        for criterion in &self.criteria {
            let mut group = GroupPattern::new();
            let value = translator.selector(&criterion.selector, &mut group, &root)?;
            if let Some(filter) = criterion.filter(&value) {
                group.add_filter(filter);
            }
            debug!(
                criterion = %criterion.selector,
                value = %value,
                patterns = group.len(),
                "Compiled criterion"
            );
            pattern.extend(group);
        }

        let mut order_by = Vec::with_capacity(self.order_by.len());
        for (selector, direction) in &self.order_by {
            let mut optional = GroupPattern::new();
            let var = translator.selector(selector, &mut optional, &root)?;
            if !optional.is_empty() {
                pattern.add_optional(optional);
            }
            order_by.push(OrderCondition {
                var,
                direction: *direction,
            });
        }

        let mut query = Query::new(root, pattern);
        query.graph = self.graph;
        query.order_by = order_by;
        query.limit = self.limit;
        query.offset = self.offset;
        query.distinct = self.config.distinct;
        Ok(query)
    }

    /// Build the query and run it; resources come back in connector order
    pub async fn execute(self) -> QueryResult<Vec<Iri>> {
        let connector = Arc::clone(&self.connector);
        let query = self.build()?;
        debug!(query = %query, "Executing query");

        let solutions = connector.select(&query).await?;
        let resources: Vec<Iri> = solutions
            .iter()
            .filter_map(|row| row.get(&query.projection))
            .filter_map(Node::as_iri)
            .cloned()
            .collect();

        info!(results = resources.len(), "Query executed");
        Ok(resources)
    }
}

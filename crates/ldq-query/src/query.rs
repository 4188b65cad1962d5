//! The assembled query handed to a store connector.

use crate::pattern::{GroupPattern, Variable};
use crate::render::{QueryRenderer, SparqlRenderer};
use ldq_syntax::Iri;
use std::fmt;

/// Sort direction for an `ORDER BY` key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One `ORDER BY` key
#[derive(Debug, Clone, PartialEq)]
pub struct OrderCondition {
    pub var: Variable,
    pub direction: Direction,
}

/// A `SELECT` query projecting exactly one variable.
///
/// Built by [`QuerySession::build`](crate::QuerySession::build); read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The projected root variable
    pub projection: Variable,
    /// Restrict matching to this named graph (`FROM <graph>`)
    pub graph: Option<Iri>,
    pub pattern: GroupPattern,
    pub order_by: Vec<OrderCondition>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub distinct: bool,
}

impl Query {
    pub fn new(projection: Variable, pattern: GroupPattern) -> Self {
        Self {
            projection,
            graph: None,
            pattern,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            distinct: true,
        }
    }

    /// SPARQL 1.1 text with full IRIs
    pub fn to_sparql(&self) -> String {
        SparqlRenderer.render(self)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sparql())
    }
}

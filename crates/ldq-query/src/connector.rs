//! Store connector seam: executes assembled queries.

use crate::error::ExecutionError;
use crate::pattern::Variable;
use crate::query::Query;
use async_trait::async_trait;
use ldq_syntax::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of variable bindings
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Solution {
    bindings: BTreeMap<Variable, Node>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: &Variable) -> Option<&Node> {
        self.bindings.get(var)
    }

    /// Bind `var`, returning the previous value
    pub fn insert(&mut self, var: Variable, value: Node) -> Option<Node> {
        self.bindings.insert(var, value)
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.bindings.contains_key(var)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Node)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromIterator<(Variable, Node)> for Solution {
    fn from_iter<T: IntoIterator<Item = (Variable, Node)>>(iter: T) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

/// Executes a compiled query against a graph store.
///
/// Cancellation and timeouts are the connector's business; the compiler
/// never retries.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Evaluate `query` and return its solutions in store order
    async fn select(&self, query: &Query) -> Result<Vec<Solution>, ExecutionError>;
}

//! In-memory quad store.

use crate::error::{StoreError, StoreResult};
use crate::eval::Evaluator;
use crate::fixture::parse_fixture;
use crate::quad::Quad;
use async_trait::async_trait;
use ldq_query::{ExecutionError, Query, Solution, StoreConnector};
use ldq_syntax::Prefixes;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Default cap on intermediate solutions per group
pub const DEFAULT_MAX_SOLUTIONS: usize = 100_000;

/// Quad store held in memory.
///
/// Clones share the same data. Without a `FROM` graph a query sees every
/// quad; with one it sees only that graph.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    quads: Arc<RwLock<Vec<Quad>>>,
    max_solutions: usize,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            quads: Arc::new(RwLock::new(Vec::new())),
            max_solutions: DEFAULT_MAX_SOLUTIONS,
        }
    }

    /// Fail queries whose intermediate results grow past `max_solutions`
    pub fn with_max_solutions(mut self, max_solutions: usize) -> Self {
        self.max_solutions = max_solutions;
        self
    }

    /// Add a quad; returns false when it was already present
    pub async fn insert(&self, quad: Quad) -> bool {
        let mut quads = self.quads.write().await;
        if quads.contains(&quad) {
            return false;
        }
        quads.push(quad);
        true
    }

    /// Add quads, returning how many were new
    pub async fn extend(&self, quads: impl IntoIterator<Item = Quad>) -> usize {
        let mut added = 0;
        for quad in quads {
            if self.insert(quad).await {
                added += 1;
            }
        }
        added
    }

    /// Load fixture text (see [`parse_fixture`])
    pub async fn load_fixture(&self, text: &str, prefixes: &Prefixes) -> StoreResult<usize> {
        let quads = parse_fixture(text, prefixes)?;
        let added = self.extend(quads).await;
        debug!(added, "Loaded fixture");
        Ok(added)
    }

    /// Load a fixture file
    pub async fn load_fixture_file(
        &self,
        path: impl AsRef<Path>,
        prefixes: &Prefixes,
    ) -> StoreResult<usize> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        self.load_fixture(&text, prefixes).await
    }

    /// Get the number of stored quads
    pub async fn len(&self) -> usize {
        self.quads.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.quads.read().await.is_empty()
    }

    /// Copy of every stored quad in insertion order
    pub async fn quads(&self) -> Vec<Quad> {
        self.quads.read().await.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreConnector for MemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Solution>, ExecutionError> {
        let quads = self.quads.read().await;
        let evaluator = Evaluator::new(&quads, query.graph.as_ref(), self.max_solutions);
        let solutions = evaluator.run(query)?;
        debug!(
            solutions = solutions.len(),
            quads = quads.len(),
            "Evaluated query"
        );
        Ok(solutions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldq_syntax::Iri;

    fn ex(local: &str) -> Iri {
        Iri::new(format!("http://example.org/{}", local))
    }

    #[tokio::test]
    async fn test_insert_ignores_duplicates() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);

        let quad = Quad::new(ex("a"), ex("p"), ex("b"));
        assert!(store.insert(quad.clone()).await);
        assert!(!store.insert(quad.clone()).await);
        assert!(store.insert(quad.in_graph(ex("g"))).await);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.insert(Quad::new(ex("a"), ex("p"), "v")).await;
        assert_eq!(other.len().await, 1);
    }

    #[tokio::test]
    async fn test_load_fixture_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data.nt");
        tokio::fs::write(&path, "@prefix ex: <http://example.org/> .\nex:a ex:p \"v\" .\n")
            .await
            .unwrap();

        let store = MemoryStore::new();
        let added = store.load_fixture_file(&path, &Prefixes::new()).await.unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.quads().await[0].subject, ex("a"));
    }

    #[tokio::test]
    async fn test_missing_fixture_file() {
        let store = MemoryStore::new();
        let err = store
            .load_fixture_file("/nonexistent/data.nt", &Prefixes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}

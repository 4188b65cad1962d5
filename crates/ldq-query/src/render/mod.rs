//! Target renderers for assembled queries.
//!
//! Connectors that talk to a remote endpoint send rendered text; in-process
//! stores evaluate the structured [`Query`] directly.

mod sparql;

pub use sparql::SparqlRenderer;

use crate::query::Query;

/// Trait for rendering a [`Query`] to a target query language.
pub trait QueryRenderer: Send + Sync {
    /// Unique name for this renderer
    fn name(&self) -> &str;

    /// Render the query to text
    fn render(&self, query: &Query) -> String;
}

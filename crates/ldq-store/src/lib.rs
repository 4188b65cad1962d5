//! # ldq-store
//!
//! An in-memory quad store that executes ldq queries directly from their
//! structured form, with SPARQL semantics for the constructs the compiler
//! emits. Useful for embedding and for end-to-end tests of compiled criteria.
//!
//! ```rust
//! use ldq_query::QueryService;
//! use ldq_store::MemoryStore;
//! use ldq_syntax::Prefixes;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! store
//!     .load_fixture(
//!         "<http://example.org/e1> <http://example.org/name> \"Alice\" .",
//!         &Prefixes::new(),
//!     )
//!     .await?;
//!
//! let service = QueryService::new(store);
//! let mut session = service.session();
//! session.add_criterion("<http://example.org/name>", "Alice")?;
//! let found = session.execute().await?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```

mod error;
mod eval;
mod fixture;
mod quad;
mod store;

pub use error::{StoreError, StoreResult};
pub use fixture::parse_fixture;
pub use quad::Quad;
pub use store::{MemoryStore, DEFAULT_MAX_SOLUTIONS};

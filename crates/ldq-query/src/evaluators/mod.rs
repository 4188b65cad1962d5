//! Default evaluator set: one translation per built-in selector, test and
//! function.

pub(crate) mod conditions;
pub mod functions;
pub(crate) mod selectors;

pub use functions::SparqlFunction;

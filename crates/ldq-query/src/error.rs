//! Error types for compiling and executing queries.

use ldq_config::ConfigError;
use ldq_syntax::ParseError;
use thiserror::Error;

/// Compilation of a syntax tree into a graph pattern failed.
///
/// Compilation is all-or-nothing: any of these aborts the whole query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// No evaluator is registered for a node kind or function name
    #[error("Unsupported construct: no evaluator registered for {construct}")]
    Unsupported { construct: String },

    /// An evaluator broke an internal invariant
    #[error("Translation error: {0}")]
    Translation(String),

    /// Recursion deeper than `recursion.max_explicit_depth`, or unbounded
    /// recursion under `recursion.strict`
    #[error("Recursive selector from depth {min} cannot be unrolled within the limit of {bound}")]
    RecursionLimit { min: usize, bound: usize },

    /// A function was called with the wrong number of arguments
    #[error("Function '{function}' expects {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: String,
        found: usize,
    },
}

impl CompileError {
    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self::Unsupported {
            construct: construct.into(),
        }
    }

    pub fn translation(message: impl Into<String>) -> Self {
        Self::Translation(message.into())
    }
}

/// The store connector failed to run a query
#[derive(Debug, Error)]
#[error("Query execution failed: {message}")]
pub struct ExecutionError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Errors surfaced by query sessions
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

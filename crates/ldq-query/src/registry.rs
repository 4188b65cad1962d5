//! Evaluator registry.
//!
//! Maps node kinds (and function names) to translation logic. Registries are
//! assembled with [`EvaluatorRegistryBuilder`] during startup and sealed by
//! [`build`](EvaluatorRegistryBuilder::build); the sealed registry has no
//! registration API and is shared read-only (`Arc<EvaluatorRegistry>`).
//!
//! Built-in kinds are dispatched through an exhaustive match in the
//! translator. The table only records whether a kind is enabled and, for
//! externally supplied evaluators, which one overrides it. Re-registering a
//! kind replaces the previous entry (last registration wins).

use crate::error::CompileError;
use crate::evaluators::functions::builtin_functions;
use crate::expr::Expr;
use crate::pattern::{GroupPattern, Variable};
use crate::translate::Translator;
use ldq_syntax::{Selector, SelectorKind, Test, TestKind};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Translation logic for one selector kind
pub trait SelectorEvaluator: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Translate `selector` relative to `context`, appending to `group`.
    ///
    /// Must return exactly one output variable.
    fn evaluate(
        &self,
        translator: &mut Translator<'_>,
        selector: &Selector,
        group: &mut GroupPattern,
        context: &Variable,
    ) -> Result<Variable, CompileError>;
}

/// Translation logic for one test kind
pub trait TestEvaluator: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Translate `test` relative to `context` into a boolean expression.
    ///
    /// Patterns may be appended to `group`; the context is never rebound.
    fn evaluate(
        &self,
        translator: &mut Translator<'_>,
        test: &Test,
        group: &mut GroupPattern,
        context: &Variable,
    ) -> Result<Expr, CompileError>;
}

/// Store-native equivalent of a path function (`fn:lcase(...)`)
pub trait FunctionEvaluator: Send + Sync {
    /// Build the expression for `name(args...)`; arguments are already translated
    fn apply(&self, name: &str, args: Vec<Expr>) -> Result<Expr, CompileError>;
}

enum Entry<E: ?Sized> {
    Builtin,
    Extension(Arc<E>),
}

impl<E: ?Sized> Clone for Entry<E> {
    fn clone(&self) -> Self {
        match self {
            Entry::Builtin => Entry::Builtin,
            Entry::Extension(e) => Entry::Extension(Arc::clone(e)),
        }
    }
}

/// Outcome of a registry lookup
pub enum Resolved<'a, E: ?Sized> {
    /// Use the built-in translation for this kind
    Builtin,
    /// Use an externally registered evaluator
    Extension(&'a E),
}

/// Sealed, read-only evaluator table
#[derive(Clone)]
pub struct EvaluatorRegistry {
    selectors: HashMap<SelectorKind, Entry<dyn SelectorEvaluator>>,
    tests: HashMap<TestKind, Entry<dyn TestEvaluator>>,
    functions: BTreeMap<String, Arc<dyn FunctionEvaluator>>,
}

impl std::fmt::Debug for EvaluatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluatorRegistry")
            .field("selectors", &self.selectors.len())
            .field("tests", &self.tests.len())
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for EvaluatorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EvaluatorRegistry {
    /// Start assembling a registry (empty)
    pub fn builder() -> EvaluatorRegistryBuilder {
        EvaluatorRegistryBuilder::new()
    }

    /// Registry with every built-in selector, test and function
    pub fn builtin() -> Self {
        EvaluatorRegistryBuilder::new().with_builtins().build()
    }

    /// Look up the evaluator for a selector kind
    pub fn selector(
        &self,
        kind: SelectorKind,
    ) -> Result<Resolved<'_, dyn SelectorEvaluator>, CompileError> {
        match self.selectors.get(&kind) {
            Some(Entry::Builtin) => Ok(Resolved::Builtin),
            Some(Entry::Extension(e)) => Ok(Resolved::Extension(e.as_ref())),
            None => Err(CompileError::unsupported(format!("selector kind '{}'", kind))),
        }
    }

    /// Look up the evaluator for a test kind
    pub fn test(&self, kind: TestKind) -> Result<Resolved<'_, dyn TestEvaluator>, CompileError> {
        match self.tests.get(&kind) {
            Some(Entry::Builtin) => Ok(Resolved::Builtin),
            Some(Entry::Extension(e)) => Ok(Resolved::Extension(e.as_ref())),
            None => Err(CompileError::unsupported(format!("test kind '{}'", kind))),
        }
    }

    /// Look up a function by bare name (`lcase`, not `fn:lcase`)
    pub fn function(&self, name: &str) -> Result<&dyn FunctionEvaluator, CompileError> {
        self.functions
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| CompileError::unsupported(format!("function '{}'", name)))
    }

    pub fn supports_selector(&self, kind: SelectorKind) -> bool {
        self.selectors.contains_key(&kind)
    }

    pub fn supports_test(&self, kind: TestKind) -> bool {
        self.tests.contains_key(&kind)
    }

    /// Registered function names in sorted order
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

/// Accumulates registrations; [`build`](Self::build) seals them
#[derive(Default)]
pub struct EvaluatorRegistryBuilder {
    selectors: HashMap<SelectorKind, Entry<dyn SelectorEvaluator>>,
    tests: HashMap<TestKind, Entry<dyn TestEvaluator>>,
    functions: BTreeMap<String, Arc<dyn FunctionEvaluator>>,
}

impl EvaluatorRegistryBuilder {
    /// An empty builder: nothing resolves until registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable every built-in selector kind, test kind and function
    pub fn with_builtins(mut self) -> Self {
        for kind in SelectorKind::ALL {
            self.selectors.insert(kind, Entry::Builtin);
        }
        for kind in TestKind::ALL {
            self.tests.insert(kind, Entry::Builtin);
        }
        for (name, function) in builtin_functions() {
            self.functions.insert(name.to_string(), function);
        }
        debug!(
            selectors = SelectorKind::ALL.len(),
            tests = TestKind::ALL.len(),
            functions = self.functions.len(),
            "Registered built-in evaluators"
        );
        self
    }

    /// Register (or override) the evaluator for a selector kind
    pub fn register_selector(
        mut self,
        kind: SelectorKind,
        evaluator: Arc<dyn SelectorEvaluator>,
    ) -> Self {
        debug!("Found evaluator {} for selector {}", evaluator.name(), kind);
        if self
            .selectors
            .insert(kind, Entry::Extension(evaluator))
            .is_some()
        {
            debug!("Replaced previous evaluator for selector {}", kind);
        }
        self
    }

    /// Register (or override) the evaluator for a test kind
    pub fn register_test(mut self, kind: TestKind, evaluator: Arc<dyn TestEvaluator>) -> Self {
        debug!("Found evaluator {} for test {}", evaluator.name(), kind);
        if self.tests.insert(kind, Entry::Extension(evaluator)).is_some() {
            debug!("Replaced previous evaluator for test {}", kind);
        }
        self
    }

    /// Register (or override) a function by bare name
    pub fn register_function(
        mut self,
        name: impl Into<String>,
        function: Arc<dyn FunctionEvaluator>,
    ) -> Self {
        let name = name.into();
        debug!("Found evaluator for function {}", name);
        if self.functions.insert(name.clone(), function).is_some() {
            debug!("Replaced previous evaluator for function {}", name);
        }
        self
    }

    /// Remove a selector kind so it no longer resolves
    pub fn without_selector(mut self, kind: SelectorKind) -> Self {
        self.selectors.remove(&kind);
        self
    }

    /// Remove a test kind so it no longer resolves
    pub fn without_test(mut self, kind: TestKind) -> Self {
        self.tests.remove(&kind);
        self
    }

    /// Remove a function so it no longer resolves
    pub fn without_function(mut self, name: &str) -> Self {
        self.functions.remove(name);
        self
    }

    /// Seal the registry
    pub fn build(self) -> EvaluatorRegistry {
        EvaluatorRegistry {
            selectors: self.selectors,
            tests: self.tests,
            functions: self.functions,
        }
    }
}

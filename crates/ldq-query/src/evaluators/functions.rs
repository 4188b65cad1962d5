//! Built-in path functions (`fn:lcase(...)` and friends).

use crate::error::CompileError;
use crate::expr::{Builtin, Expr};
use crate::registry::FunctionEvaluator;
use std::sync::Arc;

/// A SPARQL built-in accepting `min_args..=max_args` arguments
#[derive(Debug, Clone, Copy)]
pub struct SparqlFunction {
    function: Builtin,
    min_args: usize,
    max_args: Option<usize>,
}

impl SparqlFunction {
    pub const fn new(function: Builtin, min_args: usize, max_args: Option<usize>) -> Self {
        Self {
            function,
            min_args,
            max_args,
        }
    }

    const fn unary(function: Builtin) -> Self {
        Self::new(function, 1, Some(1))
    }

    fn expected(&self) -> String {
        match (self.min_args, self.max_args) {
            (min, Some(max)) if min == max => min.to_string(),
            (min, Some(max)) => format!("{} to {}", min, max),
            (min, None) => format!("at least {}", min),
        }
    }
}

impl FunctionEvaluator for SparqlFunction {
    fn apply(&self, name: &str, args: Vec<Expr>) -> Result<Expr, CompileError> {
        let found = args.len();
        let too_many = self.max_args.is_some_and(|max| found > max);
        if found < self.min_args || too_many {
            return Err(CompileError::Arity {
                function: name.to_string(),
                expected: self.expected(),
                found,
            });
        }
        Ok(Expr::call(self.function, args))
    }
}

const BUILTINS: &[(&str, SparqlFunction)] = &[
    ("str", SparqlFunction::unary(Builtin::Str)),
    ("lcase", SparqlFunction::unary(Builtin::LCase)),
    ("ucase", SparqlFunction::unary(Builtin::UCase)),
    ("strlen", SparqlFunction::unary(Builtin::StrLen)),
    ("concat", SparqlFunction::new(Builtin::Concat, 1, None)),
    ("lang", SparqlFunction::unary(Builtin::Lang)),
    ("datatype", SparqlFunction::unary(Builtin::Datatype)),
    ("contains", SparqlFunction::new(Builtin::Contains, 2, Some(2))),
];

/// Functions every registry built `with_builtins` resolves
pub(crate) fn builtin_functions() -> Vec<(&'static str, Arc<dyn FunctionEvaluator>)> {
    BUILTINS
        .iter()
        .map(|(name, f)| (*name, Arc::new(*f) as Arc<dyn FunctionEvaluator>))
        .collect()
}

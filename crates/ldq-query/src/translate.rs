//! Core dispatcher: walks selector and test trees and drives the evaluators.

use crate::error::CompileError;
use crate::evaluators::{conditions, selectors};
use crate::expr::Expr;
use crate::pattern::{GroupPattern, VarAllocator, Variable};
use crate::registry::{EvaluatorRegistry, Resolved};
use ldq_config::QueryConfig;
use ldq_syntax::{Selector, Test};
use tracing::trace;

/// Translation state for one compiled query.
///
/// Holds the sealed registry and configuration by reference and owns the
/// fresh-variable allocator, so every variable introduced while compiling
/// one query is unique within it. Not shared between queries.
pub struct Translator<'a> {
    registry: &'a EvaluatorRegistry,
    config: &'a QueryConfig,
    vars: VarAllocator,
}

impl<'a> Translator<'a> {
    pub fn new(registry: &'a EvaluatorRegistry, config: &'a QueryConfig) -> Self {
        Self {
            registry,
            config,
            vars: VarAllocator::new(config),
        }
    }

    pub fn registry(&self) -> &'a EvaluatorRegistry {
        self.registry
    }

    pub fn config(&self) -> &'a QueryConfig {
        self.config
    }

    /// The projected root variable
    pub fn root(&self) -> Variable {
        self.vars.root().clone()
    }

    /// A variable not used anywhere else in this query
    pub fn fresh(&mut self) -> Variable {
        self.vars.fresh()
    }

    /// Translate `selector` relative to `context`, appending patterns to `group`.
    ///
    /// Returns the variable holding the selector's value.
    pub fn selector(
        &mut self,
        selector: &Selector,
        group: &mut GroupPattern,
        context: &Variable,
    ) -> Result<Variable, CompileError> {
        let kind = selector.kind();
        trace!(kind = %kind, context = %context, "Translating selector");

        let registry = self.registry;
        if let Resolved::Extension(evaluator) = registry.selector(kind)? {
            return evaluator.evaluate(self, selector, group, context);
        }

        match selector {
            Selector::Property(iri) => Ok(selectors::property(self, iri, group, context)),
            Selector::ReverseProperty(iri) => Ok(selectors::reverse(self, iri, group, context)),
            Selector::Path(left, right) => selectors::path(self, left, right, group, context),
            Selector::Union(left, right) => selectors::union(self, left, right, group, context),
            Selector::Intersection(left, right) => {
                selectors::intersection(self, left, right, group, context)
            }
            Selector::Recursive { inner, min, max } => {
                selectors::recursive(self, inner, *min, *max, group, context)
            }
            Selector::Grouping(inner) => self.selector(inner, group, context),
            Selector::Testing { delegate, test } => {
                selectors::testing(self, delegate, test, group, context)
            }
            Selector::Function { name, args } => {
                selectors::function(self, name, args, group, context)
            }
            Selector::SelfNode => Ok(context.clone()),
            Selector::Wildcard => Ok(selectors::wildcard(self, group, context)),
            Selector::Constant(node) => Ok(selectors::constant(self, node, group)),
        }
    }

    /// Translate `test` relative to `context` into a boolean expression.
    ///
    /// Leaf tests may append patterns to `group`; `context` is never rebound.
    pub fn test(
        &mut self,
        test: &Test,
        group: &mut GroupPattern,
        context: &Variable,
    ) -> Result<Expr, CompileError> {
        let kind = test.kind();
        trace!(kind = %kind, context = %context, "Translating test");

        let registry = self.registry;
        if let Resolved::Extension(evaluator) = registry.test(kind)? {
            return evaluator.evaluate(self, test, group, context);
        }

        match test {
            Test::IsA(type_selector) => conditions::is_a(self, type_selector, group, context),
            Test::And(left, right) => {
                let left = self.scoped_test(left, context)?;
                let right = self.scoped_test(right, context)?;
                Ok(Expr::and(left, right))
            }
            Test::Or(left, right) => {
                let left = self.scoped_test(left, context)?;
                let right = self.scoped_test(right, context)?;
                Ok(Expr::or(left, right))
            }
            Test::Not(inner) => Ok(Expr::not(self.scoped_test(inner, context)?)),
            Test::Comparison { op, left, right } => {
                conditions::comparison(self, *op, left, right, group, context)
            }
            Test::PathEquality { left, right } => conditions::comparison(
                self,
                ldq_syntax::ComparisonOp::Eq,
                left,
                right,
                group,
                context,
            ),
            Test::PathExists(path) => {
                self.selector(path, group, context)?;
                Ok(Expr::True)
            }
            Test::Language(tag) => Ok(conditions::language(tag, context)),
            Test::Datatype(iri) => Ok(conditions::datatype(iri, context)),
        }
    }

    /// Translate `test` in its own group, scoped as an existence check.
    ///
    /// Patterns produced by the test stay inside `EXISTS { ... }` so they never
    /// become mandatory for the enclosing group. A test that produced no
    /// patterns yields its bare expression.
    pub fn scoped_test(&mut self, test: &Test, context: &Variable) -> Result<Expr, CompileError> {
        let mut scope = GroupPattern::new();
        let expr = self.test(test, &mut scope, context)?;

        if scope.is_empty() {
            return Ok(expr);
        }
        if !expr.is_true() {
            scope.add_filter(expr);
        }
        Ok(Expr::Exists(scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Element, Term};
    use crate::registry::{SelectorEvaluator, TestEvaluator};
    use ldq_syntax::{vocab, ComparisonOp, Iri, Literal, SelectorKind, TestKind};
    use std::sync::Arc;
    use test_case::test_case;

    const EX: &str = "http://www.example.com/schema#";

    fn ex(local: &str) -> Iri {
        Iri::new(format!("{}{}", EX, local))
    }

    fn prop(local: &str) -> Selector {
        Selector::property(ex(local))
    }

    fn var(name: &str) -> Variable {
        Variable::new(name)
    }

    fn translate(selector: &Selector) -> (GroupPattern, Variable) {
        translate_with(&EvaluatorRegistry::builtin(), &QueryConfig::default(), selector)
            .unwrap()
    }

    fn translate_with(
        registry: &EvaluatorRegistry,
        config: &QueryConfig,
        selector: &Selector,
    ) -> Result<(GroupPattern, Variable), CompileError> {
        let mut translator = Translator::new(registry, config);
        let root = translator.root();
        let mut group = GroupPattern::new();
        let out = translator.selector(selector, &mut group, &root)?;
        Ok((group, out))
    }

    fn triple(s: &str, p: Iri, o: &str) -> Element {
        Element::Triple(crate::pattern::TriplePattern::new(var(s), p, var(o)))
    }

    #[test]
    fn test_property() {
        let (group, out) = translate(&prop("a"));
        assert_eq!(out, var("v0"));
        assert_eq!(group.elements(), &[triple("x", ex("a"), "v0")]);
    }

    #[test]
    fn test_reverse_property() {
        let (group, out) = translate(&Selector::reverse(ex("a")));
        assert_eq!(out, var("v0"));
        assert_eq!(group.elements(), &[triple("v0", ex("a"), "x")]);
    }

    #[test]
    fn test_path_chains_context() {
        let (group, out) = translate(&Selector::path(prop("a"), prop("b")));
        assert_eq!(out, var("v1"));
        assert_eq!(
            group.elements(),
            &[triple("x", ex("a"), "v0"), triple("v0", ex("b"), "v1")]
        );
    }

    #[test]
    fn test_grouping_is_pass_through() {
        assert_eq!(
            translate(&Selector::grouping(prop("a"))),
            translate(&prop("a"))
        );
    }

    #[test]
    fn test_self_returns_context() {
        let (group, out) = translate(&Selector::SelfNode);
        assert_eq!(out, var("x"));
        assert!(group.is_empty());
    }

    #[test]
    fn test_wildcard_uses_predicate_variable() {
        let (group, out) = translate(&Selector::Wildcard);
        assert_eq!(out, var("v1"));
        assert_eq!(
            group.elements(),
            &[Element::Triple(crate::pattern::TriplePattern::new(
                var("x"),
                var("v0"),
                var("v1")
            ))]
        );
    }

    #[test]
    fn test_testing_returns_context() {
        let selector = Selector::testing(prop("body"), Test::is_a(ex("Body")));
        let (group, out) = translate(&selector);

        assert_eq!(out, var("x"));
        assert_eq!(
            group.elements(),
            &[
                triple("x", ex("body"), "v0"),
                Element::Triple(crate::pattern::TriplePattern::new(
                    var("v0"),
                    Iri::new(vocab::RDF_TYPE),
                    ex("Body")
                )),
            ]
        );
    }

    #[test]
    fn test_or_scopes_each_branch() {
        let selector = Selector::testing(
            prop("body"),
            Test::or(Test::is_a(ex("A")), Test::is_a(ex("B"))),
        );
        let (group, _) = translate(&selector);

        // Only the delegate triple is mandatory; type triples live in EXISTS
        assert_eq!(group.len(), 2);
        match &group.elements()[1] {
            Element::Filter(Expr::Or(left, right)) => {
                assert!(matches!(**left, Expr::Exists(_)));
                assert!(matches!(**right, Expr::Exists(_)));
            }
            other => panic!("expected or filter, got {:?}", other),
        }
    }

    #[test]
    fn test_not_wraps_exists() {
        let selector = Selector::testing(prop("body"), Test::not(Test::is_a(ex("A"))));
        let (group, _) = translate(&selector);

        match &group.elements()[1] {
            Element::Filter(Expr::Not(inner)) => {
                let Expr::Exists(scope) = &**inner else {
                    panic!("expected exists, got {:?}", inner);
                };
                assert_eq!(scope.triples().len(), 1);
            }
            other => panic!("expected not filter, got {:?}", other),
        }
    }

    #[test]
    fn test_leafless_boolean_tests_stay_bare() {
        let selector = Selector::testing(
            prop("label"),
            Test::or(Test::Language("en".into()), Test::Language("de".into())),
        );
        let (group, _) = translate(&selector);

        let Element::Filter(Expr::Or(left, _)) = &group.elements()[1] else {
            panic!("expected or filter");
        };
        assert!(matches!(**left, Expr::Call { .. }));
    }

    #[test]
    fn test_comparison_inlines_constants() {
        let selector = Selector::testing(
            Selector::SelfNode,
            Test::comparison(
                ComparisonOp::Ge,
                prop("age"),
                Selector::constant(Literal::integer(18)),
            ),
        );
        let (group, _) = translate(&selector);

        assert_eq!(
            group.elements()[1],
            Element::Filter(Expr::compare(
                ComparisonOp::Ge,
                Expr::var(&var("v0")),
                Expr::literal(Literal::integer(18)),
            ))
        );
    }

    #[test]
    fn test_intersection_adds_equality() {
        let (group, out) = translate(&Selector::intersection(prop("a"), prop("b")));
        assert_eq!(out, var("v0"));
        assert_eq!(
            group.elements()[2],
            Element::Filter(Expr::equals(Expr::var(&var("v0")), Expr::var(&var("v1"))))
        );
    }

    #[test]
    fn test_union_binds_shared_output() {
        let (group, out) = translate(&Selector::union(prop("a"), prop("b")));
        assert_eq!(out, var("v2"));

        let Element::Union(branches) = &group.elements()[0] else {
            panic!("expected union");
        };
        assert_eq!(branches.len(), 2);
        for branch in branches {
            assert!(matches!(
                branch.elements().last(),
                Some(Element::Bind { var, .. }) if *var == out
            ));
        }
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_union_context_branch_binds_any_resource() {
        let (group, out) = translate(&Selector::union(Selector::SelfNode, prop("a")));

        assert_eq!(group.len(), 1);
        let Element::Union(branches) = &group.elements()[0] else {
            panic!("expected union");
        };
        // `.` branch: resource union, then BIND(?x AS ?out)
        let self_branch = branches[0].elements();
        assert_eq!(self_branch.len(), 2);
        assert!(matches!(&self_branch[0], Element::Union(inner) if inner.len() == 2));
        assert_eq!(
            self_branch[1],
            Element::Bind {
                expr: Expr::var(&var("x")),
                var: out.clone(),
            }
        );
        assert!(matches!(
            branches[1].elements().last(),
            Some(Element::Bind { var, .. }) if *var == out
        ));
    }

    #[test]
    fn test_recursive_unrolls_bounded_depths() {
        let selector = Selector::recursive(prop("next"), 1, Some(3));
        let (group, _) = translate(&selector);

        let Element::Union(branches) = &group.elements()[0] else {
            panic!("expected union");
        };
        let depths: Vec<_> = branches.iter().map(|b| b.triples().len()).collect();
        assert_eq!(depths, vec![1, 2, 3]);
    }

    #[test]
    fn test_recursive_single_depth_needs_no_union() {
        let selector = Selector::recursive(prop("next"), 2, Some(2));
        let (group, out) = translate(&selector);
        assert_eq!(group.len(), 2);
        assert_eq!(out, var("v1"));
    }

    #[test]
    fn test_recursive_unbounded_strict_fails() {
        let mut config = QueryConfig::default();
        config.recursion.strict = true;
        let err = translate_with(
            &EvaluatorRegistry::builtin(),
            &config,
            &Selector::recursive(prop("next"), 0, None),
        )
        .unwrap_err();
        assert_eq!(err, CompileError::RecursionLimit { min: 0, bound: 5 });
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_recursive_unbounded_truncates_with_warning() {
        let config = QueryConfig::default().with_max_depth(3);
        let (group, _) = translate_with(
            &EvaluatorRegistry::builtin(),
            &config,
            &Selector::recursive(prop("next"), 0, None),
        )
        .unwrap();

        let Element::Union(branches) = &group.elements()[0] else {
            panic!("expected union");
        };
        assert_eq!(branches.len(), 4);
        assert!(logs_contain("Unbounded recursion truncated"));
    }

    #[test]
    fn test_recursive_huge_bound_is_rejected() {
        let err = translate_with(
            &EvaluatorRegistry::builtin(),
            &QueryConfig::default(),
            &Selector::recursive(prop("next"), 0, Some(usize::MAX)),
        )
        .unwrap_err();
        assert_eq!(err, CompileError::RecursionLimit { min: 0, bound: 64 });
    }

    #[test_case(0, Some(100_000) ; "large upper bound")]
    #[test_case(65, Some(65) ; "exact depth")]
    #[test_case(70, None ; "unbounded from high minimum")]
    fn test_recursive_depth_ceiling(min: usize, max: Option<usize>) {
        let err = translate_with(
            &EvaluatorRegistry::builtin(),
            &QueryConfig::default(),
            &Selector::recursive(prop("next"), min, max),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::RecursionLimit { bound: 64, .. }));
    }

    #[test]
    fn test_recursive_up_to_ceiling_unrolls() {
        let mut config = QueryConfig::default();
        config.recursion.max_explicit_depth = 8;
        let (group, _) = translate_with(
            &EvaluatorRegistry::builtin(),
            &config,
            &Selector::recursive(prop("next"), 8, Some(8)),
        )
        .unwrap();
        assert_eq!(group.triples().len(), 8);
    }

    #[test]
    fn test_recursive_depth_zero_binds_context() {
        let (group, out) = translate(&Selector::recursive(prop("next"), 0, Some(0)));

        let Element::Union(branches) = &group.elements()[0] else {
            panic!("expected union");
        };
        assert_eq!(branches.len(), 1);
        assert!(matches!(&branches[0].elements()[0], Element::Union(_)));
        assert_eq!(
            branches[0].elements()[1],
            Element::Bind {
                expr: Expr::var(&var("x")),
                var: out,
            }
        );
    }

    #[test]
    fn test_recursive_inverted_bounds() {
        let err = translate_with(
            &EvaluatorRegistry::builtin(),
            &QueryConfig::default(),
            &Selector::recursive(prop("next"), 3, Some(1)),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::Translation(_)));
    }

    #[test]
    fn test_function_binds_fresh_variable() {
        let (group, out) = translate(&Selector::function("lcase", vec![prop("name")]));
        assert_eq!(out, var("v1"));
        assert!(matches!(
            &group.elements()[1],
            Element::Bind { var, .. } if *var == out
        ));
    }

    #[test]
    fn test_constant_binds_value() {
        let (group, out) = translate(&Selector::constant(Literal::plain("a")));
        assert_eq!(
            group.elements(),
            &[Element::Bind {
                expr: Expr::Term(Term::Literal(Literal::plain("a"))),
                var: out,
            }]
        );
    }

    #[test]
    fn test_unknown_function_is_unsupported() {
        let err = translate_with(
            &EvaluatorRegistry::builtin(),
            &QueryConfig::default(),
            &Selector::function("frobnicate", vec![]),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::Unsupported { .. }));
    }

    #[test]
    fn test_unregistered_kind_is_unsupported() {
        let registry = EvaluatorRegistry::builder()
            .with_builtins()
            .without_selector(SelectorKind::ReverseProperty)
            .build();
        let selector = Selector::path(prop("a"), Selector::reverse(ex("b")));

        let err = translate_with(&registry, &QueryConfig::default(), &selector).unwrap_err();
        assert_eq!(
            err,
            CompileError::unsupported("selector kind 'reverse-property'")
        );
    }

    #[test]
    fn test_unregistered_nested_test_is_unsupported() {
        let registry = EvaluatorRegistry::builder()
            .with_builtins()
            .without_test(TestKind::IsA)
            .build();
        let selector = Selector::testing(prop("a"), Test::not(Test::is_a(ex("T"))));

        let err = translate_with(&registry, &QueryConfig::default(), &selector).unwrap_err();
        assert!(matches!(err, CompileError::Unsupported { .. }));
    }

    struct SameAs;

    impl SelectorEvaluator for SameAs {
        fn name(&self) -> &str {
            "same-as"
        }

        // Properties also follow owl:sameAs one step
        fn evaluate(
            &self,
            translator: &mut Translator<'_>,
            selector: &Selector,
            group: &mut GroupPattern,
            context: &Variable,
        ) -> Result<Variable, CompileError> {
            let Selector::Property(iri) = selector else {
                return Err(CompileError::translation("same-as expects a property"));
            };
            let alias = translator.fresh();
            let out = translator.fresh();
            group.add_triple(context, Iri::new("http://www.w3.org/2002/07/owl#sameAs"), &alias);
            group.add_triple(&alias, iri, &out);
            Ok(out)
        }
    }

    #[test]
    fn test_extension_overrides_builtin() {
        let registry = EvaluatorRegistry::builder()
            .with_builtins()
            .register_selector(SelectorKind::Property, Arc::new(SameAs))
            .build();

        let (group, out) =
            translate_with(&registry, &QueryConfig::default(), &prop("a")).unwrap();
        assert_eq!(out, var("v1"));
        assert_eq!(group.triples().len(), 2);
    }

    struct AlwaysFalse;

    impl TestEvaluator for AlwaysFalse {
        fn name(&self) -> &str {
            "always-false"
        }

        fn evaluate(
            &self,
            _translator: &mut Translator<'_>,
            _test: &Test,
            _group: &mut GroupPattern,
            _context: &Variable,
        ) -> Result<Expr, CompileError> {
            Ok(Expr::not(Expr::True))
        }
    }

    #[test]
    fn test_extension_test_evaluator() {
        let registry = EvaluatorRegistry::builder()
            .with_builtins()
            .register_test(TestKind::Language, Arc::new(AlwaysFalse))
            .build();
        let selector = Selector::testing(prop("label"), Test::Language("en".into()));

        let (group, _) =
            translate_with(&registry, &QueryConfig::default(), &selector).unwrap();
        assert_eq!(group.elements()[1], Element::Filter(Expr::not(Expr::True)));
    }

    #[test]
    fn test_structural_idempotence() {
        let selector = Selector::path(
            Selector::testing(prop("body"), Test::or(Test::is_a(ex("A")), Test::is_a(ex("B")))),
            Selector::union(prop("value"), Selector::recursive(prop("next"), 0, Some(2))),
        );
        assert_eq!(translate(&selector), translate(&selector));
    }
}

//! Compiled criteria executed against the in-memory store.

use ldq_query::{CriterionOp, Direction, QueryService, QuerySession};
use ldq_store::{MemoryStore, Quad};
use ldq_syntax::{Iri, Literal, Node, Prefixes};
use std::sync::Arc;
use test_case::test_case;

const EX: &str = "http://example.org/";

const FIXTURE: &str = r#"
@prefix ex: <http://example.org/> .

# hasValue / value
ex:e1 rdf:type ex:Entity .
ex:e1 ex:hasValue ex:n1 .
ex:n1 ex:value "Value1" .
ex:e2 rdf:type ex:Entity .
ex:e2 ex:hasValue ex:n2 .
ex:n2 ex:value "Value2" .

# typed bodies
ex:a ex:body ex:ba .
ex:ba rdf:type ex:A .
ex:b ex:body ex:bb .
ex:bb rdf:type ex:B .
ex:ab ex:body ex:bab .
ex:bab rdf:type ex:A .
ex:bab rdf:type ex:B .
ex:c ex:body ex:bc .
ex:bc rdf:type ex:C .
ex:mixed ex:body ex:bm1 .
ex:mixed ex:body ex:bm2 .
ex:bm1 rdf:type ex:A .
ex:bm2 rdf:type ex:C .
ex:nobody rdf:type ex:A .

# people
ex:p1 rdf:type ex:Person .
ex:p1 ex:name "Alice" .
ex:p1 ex:city "Paris" .
ex:p1 ex:age 34 .
ex:p1 ex:label "Alice"@fr .
ex:p2 rdf:type ex:Person .
ex:p2 ex:name "Alice" .
ex:p2 ex:city "Rome" .
ex:p2 ex:age 27 .
ex:p3 rdf:type ex:Person .
ex:p3 ex:name "Bob" .
ex:p3 ex:alias "Al" .
ex:p3 ex:city "Paris" .
ex:p3 ex:age 41 .

# ancestry
ex:c1 ex:parent ex:root .
ex:c2 ex:parent ex:c1 .
ex:c3 ex:parent ex:c2 .

# named graph
ex:g1 ex:name "Alice" <http://example.org/graph> .
"#;

fn ex(local: &str) -> Iri {
    Iri::new(format!("{}{}", EX, local))
}

fn exs(locals: &[&str]) -> Vec<Iri> {
    let mut iris: Vec<_> = locals.iter().map(|l| ex(l)).collect();
    iris.sort();
    iris
}

async fn service() -> QueryService {
    let store = MemoryStore::new();
    store.load_fixture(FIXTURE, &Prefixes::common()).await.unwrap();
    QueryService::new(Arc::new(store))
}

fn session(service: &QueryService) -> QuerySession {
    let mut session = service.session();
    session.add_prefix("ex", EX);
    session
}

async fn sorted(session: QuerySession) -> Vec<Iri> {
    let mut found = session.execute().await.unwrap();
    found.sort();
    found
}

#[test_case("Value1", &["e1"] ; "matching value")]
#[test_case("Value2", &["e2"] ; "other value")]
#[test_case("Value3", &[] ; "no match")]
#[tokio::test]
async fn test_value_scenario(value: &str, expected: &[&str]) {
    let service = service().await;
    let mut s = session(&service);
    s.add_criterion("ex:hasValue/ex:value", value).unwrap();

    assert_eq!(sorted(s).await, exs(expected));
}

#[test_case(1 ; "one step")]
#[test_case(2 ; "two steps")]
#[test_case(4 ; "four steps")]
#[tokio::test]
async fn test_property_chain(steps: usize) {
    let store = MemoryStore::new();
    for (entity, value) in [("match", "target"), ("miss", "other")] {
        for i in 0..steps {
            let subject = ex(&format!("{}{}", entity, i));
            let predicate = ex(&format!("p{}", i + 1));
            let object: Node = if i + 1 == steps {
                Literal::plain(value).into()
            } else {
                ex(&format!("{}{}", entity, i + 1)).into()
            };
            store.insert(Quad::new(subject, predicate, object)).await;
        }
    }
    let service = QueryService::new(Arc::new(store));

    let path = (1..=steps)
        .map(|i| format!("ex:p{}", i))
        .collect::<Vec<_>>()
        .join("/");
    let mut s = session(&service);
    s.add_criterion(&path, "target").unwrap();

    assert_eq!(sorted(s).await, exs(&["match0"]));
}

#[test_case("ex:body[is-a ex:A or is-a ex:B]", &["a", "ab", "b", "mixed"] ; "disjunction")]
#[test_case("ex:body[is-a ex:A and is-a ex:B]", &["ab"] ; "conjunction")]
#[test_case("ex:body[not is-a ex:A]", &["b", "c", "mixed"] ; "negation")]
#[test_case("ex:body[!(is-a ex:A | is-a ex:B)]", &["c", "mixed"] ; "negated disjunction")]
#[tokio::test]
async fn test_boolean_tests(path: &str, expected: &[&str]) {
    let service = service().await;
    let mut s = session(&service);
    s.add_path(path).unwrap();

    assert_eq!(sorted(s).await, exs(expected));
}

#[tokio::test]
async fn test_reverse_navigation() {
    let service = service().await;

    let mut s = session(&service);
    s.add_criterion("^ex:hasValue", ex("e1")).unwrap();
    assert_eq!(sorted(s).await, exs(&["n1"]));

    let mut s = session(&service);
    s.add_criterion("^ex:hasValue/ex:hasValue", ex("n2")).unwrap();
    assert_eq!(sorted(s).await, exs(&["n2"]));
}

#[tokio::test]
async fn test_criteria_are_conjoined() {
    let service = service().await;
    let mut s = session(&service);
    s.add_criterion("ex:name", "Alice").unwrap();
    s.add_criterion("ex:city", "Paris").unwrap();

    assert_eq!(sorted(s).await, exs(&["p1"]));
}

#[tokio::test]
async fn test_testing_filters_context() {
    let service = service().await;
    let mut s = session(&service);
    s.add_path(r#"ex:hasValue[ex:value is "Value1"]"#).unwrap();

    assert_eq!(sorted(s).await, exs(&["e1"]));
}

#[tokio::test]
async fn test_union() {
    let service = service().await;
    let mut s = session(&service);
    s.add_criterion("ex:name | ex:alias", "Al").unwrap();

    assert_eq!(sorted(s).await, exs(&["p3"]));
}

#[test_case("(ex:parent)+", &["c1", "c2", "c3"] ; "one or more")]
#[test_case("(ex:parent){2,}", &["c2", "c3"] ; "at least two")]
#[test_case("(ex:parent){1}", &["c1"] ; "exactly one")]
#[test_case("(ex:parent)*", &["c1", "c2", "c3", "root"] ; "zero or more")]
#[test_case("(ex:parent){0,1}", &["c1", "root"] ; "zero or one")]
#[tokio::test]
async fn test_recursion(path: &str, expected: &[&str]) {
    let service = service().await;
    let mut s = session(&service);
    s.add_criterion(path, ex("root")).unwrap();

    assert_eq!(sorted(s).await, exs(expected));
}

#[tokio::test]
async fn test_graph_restriction() {
    let service = service().await;

    let mut s = service.session_in_graph(ex("graph"));
    s.add_prefix("ex", EX);
    s.add_criterion("ex:name", "Alice").unwrap();
    assert_eq!(sorted(s).await, exs(&["g1"]));

    let mut s = session(&service);
    s.add_criterion("ex:name", "Alice").unwrap();
    assert_eq!(sorted(s).await, exs(&["g1", "p1", "p2"]));
}

#[tokio::test]
async fn test_type_order_and_limit() {
    let service = service().await;
    let mut s = session(&service);
    s.restrict_type(ex("Person"));
    s.order_by("ex:age", Direction::Desc).unwrap();
    s.limit(2);

    assert_eq!(s.execute().await.unwrap(), vec![ex("p3"), ex("p1")]);
}

#[test_case(CriterionOp::Gt, Literal::integer(30), &["p1", "p3"] ; "greater")]
#[test_case(CriterionOp::Le, Literal::integer(34), &["p1", "p2"] ; "at most")]
#[test_case(CriterionOp::Ne, Literal::integer(27), &["p1", "p3"] ; "not equal")]
#[tokio::test]
async fn test_value_comparisons(op: CriterionOp, value: Literal, expected: &[&str]) {
    let service = service().await;
    let mut s = session(&service);
    s.add_criterion_with("ex:age", value, op).unwrap();

    assert_eq!(sorted(s).await, exs(expected));
}

#[tokio::test]
async fn test_contains() {
    let service = service().await;
    let mut s = session(&service);
    s.restrict_type(ex("Person"));
    s.add_criterion_with("ex:name", "lic", CriterionOp::Contains).unwrap();

    assert_eq!(sorted(s).await, exs(&["p1", "p2"]));
}

#[tokio::test]
async fn test_function_and_language() {
    let service = service().await;

    let mut s = session(&service);
    s.add_criterion("fn:lcase(ex:name)", "bob").unwrap();
    assert_eq!(sorted(s).await, exs(&["p3"]));

    let mut s = session(&service);
    s.add_path("ex:label[@fr]").unwrap();
    assert_eq!(sorted(s).await, exs(&["p1"]));
}

#[tokio::test]
async fn test_path_comparison_test() {
    let service = service().await;
    let mut s = session(&service);
    s.add_path("ex:age[. >= 34]").unwrap();

    assert_eq!(sorted(s).await, exs(&["p1", "p3"]));
}

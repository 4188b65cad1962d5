//! Subcommand implementations.

use crate::cli::QueryArgs;
use anyhow::{anyhow, Context, Result};
use chumsky::prelude::*;
use ldq_config::{ConfigLoader, QueryConfig};
use ldq_query::{QueryService, QuerySession};
use ldq_store::MemoryStore;
use ldq_syntax::parser::common::node;
use ldq_syntax::{Iri, Literal, Node, Prefixes};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Load the config file when one is given, defaults otherwise
pub async fn load_config(path: Option<&Path>) -> Result<QueryConfig> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(QueryConfig::default()),
    }
}

/// SPARQL text for the criterion in `args`
pub async fn compile(args: &QueryArgs, config: QueryConfig) -> Result<String> {
    let service = QueryService::new(Arc::new(MemoryStore::new())).with_config(config)?;
    let query = session(&service, args)?.build()?;
    Ok(query.to_sparql())
}

/// Resources in `data` matching the criterion in `args`
pub async fn run(data: &Path, args: &QueryArgs, config: QueryConfig) -> Result<Vec<Iri>> {
    let store = MemoryStore::new();
    let mut prefixes = Prefixes::common();
    for (prefix, namespace) in &args.prefixes {
        prefixes.insert(prefix.clone(), namespace.clone());
    }
    let loaded = store.load_fixture_file(data, &prefixes).await?;
    info!(statements = loaded, data = %data.display(), "Loaded data");

    let service = QueryService::new(Arc::new(store)).with_config(config)?;
    Ok(session(&service, args)?.execute().await?)
}

fn session(service: &QueryService, args: &QueryArgs) -> Result<QuerySession> {
    let mut session = service.session();
    for (prefix, namespace) in &args.prefixes {
        session.add_prefix(prefix.clone(), namespace.clone());
    }

    if let Some(graph) = &args.graph {
        let graph = parse_iri(graph, session.prefixes(), "--graph")?;
        let prefixes = session.prefixes().clone();
        session = service.session_in_graph(graph);
        for (prefix, namespace) in prefixes.iter() {
            session.add_prefix(prefix, namespace);
        }
    }

    if let Some(type_iri) = &args.type_iri {
        let type_iri = parse_iri(type_iri, session.prefixes(), "--type")?;
        session.restrict_type(type_iri);
    }

    match &args.value {
        Some(raw) => {
            let value = parse_value(raw, session.prefixes());
            debug!(value = %value, "Criterion value");
            session.add_criterion_with(&args.path, value, args.op.into())?;
        }
        None => {
            session.add_path(&args.path)?;
        }
    }

    if let Some(order_by) = &args.order_by {
        session.order_by(order_by, args.direction())?;
    }
    if let Some(limit) = args.limit {
        session.limit(limit);
    }
    if let Some(offset) = args.offset {
        session.offset(offset);
    }
    Ok(session)
}

fn parse_iri(raw: &str, prefixes: &Prefixes, flag: &str) -> Result<Iri> {
    match parse_value(raw, prefixes) {
        Node::Iri { iri } => Ok(iri),
        Node::Literal { .. } if !raw.contains([':', '"']) || raw.starts_with('"') => {
            Err(anyhow!("{} must be an IRI, got '{}'", flag, raw))
        }
        // Unknown prefix or scheme IRI written without brackets
        Node::Literal { .. } => Iri::parse(raw.trim()).with_context(|| format!("invalid {}", flag)),
    }
}

/// A node in path syntax (`<iri>`, `ex:name`, `"text"@en`, `42`); anything
/// else is taken as a plain string
pub fn parse_value(raw: &str, prefixes: &Prefixes) -> Node {
    node(prefixes.clone())
        .then_ignore(end())
        .parse(raw.trim())
        .into_result()
        .unwrap_or_else(|_| Literal::plain(raw).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OpArg;
    use test_case::test_case;

    fn args(path: &str) -> QueryArgs {
        QueryArgs {
            path: path.to_string(),
            value: None,
            op: OpArg::Eq,
            prefixes: vec![("ex".to_string(), "http://example.org/".to_string())],
            graph: None,
            type_iri: None,
            order_by: None,
            desc: false,
            limit: None,
            offset: None,
        }
    }

    #[test_case("<http://example.org/a>", Iri::new("http://example.org/a").into() ; "full iri")]
    #[test_case("ex:a", Iri::new("http://example.org/a").into() ; "prefixed name")]
    #[test_case("42", Literal::integer(42).into() ; "number")]
    #[test_case("\"chat\"@fr", Literal::lang("chat", "fr").into() ; "tagged")]
    #[test_case("Value1", Literal::plain("Value1").into() ; "bare word")]
    #[test_case("two words", Literal::plain("two words").into() ; "spaces")]
    fn test_parse_value(raw: &str, expected: Node) {
        let prefixes = Prefixes::new().with("ex", "http://example.org/");
        assert_eq!(parse_value(raw, &prefixes), expected);
    }

    #[tokio::test]
    async fn test_compile_value_criterion() {
        let mut args = args("ex:hasValue/ex:value");
        args.value = Some("Value1".to_string());

        let sparql = compile(&args, QueryConfig::default()).await.unwrap();
        assert!(sparql.starts_with("SELECT DISTINCT ?x\nWHERE {"));
        assert!(sparql.contains("FILTER((?v1 = \"Value1\"))"));
    }

    #[test_case("<http://example.org/g>" ; "bracketed")]
    #[test_case("ex:g" ; "prefixed")]
    #[test_case("http://example.org/g" ; "bare")]
    fn test_parse_iri(raw: &str) {
        let prefixes = Prefixes::new().with("ex", "http://example.org/");
        assert_eq!(
            parse_iri(raw, &prefixes, "--graph").unwrap(),
            Iri::new("http://example.org/g")
        );
    }

    #[test]
    fn test_parse_iri_rejects_breakout() {
        let prefixes = Prefixes::new();
        assert!(parse_iri("http://g> WHERE { ?x ?p ?o } #", &prefixes, "--graph").is_err());
    }

    #[tokio::test]
    async fn test_compile_in_graph() {
        let mut args = args("ex:name");
        args.graph = Some("ex:g".to_string());

        let sparql = compile(&args, QueryConfig::default()).await.unwrap();
        assert!(sparql.contains("FROM <http://example.org/g>"));
    }

    #[tokio::test]
    async fn test_compile_rejects_literal_type() {
        let mut args = args("ex:a");
        args.type_iri = Some("\"Person\"".to_string());
        assert!(compile(&args, QueryConfig::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_run_against_fixture() {
        let dir = tempfile::TempDir::new().unwrap();
        let data = dir.path().join("data.nt");
        tokio::fs::write(
            &data,
            "ex:e1 ex:name \"Alice\" .\nex:e2 ex:name \"Bob\" .\n",
        )
        .await
        .unwrap();

        let mut args = args("ex:name");
        args.value = Some("Bob".to_string());
        let found = run(&data, &args, QueryConfig::default()).await.unwrap();

        assert_eq!(found, vec![Iri::new("http://example.org/e2")]);
    }

    #[tokio::test]
    async fn test_missing_config_file() {
        assert!(load_config(Some(Path::new("/nonexistent/ldq.toml"))).await.is_err());
    }
}

//! Namespace prefix tables for compact IRIs (`oa:hasBody`).

use crate::node::Iri;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefixes every session starts with
const COMMON_PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("oa", "http://www.w3.org/ns/oa#"),
];

/// Mapping from prefix to namespace IRI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prefixes {
    map: BTreeMap<String, String>,
}

impl Prefixes {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The common vocabularies (rdf, rdfs, xsd, owl, dc, dcterms, foaf, skos, oa)
    pub fn common() -> Self {
        COMMON_PREFIXES
            .iter()
            .map(|(p, ns)| (p.to_string(), ns.to_string()))
            .collect()
    }

    /// Add or replace a prefix
    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.map.insert(prefix.into(), namespace.into());
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.insert(prefix, namespace);
        self
    }

    /// Namespace for a prefix
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.map.get(prefix).map(String::as_str)
    }

    /// Expand `prefix:local` into a full IRI
    pub fn expand(&self, prefix: &str, local: &str) -> Option<Iri> {
        self.get(prefix).map(|ns| Iri::new(format!("{}{}", ns, local)))
    }

    /// Iterate over (prefix, namespace) pairs in prefix order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// Number of registered prefixes
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Prefixes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            map: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Prefixes {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

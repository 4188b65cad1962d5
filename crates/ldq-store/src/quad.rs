//! Stored statements.

use ldq_syntax::{Iri, Node};
use std::fmt;

/// A triple, optionally in a named graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quad {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: Node,
    /// `None` for the default graph
    pub graph: Option<Iri>,
}

impl Quad {
    pub fn new(subject: impl Into<Iri>, predicate: impl Into<Iri>, object: impl Into<Node>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            graph: None,
        }
    }

    /// Move the statement into a named graph
    pub fn in_graph(mut self, graph: impl Into<Iri>) -> Self {
        self.graph = Some(graph.into());
        self
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(graph) = &self.graph {
            write!(f, " {}", graph)?;
        }
        f.write_str(" .")
    }
}

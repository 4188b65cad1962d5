//! RDF nodes: IRIs and literals.
//!
//! These are the constants that can appear in a path expression (property
//! names, type names, literal values) and the values a store binds to query
//! variables.

use crate::error::IriError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known vocabulary IRIs
pub mod vocab {
    /// `rdf:type`
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `rdf:langString`
    pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
    /// `xsd:string`
    pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    /// `xsd:integer`
    pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    /// `xsd:decimal`
    pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    /// `xsd:double`
    pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    /// `xsd:int`
    pub const XSD_INT: &str = "http://www.w3.org/2001/XMLSchema#int";
    /// `xsd:long`
    pub const XSD_LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
    /// `xsd:float`
    pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
    /// `xsd:boolean`
    pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    /// `xsd:dateTime`
    pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// Datatypes compared by numeric value
    pub const NUMERIC: &[&str] = &[
        XSD_INTEGER,
        XSD_DECIMAL,
        XSD_DOUBLE,
        XSD_INT,
        XSD_LONG,
        XSD_FLOAT,
    ];
}

/// An absolute IRI
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    /// Wrap an IRI string (no validation beyond what the parser already did).
    ///
    /// Characters an IRI reference may not contain are percent-encoded when
    /// the IRI is written out, so unchecked text cannot break out of `<...>`.
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    /// Checked constructor for untrusted text
    pub fn parse(iri: impl Into<String>) -> Result<Self, IriError> {
        let iri = iri.into();
        let reason = if iri.is_empty() {
            Some("IRI is empty".to_string())
        } else {
            iri.chars()
                .find(|c| is_forbidden(*c))
                .map(|c| format!("character {:?} is not allowed", c))
        };
        match reason {
            Some(reason) => Err(IriError { iri, reason }),
            None => Ok(Self(iri)),
        }
    }

    /// The IRI text without angle brackets
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `rdf:type`
    pub fn rdf_type() -> Self {
        Self::new(vocab::RDF_TYPE)
    }
}

/// Characters excluded from SPARQL IRIREF, plus any whitespace
fn is_forbidden(c: char) -> bool {
    matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
        || c <= ' '
        || c.is_whitespace()
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        for c in self.0.chars() {
            if is_forbidden(c) {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    write!(f, "%{:02X}", byte)?;
                }
            } else {
                write!(f, "{}", c)?;
            }
        }
        f.write_str(">")
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Iri {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// An RDF literal.
///
/// A literal carries either a language tag or a datatype, never both.
/// `xsd:string` typed literals are normalized to plain literals so that
/// `"a"` and `"a"^^xsd:string` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datatype: Option<Iri>,
}

impl Literal {
    /// A simple string literal
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// A language-tagged string; the tag is stored lowercased
    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: Some(language.into().to_ascii_lowercase()),
            datatype: None,
        }
    }

    /// A typed literal
    pub fn typed(value: impl Into<String>, datatype: impl Into<Iri>) -> Self {
        let datatype = datatype.into();
        if datatype.as_str() == vocab::XSD_STRING {
            return Self::plain(value);
        }
        Self {
            value: value.into(),
            language: None,
            datatype: Some(datatype),
        }
    }

    /// An `xsd:integer` literal
    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), vocab::XSD_INTEGER)
    }

    /// An `xsd:boolean` literal
    pub fn boolean(value: bool) -> Self {
        Self::typed(value.to_string(), vocab::XSD_BOOLEAN)
    }

    /// Lexical form
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Language tag, if any
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Explicit datatype, if any
    pub fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }

    /// The datatype as seen by `datatype()` in a query: plain literals are
    /// `xsd:string`, tagged literals are `rdf:langString`.
    pub fn effective_datatype(&self) -> Iri {
        match (&self.datatype, &self.language) {
            (Some(dt), _) => dt.clone(),
            (None, Some(_)) => Iri::new(vocab::RDF_LANG_STRING),
            (None, None) => Iri::new(vocab::XSD_STRING),
        }
    }

    /// Numeric value when the datatype is one of the XSD numeric types
    pub fn as_number(&self) -> Option<f64> {
        let dt = self.datatype.as_ref()?;
        if vocab::NUMERIC.contains(&dt.as_str()) {
            self.value.trim().parse().ok()
        } else {
            None
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.value.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c => write!(f, "{}", c)?,
            }
        }
        f.write_str("\"")?;
        if let Some(lang) = &self.language {
            write!(f, "@{}", lang)?;
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^{}", dt)?;
        }
        Ok(())
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::plain(value)
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::plain(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

/// A constant node: IRI or literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// A resource
    Iri { iri: Iri },
    /// A literal value
    Literal { literal: Literal },
}

impl Node {
    /// The IRI, when this node is a resource
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Node::Iri { iri } => Some(iri),
            Node::Literal { .. } => None,
        }
    }

    /// The literal, when this node is a literal
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Literal { literal } => Some(literal),
            Node::Iri { .. } => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Iri { iri } => iri.fmt(f),
            Node::Literal { literal } => literal.fmt(f),
        }
    }
}

impl From<Iri> for Node {
    fn from(iri: Iri) -> Self {
        Node::Iri { iri }
    }
}

impl From<Literal> for Node {
    fn from(literal: Literal) -> Self {
        Node::Literal { literal }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Literal::plain(value).into()
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Literal::plain(value).into()
    }
}

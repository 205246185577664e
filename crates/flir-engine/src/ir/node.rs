//! Shared node attributes: identifiers, metadata and literal values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an IR node, unique within one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh node ids.
///
/// One generator is owned by whoever assembles a file (normally a
/// [`FileBuilder`](super::FileBuilder)); ids are never reused within it.
#[derive(Debug, Clone)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// A generator whose ids are all greater than `last`.
    pub fn after(last: NodeId) -> Self {
        Self { next: last.0 + 1 }
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far (ids start at 1).
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}

impl Default for NodeIdGen {
    fn default() -> Self {
        Self::new()
    }
}

/// Constant value of a literal expression or annotation argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Null,
    List(Vec<LiteralValue>),
    Map(Vec<(String, LiteralValue)>),
}

impl LiteralValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LiteralValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) => write!(f, "{:?}", s),
            LiteralValue::Int(i) => write!(f, "{}", i),
            LiteralValue::Double(d) => write!(f, "{}", d),
            LiteralValue::Bool(b) => write!(f, "{}", b),
            LiteralValue::Null => write!(f, "null"),
            LiteralValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            LiteralValue::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Annotation attached to a declaration: `@override`, `@Deprecated('x')`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<LiteralValue>,
}

impl Annotation {
    pub fn marker(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }
}

/// Typed per-node metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(default)]
    pub doc_comment: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Node was synthesized by the adapter rather than written in source.
    #[serde(default)]
    pub synthetic: bool,
}

impl NodeMetadata {
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.doc_comment.is_none() && self.annotations.is_empty() && !self.synthetic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_gen_never_reuses() {
        let mut ids = NodeIdGen::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(ids.issued(), 2);

        let mut resumed = NodeIdGen::after(b);
        assert!(resumed.next_id() > b);
    }

    #[test]
    fn test_literal_display() {
        let lit = LiteralValue::Map(vec![
            ("a".to_string(), LiteralValue::Int(1)),
            ("b".to_string(), LiteralValue::List(vec![LiteralValue::Null])),
        ]);
        assert_eq!(lit.to_string(), r#"{"a": 1, "b": [null]}"#);
    }
}

//! Source locations attached to every IR node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a node in its original source file.
///
/// `offset` and `length` are byte based; `line` and `column` are 1-indexed.
/// A location with `line == 0` is unknown (e.g. decoded from a file written
/// without debug info).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub offset: u32,
    pub length: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32, offset: u32, length: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            offset,
            length,
        }
    }

    /// A location in `file` with no position information.
    pub fn unknown(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    pub fn is_known(&self) -> bool {
        self.line != 0
    }

    /// Byte offset one past the end of this location.
    pub fn end(&self) -> u32 {
        self.offset.saturating_add(self.length)
    }

    /// Smallest location covering both `self` and `other`.
    ///
    /// Both locations are assumed to be in the same file.
    pub fn merge(&self, other: &SourceLocation) -> SourceLocation {
        let (first, _) = if self.offset <= other.offset {
            (self, other)
        } else {
            (other, self)
        };
        let start = self.offset.min(other.offset);
        let end = self.end().max(other.end());
        SourceLocation {
            file: first.file.clone(),
            line: first.line,
            column: first.column,
            offset: start,
            length: end - start,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        } else {
            write!(f, "{}", self.file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_covers_both() {
        let a = SourceLocation::new("a.dart", 3, 5, 40, 10);
        let b = SourceLocation::new("a.dart", 4, 1, 60, 4);
        let merged = b.merge(&a);
        assert_eq!(merged.offset, 40);
        assert_eq!(merged.length, 24);
        assert_eq!(merged.line, 3);
    }

    #[test]
    fn test_display() {
        let loc = SourceLocation::new("lib/main.dart", 12, 7, 0, 0);
        assert_eq!(loc.to_string(), "lib/main.dart:12:7");
        assert_eq!(SourceLocation::unknown("x.dart").to_string(), "x.dart");
    }
}

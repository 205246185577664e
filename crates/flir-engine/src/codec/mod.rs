//! Binary `.ir` codec
//!
//! Layout (little-endian):
//!
//! ```text
//! +--------+---------+-------+--------------+---------+--------------------+
//! | magic  | version | flags | string table | payload | sha256 (optional)  |
//! | u32    | u16     | u16   |              |         | 32 bytes           |
//! +--------+---------+-------+--------------+---------+--------------------+
//! ```
//!
//! The payload is the file record followed by length-prefixed sequences of
//! imports, exports, variables, functions, classes and issues. Every
//! expression, statement and type is preceded by a tag from [`tags`].

pub mod bytes;
pub mod format;
pub mod reader;
pub mod string_table;
pub mod tags;
pub mod writer;

pub use bytes::{IrReader, IrWriter};
pub use format::{
    flags, Header, SerializationError, WriteOptions, FORMAT_VERSION, MAGIC, MAX_DEPTH,
};
pub use reader::{decode, read_file_ir, DecodedFile};
pub use string_table::{StringTable, StringTableStats, MAX_STRING_COUNT, MAX_STRING_LEN};
pub use writer::write_file_ir;

use serde::Serialize;

use crate::ir::visitor::{walk_expr, walk_stmt};
use crate::ir::{ClassDecl, Expr, FileDecl, Stmt, Visitor};
use format::HEADER_SIZE;

/// Section sizes and node counts of an `.ir` buffer.
#[derive(Debug, Clone, Serialize)]
pub struct FileStats {
    pub file_path: String,
    pub version: u16,
    pub checksum: bool,
    pub debug_info: bool,
    pub total_bytes: usize,
    pub string_table_bytes: usize,
    pub payload_bytes: usize,
    pub strings: StringStats,
    pub nodes: NodeCounts,
}

/// String table statistics, recomputed by re-interning the decoded tree so
/// repeats are visible.
#[derive(Debug, Clone, Serialize)]
pub struct StringStats {
    pub seen: u64,
    pub stored: usize,
    pub duplicates: u64,
    pub dedup_ratio: f64,
    pub compression_ratio: f64,
    pub longest: usize,
}

impl From<StringTableStats> for StringStats {
    fn from(stats: StringTableStats) -> Self {
        Self {
            seen: stats.strings_seen,
            stored: stats.strings_stored,
            duplicates: stats.duplicates,
            dedup_ratio: stats.dedup_ratio,
            compression_ratio: stats.compression_ratio,
            longest: stats.longest_string,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeCounts {
    pub imports: usize,
    pub exports: usize,
    pub variables: usize,
    pub functions: usize,
    pub classes: usize,
    pub components: usize,
    pub providers: usize,
    pub methods: usize,
    pub constructors: usize,
    pub fields: usize,
    pub statements: usize,
    pub expressions: usize,
    pub issues: usize,
}

impl NodeCounts {
    pub fn of(file: &FileDecl) -> Self {
        let mut counts = NodeCounts {
            imports: file.imports.len(),
            exports: file.exports.len(),
            variables: file.variables.len(),
            functions: file.functions.len(),
            classes: file.classes.len(),
            issues: file.issues.len(),
            ..NodeCounts::default()
        };
        counts.visit_file(file);
        counts
    }
}

impl Visitor for NodeCounts {
    fn visit_class_decl(&mut self, decl: &ClassDecl) {
        self.components += decl.component.is_some() as usize;
        self.providers += decl.provider.is_some() as usize;
        self.methods += decl.methods.len();
        self.constructors += decl.constructors.len();
        self.fields += decl.fields.len();
        crate::ir::visitor::walk_class_decl(self, decl);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        self.statements += 1;
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        self.expressions += 1;
        walk_expr(self, expr);
    }
}

/// Decode `data` and report its layout.
pub fn inspect(data: &[u8]) -> Result<FileStats, SerializationError> {
    let decoded = decode(data)?;
    let string_table_bytes = decoded.strings.encoded_size();
    let payload_bytes = decoded.body_len - HEADER_SIZE - string_table_bytes;

    let mut encoder = writer::Encoder::new(decoded.header.has_debug_info());
    encoder.file(&decoded.file);
    let strings = encoder.into_strings().stats().into();

    Ok(FileStats {
        file_path: decoded.file.file_path.clone(),
        version: decoded.header.version,
        checksum: decoded.header.has_checksum(),
        debug_info: decoded.header.has_debug_info(),
        total_bytes: data.len(),
        string_table_bytes,
        payload_bytes,
        strings,
        nodes: NodeCounts::of(&decoded.file),
    })
}

#[cfg(test)]
mod tests {
    use super::format::CHECKSUM_SIZE;
    use super::*;
    use crate::diagnostics::{AnalysisIssue, IssueCategory, IssueId, Severity};
    use crate::ir::*;
    use crate::source::SourceLocation;

    fn sample() -> FileDecl {
        let mut b = FileBuilder::new("lib/counter.dart");
        b.content_hash("abc123").library_name("counter").analyzed_at(1_700_000_000);

        let import_id = b.next_id();
        let mut import = ImportDecl::new(import_id, b.location(), "package:flutter/material.dart");
        import.show = vec!["StatelessWidget".to_string()];
        b.add_import(import);

        let id = b.next_id();
        let value = b.literal(LiteralValue::Int(0));
        let var = VariableDecl::new(id, b.location(), "_count", TypeIR::simple("int"))
            .with_initializer(value);
        b.add_variable(var);

        b.at(4, 3);
        let print = b.call(None, "print", vec![]);
        let stmt = b.expr_stmt(print);
        let ret = b.stmt(StmtKind::Return { value: None });
        let id = b.next_id();
        let function = FunctionDecl::builder(id, "main")
            .location(b.location())
            .return_type(TypeIR::Void)
            .body(vec![ret, stmt])
            .build()
            .unwrap();
        b.add_function(function);

        b.add_issue(AnalysisIssue {
            id: IssueId(1),
            code: "ADAPTER_WARNING".to_string(),
            severity: Severity::Warning,
            category: IssueCategory::Adapter,
            message: "unresolved import".to_string(),
            suggestion: None,
            location: SourceLocation::new("lib/counter.dart", 1, 1, 0, 10),
        });
        b.build()
    }

    #[test]
    fn test_round_trip_and_determinism() {
        let file = sample();
        let bytes = write_file_ir(&file, &WriteOptions::default()).unwrap();
        assert_eq!(&bytes[0..4], b"FLIR");
        assert_eq!(read_file_ir(&bytes).unwrap(), file);
        assert_eq!(write_file_ir(&file, &WriteOptions::default()).unwrap(), bytes);
    }

    #[test]
    fn test_without_checksum_has_no_trailer() {
        let file = sample();
        let with = write_file_ir(&file, &WriteOptions::default()).unwrap();
        let without = write_file_ir(
            &file,
            &WriteOptions {
                checksum: false,
                debug_info: true,
            },
        )
        .unwrap();
        assert_eq!(with.len(), without.len() + CHECKSUM_SIZE);
        assert_eq!(read_file_ir(&without).unwrap(), file);
    }

    #[test]
    fn test_debug_info_off_drops_locations() {
        let file = sample();
        let options = WriteOptions {
            checksum: true,
            debug_info: false,
        };
        let decoded = read_file_ir(&write_file_ir(&file, &options).unwrap()).unwrap();
        assert_eq!(decoded.functions[0].name, "main");
        assert!(!decoded.functions[0].location.is_known());
        assert_eq!(decoded.functions[0].location.file, "lib/counter.dart");
        assert!(!decoded.issues[0].location.is_known());
    }

    #[test]
    fn test_inspect_counts_sections() {
        let file = sample();
        let bytes = write_file_ir(&file, &WriteOptions::default()).unwrap();
        let stats = inspect(&bytes).unwrap();
        assert_eq!(stats.total_bytes, bytes.len());
        assert_eq!(
            HEADER_SIZE + stats.string_table_bytes + stats.payload_bytes + CHECKSUM_SIZE,
            bytes.len()
        );
        assert_eq!(stats.nodes.functions, 1);
        assert_eq!(stats.nodes.statements, 2);
        assert_eq!(stats.nodes.issues, 1);
        assert!(stats.strings.duplicates > 0);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let file = sample();
        let mut bytes = write_file_ir(
            &file,
            &WriteOptions {
                checksum: false,
                debug_info: true,
            },
        )
        .unwrap();
        let end = bytes.len();
        bytes.push(0);
        assert_eq!(
            read_file_ir(&bytes).unwrap_err(),
            SerializationError::TrailingBytes {
                count: 1,
                offset: end
            }
        );
    }

    /// `!!...!flag` as the only statement of `main`. The statement, each
    /// operator, the identifier and the identifier's type each nest one
    /// level, so the file is `operators + 3` deep.
    fn negation_chain(operators: usize) -> FileDecl {
        let mut b = FileBuilder::new("lib/deep.dart");
        let mut expr = b.ident("flag");
        for _ in 0..operators {
            expr = b.expr(ExprKind::Unary {
                op: UnaryOp::Not,
                operand: Box::new(expr),
            });
        }
        let stmt = b.expr_stmt(expr);
        let id = b.next_id();
        let function = FunctionDecl::builder(id, "main")
            .location(b.location())
            .body(vec![stmt])
            .build()
            .unwrap();
        b.add_function(function);
        b.build()
    }

    fn assert_too_deep(result: Result<impl std::fmt::Debug, SerializationError>) {
        match result {
            Err(SerializationError::InvalidValue { what, value, .. }) => {
                assert_eq!(what, "nesting depth");
                assert_eq!(value, (MAX_DEPTH + 1) as u64);
            }
            other => panic!("expected nesting depth error, got {:?}", other),
        }
    }

    #[test]
    fn test_nesting_at_depth_limit_round_trips() {
        let file = negation_chain(MAX_DEPTH - 3);
        let bytes = write_file_ir(&file, &WriteOptions::default()).unwrap();
        assert_eq!(read_file_ir(&bytes).unwrap(), file);
    }

    #[test]
    fn test_writer_rejects_nesting_past_limit() {
        let file = negation_chain(MAX_DEPTH - 2);
        assert_too_deep(write_file_ir(&file, &WriteOptions::default()));
    }

    #[test]
    fn test_reader_rejects_nesting_past_limit() {
        let file = negation_chain(MAX_DEPTH - 2);
        let bytes = writer::write_with_limit(&file, &WriteOptions::default(), MAX_DEPTH + 1).unwrap();
        assert_too_deep(read_file_ir(&bytes));
    }
}

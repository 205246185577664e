//! Flir Engine
//!
//! Typed intermediate representation for component-based UI source files,
//! with a checksummed binary format and a flow-analysis pass:
//! - **IR**: declarations, statements, expressions and types (`ir` module)
//! - **Codec**: deterministic `.ir` serialization with a deduplicated
//!   string table (`codec` module)
//! - **Analysis**: CFGs, rebuild triggers, lifecycle and provider checks
//!   (`analysis` module)
//! - **Validation** and the batch **pipeline**
//!
//! # Example
//!
//! ```rust,ignore
//! use flir_engine::{analyze_file, read_file_ir, write_file_ir, AnalysisConfig, WriteOptions};
//!
//! let bytes = write_file_ir(&file, &WriteOptions::default())?;
//! let decoded = read_file_ir(&bytes)?;
//! assert_eq!(decoded, file);
//!
//! let analyzed = analyze_file(decoded, &AnalysisConfig::default());
//! for issue in &analyzed.issues {
//!     println!("{}", issue);
//! }
//! ```

#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Source positions attached to every node
pub mod source;

/// IR node model and the file builder
pub mod ir;

/// Binary `.ir` format: string table, writer and reader
pub mod codec;

/// Issue records and the rule registry
pub mod diagnostics;

/// Flow analysis pass
pub mod analysis;

/// Four-layer `.ir` validator
pub mod validate;

/// Batch driver over many files
pub mod pipeline;

// ============================================================================
// Re-exports
// ============================================================================

pub use analysis::{analyze_file, AnalysisConfig, AnalyzedFile, FlowAnalysis, FlowAnalyzer};
pub use codec::{read_file_ir, write_file_ir, SerializationError, WriteOptions};
pub use diagnostics::{AnalysisIssue, IssueCategory, IssueCollector, Severity};
pub use ir::{FileBuilder, FileDecl, NodeId};
pub use pipeline::{Pipeline, PipelineError};
pub use source::SourceLocation;
pub use validate::{ValidationReport, Validator};

//! `.ir` validation
//!
//! Four independent layers, run in order:
//!
//! 1. **Integrity**: the buffer decodes (header, checksum, structure).
//! 2. **Semantic**: the decoded tree is self-consistent (unique node ids,
//!    profile names resolve, method owners match, lifecycle roles only on
//!    component classes).
//! 3. **Round trip**: re-encoding the decoded tree with the same header
//!    flags reproduces the input byte for byte.
//! 4. **Differential**: the decoded tree equals a known-good tree, when one
//!    is supplied.
//!
//! Later layers need a decoded tree, so an integrity failure skips them.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::Serialize;
use thiserror::Error;

use crate::codec::{decode, read_file_ir, write_file_ir, WriteOptions};
use crate::ir::visitor::{
    walk_class_decl, walk_expr, walk_function_decl, walk_parameter, walk_stmt, walk_variable_decl,
};
use crate::ir::{
    ClassDecl, ComponentKind, Expr, FileDecl, FunctionDecl, NodeId, ParameterDecl, Stmt,
    StmtKind, VariableDecl, Visitor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Integrity,
    Semantic,
    RoundTrip,
    Differential,
}

impl Layer {
    pub const ALL: [Layer; 4] = [
        Layer::Integrity,
        Layer::Semantic,
        Layer::RoundTrip,
        Layer::Differential,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Integrity => "integrity",
            Layer::Semantic => "semantic",
            Layer::RoundTrip => "round-trip",
            Layer::Differential => "differential",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerReport {
    pub layer: Layer,
    pub status: LayerStatus,
    /// Failure details, or the reason the layer was skipped.
    pub findings: Vec<String>,
}

impl LayerReport {
    fn from_findings(layer: Layer, findings: Vec<String>) -> Self {
        let status = if findings.is_empty() {
            LayerStatus::Passed
        } else {
            LayerStatus::Failed
        };
        Self {
            layer,
            status,
            findings,
        }
    }

    fn skipped(layer: Layer, reason: &str) -> Self {
        Self {
            layer,
            status: LayerStatus::Skipped,
            findings: vec![reason.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Path recorded in the file, when it decoded.
    pub file_path: Option<String>,
    pub layers: Vec<LayerReport>,
}

impl ValidationReport {
    /// No layer failed. Skipped layers do not count against validity.
    pub fn is_valid(&self) -> bool {
        self.layers.iter().all(|l| l.status != LayerStatus::Failed)
    }

    pub fn layer(&self, layer: Layer) -> Option<&LayerReport> {
        self.layers.iter().find(|l| l.layer == layer)
    }

    pub fn failures(&self) -> impl Iterator<Item = &LayerReport> + '_ {
        self.layers.iter().filter(|l| l.status == LayerStatus::Failed)
    }
}

/// Inconsistency found by the semantic layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SemanticError {
    #[error("node id {id} is used more than once")]
    DuplicateId { id: NodeId },

    #[error("'{class}' profile names field '{field}', which the class does not declare")]
    UnknownField { class: String, field: String },

    #[error("'{class}' profile names method '{method}', which the class does not declare")]
    UnknownMethod { class: String, method: String },

    #[error("'{class}' names class '{target}', which is not declared in this file")]
    UnknownClass { class: String, target: String },

    #[error("'{class}' refers to widget node {id}, which is not the class '{expected}'")]
    WidgetIdMismatch {
        class: String,
        id: NodeId,
        expected: String,
    },

    #[error("'{member}' is declared in '{actual}' but records owner '{recorded}'")]
    OwnerMismatch {
        member: String,
        actual: String,
        recorded: String,
    },

    #[error("'{class}.{method}' has a lifecycle role but '{class}' is not a component")]
    LifecycleOutsideComponent { class: String, method: String },
}

/// Check the cross references of a tree.
pub fn check_semantics(file: &FileDecl) -> Vec<SemanticError> {
    let mut errors = Vec::new();

    let mut ids = IdCollector::default();
    for import in &file.imports {
        ids.add(import.id);
    }
    for export in &file.exports {
        ids.add(export.id);
    }
    ids.visit_file(file);
    errors.extend(
        ids.duplicates
            .into_iter()
            .map(|id| SemanticError::DuplicateId { id }),
    );

    for class in &file.classes {
        check_class(file, class, &mut errors);
    }
    errors
}

fn check_class(file: &FileDecl, class: &ClassDecl, errors: &mut Vec<SemanticError>) {
    let unknown_field = |field: &str| SemanticError::UnknownField {
        class: class.name.clone(),
        field: field.to_string(),
    };
    let unknown_method = |method: &str| SemanticError::UnknownMethod {
        class: class.name.clone(),
        method: method.to_string(),
    };

    for method in &class.methods {
        if method.class_name != class.name {
            errors.push(SemanticError::OwnerMismatch {
                member: method.name().to_string(),
                actual: class.name.clone(),
                recorded: method.class_name.clone(),
            });
        }
        if method.lifecycle.is_lifecycle() && class.component.is_none() {
            errors.push(SemanticError::LifecycleOutsideComponent {
                class: class.name.clone(),
                method: method.name().to_string(),
            });
        }
    }
    for ctor in &class.constructors {
        if ctor.class_name != class.name {
            errors.push(SemanticError::OwnerMismatch {
                member: ctor.display_name(),
                actual: class.name.clone(),
                recorded: ctor.class_name.clone(),
            });
        }
    }

    if let Some(profile) = &class.component {
        for field in &profile.reactive_fields {
            if class.field(&field.name).is_none() {
                errors.push(unknown_field(&field.name));
            }
        }
        for resource in &profile.resources {
            if class.field(&resource.name).is_none() {
                errors.push(unknown_field(&resource.name));
            }
        }
        match &profile.kind {
            ComponentKind::StatefulWidget { state_class } => {
                if file.class(state_class).is_none() {
                    errors.push(SemanticError::UnknownClass {
                        class: class.name.clone(),
                        target: state_class.clone(),
                    });
                }
            }
            ComponentKind::State {
                widget_class,
                widget: Some(id),
            } => {
                let matches = file
                    .classes
                    .iter()
                    .any(|c| c.id == *id && c.name == *widget_class);
                if !matches {
                    errors.push(SemanticError::WidgetIdMismatch {
                        class: class.name.clone(),
                        id: *id,
                        expected: widget_class.clone(),
                    });
                }
            }
            ComponentKind::State { widget: None, .. } | ComponentKind::Stateless => {}
        }
    }

    if let Some(profile) = &class.provider {
        for mutation in &profile.mutations {
            if class.field(&mutation.field).is_none() {
                errors.push(unknown_field(&mutation.field));
            }
            if class.method(&mutation.method).is_none() {
                errors.push(unknown_method(&mutation.method));
            }
        }
        for call in &profile.notify_calls {
            if class.method(&call.method).is_none() {
                errors.push(unknown_method(&call.method));
            }
        }
    }
}

#[derive(Default)]
struct IdCollector {
    seen: FxHashSet<NodeId>,
    duplicates: Vec<NodeId>,
}

impl IdCollector {
    fn add(&mut self, id: NodeId) {
        if !self.seen.insert(id) && !self.duplicates.contains(&id) {
            self.duplicates.push(id);
        }
    }
}

impl Visitor for IdCollector {
    fn visit_class_decl(&mut self, class: &ClassDecl) {
        self.add(class.id);
        for field in &class.fields {
            self.add(field.id);
        }
        walk_class_decl(self, class);
    }

    fn visit_function_decl(&mut self, function: &FunctionDecl) {
        self.add(function.id);
        walk_function_decl(self, function);
    }

    fn visit_variable_decl(&mut self, decl: &VariableDecl) {
        self.add(decl.id);
        walk_variable_decl(self, decl);
    }

    fn visit_parameter(&mut self, param: &ParameterDecl) {
        self.add(param.id);
        walk_parameter(self, param);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        self.add(stmt.id);
        match &stmt.kind {
            StmtKind::Switch { cases, .. } => {
                for case in cases {
                    self.add(case.id);
                }
            }
            StmtKind::Try { catches, .. } => {
                for catch in catches {
                    self.add(catch.id);
                }
            }
            _ => {}
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        self.add(expr.id);
        walk_expr(self, expr);
    }
}

/// Runs the validation layers over `.ir` buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Validate `data`, comparing against `golden` when given.
    pub fn validate(&self, data: &[u8], golden: Option<&FileDecl>) -> ValidationReport {
        let decoded = match decode(data) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!(error = %e, "integrity check failed");
                let mut layers = vec![LayerReport::from_findings(
                    Layer::Integrity,
                    vec![e.to_string()],
                )];
                layers.extend(
                    Layer::ALL[1..]
                        .iter()
                        .map(|&layer| LayerReport::skipped(layer, "file did not decode")),
                );
                return ValidationReport {
                    file_path: None,
                    layers,
                };
            }
        };
        let file = &decoded.file;
        let options = WriteOptions {
            checksum: decoded.header.has_checksum(),
            debug_info: decoded.header.has_debug_info(),
        };

        let semantic = check_semantics(file).iter().map(ToString::to_string).collect();
        let round_trip = match write_file_ir(file, &options) {
            Ok(bytes) => compare_bytes(data, &bytes),
            Err(e) => vec![format!("re-encode failed: {}", e)],
        };
        let differential = match golden {
            None => LayerReport::skipped(Layer::Differential, "no golden tree supplied"),
            Some(golden) => {
                LayerReport::from_findings(Layer::Differential, diff_golden(golden, file, &options))
            }
        };

        let report = ValidationReport {
            file_path: Some(file.file_path.clone()),
            layers: vec![
                LayerReport::from_findings(Layer::Integrity, Vec::new()),
                LayerReport::from_findings(Layer::Semantic, semantic),
                LayerReport::from_findings(Layer::RoundTrip, round_trip),
                differential,
            ],
        };
        tracing::debug!(file = %file.file_path, valid = report.is_valid(), "validated file");
        report
    }
}

fn compare_bytes(original: &[u8], reencoded: &[u8]) -> Vec<String> {
    if original == reencoded {
        return Vec::new();
    }
    let first = original
        .iter()
        .zip(reencoded)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| original.len().min(reencoded.len()));
    vec![format!(
        "re-encoded bytes differ from offset {} ({} bytes in, {} bytes out)",
        first,
        original.len(),
        reencoded.len()
    )]
}

/// Compare `actual` against `golden` as it would decode under `options`.
fn diff_golden(golden: &FileDecl, actual: &FileDecl, options: &WriteOptions) -> Vec<String> {
    let normalized;
    let expected = if options.debug_info {
        golden
    } else {
        match write_file_ir(golden, options).and_then(|bytes| read_file_ir(&bytes)) {
            Ok(file) => {
                normalized = file;
                &normalized
            }
            Err(e) => return vec![format!("golden tree does not encode: {}", e)],
        }
    };
    diff_files(expected, actual)
}

/// Human-readable differences between two trees, by section.
pub fn diff_files(expected: &FileDecl, actual: &FileDecl) -> Vec<String> {
    let mut out = Vec::new();
    if expected == actual {
        return out;
    }

    macro_rules! scalar {
        ($field:ident) => {
            if expected.$field != actual.$field {
                out.push(format!(
                    "{}: expected {:?}, found {:?}",
                    stringify!($field),
                    expected.$field,
                    actual.$field
                ));
            }
        };
    }
    scalar!(file_path);
    scalar!(content_hash);
    scalar!(library_name);
    scalar!(analyzed_at);

    diff_section(&mut out, "imports", &expected.imports, &actual.imports, |i| i.uri.clone());
    diff_section(&mut out, "exports", &expected.exports, &actual.exports, |e| e.uri.clone());
    diff_section(&mut out, "variables", &expected.variables, &actual.variables, |v| {
        v.name.clone()
    });
    diff_section(&mut out, "functions", &expected.functions, &actual.functions, |f| {
        f.name.clone()
    });
    diff_section(&mut out, "classes", &expected.classes, &actual.classes, |c| c.name.clone());
    diff_section(&mut out, "issues", &expected.issues, &actual.issues, |i| i.code.clone());
    out
}

fn diff_section<T: PartialEq>(
    out: &mut Vec<String>,
    section: &str,
    expected: &[T],
    actual: &[T],
    name: impl Fn(&T) -> String,
) {
    if expected.len() != actual.len() {
        out.push(format!(
            "{}: expected {} entries, found {}",
            section,
            expected.len(),
            actual.len()
        ));
    }
    for (e, a) in expected.iter().zip(actual) {
        if e != a {
            out.push(format!("{}: '{}' differs", section, name(e)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;

    fn counter() -> FileDecl {
        let mut b = FileBuilder::new("lib/counter.dart");
        let id = b.next_id();
        let mut widget = ClassDecl::new(id, b.location(), "Counter");
        widget.component = Some(ComponentProfile {
            kind: ComponentKind::StatefulWidget {
                state_class: "_CounterState".to_string(),
            },
            reactive_fields: Vec::new(),
            resources: Vec::new(),
        });
        let widget_id = widget.id;

        let id = b.next_id();
        let mut state = ClassDecl::new(id, b.location(), "_CounterState");
        let mut profile = ComponentProfile::state("Counter");
        if let ComponentKind::State { widget, .. } = &mut profile.kind {
            *widget = Some(widget_id);
        }
        profile.reactive_fields.push(ReactiveField {
            name: "count".to_string(),
            triggers_rebuild: true,
            is_late: false,
        });
        state.component = Some(profile);
        let id = b.next_id();
        state.fields.push(FieldDecl::new(id, b.location(), "count", TypeIR::simple("int")));

        b.add_class(widget).add_class(state);
        b.build()
    }

    #[test]
    fn test_consistent_tree_has_no_semantic_errors() {
        assert!(check_semantics(&counter()).is_empty());
    }

    #[test]
    fn test_semantic_errors() {
        let mut file = counter();
        let reused = file.classes[0].id;
        let location = file.classes[0].location.clone();
        file.classes[1].fields = vec![FieldDecl::new(reused, location, "other", TypeIR::Dynamic)];
        let errors = check_semantics(&file);
        assert!(errors.contains(&SemanticError::DuplicateId {
            id: file.classes[0].id
        }));
        assert!(errors.contains(&SemanticError::UnknownField {
            class: "_CounterState".to_string(),
            field: "count".to_string(),
        }));
    }

    #[test]
    fn test_lifecycle_role_outside_component() {
        let mut b = FileBuilder::new("lib/a.dart");
        let id = b.next_id();
        let mut class = ClassDecl::new(id, b.location(), "Plain");
        let id = b.next_id();
        let f = FunctionDecl::builder(id, "dispose").build().unwrap();
        class
            .methods
            .push(MethodDecl::new(f, "Other").with_lifecycle(LifecycleRole::Dispose));
        b.add_class(class);

        let errors = check_semantics(&b.build());
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], SemanticError::OwnerMismatch { .. }));
        assert!(matches!(
            errors[1],
            SemanticError::LifecycleOutsideComponent { .. }
        ));
    }

    #[test]
    fn test_diff_files_names_sections() {
        let expected = counter();
        let mut actual = expected.clone();
        actual.content_hash = "changed".to_string();
        actual.classes[1].fields.clear();
        let diffs = diff_files(&expected, &actual);
        assert_eq!(diffs.len(), 2);
        assert!(diffs[0].starts_with("content_hash"));
        assert_eq!(diffs[1], "classes: '_CounterState' differs");
    }

    #[test]
    fn test_compare_bytes_reports_first_offset() {
        assert!(compare_bytes(b"abc", b"abc").is_empty());
        let findings = compare_bytes(b"abcd", b"abXd");
        assert!(findings[0].contains("offset 2"));
        let findings = compare_bytes(b"abc", b"abcd");
        assert!(findings[0].contains("offset 3"));
    }
}

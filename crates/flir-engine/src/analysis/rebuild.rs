//! Rebuild-trigger graph and reactive field access trace.

use serde::Serialize;

use crate::ir::visitor::{walk_expr, Visitor};
use crate::ir::{ClassDecl, ComponentProfile, Expr, ExprKind, FileDecl, NodeId};
use crate::source::SourceLocation;

/// Edge from a reactive field to the build method its mutation invalidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildEdge {
    pub class: String,
    pub field: String,
    pub build_method: NodeId,
}

/// Which renders does mutating field X invalidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebuildGraph {
    pub edges: Vec<RebuildEdge>,
}

impl RebuildGraph {
    /// Build methods invalidated by `field` of `class`.
    pub fn invalidated_by<'a>(
        &'a self,
        class: &'a str,
        field: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.class == class && e.field == field)
            .map(|e| e.build_method)
    }

    /// Fields whose mutation invalidates `build_method`.
    pub fn triggers_of(&self, build_method: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.build_method == build_method)
            .map(|e| e.field.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Rebuild edges for every component class in `file`.
///
/// `late` fields are excluded: they are assigned once and do not drive
/// rendering.
pub fn build_rebuild_graph(file: &FileDecl) -> RebuildGraph {
    let mut graph = RebuildGraph::default();
    for class in &file.classes {
        let (Some(profile), Some(build)) = (&class.component, class.build_method()) else {
            continue;
        };
        for field in &profile.reactive_fields {
            if field.triggers_rebuild && !field.is_late {
                graph.edges.push(RebuildEdge {
                    class: class.name.clone(),
                    field: field.name.clone(),
                    build_method: build.id(),
                });
            }
        }
    }
    graph
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Read,
    Write,
}

/// One read or write of a reactive field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldAccess {
    pub class: String,
    pub field: String,
    /// Method containing the access.
    pub method: String,
    pub kind: AccessKind,
    /// Inside the callback of a mutate call.
    pub inside_mutate: bool,
    pub location: SourceLocation,
}

/// Every reactive field access in the methods of `class`.
pub fn trace_field_accesses(class: &ClassDecl, mutate_method: &str) -> Vec<FieldAccess> {
    let Some(profile) = &class.component else {
        return Vec::new();
    };
    if profile.reactive_fields.is_empty() {
        return Vec::new();
    }

    let mut tracer = AccessTracer {
        class: &class.name,
        profile,
        mutate_method,
        method: "",
        mutate_depth: 0,
        accesses: Vec::new(),
    };
    for method in &class.methods {
        tracer.method = method.name();
        tracer.visit_function_decl(&method.function);
    }
    tracer.accesses
}

struct AccessTracer<'a> {
    class: &'a str,
    profile: &'a ComponentProfile,
    mutate_method: &'a str,
    method: &'a str,
    mutate_depth: usize,
    accesses: Vec<FieldAccess>,
}

impl AccessTracer<'_> {
    fn reactive<'e>(&self, expr: &'e Expr) -> Option<&'e str> {
        expr.member_name()
            .filter(|name| self.profile.reactive_field(name).is_some())
    }

    fn record(&mut self, field: &str, kind: AccessKind, location: &SourceLocation) {
        self.accesses.push(FieldAccess {
            class: self.class.to_string(),
            field: field.to_string(),
            method: self.method.to_string(),
            kind,
            inside_mutate: self.mutate_depth > 0,
            location: location.clone(),
        });
    }
}

impl Visitor for AccessTracer<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Binary { op, left, right } if op.is_assignment() => {
                match self.reactive(left) {
                    Some(field) => self.record(field, AccessKind::Write, &expr.location),
                    None => self.visit_expr(left),
                }
                self.visit_expr(right);
            }
            ExprKind::Unary { op, operand } if op.is_update() => match self.reactive(operand) {
                Some(field) => self.record(field, AccessKind::Write, &expr.location),
                None => self.visit_expr(operand),
            },
            ExprKind::MethodCall { .. } if expr.is_self_call(self.mutate_method) => {
                self.mutate_depth += 1;
                walk_expr(self, expr);
                self.mutate_depth -= 1;
            }
            _ => match self.reactive(expr) {
                Some(field) => self.record(field, AccessKind::Read, &expr.location),
                None => walk_expr(self, expr),
            },
        }
    }
}

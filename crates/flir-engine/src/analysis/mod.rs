//! Flow analysis
//!
//! Per-file static analysis over the IR. One pass builds:
//!
//! - a [`ControlFlowGraph`] per function, method and constructor, and the
//!   statements unreachable from each entry;
//! - the [`RebuildGraph`] linking reactive fields to the build methods they
//!   invalidate, plus a trace of every reactive field access;
//! - a [`LifecycleReport`] with a health score per component class;
//! - provider notification checks and provider dependency cycles;
//! - unreferenced private declarations.
//!
//! [`FlowAnalyzer`] is the entry point. The pass holds no state between
//! files: [`FlowAnalyzer::analyze`] returns a fresh [`FlowAnalysis`] whose
//! issues carry default severities, and [`FlowAnalyzer::analyze_file`]
//! bundles it with the file and the issue list after severity overrides.
//!
//! ```ignore
//! use flir_engine::analysis::{AnalysisConfig, FlowAnalyzer};
//!
//! let analyzed = FlowAnalyzer::new(AnalysisConfig::default()).analyze_file(file);
//! for issue in &analyzed.issues {
//!     println!("{}", issue);
//! }
//! ```

pub mod cfg;
pub mod config;
pub mod lifecycle;
pub mod provider;
pub mod rebuild;
pub mod unused;

pub use cfg::{build_cfg, CfgEdge, CfgNode, CfgNodeId, CfgNodeKind, ControlFlowGraph, EdgeKind};
pub use config::{AnalysisConfig, ConfigError, SeverityOverride};
pub use lifecycle::{check_component, LifecycleReport};
pub use rebuild::{
    build_rebuild_graph, trace_field_accesses, AccessKind, FieldAccess, RebuildEdge, RebuildGraph,
};
pub use unused::{find_unused, DeclarationKind, UnusedDeclaration};

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::diagnostics::{self, AnalysisIssue, IssueCollector, Severity};
use crate::ir::{FileDecl, NodeId};
use crate::source::SourceLocation;

/// A statement no path from its owner's entry reaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreachableCode {
    /// CFG owner, e.g. `Counter.build`.
    pub owner: String,
    pub stmt: NodeId,
    pub location: SourceLocation,
}

/// Everything the pass computed for one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowAnalysis {
    pub cfgs: Vec<ControlFlowGraph>,
    pub rebuild_graph: RebuildGraph,
    pub field_accesses: Vec<FieldAccess>,
    pub lifecycles: Vec<LifecycleReport>,
    pub unreachable: Vec<UnreachableCode>,
    pub unused_declarations: Vec<UnusedDeclaration>,
    /// Each cycle starts and ends with the same provider name.
    pub provider_cycles: Vec<Vec<String>>,
    /// Issues at their rules' default severities.
    pub issues: Vec<AnalysisIssue>,
}

impl FlowAnalysis {
    /// CFG of the function, method or constructor named `owner`.
    pub fn cfg(&self, owner: &str) -> Option<&ControlFlowGraph> {
        self.cfgs.iter().find(|g| g.owner == owner)
    }

    pub fn lifecycle(&self, class: &str) -> Option<&LifecycleReport> {
        self.lifecycles.iter().find(|r| r.class == class)
    }
}

/// A file together with its analysis, handed to backends.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedFile {
    pub file: FileDecl,
    pub flow: FlowAnalysis,
    /// Adapter-reported issues followed by the pass's issues, after
    /// severity overrides, numbered sequentially.
    pub issues: Vec<AnalysisIssue>,
}

impl AnalyzedFile {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FlowAnalyzer {
    config: AnalysisConfig,
}

impl FlowAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every check over `file`.
    pub fn analyze(&self, file: &FileDecl) -> FlowAnalysis {
        let mut issues = IssueCollector::new();
        let mut flow = FlowAnalysis::default();

        flow.cfgs = build_cfgs(file);
        for cfg in &flow.cfgs {
            for node in cfg.unreachable_statements() {
                let Some(stmt) = node.stmt else {
                    continue;
                };
                let location = node
                    .location
                    .clone()
                    .unwrap_or_else(|| SourceLocation::unknown(file.file_path.clone()));
                issues.report_with(
                    &diagnostics::UNREACHABLE_CODE,
                    format!("unreachable statement in '{}'", cfg.owner),
                    location.clone(),
                    Some("remove the statement or the jump before it".to_string()),
                );
                flow.unreachable.push(UnreachableCode {
                    owner: cfg.owner.clone(),
                    stmt,
                    location,
                });
            }
        }

        flow.rebuild_graph = build_rebuild_graph(file);

        let widgets: FxHashSet<&str> = file
            .classes
            .iter()
            .filter(|c| c.is_component())
            .map(|c| c.name.as_str())
            .collect();
        for class in &file.classes {
            if class.component.is_some() {
                flow.field_accesses
                    .extend(trace_field_accesses(class, &self.config.mutate_method));
                flow.lifecycles
                    .extend(check_component(class, &widgets, &self.config, &mut issues));
            }
            if class.provider.is_some() {
                provider::check_notify(class, &self.config.notify_method, &mut issues);
            }
        }
        flow.provider_cycles = provider::check_cycles(file, &mut issues);

        if self.config.unused_declarations {
            flow.unused_declarations = find_unused(file);
            for decl in &flow.unused_declarations {
                issues.report_with(
                    &diagnostics::UNUSED_DECLARATION,
                    format!("{} '{}' is never referenced", decl.kind.as_str(), decl.name),
                    decl.location.clone(),
                    Some(format!("remove '{}'", decl.name)),
                );
            }
        }

        flow.issues = issues.into_issues();
        tracing::debug!(
            file = %file.file_path,
            cfgs = flow.cfgs.len(),
            components = flow.lifecycles.len(),
            issues = flow.issues.len(),
            "analyzed file"
        );
        flow
    }

    /// Analyze `file` and merge its adapter issues with the pass's issues.
    pub fn analyze_file(&self, file: FileDecl) -> AnalyzedFile {
        let flow = self.analyze(&file);
        let mut collector = IssueCollector::new();
        let merged = file.issues.iter().chain(&flow.issues).cloned().collect();
        collector.extend(self.config.apply_overrides(merged));
        AnalyzedFile {
            file,
            flow,
            issues: collector.into_issues(),
        }
    }
}

/// One CFG per function, constructor and method, in declaration order.
fn build_cfgs(file: &FileDecl) -> Vec<ControlFlowGraph> {
    let mut cfgs = Vec::new();
    for function in &file.functions {
        cfgs.push(build_cfg(function.name.clone(), function.id, function.statements()));
    }
    for class in &file.classes {
        for ctor in &class.constructors {
            cfgs.push(build_cfg(ctor.display_name(), ctor.id(), ctor.function.statements()));
        }
        for method in &class.methods {
            cfgs.push(build_cfg(
                format!("{}.{}", class.name, method.name()),
                method.id(),
                method.function.statements(),
            ));
        }
    }
    cfgs
}

/// Analyze `file` with `config`.
pub fn analyze_file(file: FileDecl, config: &AnalysisConfig) -> AnalyzedFile {
    FlowAnalyzer::new(config.clone()).analyze_file(file)
}

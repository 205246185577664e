//! Statement IR nodes

use serde::{Deserialize, Serialize};

use super::decl::VariableDecl;
use super::expr::Expr;
use super::node::{NodeId, NodeMetadata};
use super::types::TypeIR;
use crate::source::SourceLocation;

/// Statement node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub id: NodeId,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
    /// `outer:` labels written before the statement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum StmtKind {
    /// `final x = 1;`
    VariableDecl { decl: VariableDecl },

    /// `foo();`
    Expression { expr: Expr },

    /// `return;` / `return x;`
    Return {
        #[serde(default)]
        value: Option<Expr>,
    },

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        #[serde(default)]
        else_branch: Option<Box<Stmt>>,
    },

    /// `for (var i = 0; i < n; i++) ...`
    For {
        #[serde(default)]
        initializers: Vec<Stmt>,
        #[serde(default)]
        condition: Option<Expr>,
        #[serde(default)]
        updaters: Vec<Expr>,
        body: Box<Stmt>,
    },

    /// `for (final item in items) ...`, `await for (...)`
    ForEach {
        variable: String,
        #[serde(default)]
        variable_type: Option<TypeIR>,
        iterable: Expr,
        body: Box<Stmt>,
        #[serde(default)]
        is_await: bool,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
    },

    Switch {
        subject: Expr,
        #[serde(default)]
        cases: Vec<SwitchCase>,
        #[serde(default)]
        default: Option<Vec<Stmt>>,
    },

    Try {
        body: Vec<Stmt>,
        #[serde(default)]
        catches: Vec<CatchClause>,
        #[serde(default)]
        finally: Option<Vec<Stmt>>,
    },

    Block { statements: Vec<Stmt> },

    Break {
        #[serde(default)]
        label: Option<String>,
    },

    Continue {
        #[serde(default)]
        label: Option<String>,
    },

    Throw { value: Expr },

    Assert {
        condition: Expr,
        #[serde(default)]
        message: Option<Expr>,
    },

    /// `;`
    Empty,
}

/// `case a: case b: body` arm of a switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub id: NodeId,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
    pub patterns: Vec<Expr>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

/// `on FormatException catch (e, st) { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub id: NodeId,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
    #[serde(default)]
    pub exception_type: Option<TypeIR>,
    #[serde(default)]
    pub exception_param: Option<String>,
    #[serde(default)]
    pub stack_trace_param: Option<String>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

impl Stmt {
    pub fn new(id: NodeId, location: SourceLocation, kind: StmtKind) -> Self {
        Self {
            id,
            location,
            metadata: None,
            labels: Vec::new(),
            kind,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// The expression of an expression statement.
    pub fn as_expression(&self) -> Option<&Expr> {
        match &self.kind {
            StmtKind::Expression { expr } => Some(expr),
            _ => None,
        }
    }

    /// Whether control never falls through to the next statement.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self.kind,
            StmtKind::Return { .. }
                | StmtKind::Throw { .. }
                | StmtKind::Break { .. }
                | StmtKind::Continue { .. }
        )
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self.kind,
            StmtKind::For { .. }
                | StmtKind::ForEach { .. }
                | StmtKind::While { .. }
                | StmtKind::DoWhile { .. }
        )
    }
}

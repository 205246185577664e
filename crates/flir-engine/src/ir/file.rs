//! File-level IR and the builder AST adapters use to assemble it.

use serde::{Deserialize, Serialize};

use super::decl::{ClassDecl, ExportDecl, FunctionBody, FunctionDecl, ImportDecl, VariableDecl};
use super::error::ConstructionError;
use super::expr::{Argument, BinaryOp, Expr, ExprKind};
use super::node::{LiteralValue, NodeId, NodeIdGen};
use super::stmt::{Stmt, StmtKind};
use super::types::TypeIR;
use crate::diagnostics::AnalysisIssue;
use crate::source::SourceLocation;

/// One analyzed source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDecl {
    pub file_path: String,
    #[serde(default)]
    pub content_hash: String,
    /// Empty when the file has no `library` directive.
    #[serde(default)]
    pub library_name: String,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub analyzed_at: u64,
    #[serde(default)]
    pub imports: Vec<ImportDecl>,
    #[serde(default)]
    pub exports: Vec<ExportDecl>,
    #[serde(default)]
    pub variables: Vec<VariableDecl>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
    /// Issues reported by the AST adapter, not nodes of the tree.
    #[serde(default)]
    pub issues: Vec<AnalysisIssue>,
}

impl FileDecl {
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Re-check the invariants of every function, method and constructor.
    ///
    /// Needed for trees that did not come through the builders, such as
    /// JSON documents.
    pub fn check_invariants(&self) -> Result<(), ConstructionError> {
        for function in &self.functions {
            function.validate()?;
        }
        for class in &self.classes {
            for method in &class.methods {
                method.function.validate()?;
            }
            for ctor in &class.constructors {
                ctor.validate()?;
            }
        }
        Ok(())
    }
}

/// Assembles a [`FileDecl`], handing out node ids as nodes are created.
///
/// The node helpers (`expr`, `stmt`, `call`, ...) stamp each node with the
/// current cursor location, set with [`FileBuilder::at`].
#[derive(Debug, Clone)]
pub struct FileBuilder {
    ids: NodeIdGen,
    cursor: SourceLocation,
    file: FileDecl,
}

impl FileBuilder {
    pub fn new(file_path: impl Into<String>) -> Self {
        let file_path = file_path.into();
        Self {
            ids: NodeIdGen::new(),
            cursor: SourceLocation::new(file_path.clone(), 1, 1, 0, 0),
            file: FileDecl {
                file_path,
                content_hash: String::new(),
                library_name: String::new(),
                analyzed_at: 0,
                imports: Vec::new(),
                exports: Vec::new(),
                variables: Vec::new(),
                functions: Vec::new(),
                classes: Vec::new(),
                issues: Vec::new(),
            },
        }
    }

    pub fn content_hash(&mut self, hash: impl Into<String>) -> &mut Self {
        self.file.content_hash = hash.into();
        self
    }

    pub fn library_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.file.library_name = name.into();
        self
    }

    pub fn analyzed_at(&mut self, secs: u64) -> &mut Self {
        self.file.analyzed_at = secs;
        self
    }

    pub fn file_path(&self) -> &str {
        &self.file.file_path
    }

    pub fn next_id(&mut self) -> NodeId {
        self.ids.next_id()
    }

    /// Move the cursor to `line:column`.
    pub fn at(&mut self, line: u32, column: u32) -> &mut Self {
        self.cursor.line = line;
        self.cursor.column = column;
        self
    }

    pub fn location(&self) -> SourceLocation {
        self.cursor.clone()
    }

    pub fn add_import(&mut self, import: ImportDecl) -> &mut Self {
        self.file.imports.push(import);
        self
    }

    pub fn add_export(&mut self, export: ExportDecl) -> &mut Self {
        self.file.exports.push(export);
        self
    }

    pub fn add_variable(&mut self, variable: VariableDecl) -> &mut Self {
        self.file.variables.push(variable);
        self
    }

    pub fn add_function(&mut self, function: FunctionDecl) -> &mut Self {
        self.file.functions.push(function);
        self
    }

    pub fn add_class(&mut self, class: ClassDecl) -> &mut Self {
        self.file.classes.push(class);
        self
    }

    pub fn add_issue(&mut self, issue: AnalysisIssue) -> &mut Self {
        self.file.issues.push(issue);
        self
    }

    pub fn build(self) -> FileDecl {
        self.file
    }

    // ------------------------------------------------------------------
    // Node helpers
    // ------------------------------------------------------------------

    pub fn expr(&mut self, kind: ExprKind) -> Expr {
        self.typed_expr(TypeIR::Dynamic, kind)
    }

    pub fn typed_expr(&mut self, result_type: TypeIR, kind: ExprKind) -> Expr {
        let id = self.next_id();
        Expr::new(id, self.location(), result_type, kind)
    }

    pub fn stmt(&mut self, kind: StmtKind) -> Stmt {
        let id = self.next_id();
        Stmt::new(id, self.location(), kind)
    }

    pub fn literal(&mut self, value: LiteralValue) -> Expr {
        let ty = match &value {
            LiteralValue::String(_) => TypeIR::simple("String"),
            LiteralValue::Int(_) => TypeIR::simple("int"),
            LiteralValue::Double(_) => TypeIR::simple("double"),
            LiteralValue::Bool(_) => TypeIR::simple("bool"),
            LiteralValue::Null => TypeIR::simple("Null"),
            LiteralValue::List(_) | LiteralValue::Map(_) => TypeIR::Dynamic,
        };
        self.typed_expr(ty, ExprKind::Literal { value })
    }

    pub fn ident(&mut self, name: &str) -> Expr {
        self.expr(ExprKind::Identifier {
            name: name.to_string(),
        })
    }

    pub fn this(&mut self) -> Expr {
        self.expr(ExprKind::This)
    }

    /// `target.method(args)`, or `method(args)` without a target.
    pub fn call(&mut self, target: Option<Expr>, method: &str, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::MethodCall {
            target: target.map(Box::new),
            method: method.to_string(),
            type_args: Vec::new(),
            arguments: args.into_iter().map(Argument::positional).collect(),
            null_aware: false,
        })
    }

    /// `super.method()`
    pub fn super_call(&mut self, method: &str) -> Expr {
        let target = self.expr(ExprKind::Super);
        self.call(Some(target), method, Vec::new())
    }

    /// `name = value`
    pub fn assign(&mut self, name: &str, value: Expr) -> Expr {
        let left = self.ident(name);
        self.expr(ExprKind::Binary {
            op: BinaryOp::Assign,
            left: Box::new(left),
            right: Box::new(value),
        })
    }

    /// `() { statements }` / `() async { statements }`
    pub fn closure(&mut self, statements: Vec<Stmt>, is_async: bool) -> Expr {
        self.expr(ExprKind::FunctionLiteral {
            parameters: Vec::new(),
            body: FunctionBody::Block { statements },
            is_async,
            is_generator: false,
        })
    }

    /// `Type(args)`
    pub fn new_instance(&mut self, type_name: &str, args: Vec<Expr>) -> Expr {
        let ty = TypeIR::simple(type_name);
        self.typed_expr(
            ty.clone(),
            ExprKind::InstanceCreation {
                ty,
                constructor: None,
                arguments: args.into_iter().map(Argument::positional).collect(),
                is_const: false,
            },
        )
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expression { expr })
    }

    pub fn block(&mut self, statements: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::Block { statements })
    }
}

//! Typed intermediate representation of one source file.
//!
//! The tree is closed: every expression, statement and type form is a
//! variant of an enum, so consumers match exhaustively. Nodes own their
//! children; cross references (state to widget, provider to provider) are
//! names or [`NodeId`]s resolved through lookup tables.

pub mod decl;
pub mod error;
pub mod expr;
pub mod file;
pub mod node;
pub mod stmt;
pub mod types;
pub mod visitor;

pub use decl::{
    Accessor, ClassDecl, ComponentKind, ComponentProfile, ConstructorDecl, ConstructorInvocation,
    ExportDecl, FieldDecl, FieldInitializer, FunctionBody, FunctionDecl, FunctionDeclBuilder,
    FunctionModifiers, ImportDecl, LifecycleRole, ManagedResource, MethodDecl, NotifyCall,
    ParameterDecl, ParameterFlags, ParameterKind, ProviderProfile, ReactiveField, ResourceKind,
    StateMutation, VariableDecl,
};
pub use error::ConstructionError;
pub use expr::{Argument, BinaryOp, Expr, ExprKind, MapEntry, StringPart, UnaryOp};
pub use file::{FileBuilder, FileDecl};
pub use node::{Annotation, LiteralValue, NodeId, NodeIdGen, NodeMetadata};
pub use stmt::{CatchClause, Stmt, StmtKind, SwitchCase};
pub use types::{NamedType, NullableType, TypeIR};
pub use visitor::Visitor;

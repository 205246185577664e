//! Declaration IR nodes
//!
//! Methods and constructors wrap a [`FunctionDecl`] instead of extending it,
//! and component or provider behavior is attached to a [`ClassDecl`] as an
//! optional profile record. Construction goes through validating
//! constructors so a tree that exists is a tree that satisfies the IR
//! invariants.

use serde::{Deserialize, Serialize};

use super::error::ConstructionError;
use super::expr::{Argument, Expr};
use super::node::{NodeId, NodeMetadata};
use super::stmt::Stmt;
use super::types::TypeIR;
use crate::source::SourceLocation;

// ============================================================================
// Variables and fields
// ============================================================================

/// Top-level or local variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub id: NodeId,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
    pub name: String,
    #[serde(default)]
    pub ty: TypeIR,
    #[serde(default)]
    pub initializer: Option<Expr>,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_late: bool,
}

impl VariableDecl {
    pub fn new(id: NodeId, location: SourceLocation, name: impl Into<String>, ty: TypeIR) -> Self {
        Self {
            id,
            location,
            metadata: None,
            name: name.into(),
            ty,
            initializer: None,
            is_final: false,
            is_const: false,
            is_late: false,
        }
    }

    pub fn with_initializer(mut self, initializer: Expr) -> Self {
        self.initializer = Some(initializer);
        self
    }
}

/// Class field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub id: NodeId,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
    pub name: String,
    #[serde(default)]
    pub ty: TypeIR,
    #[serde(default)]
    pub initializer: Option<Expr>,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_late: bool,
    #[serde(default)]
    pub is_static: bool,
}

impl FieldDecl {
    pub fn new(id: NodeId, location: SourceLocation, name: impl Into<String>, ty: TypeIR) -> Self {
        Self {
            id,
            location,
            metadata: None,
            name: name.into(),
            ty,
            initializer: None,
            is_final: false,
            is_const: false,
            is_late: false,
            is_static: false,
        }
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// How a parameter is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterKind {
    /// `f(int a)` / `f([int a = 0])`
    Positional { optional: bool },
    /// `f({int a = 0})` / `f({required int a})`
    Named { required: bool },
}

/// Flags as reported by an AST adapter, before validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterFlags {
    pub is_named: bool,
    pub is_positional: bool,
    pub is_required: bool,
    pub is_optional: bool,
    /// `this.x`
    pub is_field_formal: bool,
    /// `super.x`
    pub is_super_formal: bool,
}

impl ParameterFlags {
    pub fn positional() -> Self {
        Self {
            is_positional: true,
            ..Self::default()
        }
    }

    pub fn optional_positional() -> Self {
        Self {
            is_positional: true,
            is_optional: true,
            ..Self::default()
        }
    }

    pub fn named() -> Self {
        Self {
            is_named: true,
            ..Self::default()
        }
    }

    pub fn required_named() -> Self {
        Self {
            is_named: true,
            is_required: true,
            ..Self::default()
        }
    }

    pub fn field_formal(mut self) -> Self {
        self.is_field_formal = true;
        self
    }
}

/// Function, method or constructor parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub id: NodeId,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
    pub name: String,
    #[serde(default)]
    pub ty: TypeIR,
    pub kind: ParameterKind,
    #[serde(default)]
    pub default_value: Option<Expr>,
    #[serde(default)]
    pub is_field_formal: bool,
    #[serde(default)]
    pub is_super_formal: bool,
}

impl ParameterDecl {
    pub fn new(
        id: NodeId,
        location: SourceLocation,
        name: impl Into<String>,
        ty: TypeIR,
        flags: ParameterFlags,
        default_value: Option<Expr>,
    ) -> Result<Self, ConstructionError> {
        let name = name.into();
        let kind = match (flags.is_named, flags.is_positional) {
            (true, true) => return Err(ConstructionError::NamedAndPositional { name }),
            (false, false) => return Err(ConstructionError::NeitherNamedNorPositional { name }),
            (true, false) => ParameterKind::Named {
                required: flags.is_required,
            },
            (false, true) => {
                if flags.is_required {
                    return Err(ConstructionError::RequiredPositional { name });
                }
                ParameterKind::Positional {
                    optional: flags.is_optional,
                }
            }
        };
        Ok(Self {
            id,
            location,
            metadata: None,
            name,
            ty,
            kind,
            default_value,
            is_field_formal: flags.is_field_formal,
            is_super_formal: flags.is_super_formal,
        })
    }

    /// Flags equivalent to this parameter's kind.
    pub fn flags(&self) -> ParameterFlags {
        let mut flags = ParameterFlags {
            is_field_formal: self.is_field_formal,
            is_super_formal: self.is_super_formal,
            ..ParameterFlags::default()
        };
        match self.kind {
            ParameterKind::Positional { optional } => {
                flags.is_positional = true;
                flags.is_optional = optional;
            }
            ParameterKind::Named { required } => {
                flags.is_named = true;
                flags.is_required = required;
            }
        }
        flags
    }

    pub fn is_named(&self) -> bool {
        matches!(self.kind, ParameterKind::Named { .. })
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Body of a function, method, constructor or closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "body", rename_all = "snake_case")]
pub enum FunctionBody {
    /// `{ ... }`
    Block { statements: Vec<Stmt> },
    /// `=> expr`
    Expression { expr: Box<Expr> },
}

impl FunctionBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, FunctionBody::Block { statements } if statements.is_empty())
    }

    /// Statements of a block body; empty for expression bodies.
    pub fn statements(&self) -> &[Stmt] {
        match self {
            FunctionBody::Block { statements } => statements,
            FunctionBody::Expression { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionModifiers {
    #[serde(default)]
    pub is_async: bool,
    /// `sync*` or `async*`
    #[serde(default)]
    pub is_generator: bool,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_external: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessor {
    #[default]
    None,
    Getter,
    Setter,
}

/// Function declaration shared by top-level functions, methods and
/// constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub id: NodeId,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
    pub name: String,
    #[serde(default)]
    pub return_type: TypeIR,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default)]
    pub type_parameters: Vec<TypeIR>,
    #[serde(default)]
    pub body: Option<FunctionBody>,
    #[serde(default)]
    pub modifiers: FunctionModifiers,
    #[serde(default)]
    pub accessor: Accessor,
}

impl FunctionDecl {
    pub fn builder(id: NodeId, name: impl Into<String>) -> FunctionDeclBuilder {
        FunctionDeclBuilder {
            decl: FunctionDecl {
                id,
                location: SourceLocation::default(),
                metadata: None,
                name: name.into(),
                return_type: TypeIR::Dynamic,
                parameters: Vec::new(),
                type_parameters: Vec::new(),
                body: None,
                modifiers: FunctionModifiers::default(),
                accessor: Accessor::None,
            },
        }
    }

    /// Check the modifier and accessor invariants.
    pub fn validate(&self) -> Result<(), ConstructionError> {
        let m = &self.modifiers;
        if m.is_const && (m.is_async || m.is_generator) {
            let modifier = match (m.is_async, m.is_generator) {
                (true, true) => "async*",
                (true, false) => "async",
                _ => "sync*",
            };
            return Err(ConstructionError::ConstWithAsync {
                name: self.name.clone(),
                modifier,
            });
        }
        if m.is_abstract && self.body.as_ref().is_some_and(|b| !b.is_empty()) {
            return Err(ConstructionError::AbstractWithBody {
                name: self.name.clone(),
            });
        }
        match self.accessor {
            Accessor::Getter if !self.parameters.is_empty() => {
                Err(ConstructionError::GetterWithParameters {
                    name: self.name.clone(),
                    count: self.parameters.len(),
                })
            }
            Accessor::Setter if self.parameters.len() != 1 => Err(ConstructionError::SetterArity {
                name: self.name.clone(),
                count: self.parameters.len(),
            }),
            _ => Ok(()),
        }
    }

    pub fn statements(&self) -> &[Stmt] {
        self.body.as_ref().map(FunctionBody::statements).unwrap_or(&[])
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDecl> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// Builder for [`FunctionDecl`]; `build` enforces the invariants.
#[derive(Debug, Clone)]
pub struct FunctionDeclBuilder {
    decl: FunctionDecl,
}

impl FunctionDeclBuilder {
    pub fn location(mut self, location: SourceLocation) -> Self {
        self.decl.location = location;
        self
    }

    pub fn metadata(mut self, metadata: NodeMetadata) -> Self {
        self.decl.metadata = Some(metadata);
        self
    }

    pub fn return_type(mut self, ty: TypeIR) -> Self {
        self.decl.return_type = ty;
        self
    }

    pub fn parameter(mut self, param: ParameterDecl) -> Self {
        self.decl.parameters.push(param);
        self
    }

    pub fn parameters(mut self, params: Vec<ParameterDecl>) -> Self {
        self.decl.parameters = params;
        self
    }

    pub fn type_parameter(mut self, ty: TypeIR) -> Self {
        self.decl.type_parameters.push(ty);
        self
    }

    pub fn body(mut self, statements: Vec<Stmt>) -> Self {
        self.decl.body = Some(FunctionBody::Block { statements });
        self
    }

    pub fn expression_body(mut self, expr: Expr) -> Self {
        self.decl.body = Some(FunctionBody::Expression {
            expr: Box::new(expr),
        });
        self
    }

    pub fn modifiers(mut self, modifiers: FunctionModifiers) -> Self {
        self.decl.modifiers = modifiers;
        self
    }

    pub fn is_async(mut self) -> Self {
        self.decl.modifiers.is_async = true;
        self
    }

    pub fn is_generator(mut self) -> Self {
        self.decl.modifiers.is_generator = true;
        self
    }

    pub fn is_const(mut self) -> Self {
        self.decl.modifiers.is_const = true;
        self
    }

    pub fn is_abstract(mut self) -> Self {
        self.decl.modifiers.is_abstract = true;
        self
    }

    pub fn is_static(mut self) -> Self {
        self.decl.modifiers.is_static = true;
        self
    }

    pub fn accessor(mut self, accessor: Accessor) -> Self {
        self.decl.accessor = accessor;
        self
    }

    pub fn build(self) -> Result<FunctionDecl, ConstructionError> {
        self.decl.validate()?;
        Ok(self.decl)
    }
}

// ============================================================================
// Methods and constructors
// ============================================================================

/// Role a method plays in a component's lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum LifecycleRole {
    #[default]
    None,
    /// `initState`
    Init,
    /// `dispose`
    Dispose,
    /// `build(BuildContext context)`
    Build {
        #[serde(default)]
        context_param: Option<String>,
    },
    /// `didUpdateWidget(covariant T oldWidget)`
    DidUpdateWidget {
        #[serde(default)]
        old_widget_param: Option<String>,
    },
    /// Any other framework hook, e.g. `didChangeDependencies`
    Other { hook: String },
}

impl LifecycleRole {
    pub fn is_lifecycle(&self) -> bool {
        !matches!(self, LifecycleRole::None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub function: FunctionDecl,
    /// Name of the declaring class.
    pub class_name: String,
    #[serde(default)]
    pub is_override: bool,
    #[serde(default)]
    pub lifecycle: LifecycleRole,
}

impl MethodDecl {
    pub fn new(function: FunctionDecl, class_name: impl Into<String>) -> Self {
        Self {
            function,
            class_name: class_name.into(),
            is_override: false,
            lifecycle: LifecycleRole::None,
        }
    }

    pub fn with_lifecycle(mut self, role: LifecycleRole) -> Self {
        self.lifecycle = role;
        self.is_override = true;
        self
    }

    pub fn id(&self) -> NodeId {
        self.function.id
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// `this.field = value` entry of an initializer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInitializer {
    pub field: String,
    pub value: Expr,
}

/// `super(...)` / `this.named(...)` invocation in a constructor header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorInvocation {
    #[serde(default)]
    pub constructor_name: Option<String>,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    pub function: FunctionDecl,
    pub class_name: String,
    /// `named` in `Foo.named()`; `None` for the unnamed constructor.
    #[serde(default)]
    pub constructor_name: Option<String>,
    #[serde(default)]
    pub initializers: Vec<FieldInitializer>,
    #[serde(default)]
    pub super_call: Option<ConstructorInvocation>,
    #[serde(default)]
    pub redirect: Option<ConstructorInvocation>,
    #[serde(default)]
    pub is_factory: bool,
}

impl ConstructorDecl {
    pub fn new(
        function: FunctionDecl,
        class_name: impl Into<String>,
        constructor_name: Option<String>,
        initializers: Vec<FieldInitializer>,
        super_call: Option<ConstructorInvocation>,
        redirect: Option<ConstructorInvocation>,
        is_factory: bool,
    ) -> Result<Self, ConstructionError> {
        let decl = Self {
            function,
            class_name: class_name.into(),
            constructor_name,
            initializers,
            super_call,
            redirect,
            is_factory,
        };
        decl.validate()?;
        Ok(decl)
    }

    pub fn validate(&self) -> Result<(), ConstructionError> {
        self.function.validate()?;
        let has_body = self.function.body.as_ref().is_some_and(|b| !b.is_empty());
        if self.redirect.is_some()
            && (!self.initializers.is_empty() || self.super_call.is_some() || has_body)
        {
            return Err(ConstructionError::RedirectWithInitializers {
                name: self.display_name(),
            });
        }
        Ok(())
    }

    pub fn id(&self) -> NodeId {
        self.function.id
    }

    /// `Foo` or `Foo.named`
    pub fn display_name(&self) -> String {
        match &self.constructor_name {
            Some(n) => format!("{}.{}", self.class_name, n),
            None => self.class_name.clone(),
        }
    }
}

// ============================================================================
// Component and provider profiles
// ============================================================================

/// Which side of the component split a class is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentKind {
    /// The immutable configuration half; `state_class` names its state.
    StatefulWidget { state_class: String },
    /// The mutable state half, owned by `widget_class`.
    State {
        widget_class: String,
        /// Id of the owning widget's class declaration, when it is in the
        /// same file.
        #[serde(default)]
        widget: Option<NodeId>,
    },
    Stateless,
}

/// Field whose mutation through the mutate call schedules a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactiveField {
    pub name: String,
    #[serde(default = "default_true")]
    pub triggers_rebuild: bool,
    #[serde(default)]
    pub is_late: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Needs `dispose()`
    Controller,
    /// Needs `cancel()`
    Subscription,
}

/// Field holding something that must be released in dispose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedResource {
    pub name: String,
    pub type_name: String,
    pub kind: ResourceKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentProfile {
    pub kind: ComponentKind,
    #[serde(default)]
    pub reactive_fields: Vec<ReactiveField>,
    #[serde(default)]
    pub resources: Vec<ManagedResource>,
}

impl ComponentProfile {
    pub fn state(widget_class: impl Into<String>) -> Self {
        Self {
            kind: ComponentKind::State {
                widget_class: widget_class.into(),
                widget: None,
            },
            reactive_fields: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn is_state(&self) -> bool {
        matches!(self.kind, ComponentKind::State { .. })
    }

    pub fn reactive_field(&self, name: &str) -> Option<&ReactiveField> {
        self.reactive_fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyCall {
    /// Method containing the call.
    pub method: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMutation {
    pub field: String,
    pub method: String,
    pub location: SourceLocation,
}

/// Change-notifier style state holder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
    #[serde(default)]
    pub notify_calls: Vec<NotifyCall>,
    /// Names of classes that read this provider.
    #[serde(default)]
    pub consumers: Vec<String>,
    #[serde(default)]
    pub mutations: Vec<StateMutation>,
    /// Names of other provider classes this one reads.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

// ============================================================================
// Classes, imports, exports
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub id: NodeId,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
    pub name: String,
    #[serde(default)]
    pub superclass: Option<TypeIR>,
    #[serde(default)]
    pub interfaces: Vec<TypeIR>,
    #[serde(default)]
    pub mixins: Vec<TypeIR>,
    #[serde(default)]
    pub type_parameters: Vec<TypeIR>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_sealed: bool,
    #[serde(default)]
    pub component: Option<ComponentProfile>,
    #[serde(default)]
    pub provider: Option<ProviderProfile>,
}

impl ClassDecl {
    pub fn new(id: NodeId, location: SourceLocation, name: impl Into<String>) -> Self {
        Self {
            id,
            location,
            metadata: None,
            name: name.into(),
            superclass: None,
            interfaces: Vec::new(),
            mixins: Vec::new(),
            type_parameters: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            is_abstract: false,
            is_final: false,
            is_sealed: false,
            component: None,
            provider: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name() == name)
    }

    /// First method playing the given lifecycle role.
    pub fn lifecycle_method(&self, matches: impl Fn(&LifecycleRole) -> bool) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| matches(&m.lifecycle))
    }

    pub fn init_method(&self) -> Option<&MethodDecl> {
        self.lifecycle_method(|r| matches!(r, LifecycleRole::Init))
    }

    pub fn dispose_method(&self) -> Option<&MethodDecl> {
        self.lifecycle_method(|r| matches!(r, LifecycleRole::Dispose))
    }

    pub fn build_method(&self) -> Option<&MethodDecl> {
        self.lifecycle_method(|r| matches!(r, LifecycleRole::Build { .. }))
    }

    pub fn did_update_widget_method(&self) -> Option<&MethodDecl> {
        self.lifecycle_method(|r| matches!(r, LifecycleRole::DidUpdateWidget { .. }))
    }

    pub fn is_component(&self) -> bool {
        self.component.is_some()
    }

    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// `import 'package:x/y.dart' as y show A hide B;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub id: NodeId,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
    pub uri: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub show: Vec<String>,
    #[serde(default)]
    pub hide: Vec<String>,
    #[serde(default)]
    pub is_deferred: bool,
}

impl ImportDecl {
    pub fn new(id: NodeId, location: SourceLocation, uri: impl Into<String>) -> Self {
        Self {
            id,
            location,
            metadata: None,
            uri: uri.into(),
            prefix: None,
            show: Vec::new(),
            hide: Vec::new(),
            is_deferred: false,
        }
    }
}

/// `export 'src/a.dart' show A;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDecl {
    pub id: NodeId,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
    pub uri: String,
    #[serde(default)]
    pub show: Vec<String>,
    #[serde(default)]
    pub hide: Vec<String>,
}

impl ExportDecl {
    pub fn new(id: NodeId, location: SourceLocation, uri: impl Into<String>) -> Self {
        Self {
            id,
            location,
            metadata: None,
            uri: uri.into(),
            show: Vec::new(),
            hide: Vec::new(),
        }
    }
}

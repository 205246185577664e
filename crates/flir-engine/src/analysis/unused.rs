//! Unreferenced library-private declarations.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::ir::visitor::{
    walk_class_decl, walk_expr, walk_function_decl, walk_parameter, walk_stmt,
    walk_variable_decl, Visitor,
};
use crate::ir::{
    ClassDecl, ComponentKind, Expr, ExprKind, FileDecl, FunctionDecl, NodeId, ParameterDecl,
    Stmt, StmtKind, TypeIR, VariableDecl,
};
use crate::source::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Function,
    Variable,
    Class,
    Method,
    Field,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Function => "function",
            DeclarationKind::Variable => "variable",
            DeclarationKind::Class => "class",
            DeclarationKind::Method => "method",
            DeclarationKind::Field => "field",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedDeclaration {
    pub name: String,
    pub kind: DeclarationKind,
    pub id: NodeId,
    pub location: SourceLocation,
}

fn is_private(name: &str) -> bool {
    name.starts_with('_')
}

/// `_`-prefixed declarations whose name appears nowhere else in `file`.
///
/// Lifecycle methods and overrides are invoked by the framework and never
/// reported.
pub fn find_unused(file: &FileDecl) -> Vec<UnusedDeclaration> {
    let mut refs = References::default();
    refs.visit_file(file);
    let used = refs.names;

    let mut unused = Vec::new();
    let mut check = |name: &str, kind, id, location: &SourceLocation| {
        if is_private(name) && !used.contains(name) {
            unused.push(UnusedDeclaration {
                name: name.to_string(),
                kind,
                id,
                location: location.clone(),
            });
        }
    };

    for function in &file.functions {
        check(&function.name, DeclarationKind::Function, function.id, &function.location);
    }
    for variable in &file.variables {
        check(&variable.name, DeclarationKind::Variable, variable.id, &variable.location);
    }
    for class in &file.classes {
        check(&class.name, DeclarationKind::Class, class.id, &class.location);
        for field in &class.fields {
            check(&field.name, DeclarationKind::Field, field.id, &field.location);
        }
        for method in &class.methods {
            if method.is_override || method.lifecycle.is_lifecycle() {
                continue;
            }
            check(
                method.name(),
                DeclarationKind::Method,
                method.id(),
                &method.function.location,
            );
        }
    }
    unused
}

/// Every name the file mentions outside of declaration sites.
#[derive(Default)]
struct References {
    names: FxHashSet<String>,
}

impl References {
    fn add(&mut self, name: &str) {
        if !self.names.contains(name) {
            self.names.insert(name.to_string());
        }
    }

    fn add_type(&mut self, ty: &TypeIR) {
        match ty.non_nullable() {
            TypeIR::Simple { name, type_args } | TypeIR::Generic { name, type_args } => {
                self.add(name);
                for arg in type_args {
                    self.add_type(arg);
                }
            }
            TypeIR::Function {
                return_type,
                positional,
                named,
            } => {
                self.add_type(return_type);
                for ty in positional {
                    self.add_type(ty);
                }
                for slot in named {
                    self.add_type(&slot.ty);
                }
            }
            TypeIR::TypeParameter { bound, .. } => {
                if let Some(bound) = bound {
                    self.add_type(bound);
                }
            }
            TypeIR::Dynamic | TypeIR::Void | TypeIR::Never | TypeIR::Nullable { .. } => {}
        }
    }
}

impl Visitor for References {
    fn visit_class_decl(&mut self, class: &ClassDecl) {
        for ty in class
            .superclass
            .iter()
            .chain(&class.interfaces)
            .chain(&class.mixins)
            .chain(&class.type_parameters)
        {
            self.add_type(ty);
        }
        for field in &class.fields {
            self.add_type(&field.ty);
        }
        for ctor in &class.constructors {
            for init in &ctor.initializers {
                self.add(&init.field);
            }
            for call in ctor.super_call.iter().chain(&ctor.redirect) {
                if let Some(name) = &call.constructor_name {
                    self.add(name);
                }
            }
        }
        if let Some(profile) = &class.component {
            match &profile.kind {
                ComponentKind::StatefulWidget { state_class } => self.add(state_class),
                ComponentKind::State { widget_class, .. } => self.add(widget_class),
                ComponentKind::Stateless => {}
            }
        }
        if let Some(profile) = &class.provider {
            for name in profile.consumers.iter().chain(&profile.depends_on) {
                self.add(name);
            }
        }
        walk_class_decl(self, class);
    }

    fn visit_function_decl(&mut self, function: &FunctionDecl) {
        self.add_type(&function.return_type);
        for ty in &function.type_parameters {
            self.add_type(ty);
        }
        walk_function_decl(self, function);
    }

    fn visit_variable_decl(&mut self, decl: &VariableDecl) {
        self.add_type(&decl.ty);
        walk_variable_decl(self, decl);
    }

    fn visit_parameter(&mut self, param: &ParameterDecl) {
        self.add_type(&param.ty);
        if param.is_field_formal {
            self.add(&param.name);
        }
        walk_parameter(self, param);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::ForEach {
                variable_type: Some(ty),
                ..
            } => self.add_type(ty),
            StmtKind::Try { catches, .. } => {
                for catch in catches {
                    if let Some(ty) = &catch.exception_type {
                        self.add_type(ty);
                    }
                }
            }
            _ => {}
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Identifier { name } => self.add(name),
            ExprKind::PropertyAccess { property, .. } => self.add(property),
            ExprKind::MethodCall {
                method, type_args, ..
            } => {
                self.add(method);
                for ty in type_args {
                    self.add_type(ty);
                }
            }
            ExprKind::InstanceCreation {
                ty, constructor, ..
            } => {
                self.add_type(ty);
                if let Some(name) = constructor {
                    self.add(name);
                }
            }
            ExprKind::As { target_type, .. } | ExprKind::Is { target_type, .. } => {
                self.add_type(target_type);
            }
            ExprKind::ListLiteral {
                element_type: Some(ty),
                ..
            } => self.add_type(ty),
            ExprKind::MapLiteral {
                key_type,
                value_type,
                ..
            } => {
                for ty in key_type.iter().chain(value_type) {
                    self.add_type(ty);
                }
            }
            _ => {}
        }
        walk_expr(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;

    fn function(b: &mut FileBuilder, name: &str, body: Vec<Stmt>) -> FunctionDecl {
        let id = b.next_id();
        FunctionDecl::builder(id, name).body(body).build().unwrap()
    }

    #[test]
    fn test_private_unreferenced_declarations() {
        let mut b = FileBuilder::new("lib/util.dart");

        // void main() { _used(); }
        let call = b.call(None, "_used", vec![]);
        let call = b.expr_stmt(call);
        let main = function(&mut b, "main", vec![call]);
        let used = function(&mut b, "_used", vec![]);
        let dead = function(&mut b, "_dead", vec![]);
        let public = function(&mut b, "helper", vec![]);
        b.add_function(main).add_function(used).add_function(dead).add_function(public);

        let id = b.next_id();
        let loc = b.location();
        b.add_variable(VariableDecl::new(id, loc, "_cache", TypeIR::simple("int")));

        let file = b.build();
        let unused = find_unused(&file);
        let names: Vec<_> = unused.iter().map(|u| (u.name.as_str(), u.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("_dead", DeclarationKind::Function),
                ("_cache", DeclarationKind::Variable)
            ]
        );
    }

    #[test]
    fn test_type_and_component_references_count() {
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

        let id = b.next_id();
        let mut state = ClassDecl::new(id, b.location(), "_CounterState");
        state.component = Some(ComponentProfile::state("Counter"));
        let id = b.next_id();
        state.fields.push(FieldDecl::new(id, b.location(), "_model", TypeIR::simple("_Model")));
        let id = b.next_id();
        state.fields.push(FieldDecl::new(id, b.location(), "_stale", TypeIR::simple("int")));
        let build = function(&mut b, "build", vec![]);
        state.methods.push(
            MethodDecl::new(build, "_CounterState").with_lifecycle(LifecycleRole::Build {
                context_param: None,
            }),
        );
        let private_hook = function(&mut b, "_onTick", vec![]);
        state
            .methods
            .push(MethodDecl::new(private_hook, "_CounterState").with_lifecycle(LifecycleRole::Other {
                hook: "tick".to_string(),
            }));

        let id = b.next_id();
        let model = ClassDecl::new(id, b.location(), "_Model");

        b.add_class(widget).add_class(state).add_class(model);
        let file = b.build();

        let unused = find_unused(&file);
        assert_eq!(unused.len(), 2);
        assert_eq!(unused[0].name, "_model");
        assert_eq!(unused[0].kind, DeclarationKind::Field);
        assert_eq!(unused[1].name, "_stale");
    }
}

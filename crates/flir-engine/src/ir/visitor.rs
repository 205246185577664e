//! IR visitor
//!
//! Implement [`Visitor`] and override the `visit_*` methods of interest.
//! Each default implementation calls the matching `walk_*` function, which
//! visits the node's children in source order. An override that does not
//! call `walk_*` stops descent at that node.
//!
//! ```ignore
//! struct CountCalls(usize);
//!
//! impl Visitor for CountCalls {
//!     fn visit_expr(&mut self, expr: &Expr) {
//!         if matches!(expr.kind, ExprKind::MethodCall { .. }) {
//!             self.0 += 1;
//!         }
//!         walk_expr(self, expr);
//!     }
//! }
//! ```

use super::decl::{ClassDecl, FunctionBody, FunctionDecl, ParameterDecl, VariableDecl};
use super::expr::{Expr, ExprKind, StringPart};
use super::file::FileDecl;
use super::stmt::{Stmt, StmtKind};

pub trait Visitor: Sized {
    fn visit_file(&mut self, file: &FileDecl) {
        walk_file(self, file);
    }

    fn visit_class_decl(&mut self, decl: &ClassDecl) {
        walk_class_decl(self, decl);
    }

    fn visit_function_decl(&mut self, decl: &FunctionDecl) {
        walk_function_decl(self, decl);
    }

    fn visit_variable_decl(&mut self, decl: &VariableDecl) {
        walk_variable_decl(self, decl);
    }

    fn visit_parameter(&mut self, param: &ParameterDecl) {
        walk_parameter(self, param);
    }

    fn visit_function_body(&mut self, body: &FunctionBody) {
        walk_function_body(self, body);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

pub fn walk_file<V: Visitor>(visitor: &mut V, file: &FileDecl) {
    for variable in &file.variables {
        visitor.visit_variable_decl(variable);
    }
    for function in &file.functions {
        visitor.visit_function_decl(function);
    }
    for class in &file.classes {
        visitor.visit_class_decl(class);
    }
}

pub fn walk_class_decl<V: Visitor>(visitor: &mut V, decl: &ClassDecl) {
    for field in &decl.fields {
        if let Some(init) = &field.initializer {
            visitor.visit_expr(init);
        }
    }
    for ctor in &decl.constructors {
        for init in &ctor.initializers {
            visitor.visit_expr(&init.value);
        }
        for call in ctor.super_call.iter().chain(ctor.redirect.iter()) {
            for arg in &call.arguments {
                visitor.visit_expr(&arg.value);
            }
        }
        visitor.visit_function_decl(&ctor.function);
    }
    for method in &decl.methods {
        visitor.visit_function_decl(&method.function);
    }
}

pub fn walk_function_decl<V: Visitor>(visitor: &mut V, decl: &FunctionDecl) {
    for param in &decl.parameters {
        visitor.visit_parameter(param);
    }
    if let Some(body) = &decl.body {
        visitor.visit_function_body(body);
    }
}

pub fn walk_variable_decl<V: Visitor>(visitor: &mut V, decl: &VariableDecl) {
    if let Some(init) = &decl.initializer {
        visitor.visit_expr(init);
    }
}

pub fn walk_parameter<V: Visitor>(visitor: &mut V, param: &ParameterDecl) {
    if let Some(default) = &param.default_value {
        visitor.visit_expr(default);
    }
}

pub fn walk_function_body<V: Visitor>(visitor: &mut V, body: &FunctionBody) {
    match body {
        FunctionBody::Block { statements } => {
            for stmt in statements {
                visitor.visit_stmt(stmt);
            }
        }
        FunctionBody::Expression { expr } => visitor.visit_expr(expr),
    }
}

pub fn walk_stmt<V: Visitor>(visitor: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::VariableDecl { decl } => visitor.visit_variable_decl(decl),
        StmtKind::Expression { expr } => visitor.visit_expr(expr),
        StmtKind::Return { value } => {
            if let Some(value) = value {
                visitor.visit_expr(value);
            }
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            visitor.visit_expr(condition);
            visitor.visit_stmt(then_branch);
            if let Some(else_branch) = else_branch {
                visitor.visit_stmt(else_branch);
            }
        }
        StmtKind::For {
            initializers,
            condition,
            updaters,
            body,
        } => {
            for init in initializers {
                visitor.visit_stmt(init);
            }
            if let Some(condition) = condition {
                visitor.visit_expr(condition);
            }
            for update in updaters {
                visitor.visit_expr(update);
            }
            visitor.visit_stmt(body);
        }
        StmtKind::ForEach { iterable, body, .. } => {
            visitor.visit_expr(iterable);
            visitor.visit_stmt(body);
        }
        StmtKind::While { condition, body } => {
            visitor.visit_expr(condition);
            visitor.visit_stmt(body);
        }
        StmtKind::DoWhile { body, condition } => {
            visitor.visit_stmt(body);
            visitor.visit_expr(condition);
        }
        StmtKind::Switch {
            subject,
            cases,
            default,
        } => {
            visitor.visit_expr(subject);
            for case in cases {
                for pattern in &case.patterns {
                    visitor.visit_expr(pattern);
                }
                for s in &case.body {
                    visitor.visit_stmt(s);
                }
            }
            for s in default.iter().flatten() {
                visitor.visit_stmt(s);
            }
        }
        StmtKind::Try {
            body,
            catches,
            finally,
        } => {
            for s in body {
                visitor.visit_stmt(s);
            }
            for catch in catches {
                for s in &catch.body {
                    visitor.visit_stmt(s);
                }
            }
            for s in finally.iter().flatten() {
                visitor.visit_stmt(s);
            }
        }
        StmtKind::Block { statements } => {
            for s in statements {
                visitor.visit_stmt(s);
            }
        }
        StmtKind::Throw { value } => visitor.visit_expr(value),
        StmtKind::Assert { condition, message } => {
            visitor.visit_expr(condition);
            if let Some(message) = message {
                visitor.visit_expr(message);
            }
        }
        StmtKind::Break { .. } | StmtKind::Continue { .. } | StmtKind::Empty => {}
    }
}

pub fn walk_expr<V: Visitor>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Literal { .. }
        | ExprKind::Identifier { .. }
        | ExprKind::This
        | ExprKind::Super => {}
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Unary { operand, .. }
        | ExprKind::Await { operand }
        | ExprKind::As { operand, .. }
        | ExprKind::Is { operand, .. } => visitor.visit_expr(operand),
        ExprKind::MethodCall {
            target, arguments, ..
        } => {
            if let Some(target) = target {
                visitor.visit_expr(target);
            }
            for arg in arguments {
                visitor.visit_expr(&arg.value);
            }
        }
        ExprKind::PropertyAccess { target, .. } => visitor.visit_expr(target),
        ExprKind::IndexAccess { target, index } => {
            visitor.visit_expr(target);
            visitor.visit_expr(index);
        }
        ExprKind::InstanceCreation { arguments, .. } => {
            for arg in arguments {
                visitor.visit_expr(&arg.value);
            }
        }
        ExprKind::Conditional {
            condition,
            then_expr,
            else_expr,
        } => {
            visitor.visit_expr(condition);
            visitor.visit_expr(then_expr);
            visitor.visit_expr(else_expr);
        }
        ExprKind::FunctionLiteral {
            parameters, body, ..
        } => {
            for param in parameters {
                visitor.visit_parameter(param);
            }
            visitor.visit_function_body(body);
        }
        ExprKind::ListLiteral { elements, .. } => {
            for element in elements {
                visitor.visit_expr(element);
            }
        }
        ExprKind::MapLiteral { entries, .. } => {
            for entry in entries {
                visitor.visit_expr(&entry.key);
                visitor.visit_expr(&entry.value);
            }
        }
        ExprKind::Cascade { target, sections } => {
            visitor.visit_expr(target);
            for section in sections {
                visitor.visit_expr(section);
            }
        }
        ExprKind::InterpolatedString { parts } => {
            for part in parts {
                if let StringPart::Interpolation { expr } = part {
                    visitor.visit_expr(expr);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::FileBuilder;

    struct Names(Vec<String>);

    impl Visitor for Names {
        fn visit_expr(&mut self, expr: &Expr) {
            if let ExprKind::Identifier { name } = &expr.kind {
                self.0.push(name.clone());
            }
            walk_expr(self, expr);
        }
    }

    /// Stops at closures.
    struct ShallowNames(Vec<String>);

    impl Visitor for ShallowNames {
        fn visit_expr(&mut self, expr: &Expr) {
            match &expr.kind {
                ExprKind::Identifier { name } => self.0.push(name.clone()),
                ExprKind::FunctionLiteral { .. } => return,
                _ => {}
            }
            walk_expr(self, expr);
        }
    }

    #[test]
    fn test_walk_reaches_nested_identifiers() {
        let mut b = FileBuilder::new("t.dart");
        let inner = b.ident("inner");
        let inner_stmt = b.expr_stmt(inner);
        let closure = b.closure(vec![inner_stmt], false);
        let outer = b.ident("outer");
        let call = b.call(Some(outer), "forEach", vec![closure]);
        let stmt = b.expr_stmt(call);

        let mut all = Names(Vec::new());
        all.visit_stmt(&stmt);
        assert_eq!(all.0, vec!["outer", "inner"]);

        let mut shallow = ShallowNames(Vec::new());
        shallow.visit_stmt(&stmt);
        assert_eq!(shallow.0, vec!["outer"]);
    }
}

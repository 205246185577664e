//! `.ir` writer
//!
//! The payload is encoded into its own buffer first, interning strings as
//! they are met; the header, string table and payload are then assembled
//! and the optional SHA-256 trailer appended. Output depends only on the
//! tree and the options.

use sha2::{Digest, Sha256};

use super::bytes::IrWriter;
use super::format::{
    SerializationError, WriteOptions, FORMAT_VERSION, HEADER_SIZE, MAGIC, MAX_DEPTH,
};
use super::string_table::StringTable;
use super::tags::*;
use crate::diagnostics::{AnalysisIssue, IssueCategory, Severity};
use crate::ir::*;
use crate::source::SourceLocation;

/// Serialize `file` to `.ir` bytes.
pub fn write_file_ir(file: &FileDecl, options: &WriteOptions) -> Result<Vec<u8>, SerializationError> {
    write_with_limit(file, options, MAX_DEPTH)
}

pub(crate) fn write_with_limit(
    file: &FileDecl,
    options: &WriteOptions,
    max_depth: usize,
) -> Result<Vec<u8>, SerializationError> {
    let mut encoder = Encoder::new(options.debug_info);
    encoder.max_depth = max_depth;
    encoder.file(file);
    let Encoder {
        out: payload,
        strings,
        too_deep,
        ..
    } = encoder;
    if let Some(at) = too_deep {
        return Err(SerializationError::InvalidValue {
            what: "nesting depth",
            value: (max_depth + 1) as u64,
            offset: HEADER_SIZE + strings.encoded_size() + at,
        });
    }

    let payload = payload.into_bytes();
    let mut out = IrWriter::with_capacity(
        HEADER_SIZE + strings.encoded_size() + payload.len() + super::format::CHECKSUM_SIZE,
    );
    out.emit_u32(MAGIC);
    out.emit_u16(FORMAT_VERSION);
    out.emit_u16(options.flags());
    strings.encode(&mut out)?;
    out.emit_bytes(&payload);

    if options.checksum {
        let digest = Sha256::digest(out.buffer());
        out.emit_bytes(&digest);
    }

    tracing::debug!(
        file = %file.file_path,
        bytes = out.offset(),
        strings = strings.len(),
        "encoded file"
    );
    Ok(out.into_bytes())
}

pub(crate) fn severity_to_u8(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
        Severity::Hint => 3,
    }
}

pub(crate) fn category_to_u8(category: IssueCategory) -> u8 {
    match category {
        IssueCategory::ControlFlow => 0,
        IssueCategory::Lifecycle => 1,
        IssueCategory::Reactivity => 2,
        IssueCategory::Performance => 3,
        IssueCategory::Provider => 4,
        IssueCategory::Unused => 5,
        IssueCategory::Adapter => 6,
    }
}

/// Payload encoder; owns the string table being built.
pub(crate) struct Encoder {
    out: IrWriter,
    strings: StringTable,
    debug_info: bool,
    depth: usize,
    max_depth: usize,
    /// Payload offset of the first node nested deeper than `max_depth`.
    too_deep: Option<usize>,
}

impl Encoder {
    pub(crate) fn new(debug_info: bool) -> Self {
        Self {
            out: IrWriter::new(),
            strings: StringTable::new(),
            debug_info,
            depth: 0,
            max_depth: MAX_DEPTH,
            too_deep: None,
        }
    }

    /// String table built so far, with its insertion statistics.
    pub(crate) fn into_strings(self) -> StringTable {
        self.strings
    }

    // ===== Primitives =====

    fn str(&mut self, s: &str) {
        let index = self.strings.add_string(s);
        self.out.emit_u32(index);
    }

    fn opt_str(&mut self, s: Option<&str>) {
        match s {
            Some(s) => {
                self.out.emit_u8(1);
                self.str(s);
            }
            None => self.out.emit_u8(0),
        }
    }

    fn strs(&mut self, items: &[String]) {
        self.len(items.len());
        for s in items {
            self.str(s);
        }
    }

    fn len(&mut self, len: usize) {
        self.out.emit_u32(len as u32);
    }

    fn location(&mut self, loc: &SourceLocation) {
        if !self.debug_info {
            return;
        }
        self.str(&loc.file);
        self.out.emit_u32(loc.line);
        self.out.emit_u32(loc.column);
        self.out.emit_u32(loc.offset);
        self.out.emit_u32(loc.length);
    }

    fn metadata(&mut self, metadata: &Option<NodeMetadata>) {
        if !self.debug_info {
            return;
        }
        let Some(metadata) = metadata else {
            self.out.emit_u8(0);
            return;
        };
        self.out.emit_u8(1);
        self.opt_str(metadata.doc_comment.as_deref());
        self.len(metadata.annotations.len());
        for annotation in &metadata.annotations {
            self.str(&annotation.name);
            self.len(annotation.arguments.len());
            for arg in &annotation.arguments {
                self.literal(arg);
            }
        }
        self.out.emit_bool(metadata.synthetic);
    }

    /// Run `body` one level deeper. Past `max_depth` the subtree is skipped
    /// and the overflow recorded.
    fn nested(&mut self, body: impl FnOnce(&mut Self)) {
        self.depth += 1;
        if self.depth > self.max_depth {
            let at = self.out.offset();
            self.too_deep.get_or_insert(at);
        } else {
            body(self);
        }
        self.depth -= 1;
    }

    fn node(&mut self, id: NodeId, location: &SourceLocation, metadata: &Option<NodeMetadata>) {
        self.out.emit_u32(id.as_u32());
        self.location(location);
        self.metadata(metadata);
    }

    fn literal(&mut self, value: &LiteralValue) {
        self.nested(|e| e.literal_body(value));
    }

    fn literal_body(&mut self, value: &LiteralValue) {
        match value {
            LiteralValue::String(s) => {
                self.out.emit_u8(LIT_STRING);
                self.str(s);
            }
            LiteralValue::Int(i) => {
                self.out.emit_u8(LIT_INT);
                self.out.emit_i64(*i);
            }
            LiteralValue::Double(d) => {
                self.out.emit_u8(LIT_DOUBLE);
                self.out.emit_f64(*d);
            }
            LiteralValue::Bool(b) => {
                self.out.emit_u8(LIT_BOOL);
                self.out.emit_bool(*b);
            }
            LiteralValue::Null => self.out.emit_u8(LIT_NULL),
            LiteralValue::List(items) => {
                self.out.emit_u8(LIT_LIST);
                self.len(items.len());
                for item in items {
                    self.literal(item);
                }
            }
            LiteralValue::Map(entries) => {
                self.out.emit_u8(LIT_MAP);
                self.len(entries.len());
                for (key, value) in entries {
                    self.str(key);
                    self.literal(value);
                }
            }
        }
    }

    // ===== Types =====

    fn ty(&mut self, ty: &TypeIR) {
        self.nested(|e| e.ty_body(ty));
    }

    fn ty_body(&mut self, ty: &TypeIR) {
        match ty {
            TypeIR::Simple { name, type_args } => {
                self.out.emit_u8(TYPE_SIMPLE);
                self.str(name);
                self.types(type_args);
            }
            TypeIR::Generic { name, type_args } => {
                self.out.emit_u8(TYPE_GENERIC);
                self.str(name);
                self.types(type_args);
            }
            TypeIR::Function {
                return_type,
                positional,
                named,
            } => {
                self.out.emit_u8(TYPE_FUNCTION);
                self.ty(return_type);
                self.types(positional);
                self.len(named.len());
                for n in named {
                    self.str(&n.name);
                    self.ty(&n.ty);
                    self.out.emit_bool(n.required);
                }
            }
            TypeIR::TypeParameter { name, bound } => {
                self.out.emit_u8(TYPE_PARAMETER);
                self.str(name);
                self.opt_ty(bound.as_deref());
            }
            TypeIR::Dynamic => self.out.emit_u8(TYPE_DYNAMIC),
            TypeIR::Void => self.out.emit_u8(TYPE_VOID),
            TypeIR::Never => self.out.emit_u8(TYPE_NEVER),
            TypeIR::Nullable { inner } => {
                self.out.emit_u8(TYPE_NULLABLE);
                self.ty(inner.base());
            }
        }
    }

    fn types(&mut self, types: &[TypeIR]) {
        self.len(types.len());
        for ty in types {
            self.ty(ty);
        }
    }

    fn opt_ty(&mut self, ty: Option<&TypeIR>) {
        match ty {
            Some(ty) => {
                self.out.emit_u8(1);
                self.ty(ty);
            }
            None => self.out.emit_u8(0),
        }
    }

    // ===== Expressions =====

    fn expr(&mut self, expr: &Expr) {
        self.nested(|e| e.expr_body(expr));
    }

    fn expr_body(&mut self, expr: &Expr) {
        let tag = match &expr.kind {
            ExprKind::Literal { .. } => EXPR_LITERAL,
            ExprKind::Identifier { .. } => EXPR_IDENTIFIER,
            ExprKind::Binary { .. } => EXPR_BINARY,
            ExprKind::Unary { .. } => EXPR_UNARY,
            ExprKind::MethodCall { .. } => EXPR_METHOD_CALL,
            ExprKind::PropertyAccess { .. } => EXPR_PROPERTY_ACCESS,
            ExprKind::IndexAccess { .. } => EXPR_INDEX_ACCESS,
            ExprKind::InstanceCreation { .. } => EXPR_INSTANCE_CREATION,
            ExprKind::Conditional { .. } => EXPR_CONDITIONAL,
            ExprKind::FunctionLiteral { .. } => EXPR_FUNCTION_LITERAL,
            ExprKind::ListLiteral { .. } => EXPR_LIST_LITERAL,
            ExprKind::MapLiteral { .. } => EXPR_MAP_LITERAL,
            ExprKind::Await { .. } => EXPR_AWAIT,
            ExprKind::As { .. } => EXPR_AS,
            ExprKind::Is { .. } => EXPR_IS,
            ExprKind::Cascade { .. } => EXPR_CASCADE,
            ExprKind::InterpolatedString { .. } => EXPR_INTERPOLATED_STRING,
            ExprKind::This => EXPR_THIS,
            ExprKind::Super => EXPR_SUPER,
        };
        self.out.emit_u8(tag);
        self.node(expr.id, &expr.location, &expr.metadata);
        self.ty(&expr.result_type);

        match &expr.kind {
            ExprKind::Literal { value } => self.literal(value),
            ExprKind::Identifier { name } => self.str(name),
            ExprKind::Binary { op, left, right } => {
                self.out.emit_u8(op.to_u8());
                self.expr(left);
                self.expr(right);
            }
            ExprKind::Unary { op, operand } => {
                self.out.emit_u8(op.to_u8());
                self.expr(operand);
            }
            ExprKind::MethodCall {
                target,
                method,
                type_args,
                arguments,
                null_aware,
            } => {
                self.opt_expr(target.as_deref());
                self.str(method);
                self.types(type_args);
                self.arguments(arguments);
                self.out.emit_bool(*null_aware);
            }
            ExprKind::PropertyAccess {
                target,
                property,
                null_aware,
            } => {
                self.expr(target);
                self.str(property);
                self.out.emit_bool(*null_aware);
            }
            ExprKind::IndexAccess { target, index } => {
                self.expr(target);
                self.expr(index);
            }
            ExprKind::InstanceCreation {
                ty,
                constructor,
                arguments,
                is_const,
            } => {
                self.ty(ty);
                self.opt_str(constructor.as_deref());
                self.arguments(arguments);
                self.out.emit_bool(*is_const);
            }
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.expr(condition);
                self.expr(then_expr);
                self.expr(else_expr);
            }
            ExprKind::FunctionLiteral {
                parameters,
                body,
                is_async,
                is_generator,
            } => {
                self.parameters(parameters);
                self.function_body(body);
                self.out.emit_bool(*is_async);
                self.out.emit_bool(*is_generator);
            }
            ExprKind::ListLiteral {
                elements,
                element_type,
                is_const,
            } => {
                self.exprs(elements);
                self.opt_ty(element_type.as_ref());
                self.out.emit_bool(*is_const);
            }
            ExprKind::MapLiteral {
                entries,
                key_type,
                value_type,
                is_const,
            } => {
                self.len(entries.len());
                for entry in entries {
                    self.expr(&entry.key);
                    self.expr(&entry.value);
                }
                self.opt_ty(key_type.as_ref());
                self.opt_ty(value_type.as_ref());
                self.out.emit_bool(*is_const);
            }
            ExprKind::Await { operand } => self.expr(operand),
            ExprKind::As {
                operand,
                target_type,
            } => {
                self.expr(operand);
                self.ty(target_type);
            }
            ExprKind::Is {
                operand,
                target_type,
                negated,
            } => {
                self.expr(operand);
                self.ty(target_type);
                self.out.emit_bool(*negated);
            }
            ExprKind::Cascade { target, sections } => {
                self.expr(target);
                self.exprs(sections);
            }
            ExprKind::InterpolatedString { parts } => {
                self.len(parts.len());
                for part in parts {
                    match part {
                        StringPart::Text { text } => {
                            self.out.emit_u8(0);
                            self.str(text);
                        }
                        StringPart::Interpolation { expr } => {
                            self.out.emit_u8(1);
                            self.expr(expr);
                        }
                    }
                }
            }
            ExprKind::This | ExprKind::Super => {}
        }
    }

    fn exprs(&mut self, exprs: &[Expr]) {
        self.len(exprs.len());
        for expr in exprs {
            self.expr(expr);
        }
    }

    fn opt_expr(&mut self, expr: Option<&Expr>) {
        match expr {
            Some(expr) => {
                self.out.emit_u8(1);
                self.expr(expr);
            }
            None => self.out.emit_u8(0),
        }
    }

    fn arguments(&mut self, args: &[Argument]) {
        self.len(args.len());
        for arg in args {
            self.opt_str(arg.name.as_deref());
            self.expr(&arg.value);
        }
    }

    // ===== Statements =====

    fn stmt(&mut self, stmt: &Stmt) {
        self.nested(|e| e.stmt_body(stmt));
    }

    fn stmt_body(&mut self, stmt: &Stmt) {
        let tag = match &stmt.kind {
            StmtKind::VariableDecl { .. } => STMT_VARIABLE_DECL,
            StmtKind::Expression { .. } => STMT_EXPRESSION,
            StmtKind::Return { .. } => STMT_RETURN,
            StmtKind::If { .. } => STMT_IF,
            StmtKind::For { .. } => STMT_FOR,
            StmtKind::ForEach { .. } => STMT_FOR_EACH,
            StmtKind::While { .. } => STMT_WHILE,
            StmtKind::DoWhile { .. } => STMT_DO_WHILE,
            StmtKind::Switch { .. } => STMT_SWITCH,
            StmtKind::Try { .. } => STMT_TRY,
            StmtKind::Block { .. } => STMT_BLOCK,
            StmtKind::Break { .. } => STMT_BREAK,
            StmtKind::Continue { .. } => STMT_CONTINUE,
            StmtKind::Throw { .. } => STMT_THROW,
            StmtKind::Assert { .. } => STMT_ASSERT,
            StmtKind::Empty => STMT_EMPTY,
        };
        self.out.emit_u8(tag);
        self.node(stmt.id, &stmt.location, &stmt.metadata);
        self.strs(&stmt.labels);

        match &stmt.kind {
            StmtKind::VariableDecl { decl } => self.variable(decl),
            StmtKind::Expression { expr } => self.expr(expr),
            StmtKind::Return { value } => self.opt_expr(value.as_ref()),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expr(condition);
                self.stmt(then_branch);
                self.opt_stmt(else_branch.as_deref());
            }
            StmtKind::For {
                initializers,
                condition,
                updaters,
                body,
            } => {
                self.stmts(initializers);
                self.opt_expr(condition.as_ref());
                self.exprs(updaters);
                self.stmt(body);
            }
            StmtKind::ForEach {
                variable,
                variable_type,
                iterable,
                body,
                is_await,
            } => {
                self.str(variable);
                self.opt_ty(variable_type.as_ref());
                self.expr(iterable);
                self.stmt(body);
                self.out.emit_bool(*is_await);
            }
            StmtKind::While { condition, body } => {
                self.expr(condition);
                self.stmt(body);
            }
            StmtKind::DoWhile { body, condition } => {
                self.stmt(body);
                self.expr(condition);
            }
            StmtKind::Switch {
                subject,
                cases,
                default,
            } => {
                self.expr(subject);
                self.len(cases.len());
                for case in cases {
                    self.node(case.id, &case.location, &case.metadata);
                    self.exprs(&case.patterns);
                    self.stmts(&case.body);
                }
                self.opt_stmts(default.as_deref());
            }
            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                self.stmts(body);
                self.len(catches.len());
                for catch in catches {
                    self.node(catch.id, &catch.location, &catch.metadata);
                    self.opt_ty(catch.exception_type.as_ref());
                    self.opt_str(catch.exception_param.as_deref());
                    self.opt_str(catch.stack_trace_param.as_deref());
                    self.stmts(&catch.body);
                }
                self.opt_stmts(finally.as_deref());
            }
            StmtKind::Block { statements } => self.stmts(statements),
            StmtKind::Break { label } | StmtKind::Continue { label } => {
                self.opt_str(label.as_deref())
            }
            StmtKind::Throw { value } => self.expr(value),
            StmtKind::Assert { condition, message } => {
                self.expr(condition);
                self.opt_expr(message.as_ref());
            }
            StmtKind::Empty => {}
        }
    }

    fn stmts(&mut self, stmts: &[Stmt]) {
        self.len(stmts.len());
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn opt_stmt(&mut self, stmt: Option<&Stmt>) {
        match stmt {
            Some(stmt) => {
                self.out.emit_u8(1);
                self.stmt(stmt);
            }
            None => self.out.emit_u8(0),
        }
    }

    fn opt_stmts(&mut self, stmts: Option<&[Stmt]>) {
        match stmts {
            Some(stmts) => {
                self.out.emit_u8(1);
                self.stmts(stmts);
            }
            None => self.out.emit_u8(0),
        }
    }

    // ===== Declarations =====

    fn variable(&mut self, decl: &VariableDecl) {
        self.node(decl.id, &decl.location, &decl.metadata);
        self.str(&decl.name);
        self.ty(&decl.ty);
        self.opt_expr(decl.initializer.as_ref());
        self.out.emit_u8(storage_bits(decl.is_final, decl.is_const, decl.is_late, false));
    }

    fn field(&mut self, decl: &FieldDecl) {
        self.node(decl.id, &decl.location, &decl.metadata);
        self.str(&decl.name);
        self.ty(&decl.ty);
        self.opt_expr(decl.initializer.as_ref());
        self.out.emit_u8(storage_bits(
            decl.is_final,
            decl.is_const,
            decl.is_late,
            decl.is_static,
        ));
    }

    fn parameters(&mut self, params: &[ParameterDecl]) {
        self.len(params.len());
        for param in params {
            self.node(param.id, &param.location, &param.metadata);
            self.str(&param.name);
            self.ty(&param.ty);
            self.out.emit_u8(parameter_bits(&param.flags()));
            self.opt_expr(param.default_value.as_ref());
        }
    }

    fn function_body(&mut self, body: &FunctionBody) {
        match body {
            FunctionBody::Block { statements } => {
                self.out.emit_u8(0);
                self.stmts(statements);
            }
            FunctionBody::Expression { expr } => {
                self.out.emit_u8(1);
                self.expr(expr);
            }
        }
    }

    fn function(&mut self, decl: &FunctionDecl) {
        self.node(decl.id, &decl.location, &decl.metadata);
        self.str(&decl.name);
        self.ty(&decl.return_type);
        self.parameters(&decl.parameters);
        self.types(&decl.type_parameters);
        match &decl.body {
            Some(body) => {
                self.out.emit_u8(1);
                self.function_body(body);
            }
            None => self.out.emit_u8(0),
        }
        self.out.emit_u8(modifier_bits(&decl.modifiers));
        self.out.emit_u8(match decl.accessor {
            Accessor::None => 0,
            Accessor::Getter => 1,
            Accessor::Setter => 2,
        });
    }

    fn method(&mut self, decl: &MethodDecl) {
        self.function(&decl.function);
        self.str(&decl.class_name);
        self.out.emit_bool(decl.is_override);
        match &decl.lifecycle {
            LifecycleRole::None => self.out.emit_u8(0),
            LifecycleRole::Init => self.out.emit_u8(1),
            LifecycleRole::Dispose => self.out.emit_u8(2),
            LifecycleRole::Build { context_param } => {
                self.out.emit_u8(3);
                self.opt_str(context_param.as_deref());
            }
            LifecycleRole::DidUpdateWidget { old_widget_param } => {
                self.out.emit_u8(4);
                self.opt_str(old_widget_param.as_deref());
            }
            LifecycleRole::Other { hook } => {
                self.out.emit_u8(5);
                self.str(hook);
            }
        }
    }

    fn invocation(&mut self, call: Option<&ConstructorInvocation>) {
        match call {
            Some(call) => {
                self.out.emit_u8(1);
                self.opt_str(call.constructor_name.as_deref());
                self.arguments(&call.arguments);
            }
            None => self.out.emit_u8(0),
        }
    }

    fn constructor(&mut self, decl: &ConstructorDecl) {
        self.function(&decl.function);
        self.str(&decl.class_name);
        self.opt_str(decl.constructor_name.as_deref());
        self.len(decl.initializers.len());
        for init in &decl.initializers {
            self.str(&init.field);
            self.expr(&init.value);
        }
        self.invocation(decl.super_call.as_ref());
        self.invocation(decl.redirect.as_ref());
        self.out.emit_bool(decl.is_factory);
    }

    fn component(&mut self, profile: &ComponentProfile) {
        match &profile.kind {
            ComponentKind::StatefulWidget { state_class } => {
                self.out.emit_u8(0);
                self.str(state_class);
            }
            ComponentKind::State {
                widget_class,
                widget,
            } => {
                self.out.emit_u8(1);
                self.str(widget_class);
                match widget {
                    Some(id) => {
                        self.out.emit_u8(1);
                        self.out.emit_u32(id.as_u32());
                    }
                    None => self.out.emit_u8(0),
                }
            }
            ComponentKind::Stateless => self.out.emit_u8(2),
        }
        self.len(profile.reactive_fields.len());
        for field in &profile.reactive_fields {
            self.str(&field.name);
            self.out.emit_bool(field.triggers_rebuild);
            self.out.emit_bool(field.is_late);
        }
        self.len(profile.resources.len());
        for resource in &profile.resources {
            self.str(&resource.name);
            self.str(&resource.type_name);
            self.out.emit_u8(match resource.kind {
                ResourceKind::Controller => 0,
                ResourceKind::Subscription => 1,
            });
        }
    }

    fn provider(&mut self, profile: &ProviderProfile) {
        self.len(profile.notify_calls.len());
        for call in &profile.notify_calls {
            self.str(&call.method);
            self.location(&call.location);
        }
        self.strs(&profile.consumers);
        self.len(profile.mutations.len());
        for mutation in &profile.mutations {
            self.str(&mutation.field);
            self.str(&mutation.method);
            self.location(&mutation.location);
        }
        self.strs(&profile.depends_on);
    }

    fn class(&mut self, decl: &ClassDecl) {
        self.node(decl.id, &decl.location, &decl.metadata);
        self.str(&decl.name);
        self.opt_ty(decl.superclass.as_ref());
        self.types(&decl.interfaces);
        self.types(&decl.mixins);
        self.types(&decl.type_parameters);
        self.len(decl.fields.len());
        for field in &decl.fields {
            self.field(field);
        }
        self.len(decl.methods.len());
        for method in &decl.methods {
            self.method(method);
        }
        self.len(decl.constructors.len());
        for ctor in &decl.constructors {
            self.constructor(ctor);
        }
        let mut bits = 0u8;
        if decl.is_abstract {
            bits |= 1;
        }
        if decl.is_final {
            bits |= 2;
        }
        if decl.is_sealed {
            bits |= 4;
        }
        self.out.emit_u8(bits);
        match &decl.component {
            Some(profile) => {
                self.out.emit_u8(1);
                self.component(profile);
            }
            None => self.out.emit_u8(0),
        }
        match &decl.provider {
            Some(profile) => {
                self.out.emit_u8(1);
                self.provider(profile);
            }
            None => self.out.emit_u8(0),
        }
    }

    fn import(&mut self, decl: &ImportDecl) {
        self.node(decl.id, &decl.location, &decl.metadata);
        self.str(&decl.uri);
        self.opt_str(decl.prefix.as_deref());
        self.strs(&decl.show);
        self.strs(&decl.hide);
        self.out.emit_bool(decl.is_deferred);
    }

    fn export(&mut self, decl: &ExportDecl) {
        self.node(decl.id, &decl.location, &decl.metadata);
        self.str(&decl.uri);
        self.strs(&decl.show);
        self.strs(&decl.hide);
    }

    fn issue(&mut self, issue: &AnalysisIssue) {
        self.out.emit_u32(issue.id.0);
        self.str(&issue.code);
        self.out.emit_u8(severity_to_u8(issue.severity));
        self.out.emit_u8(category_to_u8(issue.category));
        self.str(&issue.message);
        self.opt_str(issue.suggestion.as_deref());
        self.location(&issue.location);
    }

    pub(crate) fn file(&mut self, file: &FileDecl) {
        self.str(&file.file_path);
        self.str(&file.content_hash);
        self.str(&file.library_name);
        self.out.emit_u64(file.analyzed_at);

        self.len(file.imports.len());
        for import in &file.imports {
            self.import(import);
        }
        self.len(file.exports.len());
        for export in &file.exports {
            self.export(export);
        }
        self.len(file.variables.len());
        for variable in &file.variables {
            self.variable(variable);
        }
        self.len(file.functions.len());
        for function in &file.functions {
            self.function(function);
        }
        self.len(file.classes.len());
        for class in &file.classes {
            self.class(class);
        }
        self.len(file.issues.len());
        for issue in &file.issues {
            self.issue(issue);
        }
    }
}

// ===== Flag bytes =====

pub(crate) const STORAGE_FINAL: u8 = 1 << 0;
pub(crate) const STORAGE_CONST: u8 = 1 << 1;
pub(crate) const STORAGE_LATE: u8 = 1 << 2;
pub(crate) const STORAGE_STATIC: u8 = 1 << 3;

fn storage_bits(is_final: bool, is_const: bool, is_late: bool, is_static: bool) -> u8 {
    let mut bits = 0;
    if is_final {
        bits |= STORAGE_FINAL;
    }
    if is_const {
        bits |= STORAGE_CONST;
    }
    if is_late {
        bits |= STORAGE_LATE;
    }
    if is_static {
        bits |= STORAGE_STATIC;
    }
    bits
}

pub(crate) const PARAM_NAMED: u8 = 1 << 0;
pub(crate) const PARAM_POSITIONAL: u8 = 1 << 1;
pub(crate) const PARAM_REQUIRED: u8 = 1 << 2;
pub(crate) const PARAM_OPTIONAL: u8 = 1 << 3;
pub(crate) const PARAM_FIELD_FORMAL: u8 = 1 << 4;
pub(crate) const PARAM_SUPER_FORMAL: u8 = 1 << 5;

fn parameter_bits(flags: &ParameterFlags) -> u8 {
    let mut bits = 0;
    if flags.is_named {
        bits |= PARAM_NAMED;
    }
    if flags.is_positional {
        bits |= PARAM_POSITIONAL;
    }
    if flags.is_required {
        bits |= PARAM_REQUIRED;
    }
    if flags.is_optional {
        bits |= PARAM_OPTIONAL;
    }
    if flags.is_field_formal {
        bits |= PARAM_FIELD_FORMAL;
    }
    if flags.is_super_formal {
        bits |= PARAM_SUPER_FORMAL;
    }
    bits
}

pub(crate) const FN_ASYNC: u8 = 1 << 0;
pub(crate) const FN_GENERATOR: u8 = 1 << 1;
pub(crate) const FN_CONST: u8 = 1 << 2;
pub(crate) const FN_ABSTRACT: u8 = 1 << 3;
pub(crate) const FN_STATIC: u8 = 1 << 4;
pub(crate) const FN_EXTERNAL: u8 = 1 << 5;

fn modifier_bits(m: &FunctionModifiers) -> u8 {
    let mut bits = 0;
    if m.is_async {
        bits |= FN_ASYNC;
    }
    if m.is_generator {
        bits |= FN_GENERATOR;
    }
    if m.is_const {
        bits |= FN_CONST;
    }
    if m.is_abstract {
        bits |= FN_ABSTRACT;
    }
    if m.is_static {
        bits |= FN_STATIC;
    }
    if m.is_external {
        bits |= FN_EXTERNAL;
    }
    bits
}

//! Fixture files shared by the integration tests.

#![allow(dead_code)]

use flir_engine::diagnostics::{AnalysisIssue, IssueCategory, IssueId, Severity};
use flir_engine::ir::*;
use flir_engine::SourceLocation;

pub fn function(b: &mut FileBuilder, name: &str, body: Vec<Stmt>) -> FunctionDecl {
    let id = b.next_id();
    FunctionDecl::builder(id, name)
        .location(b.location())
        .body(body)
        .build()
        .unwrap()
}

pub fn method(
    b: &mut FileBuilder,
    class: &ClassDecl,
    name: &str,
    body: Vec<Stmt>,
    role: LifecycleRole,
) -> MethodDecl {
    let function = function(b, name, body);
    match role {
        LifecycleRole::None => MethodDecl::new(function, class.name.clone()),
        role => MethodDecl::new(function, class.name.clone()).with_lifecycle(role),
    }
}

/// `class <name> extends State<<widget>>` with an empty profile.
pub fn state_class(b: &mut FileBuilder, name: &str, widget: &str) -> ClassDecl {
    let id = b.next_id();
    let mut class = ClassDecl::new(id, b.location(), name);
    class.superclass = Some(TypeIR::with_args("State", vec![TypeIR::simple(widget)]));
    class.component = Some(ComponentProfile::state(widget));
    class
}

pub fn add_field(b: &mut FileBuilder, class: &mut ClassDecl, name: &str, ty: &str) {
    let id = b.next_id();
    class
        .fields
        .push(FieldDecl::new(id, b.location(), name, TypeIR::simple(ty)));
}

pub fn add_reactive(b: &mut FileBuilder, class: &mut ClassDecl, name: &str) {
    add_field(b, class, name, "int");
    if let Some(profile) = &mut class.component {
        profile.reactive_fields.push(ReactiveField {
            name: name.to_string(),
            triggers_rebuild: true,
            is_late: false,
        });
    }
}

pub fn add_resource(
    b: &mut FileBuilder,
    class: &mut ClassDecl,
    name: &str,
    type_name: &str,
    kind: ResourceKind,
) {
    add_field(b, class, name, type_name);
    if let Some(profile) = &mut class.component {
        profile.resources.push(ManagedResource {
            name: name.to_string(),
            type_name: type_name.to_string(),
            kind,
        });
    }
}

/// `void initState() { [super.initState();] }`
pub fn add_init(b: &mut FileBuilder, class: &mut ClassDecl, call_super: bool) {
    let mut body = Vec::new();
    let log = b.call(None, "debugPrint", vec![]);
    body.push(b.expr_stmt(log));
    if call_super {
        let sup = b.super_call("initState");
        body.insert(0, b.expr_stmt(sup));
    }
    let m = method(b, class, "initState", body, LifecycleRole::Init);
    class.methods.push(m);
}

/// `void dispose() { <released>.dispose(); ... super.dispose(); }`
pub fn add_dispose(b: &mut FileBuilder, class: &mut ClassDecl, released: &[&str]) {
    let mut body = Vec::new();
    for name in released {
        let target = b.ident(name);
        let call = b.call(Some(target), "dispose", vec![]);
        body.push(b.expr_stmt(call));
    }
    let sup = b.super_call("dispose");
    body.push(b.expr_stmt(sup));
    let m = method(b, class, "dispose", body, LifecycleRole::Dispose);
    class.methods.push(m);
}

/// `Widget build(BuildContext context) => Column(children: [<reads>...])`
pub fn add_build(b: &mut FileBuilder, class: &mut ClassDecl, reads: &[&str]) {
    let args = reads
        .iter()
        .map(|name| {
            let read = b.ident(name);
            b.new_instance("Text", vec![read])
        })
        .collect();
    let column = b.new_instance("Column", args);
    let ret = b.stmt(StmtKind::Return {
        value: Some(column),
    });
    let m = method(
        b,
        class,
        "build",
        vec![ret],
        LifecycleRole::Build {
            context_param: Some("context".to_string()),
        },
    );
    class.methods.push(m);
}

/// `setState(() { <field> += 1; })`
pub fn mutate_stmt(b: &mut FileBuilder, field: &str) -> Stmt {
    let one = b.literal(LiteralValue::Int(1));
    let target = b.ident(field);
    let add = b.expr(ExprKind::Binary {
        op: BinaryOp::AddAssign,
        left: Box::new(target),
        right: Box::new(one),
    });
    let add = b.expr_stmt(add);
    let callback = b.closure(vec![add], false);
    let call = b.call(None, "setState", vec![callback]);
    b.expr_stmt(call)
}

/// `for (var i = 0; i < n; i++) <body>`
pub fn for_loop(b: &mut FileBuilder, body: Stmt) -> Stmt {
    let i = b.ident("i");
    let n = b.ident("n");
    let cond = b.expr(ExprKind::Binary {
        op: BinaryOp::Lt,
        left: Box::new(i),
        right: Box::new(n),
    });
    let i = b.ident("i");
    let step = b.expr(ExprKind::Unary {
        op: UnaryOp::PostIncrement,
        operand: Box::new(i),
    });
    b.stmt(StmtKind::For {
        initializers: Vec::new(),
        condition: Some(cond),
        updaters: vec![step],
        body: Box::new(body),
    })
}

/// Healthy counter: reactive `count`, super-calling initState, a build
/// that reads `count`, and an `increment` method.
pub fn counter_file() -> FileDecl {
    let mut b = FileBuilder::new("lib/counter.dart");
    b.content_hash("c0ffee").analyzed_at(1_700_000_000);

    let id = b.next_id();
    let mut widget = ClassDecl::new(id, b.location(), "Counter");
    widget.superclass = Some(TypeIR::simple("StatefulWidget"));
    widget.component = Some(ComponentProfile {
        kind: ComponentKind::StatefulWidget {
            state_class: "_CounterState".to_string(),
        },
        reactive_fields: Vec::new(),
        resources: Vec::new(),
    });
    let widget_id = widget.id;

    let mut state = state_class(&mut b, "_CounterState", "Counter");
    if let Some(ComponentProfile {
        kind: ComponentKind::State { widget, .. },
        ..
    }) = &mut state.component
    {
        *widget = Some(widget_id);
    }
    add_reactive(&mut b, &mut state, "count");
    add_init(&mut b, &mut state, true);
    add_build(&mut b, &mut state, &["count"]);
    let body = vec![mutate_stmt(&mut b, "count")];
    let increment = method(&mut b, &state, "increment", body, LifecycleRole::None);
    state.methods.push(increment);

    b.add_class(widget).add_class(state);
    b.build()
}

/// One file touching every expression, statement, type and declaration
/// form.
pub fn kitchen_sink() -> FileDecl {
    let mut b = FileBuilder::new("lib/kitchen_sink.dart");
    b.content_hash("9f86d081884c7d65")
        .library_name("kitchen_sink")
        .analyzed_at(1_712_000_000);

    let id = b.next_id();
    let mut import = ImportDecl::new(id, b.location(), "package:flutter/material.dart");
    import.prefix = Some("m".to_string());
    import.show = vec!["Widget".to_string(), "Text".to_string()];
    import.hide = vec!["Icon".to_string()];
    b.add_import(import);
    let id = b.next_id();
    let mut deferred = ImportDecl::new(id, b.location(), "package:heavy/heavy.dart");
    deferred.is_deferred = true;
    b.add_import(deferred);
    let id = b.next_id();
    let mut export = ExportDecl::new(id, b.location(), "src/models.dart");
    export.hide = vec!["Internal".to_string()];
    b.add_export(export);

    // Top-level variable with a literal initializer and metadata.
    b.at(5, 1);
    let id = b.next_id();
    let list = b.literal(LiteralValue::List(vec![
        LiteralValue::Int(-3),
        LiteralValue::Double(2.5),
        LiteralValue::Map(vec![("k".to_string(), LiteralValue::Bool(true))]),
        LiteralValue::Null,
    ]));
    let mut var = VariableDecl::new(
        id,
        b.location(),
        "defaults",
        TypeIR::with_args("List", vec![TypeIR::Dynamic]),
    )
    .with_initializer(list);
    var.is_const = true;
    var.metadata = Some(NodeMetadata {
        doc_comment: Some("/// Defaults.".to_string()),
        annotations: vec![Annotation {
            name: "Deprecated".to_string(),
            arguments: vec![LiteralValue::String("use config".to_string())],
        }],
        synthetic: false,
    });
    b.add_variable(var);

    // Function exercising statements and expressions.
    b.at(10, 1);
    let body = kitchen_sink_body(&mut b);
    let id = b.next_id();
    let param_id = b.next_id();
    let items = ParameterDecl::new(
        param_id,
        b.location(),
        "items",
        TypeIR::with_args("List", vec![TypeIR::simple("String")]),
        ParameterFlags::positional(),
        None,
    )
    .unwrap();
    let param_id = b.next_id();
    let limit_default = b.literal(LiteralValue::Int(10));
    let limit = ParameterDecl::new(
        param_id,
        b.location(),
        "limit",
        TypeIR::simple("int"),
        ParameterFlags::named(),
        Some(limit_default),
    )
    .unwrap();
    let param_id = b.next_id();
    let on_done = ParameterDecl::new(
        param_id,
        b.location(),
        "onDone",
        TypeIR::Function {
            return_type: Box::new(TypeIR::Void),
            positional: vec![TypeIR::simple("int").nullable()],
            named: vec![NamedType {
                name: "force".to_string(),
                ty: TypeIR::simple("bool"),
                required: true,
            }],
        },
        ParameterFlags::required_named(),
        None,
    )
    .unwrap();
    let process = FunctionDecl::builder(id, "process")
        .location(b.location())
        .return_type(TypeIR::with_args("Future", vec![TypeIR::Void]))
        .type_parameter(TypeIR::TypeParameter {
            name: "T".to_string(),
            bound: Some(Box::new(TypeIR::simple("Object"))),
        })
        .parameters(vec![items, limit, on_done])
        .body(body)
        .is_async()
        .build()
        .unwrap();
    b.add_function(process);

    // Expression-bodied generic helper.
    let x = b.ident("x");
    let id = b.next_id();
    let identity = FunctionDecl::builder(id, "identity")
        .return_type(TypeIR::type_parameter("T"))
        .expression_body(x)
        .build()
        .unwrap();
    b.add_function(identity);

    b.at(40, 1);
    let class = kitchen_sink_class(&mut b);
    b.add_class(class);
    let provider = kitchen_sink_provider(&mut b);
    b.add_class(provider);

    b.add_issue(AnalysisIssue {
        id: IssueId(0),
        code: "ADAPTER_RECOVERED".to_string(),
        severity: Severity::Info,
        category: IssueCategory::Adapter,
        message: "recovered from a missing semicolon".to_string(),
        suggestion: Some("add ';'".to_string()),
        location: SourceLocation::new("lib/kitchen_sink.dart", 12, 4, 210, 1),
    });
    b.build()
}

fn kitchen_sink_body(b: &mut FileBuilder) -> Vec<Stmt> {
    let mut body = Vec::new();

    // final total = items.length * 2 ?? 0;
    let items = b.ident("items");
    let length = b.expr(ExprKind::PropertyAccess {
        target: Box::new(items),
        property: "length".to_string(),
        null_aware: false,
    });
    let two = b.literal(LiteralValue::Int(2));
    let product = b.expr(ExprKind::Binary {
        op: BinaryOp::Mul,
        left: Box::new(length),
        right: Box::new(two),
    });
    let zero = b.literal(LiteralValue::Int(0));
    let total = b.typed_expr(
        TypeIR::simple("int"),
        ExprKind::Binary {
            op: BinaryOp::IfNull,
            left: Box::new(product),
            right: Box::new(zero),
        },
    );
    let id = b.next_id();
    let mut decl = VariableDecl::new(id, b.location(), "total", TypeIR::simple("int"))
        .with_initializer(total);
    decl.is_final = true;
    body.push(b.stmt(StmtKind::VariableDecl { decl }));

    // if (!(items is List<String>)) { throw StateError('x'); } else { ; }
    let items = b.ident("items");
    let is = b.expr(ExprKind::Is {
        operand: Box::new(items),
        target_type: TypeIR::with_args("List", vec![TypeIR::simple("String")]),
        negated: true,
    });
    let msg = b.literal(LiteralValue::String("x".to_string()));
    let err = b.new_instance("StateError", vec![msg]);
    let throw = b.stmt(StmtKind::Throw { value: err });
    let then_branch = b.block(vec![throw]);
    let empty = b.stmt(StmtKind::Empty);
    body.push(b.stmt(StmtKind::If {
        condition: is,
        then_branch: Box::new(then_branch),
        else_branch: Some(Box::new(empty)),
    }));

    // for (final item in items) { if (item.isEmpty) continue; print('$item!'); }
    let item = b.ident("item");
    let is_empty = b.expr(ExprKind::PropertyAccess {
        target: Box::new(item),
        property: "isEmpty".to_string(),
        null_aware: true,
    });
    let cont = b.stmt(StmtKind::Continue { label: None });
    let skip = b.stmt(StmtKind::If {
        condition: is_empty,
        then_branch: Box::new(cont),
        else_branch: None,
    });
    let item = b.ident("item");
    let text = b.expr(ExprKind::InterpolatedString {
        parts: vec![
            StringPart::Interpolation { expr: item },
            StringPart::Text {
                text: "!".to_string(),
            },
        ],
    });
    let print = b.call(None, "print", vec![text]);
    let print = b.expr_stmt(print);
    let loop_body = b.block(vec![skip, print]);
    let items = b.ident("items");
    body.push(b.stmt(StmtKind::ForEach {
        variable: "item".to_string(),
        variable_type: Some(TypeIR::simple("String")),
        iterable: items,
        body: Box::new(loop_body),
        is_await: false,
    }));

    // spin: while (true) { break spin; }
    let t = b.literal(LiteralValue::Bool(true));
    let brk = b.stmt(StmtKind::Break {
        label: Some("spin".to_string()),
    });
    let brk = b.block(vec![brk]);
    let spin = b.stmt(StmtKind::While {
        condition: t,
        body: Box::new(brk),
    });
    body.push(spin.with_label("spin"));

    // do { limit--; } while (limit > 0);
    let limit = b.ident("limit");
    let dec = b.expr(ExprKind::Unary {
        op: UnaryOp::PostDecrement,
        operand: Box::new(limit),
    });
    let dec = b.expr_stmt(dec);
    let limit = b.ident("limit");
    let zero = b.literal(LiteralValue::Int(0));
    let positive = b.expr(ExprKind::Binary {
        op: BinaryOp::Gt,
        left: Box::new(limit),
        right: Box::new(zero),
    });
    body.push(b.stmt(StmtKind::DoWhile {
        body: Box::new(dec),
        condition: positive,
    }));

    // switch (total) { case 0: case 1: return; default: assert(total > 1, 'big'); }
    let subject = b.ident("total");
    let zero = b.literal(LiteralValue::Int(0));
    let one = b.literal(LiteralValue::Int(1));
    let ret = b.stmt(StmtKind::Return { value: None });
    let case_id = b.next_id();
    let case = SwitchCase {
        id: case_id,
        location: b.location(),
        metadata: None,
        patterns: vec![zero, one],
        body: vec![ret],
    };
    let total = b.ident("total");
    let one = b.literal(LiteralValue::Int(1));
    let big = b.expr(ExprKind::Binary {
        op: BinaryOp::Gt,
        left: Box::new(total),
        right: Box::new(one),
    });
    let msg = b.literal(LiteralValue::String("big".to_string()));
    let assert = b.stmt(StmtKind::Assert {
        condition: big,
        message: Some(msg),
    });
    body.push(b.stmt(StmtKind::Switch {
        subject,
        cases: vec![case],
        default: Some(vec![assert]),
    }));

    // try { await fetch<int>(items[0] as String); } on FormatException catch (e, st) { onDone(null, force: true); } finally { }
    let items = b.ident("items");
    let index = b.literal(LiteralValue::Int(0));
    let first = b.expr(ExprKind::IndexAccess {
        target: Box::new(items),
        index: Box::new(index),
    });
    let cast = b.expr(ExprKind::As {
        operand: Box::new(first),
        target_type: TypeIR::simple("String"),
    });
    let fetch = b.expr(ExprKind::MethodCall {
        target: None,
        method: "fetch".to_string(),
        type_args: vec![TypeIR::simple("int")],
        arguments: vec![Argument::positional(cast)],
        null_aware: false,
    });
    let awaited = b.expr(ExprKind::Await {
        operand: Box::new(fetch),
    });
    let awaited = b.expr_stmt(awaited);
    let null = b.literal(LiteralValue::Null);
    let force = b.literal(LiteralValue::Bool(true));
    let done = b.expr(ExprKind::MethodCall {
        target: None,
        method: "onDone".to_string(),
        type_args: Vec::new(),
        arguments: vec![Argument::positional(null), Argument::named("force", force)],
        null_aware: false,
    });
    let done = b.expr_stmt(done);
    let catch_id = b.next_id();
    let catch = CatchClause {
        id: catch_id,
        location: b.location(),
        metadata: None,
        exception_type: Some(TypeIR::simple("FormatException")),
        exception_param: Some("e".to_string()),
        stack_trace_param: Some("st".to_string()),
        body: vec![done],
    };
    body.push(b.stmt(StmtKind::Try {
        body: vec![awaited],
        catches: vec![catch],
        finally: Some(Vec::new()),
    }));

    // final paint = Paint()..color = total > 0 ? red : blue..reset();
    let paint = b.new_instance("Paint", vec![]);
    let total = b.ident("total");
    let zero = b.literal(LiteralValue::Int(0));
    let cond = b.expr(ExprKind::Binary {
        op: BinaryOp::Gt,
        left: Box::new(total),
        right: Box::new(zero),
    });
    let red = b.ident("red");
    let blue = b.ident("blue");
    let pick = b.expr(ExprKind::Conditional {
        condition: Box::new(cond),
        then_expr: Box::new(red),
        else_expr: Box::new(blue),
    });
    let set_color = b.assign("color", pick);
    let reset = b.call(None, "reset", vec![]);
    let cascade = b.expr(ExprKind::Cascade {
        target: Box::new(paint),
        sections: vec![set_color, reset],
    });
    body.push(b.expr_stmt(cascade));

    // return {'total': -total, 'ok': const [true]};
    let key = b.literal(LiteralValue::String("total".to_string()));
    let total = b.ident("total");
    let neg = b.expr(ExprKind::Unary {
        op: UnaryOp::Neg,
        operand: Box::new(total),
    });
    let ok = b.literal(LiteralValue::String("ok".to_string()));
    let t = b.literal(LiteralValue::Bool(true));
    let list = b.expr(ExprKind::ListLiteral {
        elements: vec![t],
        element_type: Some(TypeIR::simple("bool")),
        is_const: true,
    });
    let map = b.expr(ExprKind::MapLiteral {
        entries: vec![MapEntry { key, value: neg }, MapEntry { key: ok, value: list }],
        key_type: Some(TypeIR::simple("String")),
        value_type: None,
        is_const: false,
    });
    body.push(b.stmt(StmtKind::Return { value: Some(map) }));
    body
}

fn kitchen_sink_class(b: &mut FileBuilder) -> ClassDecl {
    let id = b.next_id();
    let mut class = ClassDecl::new(id, b.location(), "Point");
    class.superclass = Some(TypeIR::simple("Shape"));
    class.interfaces = vec![TypeIR::with_args("Comparable", vec![TypeIR::simple("Point")])];
    class.mixins = vec![TypeIR::simple("EquatableMixin")];
    class.type_parameters = vec![TypeIR::type_parameter("N")];
    class.is_final = true;
    class.metadata = Some(NodeMetadata {
        doc_comment: None,
        annotations: vec![Annotation::marker("immutable")],
        synthetic: false,
    });

    let id = b.next_id();
    let mut x = FieldDecl::new(id, b.location(), "x", TypeIR::type_parameter("N"));
    x.is_final = true;
    class.fields.push(x);
    let id = b.next_id();
    let mut origin = FieldDecl::new(id, b.location(), "origin", TypeIR::simple("Point").nullable());
    origin.is_static = true;
    origin.is_late = true;
    class.fields.push(origin);

    // Point(this.x, {int scale = 1}) : assert(x != null), super(scale: scale);
    let param_id = b.next_id();
    let this_x = ParameterDecl::new(
        param_id,
        b.location(),
        "x",
        TypeIR::type_parameter("N"),
        ParameterFlags::positional().field_formal(),
        None,
    )
    .unwrap();
    let id = b.next_id();
    let ctor_fn = FunctionDecl::builder(id, "Point")
        .parameter(this_x)
        .build()
        .unwrap();
    let scale = b.ident("scale");
    let ctor = ConstructorDecl::new(
        ctor_fn,
        "Point",
        None,
        Vec::new(),
        Some(ConstructorInvocation {
            constructor_name: None,
            arguments: vec![Argument::named("scale", scale)],
        }),
        None,
        false,
    )
    .unwrap();
    class.constructors.push(ctor);

    // Point.origin() : this(0);
    let zero = b.literal(LiteralValue::Int(0));
    let id = b.next_id();
    let redirect_fn = FunctionDecl::builder(id, "Point").build().unwrap();
    let redirect = ConstructorDecl::new(
        redirect_fn,
        "Point",
        Some("origin".to_string()),
        Vec::new(),
        None,
        Some(ConstructorInvocation {
            constructor_name: None,
            arguments: vec![Argument::positional(zero)],
        }),
        false,
    )
    .unwrap();
    class.constructors.push(redirect);

    // factory Point.parse(String s) => Point(int.parse(s));
    let param_id = b.next_id();
    let s = ParameterDecl::new(
        param_id,
        b.location(),
        "s",
        TypeIR::simple("String"),
        ParameterFlags::positional(),
        None,
    )
    .unwrap();
    let int = b.ident("int");
    let s_ref = b.ident("s");
    let parsed = b.call(Some(int), "parse", vec![s_ref]);
    let made = b.new_instance("Point", vec![parsed]);
    let id = b.next_id();
    let factory_fn = FunctionDecl::builder(id, "Point")
        .parameter(s)
        .expression_body(made)
        .build()
        .unwrap();
    let factory = ConstructorDecl::new(
        factory_fn,
        "Point",
        Some("parse".to_string()),
        Vec::new(),
        None,
        None,
        true,
    )
    .unwrap();
    class.constructors.push(factory);

    // N get value => x;
    let x_ref = b.ident("x");
    let id = b.next_id();
    let getter = FunctionDecl::builder(id, "value")
        .return_type(TypeIR::type_parameter("N"))
        .accessor(Accessor::Getter)
        .expression_body(x_ref)
        .build()
        .unwrap();
    class.methods.push(MethodDecl::new(getter, "Point"));

    // set label(String v) {}
    let param_id = b.next_id();
    let v = ParameterDecl::new(
        param_id,
        b.location(),
        "v",
        TypeIR::simple("String"),
        ParameterFlags::positional(),
        None,
    )
    .unwrap();
    let id = b.next_id();
    let setter = FunctionDecl::builder(id, "label")
        .accessor(Accessor::Setter)
        .parameter(v)
        .body(Vec::new())
        .build()
        .unwrap();
    class.methods.push(MethodDecl::new(setter, "Point"));

    // @override int compareTo(Point other) => 0;
    let param_id = b.next_id();
    let other = ParameterDecl::new(
        param_id,
        b.location(),
        "other",
        TypeIR::simple("Point"),
        ParameterFlags::positional(),
        None,
    )
    .unwrap();
    let zero = b.literal(LiteralValue::Int(0));
    let id = b.next_id();
    let compare = FunctionDecl::builder(id, "compareTo")
        .return_type(TypeIR::simple("int"))
        .parameter(other)
        .expression_body(zero)
        .build()
        .unwrap();
    let mut compare = MethodDecl::new(compare, "Point");
    compare.is_override = true;
    class.methods.push(compare);

    // static Stream<int> ticks() async* {}
    let id = b.next_id();
    let ticks = FunctionDecl::builder(id, "ticks")
        .return_type(TypeIR::with_args("Stream", vec![TypeIR::simple("int")]))
        .is_async()
        .is_generator()
        .is_static()
        .body(Vec::new())
        .build()
        .unwrap();
    class.methods.push(MethodDecl::new(ticks, "Point"));

    class
}

fn kitchen_sink_provider(b: &mut FileBuilder) -> ClassDecl {
    let id = b.next_id();
    let mut class = ClassDecl::new(id, b.location(), "CartModel");
    class.superclass = Some(TypeIR::simple("ChangeNotifier"));
    let id = b.next_id();
    class
        .fields
        .push(FieldDecl::new(id, b.location(), "items", TypeIR::simple("List")));

    // void add(Item item) { items.add(item); notifyListeners(); }
    let items = b.ident("items");
    let item = b.ident("item");
    let add = b.call(Some(items), "add", vec![item]);
    let add = b.expr_stmt(add);
    let notify = b.call(None, "notifyListeners", vec![]);
    let notify_loc = notify.location.clone();
    let notify = b.expr_stmt(notify);
    let id = b.next_id();
    let f = FunctionDecl::builder(id, "add")
        .body(vec![add, notify])
        .build()
        .unwrap();
    class.methods.push(MethodDecl::new(f, "CartModel"));

    class.provider = Some(ProviderProfile {
        notify_calls: vec![NotifyCall {
            method: "add".to_string(),
            location: notify_loc.clone(),
        }],
        consumers: vec!["CartPage".to_string()],
        mutations: vec![StateMutation {
            field: "items".to_string(),
            method: "add".to_string(),
            location: notify_loc,
        }],
        depends_on: vec!["AuthModel".to_string()],
    });
    class
}

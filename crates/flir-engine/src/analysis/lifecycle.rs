//! Component lifecycle and reactivity checks
//!
//! Every check is independent. A missing method or body degrades that
//! check to "nothing found" rather than failing the class.

use rustc_hash::FxHashSet;
use serde::Serialize;

use super::config::AnalysisConfig;
use crate::diagnostics::{self, IssueCollector, RuleMeta, Severity};
use crate::ir::visitor::{walk_expr, walk_stmt, Visitor};
use crate::ir::{ClassDecl, Expr, ExprKind, FunctionDecl, NodeId, ResourceKind, Stmt};
use crate::source::SourceLocation;

/// Rules whose errors carry their own health deduction.
const DEDICATED: &[&str] = &[
    "INIT_NO_SUPER",
    "MISSING_DISPOSE",
    "DISPOSE_NO_SUPER",
    "CONTROLLER_NOT_DISPOSED",
    "SUBSCRIPTION_NOT_CANCELLED",
    "MUTATE_IN_LOOP",
];

/// Lifecycle findings for one component class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleReport {
    pub class: String,
    pub class_id: NodeId,
    pub has_init: bool,
    pub has_dispose: bool,
    pub init_calls_super: bool,
    pub dispose_calls_super: bool,
    pub undisposed_resources: Vec<String>,
    pub unused_reactive_fields: Vec<String>,
    pub mutate_in_loop: usize,
    /// 0..=100
    pub health_score: u8,
}

/// Run the lifecycle checks on `class`, which must carry a component
/// profile. `widgets` names the file's component classes.
pub fn check_component(
    class: &ClassDecl,
    widgets: &FxHashSet<&str>,
    config: &AnalysisConfig,
    issues: &mut IssueCollector,
) -> Option<LifecycleReport> {
    let profile = class.component.as_ref()?;
    let mut checker = Checker {
        class,
        issues,
        reported: Vec::new(),
    };

    let needs_init = !profile.reactive_fields.is_empty() || !profile.resources.is_empty();
    let needs_dispose = !profile.resources.is_empty();

    // initState
    let init = class.init_method();
    let mut init_calls_super = true;
    match init {
        None if needs_init => checker.report(
            &diagnostics::MISSING_INIT_STATE,
            format!("'{}' declares state but has no initState", class.name),
            class.location.clone(),
            Some("override initState and call super.initState() first"),
        ),
        None => {}
        Some(init) => {
            init_calls_super = init
                .function
                .statements()
                .first()
                .and_then(Stmt::as_expression)
                .is_some_and(|e| e.is_super_call(init.name()));
            if !init_calls_super {
                checker.report(
                    &diagnostics::INIT_NO_SUPER,
                    format!("'{}.{}' must call super.{}() first", class.name, init.name(), init.name()),
                    init.function.location.clone(),
                    Some("move the super call to the first statement"),
                );
            }
        }
    }

    // dispose
    let dispose = class.dispose_method();
    let mut dispose_calls_super = true;
    let mut undisposed_resources = Vec::new();
    match dispose {
        None if needs_dispose => {
            let names: Vec<&str> = profile.resources.iter().map(|r| r.name.as_str()).collect();
            checker.report(
                &diagnostics::MISSING_DISPOSE,
                format!(
                    "'{}' holds {} but has no dispose",
                    class.name,
                    names.join(", ")
                ),
                class.location.clone(),
                Some("override dispose, release each resource, then call super.dispose()"),
            );
        }
        None => {}
        Some(dispose) => {
            let name = dispose.name();
            dispose_calls_super = contains_expr(&dispose.function, |e| e.is_super_call(name));
            if !dispose_calls_super {
                checker.report(
                    &diagnostics::DISPOSE_NO_SUPER,
                    format!("'{}.{}' does not call super.{}()", class.name, name, name),
                    dispose.function.location.clone(),
                    None,
                );
            }
            for resource in &profile.resources {
                if references(&dispose.function, &resource.name) {
                    continue;
                }
                let (rule, verb) = match resource.kind {
                    ResourceKind::Controller => (&diagnostics::CONTROLLER_NOT_DISPOSED, "disposed"),
                    ResourceKind::Subscription => {
                        (&diagnostics::SUBSCRIPTION_NOT_CANCELLED, "cancelled")
                    }
                };
                let location = class
                    .field(&resource.name)
                    .map_or_else(|| class.location.clone(), |f| f.location.clone());
                checker.report(
                    rule,
                    format!(
                        "{} '{}' is never {} in {}",
                        resource.type_name, resource.name, verb, name
                    ),
                    location,
                    None,
                );
                undisposed_resources.push(resource.name.clone());
            }
        }
    }

    // didUpdateWidget
    if let Some(did_update) = class.did_update_widget_method() {
        let name = did_update.name();
        if !contains_expr(&did_update.function, |e| e.is_super_call(name)) {
            checker.report(
                &diagnostics::DID_UPDATE_NO_SUPER,
                format!("'{}.{}' does not call super.{}()", class.name, name, name),
                did_update.function.location.clone(),
                None,
            );
        }
    }

    // build
    let build = class.build_method();
    let mut unused_reactive_fields = Vec::new();
    if let Some(build) = build {
        if build.function.modifiers.is_async {
            checker.report(
                &diagnostics::BUILD_IS_ASYNC,
                format!("'{}.{}' is async", class.name, build.name()),
                build.function.location.clone(),
                Some("load data in initState and render from state"),
            );
        }

        let mut finder = LoopWidgetFinder {
            is_widget: |name: &str| widgets.contains(name) || config.is_widget_type(name),
            loop_depth: 0,
            found: Vec::new(),
        };
        finder.visit_function_decl(&build.function);
        for (name, location) in finder.found {
            checker.report(
                &diagnostics::WIDGETS_IN_LOOPS,
                format!("'{}' created inside a loop in {}.build", name, class.name),
                location,
                Some("use a builder such as ListView.builder"),
            );
        }

        for field in &profile.reactive_fields {
            if !references(&build.function, &field.name) {
                checker.report(
                    &diagnostics::UNUSED_REACTIVE_FIELD,
                    format!("reactive field '{}' is never read in build", field.name),
                    class
                        .field(&field.name)
                        .map_or_else(|| class.location.clone(), |f| f.location.clone()),
                    None,
                );
                unused_reactive_fields.push(field.name.clone());
            }
        }
    }

    // mutate calls, in every method
    let mut mutate_in_loop = 0;
    for method in &class.methods {
        let mut finder = MutateFinder {
            mutate_method: &config.mutate_method,
            loop_depth: 0,
            in_loop: Vec::new(),
            async_callbacks: Vec::new(),
        };
        finder.visit_function_decl(&method.function);
        mutate_in_loop += finder.in_loop.len();
        for location in finder.in_loop {
            checker.report(
                &diagnostics::MUTATE_IN_LOOP,
                format!("{}() inside a loop in {}.{}", config.mutate_method, class.name, method.name()),
                location,
                Some("mutate once after the loop"),
            );
        }
        for location in finder.async_callbacks {
            checker.report(
                &diagnostics::MUTATE_ASYNC_CALLBACK,
                format!("{}() called with an async callback", config.mutate_method),
                location,
                Some("await the work first, then mutate synchronously"),
            );
        }
    }

    let missing_init = init.is_none() && needs_init;
    let missing_dispose = dispose.is_none() && needs_dispose;
    let generic_errors = checker
        .reported
        .iter()
        .filter(|r| r.default_severity == Severity::Error && !DEDICATED.contains(&r.code))
        .count();

    let mut score: i64 = 100;
    score -= 20 * missing_init as i64;
    score -= 20 * missing_dispose as i64;
    score -= 15 * (!init_calls_super) as i64;
    score -= 15 * (!dispose_calls_super) as i64;
    score -= 10 * undisposed_resources.len() as i64;
    score -= 5 * unused_reactive_fields.len() as i64;
    score -= 10 * generic_errors as i64;
    score -= 5 * mutate_in_loop as i64;

    Some(LifecycleReport {
        class: class.name.clone(),
        class_id: class.id,
        has_init: init.is_some(),
        has_dispose: dispose.is_some(),
        init_calls_super,
        dispose_calls_super,
        undisposed_resources,
        unused_reactive_fields,
        mutate_in_loop,
        health_score: score.clamp(0, 100) as u8,
    })
}

struct Checker<'a> {
    class: &'a ClassDecl,
    issues: &'a mut IssueCollector,
    reported: Vec<&'static RuleMeta>,
}

impl Checker<'_> {
    fn report(
        &mut self,
        rule: &'static RuleMeta,
        message: String,
        location: SourceLocation,
        suggestion: Option<&str>,
    ) {
        tracing::trace!(class = %self.class.name, code = rule.code, "lifecycle issue");
        self.issues
            .report_with(rule, message, location, suggestion.map(str::to_string));
        self.reported.push(rule);
    }
}

/// Whether any expression in `function` satisfies `pred`, closures included.
fn contains_expr(function: &FunctionDecl, pred: impl Fn(&Expr) -> bool) -> bool {
    let mut finder = ExprFinder { pred, found: false };
    finder.visit_function_decl(function);
    finder.found
}

/// Whether `function` mentions member `name`.
fn references(function: &FunctionDecl, name: &str) -> bool {
    contains_expr(function, |e| e.member_name() == Some(name))
}

struct ExprFinder<F> {
    pred: F,
    found: bool,
}

impl<F: Fn(&Expr) -> bool> Visitor for ExprFinder<F> {
    fn visit_expr(&mut self, expr: &Expr) {
        if self.found {
            return;
        }
        if (self.pred)(expr) {
            self.found = true;
            return;
        }
        walk_expr(self, expr);
    }
}

/// Widget instance creations inside loops, not descending into closures.
struct LoopWidgetFinder<F> {
    is_widget: F,
    loop_depth: usize,
    found: Vec<(String, SourceLocation)>,
}

impl<F: Fn(&str) -> bool> Visitor for LoopWidgetFinder<F> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        let is_loop = stmt.is_loop();
        self.loop_depth += is_loop as usize;
        walk_stmt(self, stmt);
        self.loop_depth -= is_loop as usize;
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::FunctionLiteral { .. } => {}
            ExprKind::InstanceCreation { ty, .. } if self.loop_depth > 0 => {
                if let Some(name) = ty.name().filter(|n| (self.is_widget)(*n)) {
                    self.found.push((name.to_string(), expr.location.clone()));
                }
                walk_expr(self, expr);
            }
            // `Text(...)` without `new` before type resolution
            ExprKind::MethodCall {
                target: None,
                method,
                ..
            } if self.loop_depth > 0 && (self.is_widget)(method.as_str()) => {
                self.found.push((method.clone(), expr.location.clone()));
                walk_expr(self, expr);
            }
            _ => walk_expr(self, expr),
        }
    }
}

/// Mutate calls inside loops or with async callbacks.
///
/// A closure runs later, so it starts outside any loop, except a callback
/// passed to `forEach`, which runs once per element.
struct MutateFinder<'a> {
    mutate_method: &'a str,
    loop_depth: usize,
    in_loop: Vec<SourceLocation>,
    async_callbacks: Vec<SourceLocation>,
}

impl Visitor for MutateFinder<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        let is_loop = stmt.is_loop();
        self.loop_depth += is_loop as usize;
        walk_stmt(self, stmt);
        self.loop_depth -= is_loop as usize;
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::MethodCall { arguments, .. } if expr.is_self_call(self.mutate_method) => {
                if self.loop_depth > 0 {
                    self.in_loop.push(expr.location.clone());
                }
                let async_callback = arguments.iter().any(|a| {
                    matches!(a.value.kind, ExprKind::FunctionLiteral { is_async: true, .. })
                });
                if async_callback {
                    self.async_callbacks.push(expr.location.clone());
                }
                walk_expr(self, expr);
            }
            ExprKind::MethodCall {
                target,
                method,
                arguments,
                ..
            } if method == "forEach" => {
                if let Some(target) = target {
                    self.visit_expr(target);
                }
                for arg in arguments {
                    match &arg.value.kind {
                        ExprKind::FunctionLiteral { body, .. } => {
                            self.loop_depth += 1;
                            self.visit_function_body(body);
                            self.loop_depth -= 1;
                        }
                        _ => self.visit_expr(&arg.value),
                    }
                }
            }
            ExprKind::FunctionLiteral { .. } => {
                let saved = std::mem::replace(&mut self.loop_depth, 0);
                walk_expr(self, expr);
                self.loop_depth = saved;
            }
            _ => walk_expr(self, expr),
        }
    }
}

//! Provider checks: mutations without notification and dependency cycles.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::diagnostics::{self, IssueCollector};
use crate::ir::visitor::{walk_expr, Visitor};
use crate::ir::{ClassDecl, Expr, FileDecl};

/// Report `MISSING_NOTIFY` for every recorded mutation whose method never
/// notifies listeners.
///
/// A method notifies when the adapter recorded a notify call for it, or when
/// its body calls `notify_method` on itself.
pub fn check_notify(class: &ClassDecl, notify_method: &str, issues: &mut IssueCollector) {
    let Some(profile) = &class.provider else {
        return;
    };
    let mut notifying: FxHashSet<&str> = profile
        .notify_calls
        .iter()
        .map(|c| c.method.as_str())
        .collect();
    for method in &class.methods {
        let mut finder = NotifyFinder {
            notify_method,
            found: false,
        };
        finder.visit_function_decl(&method.function);
        if finder.found {
            notifying.insert(method.name());
        }
    }

    for mutation in &profile.mutations {
        if notifying.contains(mutation.method.as_str()) {
            continue;
        }
        issues.report_with(
            &diagnostics::MISSING_NOTIFY,
            format!(
                "'{}.{}' changes '{}' without calling {}()",
                class.name, mutation.method, mutation.field, notify_method
            ),
            mutation.location.clone(),
            Some(format!("call {}() after the change", notify_method)),
        );
    }
}

struct NotifyFinder<'a> {
    notify_method: &'a str,
    found: bool,
}

impl Visitor for NotifyFinder<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        if self.found {
            return;
        }
        if expr.is_self_call(self.notify_method) {
            self.found = true;
            return;
        }
        walk_expr(self, expr);
    }
}

/// Dependency cycles among the file's providers, each listed from its
/// lexicographically smallest member with the first member repeated at
/// the end: `["A", "B", "A"]`.
///
/// Dependencies on classes outside the file are ignored.
pub fn find_cycles(file: &FileDecl) -> Vec<Vec<String>> {
    let providers: Vec<&ClassDecl> = file.classes.iter().filter(|c| c.provider.is_some()).collect();
    let index: FxHashMap<&str, usize> = providers
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name.as_str(), i))
        .collect();
    let edges: Vec<Vec<usize>> = providers
        .iter()
        .map(|c| {
            let mut deps: Vec<usize> = c
                .provider
                .iter()
                .flat_map(|p| p.depends_on.iter())
                .filter_map(|dep| index.get(dep.as_str()).copied())
                .collect();
            deps.sort_unstable();
            deps.dedup();
            deps
        })
        .collect();

    let mut search = CycleSearch {
        edges: &edges,
        start: 0,
        on_path: vec![false; providers.len()],
        path: Vec::new(),
        cycles: Vec::new(),
    };
    for start in 0..providers.len() {
        search.start = start;
        search.extend(start);
    }

    search
        .cycles
        .into_iter()
        .map(|cycle| {
            let mut names: Vec<String> = cycle.iter().map(|&i| providers[i].name.clone()).collect();
            if let Some(min_pos) = names
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.cmp(b))
                .map(|(i, _)| i)
            {
                names.rotate_left(min_pos);
            }
            if let Some(first) = names.first().cloned() {
                names.push(first);
            }
            names
        })
        .collect()
}

/// Report one `PROVIDER_CYCLE` per cycle.
pub fn check_cycles(file: &FileDecl, issues: &mut IssueCollector) -> Vec<Vec<String>> {
    let cycles = find_cycles(file);
    for cycle in &cycles {
        let location = cycle
            .first()
            .and_then(|name| file.class(name))
            .map_or_else(
                || crate::source::SourceLocation::unknown(file.file_path.clone()),
                |c| c.location.clone(),
            );
        issues.report_with(
            &diagnostics::PROVIDER_CYCLE,
            format!("provider dependency cycle: {}", cycle.join(" -> ")),
            location,
            Some("break the cycle by moving shared state into its own provider".to_string()),
        );
    }
    cycles
}

/// Elementary cycle enumeration. Each cycle is found once, from its
/// lowest-indexed member: the walk from `start` never enters a node below it.
struct CycleSearch<'a> {
    edges: &'a [Vec<usize>],
    start: usize,
    on_path: Vec<bool>,
    path: Vec<usize>,
    cycles: Vec<Vec<usize>>,
}

impl CycleSearch<'_> {
    fn extend(&mut self, node: usize) {
        self.on_path[node] = true;
        self.path.push(node);
        for &next in &self.edges[node] {
            if next == self.start {
                self.cycles.push(self.path.clone());
            } else if next > self.start && !self.on_path[next] {
                self.extend(next);
            }
        }
        self.path.pop();
        self.on_path[node] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FileBuilder, ProviderProfile};

    fn providers(deps: &[(&str, &[&str])]) -> FileDecl {
        let mut b = FileBuilder::new("lib/providers.dart");
        for (name, depends_on) in deps {
            let id = b.next_id();
            let mut class = ClassDecl::new(id, b.location(), *name);
            class.provider = Some(ProviderProfile {
                depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
                ..ProviderProfile::default()
            });
            b.add_class(class);
        }
        b.build()
    }

    #[test]
    fn test_two_provider_cycle() {
        let file = providers(&[("Cart", &["Auth"]), ("Auth", &["Cart"]), ("Theme", &[])]);
        let cycles = find_cycles(&file);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].first(), cycles[0].last());
        assert_eq!(cycles[0].len(), 3);
    }

    #[test]
    fn test_cycles_sharing_a_provider_are_all_found() {
        let file = providers(&[("A", &["B", "C"]), ("B", &["C"]), ("C", &["A"])]);
        let cycles = find_cycles(&file);
        let expected: Vec<Vec<String>> = vec![
            vec!["A".into(), "B".into(), "C".into(), "A".into()],
            vec!["A".into(), "C".into(), "A".into()],
        ];
        assert_eq!(cycles, expected);

        let mut issues = IssueCollector::new();
        check_cycles(&file, &mut issues);
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_repeated_dependency_counts_once() {
        let file = providers(&[("Y", &["X"]), ("X", &["Y", "Y"])]);
        assert_eq!(
            find_cycles(&file),
            vec![vec!["X".to_string(), "Y".to_string(), "X".to_string()]]
        );
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let file = providers(&[("Loop", &["Loop"])]);
        assert_eq!(find_cycles(&file), vec![vec!["Loop".to_string(), "Loop".to_string()]]);
    }

    #[test]
    fn test_acyclic_and_external_dependencies() {
        let file = providers(&[("A", &["B", "External"]), ("B", &[]), ("C", &["A", "B"])]);
        assert!(find_cycles(&file).is_empty());

        let mut issues = IssueCollector::new();
        assert!(check_cycles(&file, &mut issues).is_empty());
        assert!(issues.is_empty());
    }
}

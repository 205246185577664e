//! Analysis issues, the issue collector and the rule registry.
//!
//! Issues are findings, not errors: passes append them to an
//! [`IssueCollector`] and keep going.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::source::SourceLocation;

/// Issue severity, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }

    /// Whether `self` is at least as severe as `other`.
    pub fn at_least(self, other: Severity) -> bool {
        self <= other
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Unreachable statements and other CFG findings.
    ControlFlow,
    /// Component lifecycle misuse.
    Lifecycle,
    /// Reactive field and mutate-call findings.
    Reactivity,
    /// Avoidable rebuild or allocation cost.
    Performance,
    /// Change-notifier state holders.
    Provider,
    /// Dead private declarations.
    Unused,
    /// Reported by the AST adapter.
    Adapter,
}

impl IssueCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCategory::ControlFlow => "control_flow",
            IssueCategory::Lifecycle => "lifecycle",
            IssueCategory::Reactivity => "reactivity",
            IssueCategory::Performance => "performance",
            IssueCategory::Provider => "provider",
            IssueCategory::Unused => "unused",
            IssueCategory::Adapter => "adapter",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sequential issue id, unique within one collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub u32);

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisIssue {
    pub id: IssueId,
    pub code: String,
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    #[serde(default)]
    pub suggestion: Option<String>,
    pub location: SourceLocation,
}

impl fmt::Display for AnalysisIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[{}]: {}",
            self.location, self.severity, self.code, self.message
        )
    }
}

/// Static metadata for an analysis rule.
#[derive(Debug)]
pub struct RuleMeta {
    /// Issue code, e.g. "MISSING_DISPOSE".
    pub code: &'static str,
    pub category: IssueCategory,
    pub default_severity: Severity,
    pub description: &'static str,
}

macro_rules! rules {
    ($($name:ident => $code:literal, $category:ident, $severity:ident, $desc:literal;)*) => {
        $(
            pub static $name: RuleMeta = RuleMeta {
                code: $code,
                category: IssueCategory::$category,
                default_severity: Severity::$severity,
                description: $desc,
            };
        )*

        /// Every rule known to the analysis pass.
        pub static RULES: &[&RuleMeta] = &[$(&$name),*];
    };
}

rules! {
    UNREACHABLE_CODE => "UNREACHABLE_CODE", ControlFlow, Warning,
        "Statement can never execute";
    MISSING_INIT_STATE => "MISSING_INIT_STATE", Lifecycle, Warning,
        "State with reactive fields or resources has no initState";
    INIT_NO_SUPER => "INIT_NO_SUPER", Lifecycle, Error,
        "initState does not call super.initState() first";
    MISSING_DISPOSE => "MISSING_DISPOSE", Lifecycle, Error,
        "State holding controllers or subscriptions has no dispose";
    DISPOSE_NO_SUPER => "DISPOSE_NO_SUPER", Lifecycle, Error,
        "dispose does not call super.dispose()";
    CONTROLLER_NOT_DISPOSED => "CONTROLLER_NOT_DISPOSED", Lifecycle, Error,
        "Controller field is never disposed";
    SUBSCRIPTION_NOT_CANCELLED => "SUBSCRIPTION_NOT_CANCELLED", Lifecycle, Error,
        "Subscription field is never cancelled";
    DID_UPDATE_NO_SUPER => "DID_UPDATE_NO_SUPER", Lifecycle, Warning,
        "didUpdateWidget does not call super.didUpdateWidget()";
    BUILD_IS_ASYNC => "BUILD_IS_ASYNC", Lifecycle, Error,
        "build must be synchronous";
    WIDGETS_IN_LOOPS => "WIDGETS_IN_LOOPS", Performance, Warning,
        "Widgets created inside a loop in build; prefer a builder";
    MUTATE_IN_LOOP => "MUTATE_IN_LOOP", Reactivity, Error,
        "State mutate call inside a loop schedules a rebuild per iteration";
    MUTATE_ASYNC_CALLBACK => "MUTATE_ASYNC_CALLBACK", Reactivity, Warning,
        "State mutate call with an async callback";
    UNUSED_REACTIVE_FIELD => "UNUSED_REACTIVE_FIELD", Reactivity, Info,
        "Reactive field is never read in build";
    MISSING_NOTIFY => "MISSING_NOTIFY", Provider, Warning,
        "Provider mutates state without notifying listeners";
    PROVIDER_CYCLE => "PROVIDER_CYCLE", Provider, Error,
        "Providers depend on each other in a cycle";
    UNUSED_DECLARATION => "UNUSED_DECLARATION", Unused, Hint,
        "Private declaration is never referenced";
}

/// Look up a rule by issue code.
pub fn rule(code: &str) -> Option<&'static RuleMeta> {
    RULES.iter().copied().find(|r| r.code == code)
}

/// Append-only issue list.
///
/// No deduplication: reporting the same condition twice yields two issues.
#[derive(Debug, Clone, Default)]
pub struct IssueCollector {
    issues: Vec<AnalysisIssue>,
    next_id: u32,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&mut self) -> IssueId {
        let id = IssueId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Report an issue for `rule` at its default severity.
    pub fn report(
        &mut self,
        rule: &RuleMeta,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> IssueId {
        self.report_with(rule, message, location, None)
    }

    pub fn report_with(
        &mut self,
        rule: &RuleMeta,
        message: impl Into<String>,
        location: SourceLocation,
        suggestion: Option<String>,
    ) -> IssueId {
        let id = self.fresh_id();
        self.issues.push(AnalysisIssue {
            id,
            code: rule.code.to_string(),
            severity: rule.default_severity,
            category: rule.category,
            message: message.into(),
            suggestion,
            location,
        });
        id
    }

    /// Append an existing issue, renumbering it into this collector.
    pub fn push(&mut self, mut issue: AnalysisIssue) -> IssueId {
        let id = self.fresh_id();
        issue.id = id;
        self.issues.push(issue);
        id
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = AnalysisIssue>) {
        for issue in issues {
            self.push(issue);
        }
    }

    pub fn issues(&self) -> &[AnalysisIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<AnalysisIssue> {
        self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &AnalysisIssue> + '_ {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn with_category(&self, category: IssueCategory) -> impl Iterator<Item = &AnalysisIssue> + '_ {
        self.issues.iter().filter(move |i| i.category == category)
    }

    /// Issues at least as severe as `severity`.
    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &AnalysisIssue> + '_ {
        self.issues.iter().filter(move |i| i.severity.at_least(severity))
    }

    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a AnalysisIssue> + 'a {
        self.issues.iter().filter(move |i| i.code == code)
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }
}

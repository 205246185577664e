//! Analysis configuration: framework names and per-rule severity overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::{rule, AnalysisIssue, Severity};

/// Severity override for one rule. `off` drops the rule's issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityOverride {
    Off,
    Error,
    Warning,
    Info,
    Hint,
}

impl SeverityOverride {
    /// Effective severity, or `None` when the rule is disabled.
    pub fn severity(self) -> Option<Severity> {
        match self {
            SeverityOverride::Off => None,
            SeverityOverride::Error => Some(Severity::Error),
            SeverityOverride::Warning => Some(Severity::Warning),
            SeverityOverride::Info => Some(Severity::Info),
            SeverityOverride::Hint => Some(Severity::Hint),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown rule '{code}' in severity overrides")]
    UnknownRule { code: String },

    #[error("'{key}' must not be empty")]
    EmptyName { key: &'static str },
}

/// Framework widget classes recognized without configuration.
pub const FRAMEWORK_WIDGETS: &[&str] = &[
    "Align",
    "AnimatedBuilder",
    "AnimatedContainer",
    "AppBar",
    "AspectRatio",
    "Card",
    "Center",
    "Checkbox",
    "CircleAvatar",
    "CircularProgressIndicator",
    "Column",
    "ConstrainedBox",
    "Container",
    "DecoratedBox",
    "Divider",
    "ElevatedButton",
    "Expanded",
    "FittedBox",
    "Flexible",
    "FloatingActionButton",
    "FutureBuilder",
    "GestureDetector",
    "GridView",
    "Icon",
    "IconButton",
    "Image",
    "InkWell",
    "LayoutBuilder",
    "ListTile",
    "ListView",
    "Material",
    "Opacity",
    "OutlinedButton",
    "Padding",
    "Placeholder",
    "Positioned",
    "RichText",
    "Row",
    "SafeArea",
    "Scaffold",
    "SingleChildScrollView",
    "SizedBox",
    "Spacer",
    "Stack",
    "StreamBuilder",
    "Switch",
    "Text",
    "TextButton",
    "TextField",
    "Tooltip",
    "Transform",
    "Visibility",
    "Wrap",
];

/// Configuration for the flow-analysis pass, loaded from `[analysis]` in
/// `flir.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Batched-update call on component state.
    pub mutate_method: String,
    /// Listener notification call on providers.
    pub notify_method: String,
    /// Extra type names treated as widgets, on top of the file's component
    /// classes, [`FRAMEWORK_WIDGETS`] and names ending in `Widget`.
    pub widget_types: Vec<String>,
    /// Report unreferenced private declarations.
    pub unused_declarations: bool,
    /// Per-rule overrides. Key = issue code, e.g. "WIDGETS_IN_LOOPS".
    pub severity: BTreeMap<String, SeverityOverride>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mutate_method: "setState".to_string(),
            notify_method: "notifyListeners".to_string(),
            widget_types: Vec::new(),
            unused_declarations: true,
            severity: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the severity for a specific rule.
    pub fn set_severity(&mut self, code: &str, severity: SeverityOverride) {
        self.severity.insert(code.to_string(), severity);
    }

    /// Effective severity for `code`, or `None` when disabled.
    pub fn effective_severity(&self, code: &str, default: Severity) -> Option<Severity> {
        match self.severity.get(code) {
            Some(o) => o.severity(),
            None => Some(default),
        }
    }

    pub fn is_disabled(&self, code: &str) -> bool {
        self.severity.get(code) == Some(&SeverityOverride::Off)
    }

    /// Reject overrides for unknown rules and empty method names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mutate_method.is_empty() {
            return Err(ConfigError::EmptyName {
                key: "mutate_method",
            });
        }
        if self.notify_method.is_empty() {
            return Err(ConfigError::EmptyName {
                key: "notify_method",
            });
        }
        if let Some(code) = self.severity.keys().find(|code| rule(code).is_none()) {
            return Err(ConfigError::UnknownRule { code: code.clone() });
        }
        Ok(())
    }

    /// Apply severity overrides, dropping disabled issues.
    pub fn apply_overrides(&self, mut issues: Vec<AnalysisIssue>) -> Vec<AnalysisIssue> {
        if self.severity.is_empty() {
            return issues;
        }
        issues.retain_mut(|issue| match self.effective_severity(&issue.code, issue.severity) {
            Some(severity) => {
                issue.severity = severity;
                true
            }
            None => false,
        });
        issues
    }

    pub fn is_widget_type(&self, name: &str) -> bool {
        name.ends_with("Widget")
            || FRAMEWORK_WIDGETS.binary_search(&name).is_ok()
            || self.widget_types.iter().any(|w| w == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{IssueCategory, IssueId};
    use crate::source::SourceLocation;

    fn issue(code: &str, severity: Severity) -> AnalysisIssue {
        AnalysisIssue {
            id: IssueId(0),
            code: code.to_string(),
            severity,
            category: IssueCategory::Lifecycle,
            message: String::new(),
            suggestion: None,
            location: SourceLocation::unknown("a.dart"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::new();
        assert_eq!(config.mutate_method, "setState");
        assert_eq!(
            config.effective_severity("WIDGETS_IN_LOOPS", Severity::Warning),
            Some(Severity::Warning)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_override_and_disable() {
        let mut config = AnalysisConfig::new();
        config.set_severity("WIDGETS_IN_LOOPS", SeverityOverride::Off);
        config.set_severity("UNUSED_REACTIVE_FIELD", SeverityOverride::Warning);
        assert!(config.is_disabled("WIDGETS_IN_LOOPS"));

        let issues = config.apply_overrides(vec![
            issue("WIDGETS_IN_LOOPS", Severity::Warning),
            issue("UNUSED_REACTIVE_FIELD", Severity::Info),
            issue("MISSING_DISPOSE", Severity::Error),
        ]);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[1].severity, Severity::Error);
    }

    #[test]
    fn test_unknown_rule_rejected() {
        let mut config = AnalysisConfig::new();
        config.set_severity("NO_SUCH_RULE", SeverityOverride::Error);
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownRule {
                code: "NO_SUCH_RULE".to_string()
            })
        );
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{"mutate_method": "update", "severity": {"MUTATE_IN_LOOP": "warning"}}"#,
        )
        .unwrap();
        assert_eq!(config.mutate_method, "update");
        assert_eq!(config.notify_method, "notifyListeners");
        assert_eq!(
            config.severity.get("MUTATE_IN_LOOP"),
            Some(&SeverityOverride::Warning)
        );
    }

    #[test]
    fn test_widget_type_names() {
        let config = AnalysisConfig {
            widget_types: vec!["Label".to_string()],
            ..AnalysisConfig::default()
        };
        assert!(config.is_widget_type("StatelessWidget"));
        assert!(config.is_widget_type("Label"));
        assert!(config.is_widget_type("Text"));
        assert!(!config.is_widget_type("String"));
        assert!(!AnalysisConfig::default().is_widget_type("Label"));
    }

    #[test]
    fn test_framework_widgets_recognized_by_default() {
        let config = AnalysisConfig::default();
        for name in ["Text", "Container", "Padding", "Column", "SizedBox"] {
            assert!(config.is_widget_type(name), "{}", name);
        }
        assert!(FRAMEWORK_WIDGETS.windows(2).all(|w| w[0] < w[1]));
    }
}

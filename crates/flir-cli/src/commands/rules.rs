//! `flir rules`: list the analysis rules with their effective severity.

use flir_engine::diagnostics::RULES;
use flir_engine::AnalysisConfig;

use crate::output::{severity_color, StyledOutput};

pub fn execute(config: &AnalysisConfig, out: &mut StyledOutput) {
    let width = RULES.iter().map(|r| r.code.len()).max().unwrap_or(0);
    for rule in RULES {
        out.bold(&format!("{:<width$}  ", rule.code, width = width));
        match config.effective_severity(rule.code, rule.default_severity) {
            Some(severity) => out.write_styled(
                &format!("{:<8}", severity.as_str()),
                Some(severity_color(severity)),
                false,
            ),
            None => out.dim(&format!("{:<8}", "off")),
        }
        out.dim(&format!("{:<13}", rule.category.as_str()));
        out.plain(rule.description);
        out.newline();
    }
    out.flush();
}

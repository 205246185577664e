//! `flir analyze`: run the flow-analysis pass over `.ir` / `.json` inputs.

use anyhow::bail;
use flir_engine::pipeline::{BatchSummary, FileOutcome};
use flir_engine::{AnalysisIssue, FlowAnalyzer, Pipeline};
use serde::Serialize;

use super::files::collect_inputs;
use super::Format;
use crate::config::FlirConfig;
use crate::output::{plural, StyledOutput};

/// One input's entry in the JSON report.
#[derive(Debug, Serialize)]
pub struct FileReport<'a> {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub issues: &'a [AnalysisIssue],
    pub health: Vec<Health<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Health<'a> {
    pub class: &'a str,
    pub score: u8,
}

pub fn reports(outcomes: &[FileOutcome]) -> Vec<FileReport<'_>> {
    outcomes
        .iter()
        .map(|outcome| {
            let path = outcome.path.display().to_string();
            match &outcome.result {
                Ok(analyzed) => FileReport {
                    path,
                    error: None,
                    issues: &analyzed.issues,
                    health: analyzed
                        .flow
                        .lifecycles
                        .iter()
                        .map(|r| Health {
                            class: &r.class,
                            score: r.health_score,
                        })
                        .collect(),
                },
                Err(e) => FileReport {
                    path,
                    error: Some(e.to_string()),
                    issues: &[],
                    health: Vec::new(),
                },
            }
        })
        .collect()
}

/// Returns `false` when any input failed to load or reported an error.
pub fn execute(
    paths: &[String],
    format: Format,
    config: &FlirConfig,
    threads: Option<usize>,
    out: &mut StyledOutput,
) -> anyhow::Result<bool> {
    let inputs = collect_inputs(paths)?;
    if inputs.is_empty() {
        bail!("no .ir or .json files found in {}", paths.join(", "));
    }

    let threads = threads.unwrap_or_else(num_cpus::get).max(1);
    let pipeline = Pipeline::new(
        FlowAnalyzer::new(config.analysis.clone()),
        config.codec.write_options(),
    )
    .with_threads(threads)?;
    let outcomes = pipeline.run_paths(&inputs);
    let summary = BatchSummary::of(&outcomes);

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&reports(&outcomes))?);
        }
        Format::Pretty => {
            emit_pretty(&outcomes, out);
            print_summary(out, &summary);
        }
    }
    Ok(!summary.has_failures())
}

fn emit_pretty(outcomes: &[FileOutcome], out: &mut StyledOutput) {
    for outcome in outcomes {
        let analyzed = match &outcome.result {
            Ok(analyzed) => analyzed,
            Err(e) => {
                out.stderr_error(&format!("error: {}", e));
                continue;
            }
        };
        for issue in &analyzed.issues {
            out.bold(&format!("{}: ", issue.location));
            out.severity_label(issue.severity, &issue.code);
            out.plain(&format!(": {}", issue.message));
            out.newline();
            if let Some(suggestion) = &issue.suggestion {
                out.dim(&format!("  help: {}", suggestion));
                out.newline();
            }
        }
        for report in analyzed.flow.lifecycles.iter().filter(|r| r.health_score < 100) {
            out.dim(&format!(
                "  {} health {}/100",
                report.class, report.health_score
            ));
            out.newline();
        }
    }
}

fn print_summary(out: &mut StyledOutput, summary: &BatchSummary) {
    out.newline();
    out.plain(&format!("Analyzed {}", plural(summary.files, "file")));
    if summary.failed > 0 {
        out.plain(" (");
        out.error(&format!("{} failed to load", summary.failed));
        out.plain(")");
    }
    if summary.errors == 0 && summary.warnings == 0 {
        out.plain(": ");
        out.success("no problems found.");
        out.newline();
        out.flush();
        return;
    }

    out.plain(": ");
    if summary.errors > 0 {
        out.error(&plural(summary.errors, "error"));
    }
    if summary.errors > 0 && summary.warnings > 0 {
        out.plain(", ");
    }
    if summary.warnings > 0 {
        out.warning(&plural(summary.warnings, "warning"));
    }
    out.plain(".");
    out.newline();
    out.flush();
}

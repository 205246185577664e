//! `flir validate`: run the four validation layers on one `.ir` file.

use std::fs;
use std::path::Path;

use anyhow::Context;
use flir_engine::pipeline::load_file;
use flir_engine::validate::LayerStatus;
use flir_engine::{ValidationReport, Validator};

use crate::output::StyledOutput;

pub fn run(input: &Path, golden: Option<&Path>) -> anyhow::Result<ValidationReport> {
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let golden = golden
        .map(|path| load_file(path).with_context(|| "failed to load golden tree".to_string()))
        .transpose()?;
    Ok(Validator::new().validate(&bytes, golden.as_ref()))
}

/// Returns `false` when any layer failed.
pub fn execute(
    input: &Path,
    golden: Option<&Path>,
    out: &mut StyledOutput,
) -> anyhow::Result<bool> {
    let report = run(input, golden)?;

    out.bold(&input.display().to_string());
    out.newline();
    for layer in &report.layers {
        match layer.status {
            LayerStatus::Passed => out.pass_badge(),
            LayerStatus::Failed => out.fail_badge(),
            LayerStatus::Skipped => out.skip_badge(),
        }
        out.plain(&format!(" {}", layer.layer));
        out.newline();
        for finding in &layer.findings {
            out.dim(&format!("    {}", finding));
            out.newline();
        }
    }
    out.flush();
    Ok(report.is_valid())
}

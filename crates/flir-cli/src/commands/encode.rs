//! `flir encode`: JSON IR to `.ir`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use flir_engine::pipeline::load_file;
use flir_engine::{write_file_ir, WriteOptions};

use crate::output::StyledOutput;

/// `input` with its extension replaced by `.ir`.
pub fn default_output(input: &Path) -> PathBuf {
    input.with_extension("ir")
}

pub fn execute(
    input: &Path,
    output: &Path,
    options: WriteOptions,
    out: &mut StyledOutput,
) -> anyhow::Result<()> {
    let file = load_file(input)?;
    let bytes = write_file_ir(&file, &options)
        .with_context(|| format!("failed to encode {}", input.display()))?;
    fs::write(output, &bytes).with_context(|| format!("failed to write {}", output.display()))?;

    out.success("Encoded ");
    out.plain(&format!(
        "{} -> {} ({} bytes",
        input.display(),
        output.display(),
        bytes.len()
    ));
    if !options.checksum {
        out.plain(", no checksum");
    }
    if !options.debug_info {
        out.plain(", no debug info");
    }
    out.plain(")");
    out.newline();
    Ok(())
}

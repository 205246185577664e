//! `flir decode`: `.ir` to pretty JSON.

use std::fs;
use std::path::Path;

use anyhow::Context;
use flir_engine::read_file_ir;

pub fn execute(input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let file = read_file_ir(&bytes).with_context(|| format!("failed to decode {}", input.display()))?;
    let json = serde_json::to_string_pretty(&file)?;

    match output {
        Some(path) => {
            fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => println!("{}", json),
    }
    Ok(())
}

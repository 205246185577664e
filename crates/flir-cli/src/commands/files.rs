//! Input discovery for batch commands.

use std::path::{Path, PathBuf};

use anyhow::Context;

fn is_input(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("ir") | Some("json")
    )
}

/// Collect `.ir` and `.json` files from `paths`, recursing into
/// directories. Explicitly named files are kept whatever their extension,
/// so the loader can report them. Output is sorted.
pub fn collect_inputs(paths: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path_str in paths {
        let path = Path::new(path_str);
        if path.is_dir() {
            collect_in_dir(path, &mut files)?;
        } else {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn collect_in_dir(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            // Hidden dirs and build output
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') || name == "build" || name == "target" {
                continue;
            }
            collect_in_dir(&path, files)?;
        } else if is_input(&path) {
            files.push(path);
        }
    }
    Ok(())
}

//! `flir stats`: section sizes, string table statistics and node counts.

use std::fs;
use std::path::Path;

use anyhow::Context;
use flir_engine::codec::{inspect, FileStats};

use super::Format;
use crate::output::StyledOutput;

pub fn execute(input: &Path, format: Format, out: &mut StyledOutput) -> anyhow::Result<()> {
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let stats = inspect(&bytes).with_context(|| format!("failed to decode {}", input.display()))?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        Format::Pretty => print_stats(&stats, out),
    }
    Ok(())
}

fn row(out: &mut StyledOutput, label: &str, value: impl std::fmt::Display) {
    out.dim(&format!("  {:<22}", label));
    out.plain(&value.to_string());
    out.newline();
}

fn print_stats(stats: &FileStats, out: &mut StyledOutput) {
    out.bold(&stats.file_path);
    out.newline();
    row(out, "format version", stats.version);
    row(out, "checksum", stats.checksum);
    row(out, "debug info", stats.debug_info);

    out.bold("bytes");
    out.newline();
    row(out, "total", stats.total_bytes);
    row(out, "string table", stats.string_table_bytes);
    row(out, "payload", stats.payload_bytes);

    let s = &stats.strings;
    out.bold("strings");
    out.newline();
    row(out, "references", s.seen);
    row(out, "stored", s.stored);
    row(out, "duplicates", s.duplicates);
    row(out, "dedup ratio", format!("{:.1}%", s.dedup_ratio * 100.0));
    row(out, "compression ratio", format!("{:.2}", s.compression_ratio));
    row(out, "longest", s.longest);

    let n = &stats.nodes;
    out.bold("nodes");
    out.newline();
    for (label, count) in [
        ("imports", n.imports),
        ("exports", n.exports),
        ("variables", n.variables),
        ("functions", n.functions),
        ("classes", n.classes),
        ("components", n.components),
        ("providers", n.providers),
        ("methods", n.methods),
        ("constructors", n.constructors),
        ("fields", n.fields),
        ("statements", n.statements),
        ("expressions", n.expressions),
        ("issues", n.issues),
    ] {
        row(out, label, count);
    }
    out.flush();
}

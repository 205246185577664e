//! Tests for the command implementations behind `flir`.

use std::fs;
use std::path::Path;

use flir_cli::commands::{analyze, decode, encode, files, validate, Format};
use flir_cli::config::{discover, FlirConfig, CONFIG_FILE};
use flir_cli::output::{resolve_color_choice, StyledOutput};
use flir_engine::ir::{FileDecl, FileBuilder};
use flir_engine::pipeline::{load_file, BatchSummary};
use flir_engine::validate::LayerStatus;
use flir_engine::{FlowAnalyzer, Pipeline, Severity, WriteOptions};
use tempfile::TempDir;

fn quiet() -> StyledOutput {
    StyledOutput::new(resolve_color_choice(Some("never")))
}

fn empty_file(path: &str) -> FileDecl {
    let mut b = FileBuilder::new(path);
    b.content_hash("e3b0c442").analyzed_at(1_700_000_000);
    b.build()
}

fn write_json(dir: &Path, name: &str, file: &FileDecl) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string(file).unwrap()).unwrap();
    path
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_defaults() {
    let config = FlirConfig::parse("").unwrap();
    assert_eq!(config, FlirConfig::default());
    assert_eq!(config.codec.write_options(), WriteOptions::default());
    assert!(config.codec.checksum);
    assert!(config.codec.debug_info);
}

#[test]
fn test_config_parses_sections() {
    let config = FlirConfig::parse(
        r#"
[analysis]
mutate_method = "update"
widget_types = ["Label"]

[analysis.severity]
MISSING_DISPOSE = "error"
WIDGETS_IN_LOOPS = "off"

[codec]
debug_info = false
"#,
    )
    .unwrap();

    assert_eq!(config.analysis.mutate_method, "update");
    assert!(config.analysis.is_widget_type("Label"));
    assert_eq!(
        config
            .analysis
            .effective_severity("MISSING_DISPOSE", Severity::Warning),
        Some(Severity::Error)
    );
    assert_eq!(
        config
            .analysis
            .effective_severity("WIDGETS_IN_LOOPS", Severity::Warning),
        None
    );
    assert!(config.codec.checksum);
    assert!(!config.codec.debug_info);
}

#[test]
fn test_config_rejects_unknown_rule() {
    let err = FlirConfig::parse("[analysis.severity]\nNO_SUCH_RULE = \"warning\"\n").unwrap_err();
    assert!(err.to_string().contains("NO_SUCH_RULE"));
}

#[test]
fn test_config_rejects_unknown_key() {
    assert!(FlirConfig::parse("[codec]\ncompress = true\n").is_err());
    assert!(FlirConfig::parse("[linter]\n").is_err());
}

#[test]
fn test_config_discover_walks_up() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("lib/src/widgets");
    fs::create_dir_all(&nested).unwrap();
    assert_eq!(discover(&nested), None);

    fs::write(dir.path().join(CONFIG_FILE), "[codec]\nchecksum = false\n").unwrap();
    let found = discover(&nested).unwrap();
    assert_eq!(found, dir.path().join(CONFIG_FILE));

    let config = FlirConfig::resolve(Some(&found)).unwrap();
    assert!(!config.codec.checksum);
}

#[test]
fn test_config_load_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "[analysis]\nmutate_method = \"\"\n").unwrap();
    let err = FlirConfig::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("mutate_method"));
    assert!(err.to_string().contains("flir.toml"));
}

// ============================================================================
// Input discovery
// ============================================================================

#[test]
fn test_collect_inputs_skips_hidden_and_build_dirs() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    for sub in ["lib", ".dart_tool", "build", "lib/widgets"] {
        fs::create_dir_all(root.join(sub)).unwrap();
    }
    fs::write(root.join("lib/a.ir"), b"").unwrap();
    fs::write(root.join("lib/widgets/b.json"), b"{}").unwrap();
    fs::write(root.join("lib/notes.txt"), b"").unwrap();
    fs::write(root.join(".dart_tool/c.ir"), b"").unwrap();
    fs::write(root.join("build/d.ir"), b"").unwrap();

    let found = files::collect_inputs(&[root.display().to_string()]).unwrap();
    assert_eq!(
        found,
        vec![root.join("lib/a.ir"), root.join("lib/widgets/b.json")]
    );
}

#[test]
fn test_collect_inputs_keeps_explicit_files() {
    let dir = TempDir::new().unwrap();
    let txt = dir.path().join("notes.txt");
    fs::write(&txt, b"").unwrap();
    let arg = txt.display().to_string();

    let found = files::collect_inputs(&[arg.clone(), arg]).unwrap();
    assert_eq!(found, vec![txt]);
}

// ============================================================================
// encode / decode
// ============================================================================

#[test]
fn test_encode_then_decode_file() {
    let dir = TempDir::new().unwrap();
    let file = empty_file("lib/empty.dart");
    let json = write_json(dir.path(), "empty.json", &file);

    let ir = encode::default_output(&json);
    assert_eq!(ir, dir.path().join("empty.ir"));
    encode::execute(&json, &ir, WriteOptions::default(), &mut quiet()).unwrap();
    assert_eq!(&fs::read(&ir).unwrap()[..4], b"FLIR");

    let decoded = dir.path().join("decoded.json");
    decode::execute(&ir, Some(&decoded)).unwrap();
    let back: FileDecl = serde_json::from_str(&fs::read_to_string(&decoded).unwrap()).unwrap();
    assert_eq!(back, file);
}

#[test]
fn test_encode_honours_options() {
    let dir = TempDir::new().unwrap();
    let json = write_json(dir.path(), "a.json", &empty_file("lib/a.dart"));
    let with = dir.path().join("with.ir");
    let without = dir.path().join("without.ir");

    encode::execute(&json, &with, WriteOptions::default(), &mut quiet()).unwrap();
    let options = WriteOptions {
        checksum: false,
        ..WriteOptions::default()
    };
    encode::execute(&json, &without, options, &mut quiet()).unwrap();

    let with = fs::read(with).unwrap();
    let without = fs::read(without).unwrap();
    assert_eq!(with.len(), without.len() + 32);
}

#[test]
fn test_decode_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.ir");
    fs::write(&path, b"not an ir file").unwrap();
    let err = decode::execute(&path, None).unwrap_err();
    assert!(err.to_string().contains("bad.ir"));
}

// ============================================================================
// analyze
// ============================================================================

#[test]
fn test_analyze_clean_inputs_succeed() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "a.json", &empty_file("lib/a.dart"));
    write_json(dir.path(), "b.json", &empty_file("lib/b.dart"));

    let ok = analyze::execute(
        &[dir.path().display().to_string()],
        Format::Pretty,
        &FlirConfig::default(),
        Some(2),
        &mut quiet(),
    )
    .unwrap();
    assert!(ok);
}

#[test]
fn test_analyze_fails_on_unreadable_input() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "a.json", &empty_file("lib/a.dart"));
    fs::write(dir.path().join("corrupt.ir"), b"FLIR\x01\x00").unwrap();

    let ok = analyze::execute(
        &[dir.path().display().to_string()],
        Format::Json,
        &FlirConfig::default(),
        Some(1),
        &mut quiet(),
    )
    .unwrap();
    assert!(!ok);
}

#[test]
fn test_analyze_without_inputs_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = analyze::execute(
        &[dir.path().display().to_string()],
        Format::Pretty,
        &FlirConfig::default(),
        None,
        &mut quiet(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("no .ir or .json files"));
}

#[test]
fn test_analyze_json_reports() {
    let dir = TempDir::new().unwrap();
    let good = write_json(dir.path(), "good.json", &empty_file("lib/good.dart"));
    let bad = dir.path().join("bad.ir");
    fs::write(&bad, b"nope").unwrap();

    let pipeline = Pipeline::new(FlowAnalyzer::default(), WriteOptions::default());
    let outcomes = pipeline.run_paths(&[good, bad]);
    let summary = BatchSummary::of(&outcomes);
    assert_eq!(summary.files, 2);
    assert_eq!(summary.failed, 1);

    let reports = analyze::reports(&outcomes);
    let value = serde_json::to_value(&reports).unwrap();
    assert!(value[0]["issues"].as_array().unwrap().is_empty());
    assert!(value[0].get("error").is_none());
    assert!(value[1]["error"].is_string());
    assert!(value[1]["health"].as_array().unwrap().is_empty());
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_encoded_file_with_golden() {
    let dir = TempDir::new().unwrap();
    let file = empty_file("lib/a.dart");
    let json = write_json(dir.path(), "a.json", &file);
    let ir = dir.path().join("a.ir");
    encode::execute(&json, &ir, WriteOptions::default(), &mut quiet()).unwrap();

    let report = validate::run(&ir, Some(&json)).unwrap();
    assert!(report.is_valid());
    assert!(report
        .layers
        .iter()
        .all(|layer| layer.status == LayerStatus::Passed));

    let mut changed = file.clone();
    changed.content_hash = "different".to_string();
    let golden = write_json(dir.path(), "golden.json", &changed);
    assert!(!validate::execute(&ir, Some(&golden), &mut quiet()).unwrap());
}

#[test]
fn test_validate_tampered_file_fails() {
    let dir = TempDir::new().unwrap();
    let json = write_json(dir.path(), "a.json", &empty_file("lib/a.dart"));
    let ir = dir.path().join("a.ir");
    encode::execute(&json, &ir, WriteOptions::default(), &mut quiet()).unwrap();

    let mut bytes = fs::read(&ir).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    fs::write(&ir, &bytes).unwrap();

    let report = validate::run(&ir, None).unwrap();
    assert!(!report.is_valid());
    assert_eq!(report.layers[0].status, LayerStatus::Failed);
    assert!(load_file(&ir).is_err());
}

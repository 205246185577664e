//! Batch driver: load, analyze and encode many files on a worker pool.
//!
//! Files are independent. A file that fails to load is reported in its own
//! [`FileOutcome`] and the rest of the batch continues.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;

use crate::analysis::{AnalyzedFile, FlowAnalyzer};
use crate::codec::{read_file_ir, write_file_ir, SerializationError, WriteOptions};
use crate::diagnostics::Severity;
use crate::ir::{ConstructionError, FileDecl};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: invalid JSON IR: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: SerializationError,
    },

    #[error("{}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: ConstructionError,
    },

    #[error("{}: expected a .ir or .json file", path.display())]
    UnsupportedInput { path: PathBuf },

    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Load a file's IR: `.ir` files are decoded, `.json` files are parsed and
/// re-checked against the construction invariants.
pub fn load_file(path: &Path) -> Result<FileDecl, PipelineError> {
    let bytes = fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("ir") => read_file_ir(&bytes).map_err(|source| PipelineError::Decode {
            path: path.to_path_buf(),
            source,
        }),
        Some("json") => {
            let file: FileDecl =
                serde_json::from_slice(&bytes).map_err(|source| PipelineError::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
            file.check_invariants()
                .map_err(|source| PipelineError::Invalid {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(file)
        }
        _ => Err(PipelineError::UnsupportedInput {
            path: path.to_path_buf(),
        }),
    }
}

/// Result for one input of a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<AnalyzedFile, PipelineError>,
}

/// Totals over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl BatchSummary {
    pub fn of(outcomes: &[FileOutcome]) -> Self {
        let mut summary = Self {
            files: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match &outcome.result {
                Ok(analyzed) => {
                    summary.errors += analyzed.count(Severity::Error);
                    summary.warnings += analyzed.count(Severity::Warning);
                }
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Any file failed to load or reported an error.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.errors > 0
    }
}

pub struct Pipeline {
    analyzer: FlowAnalyzer,
    options: WriteOptions,
    /// Dedicated pool; the global rayon pool when `None`.
    pool: Option<rayon::ThreadPool>,
}

impl Pipeline {
    pub fn new(analyzer: FlowAnalyzer, options: WriteOptions) -> Self {
        Self {
            analyzer,
            options,
            pool: None,
        }
    }

    /// Run batches on a pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Result<Self, PipelineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("flir-worker-{}", i))
            .build()?;
        self.pool = Some(pool);
        Ok(self)
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Analyze already-loaded files. Output order matches input order.
    pub fn analyze(&self, files: Vec<FileDecl>) -> Vec<AnalyzedFile> {
        self.install(|| {
            files
                .into_par_iter()
                .map(|file| self.analyzer.analyze_file(file))
                .collect()
        })
    }

    /// Encode files with the pipeline's write options.
    pub fn encode(&self, files: &[FileDecl]) -> Vec<Result<Vec<u8>, SerializationError>> {
        self.install(|| {
            files
                .par_iter()
                .map(|file| write_file_ir(file, &self.options))
                .collect()
        })
    }

    /// Load and analyze every path.
    pub fn run_paths(&self, paths: &[PathBuf]) -> Vec<FileOutcome> {
        let outcomes: Vec<FileOutcome> = self.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let result = load_file(path).map(|file| self.analyzer.analyze_file(file));
                    if let Err(e) = &result {
                        tracing::warn!(path = %path.display(), error = %e, "skipping file");
                    }
                    FileOutcome {
                        path: path.clone(),
                        result,
                    }
                })
                .collect()
        });
        tracing::debug!(files = outcomes.len(), "batch finished");
        outcomes
    }
}

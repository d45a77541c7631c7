//! Data types shared across the pipeline.
//!
//! - [`ErrorMode`] / [`ErrorPolicy`] - what happens when a row fails
//! - [`RowFailure`] - one rejected row, as logged and reported
//! - [`RunStatus`] - how the run ended
//! - [`ConversionReport`] - summary of a whole run, serializable to JSON

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transliterate::Schema;

// =============================================================================
// Error policy
// =============================================================================

/// How a transliteration failure is handled. Fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Ask the operator whether to continue.
    #[default]
    Interactive,
    /// Log and continue with an empty result.
    Skip,
}

/// Error mode plus the orthogonal debug flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorPolicy {
    pub mode: ErrorMode,
    /// Isolate the offending token and log a row excerpt.
    #[serde(default)]
    pub debug: bool,
}

impl ErrorPolicy {
    pub fn new(mode: ErrorMode, debug: bool) -> Self {
        Self { mode, debug }
    }

    pub fn skip() -> Self {
        Self::new(ErrorMode::Skip, false)
    }

    pub fn interactive() -> Self {
        Self::new(ErrorMode::Interactive, false)
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

// =============================================================================
// Row failures
// =============================================================================

/// A row whose source field was rejected by the transliterator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    /// Physical line number, header = 1
    pub line: usize,
    /// First three fields joined by the delimiter
    pub location: String,
    /// Transliterator error message
    pub message: String,
    /// First token that fails on its own (debug only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offending_token: Option<String>,
    /// Truncated raw line (debug only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

// =============================================================================
// Run report
// =============================================================================

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every row transliterated (or had an empty source field).
    Completed,
    /// Input exhausted, some rows written with an empty result.
    CompletedWithErrors,
    /// The operator declined to continue after the failure on `line`.
    Aborted { line: usize },
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, RunStatus::Aborted { .. })
    }
}

/// Summary of a conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub schema: Schema,
    pub started_at: String,
    pub finished_at: String,
    /// Data rows written (header excluded)
    pub rows_written: usize,
    pub blank_lines: usize,
    /// Lines that were not valid UTF-8 and were decoded lossily
    pub lossy_lines: Vec<usize>,
    pub failures: Vec<RowFailure>,
    pub status: RunStatus,
}

impl ConversionReport {
    pub fn new(schema: Schema) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            input: None,
            output: None,
            schema,
            started_at: now.clone(),
            finished_at: now,
            rows_written: 0,
            blank_lines: 0,
            lossy_lines: Vec::new(),
            failures: Vec::new(),
            status: RunStatus::Completed,
        }
    }

    /// Stamp the end time and derive the status from the failures seen.
    pub fn finish(&mut self, aborted_at: Option<usize>) {
        self.finished_at = chrono::Utc::now().to_rfc3339();
        self.status = match aborted_at {
            Some(line) => RunStatus::Aborted { line },
            None if self.failures.is_empty() => RunStatus::Completed,
            None => RunStatus::CompletedWithErrors,
        };
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        format!(
            "{} rows written, {} failed, {} blank lines skipped",
            self.rows_written,
            self.failures.len(),
            self.blank_lines
        )
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

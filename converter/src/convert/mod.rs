//! Row conversion.
//!
//! - `checkpoint`: the continue/abort decision point
//! - `pipeline`: file and stream drivers, options
//!
//! [`RowConverter`] owns everything that lives for a run: the header index,
//! the error policy, the transliterator, the checkpoint and the diagnostics
//! channel. It turns one raw line at a time into an output row.
//!
//! ```text
//! raw line → strip BOM → split → pad → transliterate source field → append
//!                                            │ failure
//!                                            ▼
//!                         log diagnostic → policy (skip / ask) → empty result or abort
//! ```

pub mod checkpoint;
pub mod pipeline;

pub use checkpoint::{AlwaysAbort, AlwaysContinue, Checkpoint, ConsolePrompt, Decision};
pub use pipeline::{convert, convert_file, read_header, ConvertOptions};

use std::io::Write;

use crate::error::{ConvertResult, ParseResult, TransliterationError};
use crate::logs::LogEntry;
use crate::models::{ErrorMode, ErrorPolicy, RowFailure};
use crate::parser::{
    excerpt, location, split_fields, strip_bom, trim_line_ending, validate_delimiter, HeaderIndex,
};
use crate::transliterate::{first_failing, tokenize, Schema, Transliterator};

/// Result of converting one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Output fields, result appended
    Row(Vec<String>),
    /// Whitespace-only line, nothing to write
    Blank,
    /// The operator declined to continue
    Abort,
}

/// A line after transliteration, before the error policy is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowStep {
    Blank,
    Done(Vec<String>),
    /// Padded input fields (no result yet) and the logged failure
    Failed(Vec<String>, RowFailure),
}

pub struct RowConverter<T, C, E> {
    header: HeaderIndex,
    delimiter: char,
    target_column: String,
    schema: Schema,
    policy: ErrorPolicy,
    excerpt_chars: usize,
    transliterator: T,
    checkpoint: C,
    diagnostics: E,
    failures: Vec<RowFailure>,
}

impl<T, C, E> RowConverter<T, C, E>
where
    T: Transliterator,
    C: Checkpoint,
    E: Write,
{
    /// Parse the header line and set up a converter for the run.
    ///
    /// Fails if the delimiter is unusable or the source column is missing.
    pub fn initialize(
        header_line: &str,
        options: &ConvertOptions,
        transliterator: T,
        checkpoint: C,
        diagnostics: E,
    ) -> ParseResult<Self> {
        validate_delimiter(options.delimiter)?;
        let header = HeaderIndex::parse(header_line, options.delimiter, &options.source_column)?;

        Ok(Self {
            header,
            delimiter: options.delimiter,
            target_column: options.target_column.clone(),
            schema: options.schema,
            policy: options.policy,
            excerpt_chars: options.excerpt_chars,
            transliterator,
            checkpoint,
            diagnostics,
            failures: Vec::new(),
        })
    }

    pub fn header(&self) -> &HeaderIndex {
        &self.header
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Input header plus the result column.
    pub fn output_header(&self) -> Vec<String> {
        self.header.output_columns(&self.target_column)
    }

    /// Failures seen so far, in input order
    pub fn failures(&self) -> &[RowFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<RowFailure> {
        self.failures
    }

    /// Convert one raw line, applying the error policy on failure.
    ///
    /// `line_number` is the physical line (header = 1) and only feeds
    /// diagnostics.
    pub fn convert_row(&mut self, raw_line: &str, line_number: usize) -> ConvertResult<RowOutcome> {
        match self.transliterate_row(raw_line, line_number)? {
            RowStep::Blank => Ok(RowOutcome::Blank),
            RowStep::Done(fields) => Ok(RowOutcome::Row(fields)),
            RowStep::Failed(fields, failure) => Ok(match self.resolve(fields, failure) {
                Some(fields) => RowOutcome::Row(fields),
                None => RowOutcome::Abort,
            }),
        }
    }

    /// First half of [`Self::convert_row`]: parse and transliterate.
    ///
    /// Failures are logged to the diagnostics channel before returning.
    pub fn transliterate_row(&mut self, raw_line: &str, line_number: usize) -> ConvertResult<RowStep> {
        let line = trim_line_ending(strip_bom(raw_line));
        if line.trim().is_empty() {
            return Ok(RowStep::Blank);
        }

        let mut fields = split_fields(line, self.delimiter);
        self.header.pad(&mut fields);

        let source = &fields[self.header.source_index()];
        if source.is_empty() {
            fields.push(String::new());
            return Ok(RowStep::Done(fields));
        }

        match self.transliterator.transliterate(source, self.schema) {
            Ok(result) => {
                fields.push(result);
                Ok(RowStep::Done(fields))
            }
            Err(err) => {
                let failure = self.describe_failure(line, &fields, line_number, &err);
                self.log_failure(&failure)?;
                Ok(RowStep::Failed(fields, failure))
            }
        }
    }

    /// Second half of [`Self::convert_row`]: apply the error policy.
    ///
    /// Returns the row to write (empty result appended), or `None` when the
    /// checkpoint says to stop.
    pub fn resolve(&mut self, mut fields: Vec<String>, failure: RowFailure) -> Option<Vec<String>> {
        let decision = match self.policy.mode {
            ErrorMode::Skip => Decision::Continue,
            ErrorMode::Interactive => self.checkpoint.confirm_continue(&failure),
        };
        self.failures.push(failure);

        match decision {
            Decision::Continue => {
                fields.push(String::new());
                Some(fields)
            }
            Decision::Abort => None,
        }
    }

    /// Write one entry to the diagnostics channel.
    pub fn log(&mut self, entry: LogEntry) -> std::io::Result<()> {
        writeln!(self.diagnostics, "{}", entry.render())
    }

    fn describe_failure(
        &self,
        line: &str,
        fields: &[String],
        line_number: usize,
        err: &TransliterationError,
    ) -> RowFailure {
        let (offending_token, excerpt) = if self.policy.debug {
            let source = &fields[self.header.source_index()];
            let token = first_failing(tokenize(source), |t| {
                self.transliterator.transliterate(t, self.schema)
            })
            .map(|(token, _)| token.to_string());
            (token, Some(excerpt(line, self.excerpt_chars)))
        } else {
            (None, None)
        };

        RowFailure {
            line: line_number,
            location: location(fields, self.delimiter),
            message: err.to_string(),
            offending_token,
            excerpt,
        }
    }

    fn log_failure(&mut self, failure: &RowFailure) -> std::io::Result<()> {
        self.log(LogEntry::error(format!(
            "line {} [{}]: {}",
            failure.line, failure.location, failure.message
        )))?;

        if self.policy.debug {
            let token = match &failure.offending_token {
                Some(token) => LogEntry::warning(format!("offending token: {}", token)),
                None => LogEntry::warning("offending token: none (no single token fails alone)"),
            };
            self.log(token.with_indent(1))?;
            if let Some(excerpt) = &failure.excerpt {
                self.log(LogEntry::info(format!("row: {}", excerpt)).with_indent(1))?;
            }
        }

        self.diagnostics.flush()
    }
}

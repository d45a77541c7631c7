//! Error types for the conversion pipeline.
//!
//! - [`TransliterationError`] - the transliterator rejected a piece of text
//! - [`ParseError`] - the input cannot be used at all (empty, bad header)
//! - [`ConvertError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Transliteration Errors
// =============================================================================

/// Invalid-input conditions raised by a [`crate::Transliterator`].
///
/// These are per-row and recoverable: the converter applies its error policy
/// instead of stopping the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransliterationError {
    /// A character outside the supported repertoire.
    #[error("unsupported character '{ch}' (U+{code:04X}) in \"{word}\"")]
    UnsupportedCharacter { ch: char, code: u32, word: String },

    /// A Hebrew word without any vowel pointing.
    #[error("unvocalized word \"{0}\"")]
    Unvocalized(String),

    /// A point or dagesh with no consonant to attach to.
    #[error("mark U+{code:04X} has no consonant to attach to in \"{word}\"")]
    DanglingMark { code: u32, word: String },
}

impl TransliterationError {
    pub fn unsupported(ch: char, word: impl Into<String>) -> Self {
        Self::UnsupportedCharacter {
            ch,
            code: ch as u32,
            word: word.into(),
        }
    }
}

// =============================================================================
// Parse Errors
// =============================================================================

/// Fatal problems with the input layout.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No header line at all.
    #[error("input is empty, expected a header line")]
    EmptyInput,

    /// The delimiter cannot be written safely.
    #[error("delimiter {0:?} must be a single ASCII character other than '\"' or a line break")]
    InvalidDelimiter(char),

    /// The header does not name the source column.
    #[error("header has no '{column}' column (found: {})", .header.join(", "))]
    MissingColumn { column: String, header: Vec<String> },
}

// =============================================================================
// Conversion Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::convert_file`] and [`crate::convert`].
///
/// Operator abort is not an error: it is reported through
/// [`crate::RunStatus::Aborted`].
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input path does not exist.
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Header or layout error.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// Reading or writing failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a delimited record failed.
    #[error("write error: {0}")]
    Csv(#[from] csv::Error),

    /// Serializing the run report failed.
    #[error("report error: {0}")]
    Report(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transliteration calls.
pub type TransliterationResult<T> = Result<T, TransliterationError>;

/// Result type for header parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for pipeline operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

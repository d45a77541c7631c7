//! # tiberian-csv - Tiberian transliteration for a vocalized Hebrew corpus
//!
//! Reads a pipe-delimited corpus with a `vocalized` column and writes the same
//! rows with a `tiberian` transliteration column appended.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────────┐     ┌─────────────┐
//! │  Input file │────▶│   Parser    │────▶│  RowConverter   │────▶│ Output file │
//! │ (BOM, CRLF) │     │  (quoting)  │     │ (transliterate) │     │  (+column)  │
//! └─────────────┘     └─────────────┘     └────────┬────────┘     └─────────────┘
//!                                                  │ failure
//!                                                  ▼
//!                                          skip / ask operator
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tiberian_csv::{convert_file, AlwaysContinue, ConvertOptions, TiberianTransliterator};
//!
//! let report = convert_file(
//!     &ConvertOptions::default(),
//!     TiberianTransliterator::new(),
//!     AlwaysContinue,
//!     std::io::stderr(),
//! )?;
//! println!("{}", report.summary());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`logs`] - Leveled log lines on stderr
//! - [`models`] - Error policy, row failures, run report
//! - [`parser`] - Field splitting, header index, row writer
//! - [`transliterate`] - Transliterator trait and the Tiberian rules
//! - [`convert`] - Row converter, checkpoint and pipeline

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Transliteration
pub mod transliterate;

// Conversion
pub mod convert;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConvertError, ConvertResult, ParseError, ParseResult, TransliterationError,
    TransliterationResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{ConversionReport, ErrorMode, ErrorPolicy, RowFailure, RunStatus};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{split_fields, HeaderIndex, RowWriter};

// =============================================================================
// Re-exports - Transliteration
// =============================================================================

pub use transliterate::{first_failing, tokenize, Schema, TiberianTransliterator, Transliterator};

// =============================================================================
// Re-exports - Conversion
// =============================================================================

pub use convert::{
    convert, convert_file, read_header, AlwaysAbort, AlwaysContinue, Checkpoint, ConsolePrompt,
    ConvertOptions, Decision, RowConverter, RowOutcome,
};

//! Transliteration capability used by the row converter.
//!
//! The converter only sees the [`Transliterator`] trait: text in, text out,
//! or a [`TransliterationError`] when the input is outside the supported
//! repertoire. [`TiberianTransliterator`] is the built-in implementation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tiberian_csv::{Schema, TiberianTransliterator, Transliterator};
//!
//! let t = TiberianTransliterator::new();
//! assert_eq!(t.transliterate("בְּרֵאשִׁ֖ית", Schema::Tiberian)?, "bərēšīθ");
//! ```

pub mod isolate;
pub mod tiberian;

pub use isolate::{first_failing, tokenize};
pub use tiberian::TiberianTransliterator;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TransliterationResult;

/// Transliteration convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    /// Phonological rendering of the Tiberian reading tradition
    #[default]
    Tiberian,
}

impl Schema {
    pub fn name(&self) -> &'static str {
        match self {
            Schema::Tiberian => "tiberian",
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Turns vocalized text into a transliteration.
pub trait Transliterator {
    fn transliterate(&self, text: &str, schema: Schema) -> TransliterationResult<String>;
}

impl<T: Transliterator + ?Sized> Transliterator for &T {
    fn transliterate(&self, text: &str, schema: Schema) -> TransliterationResult<String> {
        (**self).transliterate(text, schema)
    }
}

impl<T: Transliterator + ?Sized> Transliterator for Box<T> {
    fn transliterate(&self, text: &str, schema: Schema) -> TransliterationResult<String> {
        (**self).transliterate(text, schema)
    }
}

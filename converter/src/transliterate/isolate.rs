//! Offending-token isolation for debug diagnostics.
//!
//! When a whole field fails, each token is probed alone and the first one
//! that fails is reported. If every token passes alone, the failure comes
//! from their combination and nothing is reported.

use once_cell::sync::Lazy;
use regex::Regex;

/// Whitespace, ASCII hyphen, maqaf (U+05BE) and the dashes U+2010..=U+2015.
static SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\s\-\x{05BE}\x{2010}-\x{2015}]+").expect("separator pattern is valid")
});

/// Split a field into tokens, dropping separator runs and empty pieces.
pub fn tokenize(field: &str) -> Vec<&str> {
    SEPARATORS
        .split(field)
        .filter(|token| !token.is_empty())
        .collect()
}

/// First token for which `probe` fails, with the error it produced.
///
/// Tokens are probed left to right and probing stops at the first failure.
pub fn first_failing<'a, I, F, T, E>(tokens: I, mut probe: F) -> Option<(&'a str, E)>
where
    I: IntoIterator<Item = &'a str>,
    F: FnMut(&str) -> Result<T, E>,
{
    tokens
        .into_iter()
        .find_map(|token| probe(token).err().map(|e| (token, e)))
}

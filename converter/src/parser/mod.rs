//! Line-level parsing of the delimited corpus.
//!
//! This is not a CSV engine: one record per physical line, a single
//! delimiter, and one quoting rule. A field that starts with `"` runs to
//! the next lone `"`, with `""` standing for a literal quote. Quotes
//! anywhere else are ordinary characters.

pub mod writer;

pub use writer::RowWriter;

use crate::error::{ParseError, ParseResult};

/// Byte-order mark, stripped wherever it leads a line.
pub const BOM: char = '\u{FEFF}';

/// Quote character used by the escaping rule.
pub const QUOTE: char = '"';

/// Default field delimiter
pub const DEFAULT_DELIMITER: char = '|';

/// Marker appended to truncated excerpts.
pub const ELLIPSIS: &str = "…";

/// Remove a leading byte-order mark, if any.
pub fn strip_bom(line: &str) -> &str {
    line.strip_prefix(BOM).unwrap_or(line)
}

/// Remove a trailing `\n` or `\r\n`.
pub fn trim_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Check that a delimiter can round-trip through [`RowWriter`].
pub fn validate_delimiter(delimiter: char) -> ParseResult<()> {
    if !delimiter.is_ascii() || delimiter == QUOTE || delimiter == '\n' || delimiter == '\r' {
        return Err(ParseError::InvalidDelimiter(delimiter));
    }
    Ok(())
}

/// Split one line into fields, undoing the quoting rule.
///
/// An unterminated quoted field takes the rest of the line.
///
/// # Example
/// ```ignore
/// let fields = split_fields(r#"Gen|"a|b"|"say ""hi""""#, '|');
/// assert_eq!(fields, vec!["Gen", "a|b", r#"say "hi""#]);
/// ```
pub fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    current.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == delimiter {
            fields.push(std::mem::take(&mut current));
            at_field_start = true;
            continue;
        } else if c == QUOTE && at_field_start {
            in_quotes = true;
        } else {
            current.push(c);
        }
        at_field_start = false;
    }

    fields.push(current);
    fields
}

/// First three fields joined by the delimiter, used to locate a row in logs.
pub fn location(fields: &[String], delimiter: char) -> String {
    let end = fields.len().min(3);
    fields[..end].join(&delimiter.to_string())
}

/// First `max_chars` characters of `text`, with [`ELLIPSIS`] if cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Parsed header with the position of the source column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderIndex {
    columns: Vec<String>,
    source: usize,
}

impl HeaderIndex {
    /// Parse a header line and locate `column` (exact, case-sensitive match).
    pub fn parse(line: &str, delimiter: char, column: &str) -> ParseResult<Self> {
        let line = trim_line_ending(strip_bom(line));
        let columns = split_fields(line, delimiter);

        let source = columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| ParseError::MissingColumn {
                column: column.to_string(),
                header: columns.clone(),
            })?;

        Ok(Self { columns, source })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of declared columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Index of the source column
    pub fn source_index(&self) -> usize {
        self.source
    }

    pub fn source_name(&self) -> &str {
        &self.columns[self.source]
    }

    /// Header columns with the result column appended.
    pub fn output_columns(&self, target: &str) -> Vec<String> {
        let mut columns = self.columns.clone();
        columns.push(target.to_string());
        columns
    }

    /// Right-pad `fields` with empty strings up to the header width.
    ///
    /// Longer rows are left as they are.
    pub fn pad(&self, fields: &mut Vec<String>) {
        if fields.len() < self.columns.len() {
            fields.resize(self.columns.len(), String::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_split() {
        assert_eq!(split_fields("Gen|1|1|text", '|'), vec!["Gen", "1", "1", "text"]);
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(split_fields("a||c|", '|'), vec!["a", "", "c", ""]);
        assert_eq!(split_fields("", '|'), vec![""]);
    }

    #[test]
    fn test_quoted_field_with_delimiter() {
        assert_eq!(split_fields(r#"Gen|"a|b"|c"#, '|'), vec!["Gen", "a|b", "c"]);
    }

    #[test]
    fn test_doubled_quotes() {
        assert_eq!(
            split_fields(r#""say ""hi"""|x"#, '|'),
            vec![r#"say "hi""#, "x"]
        );
    }

    #[test]
    fn test_quote_inside_field_is_literal() {
        // Hebrew abbreviations are often typed with an ASCII quote
        assert_eq!(split_fields(r#"תנ"ך|x"#, '|'), vec![r#"תנ"ך"#, "x"]);
    }

    #[test]
    fn test_unterminated_quote_takes_rest_of_line() {
        assert_eq!(split_fields(r#"a|"b|c"#, '|'), vec!["a", "b|c"]);
    }

    #[test]
    fn test_strip_bom_and_line_ending() {
        assert_eq!(strip_bom("\u{FEFF}book|verse"), "book|verse");
        assert_eq!(strip_bom("book"), "book");
        assert_eq!(trim_line_ending("a|b\r\n"), "a|b");
        assert_eq!(trim_line_ending("a|b\n"), "a|b");
        assert_eq!(trim_line_ending("a|b"), "a|b");
    }

    #[test]
    fn test_header_index() {
        let header = HeaderIndex::parse("\u{FEFF}book|chapter|verse|vocalized\n", '|', "vocalized").unwrap();
        assert_eq!(header.len(), 4);
        assert_eq!(header.source_index(), 3);
        assert_eq!(header.source_name(), "vocalized");
        assert_eq!(
            header.output_columns("tiberian"),
            vec!["book", "chapter", "verse", "vocalized", "tiberian"]
        );
    }

    #[test]
    fn test_header_missing_column_is_exact() {
        for line in ["book|Vocalized", "book| vocalized", "book|text"] {
            let err = HeaderIndex::parse(line, '|', "vocalized").unwrap_err();
            assert!(matches!(err, ParseError::MissingColumn { .. }), "{}", line);
        }
    }

    #[test]
    fn test_pad_never_truncates() {
        let header = HeaderIndex::parse("a|b|vocalized", '|', "vocalized").unwrap();

        let mut short = vec!["1".to_string()];
        header.pad(&mut short);
        assert_eq!(short, vec!["1", "", ""]);

        let mut long = split_fields("1|2|3|4", '|');
        header.pad(&mut long);
        assert_eq!(long.len(), 4);
    }

    #[test]
    fn test_location() {
        let fields = split_fields("Gen|1|2|text", '|');
        assert_eq!(location(&fields, '|'), "Gen|1|2");
        assert_eq!(location(&["only".to_string()], '|'), "only");
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("short", 200), "short");
        let long = "א".repeat(250);
        let cut = excerpt(&long, 200);
        assert_eq!(cut.chars().count(), 201);
        assert!(cut.ends_with(ELLIPSIS));
        assert_eq!(excerpt(&"x".repeat(200), 200), "x".repeat(200));
    }

    #[test]
    fn test_validate_delimiter() {
        assert!(validate_delimiter('|').is_ok());
        assert!(validate_delimiter('\t').is_ok());
        assert!(validate_delimiter('"').is_err());
        assert!(validate_delimiter('\n').is_err());
        assert!(validate_delimiter('־').is_err());
    }
}

//! File and stream drivers for a conversion run.
//!
//! # Example
//!
//! ```rust,ignore
//! use tiberian_csv::{convert_file, ConsolePrompt, ConvertOptions, TiberianTransliterator};
//!
//! let report = convert_file(
//!     &ConvertOptions::default(),
//!     TiberianTransliterator::new(),
//!     ConsolePrompt::stdio(),
//!     std::io::stderr(),
//! )?;
//! println!("{}", report.summary());
//! ```

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use super::{Checkpoint, RowConverter, RowStep};
use crate::error::{ConvertError, ConvertResult, ParseError};
use crate::logs::LogEntry;
use crate::models::{ConversionReport, ErrorMode, ErrorPolicy};
use crate::parser::{RowWriter, DEFAULT_DELIMITER};
use crate::transliterate::{Schema, Transliterator};

pub const DEFAULT_INPUT: &str = "heb_corpus.csv";
pub const DEFAULT_OUTPUT: &str = "heb_corpus_tiberian.csv";
pub const DEFAULT_SOURCE_COLUMN: &str = "vocalized";
pub const DEFAULT_TARGET_COLUMN: &str = "tiberian";

/// Maximum characters of a row shown in debug diagnostics
pub const DEFAULT_EXCERPT_CHARS: usize = 200;

/// Options for a conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,

    /// Column holding the vocalized text
    pub source_column: String,

    /// Name of the appended result column
    pub target_column: String,

    pub delimiter: char,
    pub policy: ErrorPolicy,

    /// Row excerpt length in debug mode
    pub excerpt_chars: usize,

    /// Where to write the JSON run report, if anywhere
    pub report: Option<PathBuf>,

    pub schema: Schema,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            source_column: DEFAULT_SOURCE_COLUMN.to_string(),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            delimiter: DEFAULT_DELIMITER,
            policy: ErrorPolicy::default(),
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            report: None,
            schema: Schema::default(),
        }
    }
}

/// One physical line as read from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// Line text, line ending included
    pub text: String,
    /// The bytes were not valid UTF-8 and were decoded lossily
    pub lossy: bool,
}

/// Read the next physical line, or `None` at end of input.
pub fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<RawLine>> {
    let mut bytes = Vec::new();
    if input.read_until(b'\n', &mut bytes)? == 0 {
        return Ok(None);
    }

    let line = match String::from_utf8(bytes) {
        Ok(text) => RawLine { text, lossy: false },
        Err(err) => RawLine {
            text: String::from_utf8_lossy(err.as_bytes()).into_owned(),
            lossy: true,
        },
    };
    Ok(Some(line))
}

/// Read the header line. An input with no lines at all is an error.
pub fn read_header<R: BufRead>(input: &mut R) -> ConvertResult<RawLine> {
    read_line(input)?.ok_or(ConvertError::Parse(ParseError::EmptyInput))
}

/// Convert an in-memory stream.
///
/// Writes the output header, then one row per non-blank input line. Returns
/// the run report; an operator abort shows up as [`crate::RunStatus::Aborted`].
pub fn convert<R, W, T, C, E>(
    mut input: R,
    output: W,
    options: &ConvertOptions,
    transliterator: T,
    checkpoint: C,
    diagnostics: E,
) -> ConvertResult<ConversionReport>
where
    R: BufRead,
    W: Write,
    T: Transliterator,
    C: Checkpoint,
    E: Write,
{
    let mut report = ConversionReport::new(options.schema);
    let header = read_header(&mut input)?;
    let converter =
        RowConverter::initialize(&header.text, options, transliterator, checkpoint, diagnostics)?;

    stream_rows(input, header.lossy, converter, output, &mut report)?;
    Ok(report)
}

/// Convert `options.input` into `options.output`.
///
/// The output file is only created once the header has been validated, so
/// a missing input or column leaves no file behind.
pub fn convert_file<T, C, E>(
    options: &ConvertOptions,
    transliterator: T,
    checkpoint: C,
    diagnostics: E,
) -> ConvertResult<ConversionReport>
where
    T: Transliterator,
    C: Checkpoint,
    E: Write,
{
    if !options.input.is_file() {
        return Err(ConvertError::InputNotFound(options.input.clone()));
    }

    let mut report = ConversionReport::new(options.schema);
    report.input = Some(options.input.clone());
    report.output = Some(options.output.clone());

    let mut input = BufReader::new(File::open(&options.input)?);
    let header = read_header(&mut input)?;
    let converter =
        RowConverter::initialize(&header.text, options, transliterator, checkpoint, diagnostics)?;

    let output = BufWriter::new(File::create(&options.output)?);
    stream_rows(input, header.lossy, converter, output, &mut report)?;

    if let Some(path) = &options.report {
        fs::write(path, report.to_json()?)?;
    }
    Ok(report)
}

/// Main loop shared by [`convert`] and [`convert_file`].
fn stream_rows<R, W, T, C, E>(
    mut input: R,
    header_lossy: bool,
    mut converter: RowConverter<T, C, E>,
    output: W,
    report: &mut ConversionReport,
) -> ConvertResult<()>
where
    R: BufRead,
    W: Write,
    T: Transliterator,
    C: Checkpoint,
    E: Write,
{
    let mut writer = RowWriter::new(output, converter.delimiter());
    writer.write_header(&converter.output_header())?;

    if header_lossy {
        note_lossy(&mut converter, report, 1)?;
    }

    // header is line 1
    let mut line_number = 1;
    let mut aborted_at = None;

    while let Some(line) = read_line(&mut input)? {
        line_number += 1;
        if line.lossy {
            note_lossy(&mut converter, report, line_number)?;
        }

        match converter.transliterate_row(&line.text, line_number)? {
            RowStep::Blank => report.blank_lines += 1,
            RowStep::Done(fields) => writer.write_row(&fields)?,
            RowStep::Failed(fields, failure) => {
                // rows before the question must already be on disk
                if converter.policy().mode == ErrorMode::Interactive {
                    writer.flush()?;
                }
                match converter.resolve(fields, failure) {
                    Some(fields) => writer.write_row(&fields)?,
                    None => {
                        aborted_at = Some(line_number);
                        break;
                    }
                }
            }
        }
    }

    report.rows_written = writer.rows_written();
    let mut output = writer.finish()?;
    output.flush()?;

    report.failures = converter.into_failures();
    report.finish(aborted_at);
    Ok(())
}

fn note_lossy<T, C, E>(
    converter: &mut RowConverter<T, C, E>,
    report: &mut ConversionReport,
    line_number: usize,
) -> io::Result<()>
where
    T: Transliterator,
    C: Checkpoint,
    E: Write,
{
    report.lossy_lines.push(line_number);
    converter.log(LogEntry::warning(format!(
        "line {}: invalid UTF-8 replaced with U+FFFD",
        line_number
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{AlwaysAbort, AlwaysContinue, ConsolePrompt};
    use crate::error::{TransliterationError, TransliterationResult};
    use crate::models::RunStatus;
    use crate::transliterate::TiberianTransliterator;
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Upper-cases its input and rejects anything containing "BAD".
    struct FakeTransliterator;

    impl Transliterator for FakeTransliterator {
        fn transliterate(&self, text: &str, _schema: Schema) -> TransliterationResult<String> {
            if text.contains("BAD") {
                return Err(TransliterationError::Unvocalized(text.to_string()));
            }
            Ok(text.to_uppercase())
        }
    }

    fn run<C: Checkpoint>(
        input: &str,
        policy: ErrorPolicy,
        checkpoint: C,
    ) -> (String, String, ConversionReport) {
        let options = ConvertOptions {
            policy,
            ..ConvertOptions::default()
        };
        let mut output = Vec::new();
        let mut diagnostics = Vec::new();
        let report = convert(
            Cursor::new(input),
            &mut output,
            &options,
            FakeTransliterator,
            checkpoint,
            &mut diagnostics,
        )
        .unwrap();
        (
            String::from_utf8(output).unwrap(),
            String::from_utf8(diagnostics).unwrap(),
            report,
        )
    }

    #[test]
    fn test_header_only_input() {
        let (out, _, report) = run("book|vocalized\r\n", ErrorPolicy::skip(), AlwaysAbort);
        assert_eq!(out, "book|vocalized|tiberian\n");
        assert_eq!(report.rows_written, 0);
        assert_eq!(report.status, RunStatus::Completed);
    }

    #[test]
    fn test_empty_input_is_error() {
        let result = convert(
            Cursor::new(""),
            std::io::sink(),
            &ConvertOptions::default(),
            FakeTransliterator,
            AlwaysAbort,
            std::io::sink(),
        );
        assert!(matches!(result, Err(ConvertError::Parse(ParseError::EmptyInput))));
    }

    #[test]
    fn test_rows_in_order_with_blank_lines_counted() {
        let input = "book|ch|v|vocalized\nGen|1|1|a\n\n   \nGen|1|2|BAD\nGen|1|3|c";
        let (out, diag, report) = run(input, ErrorPolicy::skip(), AlwaysAbort);

        assert_eq!(
            out,
            "book|ch|v|vocalized|tiberian\nGen|1|1|a|A\nGen|1|2|BAD|\nGen|1|3|c|C\n"
        );
        assert_eq!(report.blank_lines, 2);
        assert_eq!(report.rows_written, 3);
        // blank lines still advance the line counter
        assert_eq!(report.failures[0].line, 5);
        assert!(diag.contains("line 5 [Gen|1|2]"));
        assert_eq!(report.status, RunStatus::CompletedWithErrors);
        assert!(report.status.is_success());
    }

    #[test]
    fn test_short_rows_padded() {
        let (out, _, _) = run("book|ch|v|vocalized\nGen|1\n", ErrorPolicy::skip(), AlwaysAbort);
        assert_eq!(out, "book|ch|v|vocalized|tiberian\nGen|1|||\n");
    }

    #[test]
    fn test_interactive_decline_stops_after_last_good_row() {
        let input = "book|vocalized\nA|one\nB|BAD\nC|three\n";
        let (out, _, report) = run(input, ErrorPolicy::interactive(), AlwaysAbort);

        assert_eq!(out, "book|vocalized|tiberian\nA|one|ONE\n");
        assert_eq!(report.status, RunStatus::Aborted { line: 3 });
        assert!(!report.status.is_success());
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_interactive_accept_continues() {
        let input = "book|vocalized\nA|one\nB|BAD\nC|three\n";
        let (out, _, report) = run(input, ErrorPolicy::interactive(), AlwaysContinue);
        assert_eq!(out, "book|vocalized|tiberian\nA|one|ONE\nB|BAD|\nC|three|THREE\n");
        assert_eq!(report.status, RunStatus::CompletedWithErrors);
    }

    #[test]
    fn test_console_prompt_answers_in_order() {
        let input = "book|vocalized\nA|BAD1\nB|BAD2\nC|ok\n";
        let mut shown = Vec::new();
        let prompt = ConsolePrompt::new(Cursor::new("y\nn\n"), &mut shown);
        let (out, _, report) = run(input, ErrorPolicy::interactive(), prompt);

        assert_eq!(out, "book|vocalized|tiberian\nA|BAD1|\n");
        assert_eq!(report.status, RunStatus::Aborted { line: 3 });
    }

    #[test]
    fn test_interactive_with_debug_logs_token_and_asks_once_per_failure() {
        let input = "book|vocalized\nA|ok BAD1\nB|fine\nC|x-BAD2 y\n";
        let mut shown = Vec::new();
        let prompt = ConsolePrompt::new(Cursor::new("y\nyes\n"), &mut shown);
        let (out, diag, report) = run(input, ErrorPolicy::interactive().with_debug(true), prompt);

        assert_eq!(
            out,
            "book|vocalized|tiberian\nA|ok BAD1|\nB|fine|FINE\nC|x-BAD2 y|\n"
        );
        assert_eq!(report.status, RunStatus::CompletedWithErrors);
        assert_eq!(report.failures[0].offending_token.as_deref(), Some("BAD1"));
        assert_eq!(report.failures[1].offending_token.as_deref(), Some("BAD2"));
        assert!(diag.contains("offending token: BAD1"));
        assert!(diag.contains("offending token: BAD2"));
        assert!(diag.contains("row: A|ok BAD1"));

        let shown = String::from_utf8(shown).unwrap();
        assert_eq!(shown.matches("[y/N]").count(), 2);
        assert!(shown.contains("line 2:"));
        assert!(shown.contains("line 4:"));
    }

    #[test]
    fn test_quoted_fields_round_trip() {
        let input = "book|vocalized\n\"a|b\"|\"say \"\"x\"\"\"\n";
        let (out, _, _) = run(input, ErrorPolicy::skip(), AlwaysAbort);
        assert_eq!(
            out,
            "book|vocalized|tiberian\n\"a|b\"|\"say \"\"x\"\"\"|\"SAY \"\"X\"\"\"\n"
        );
    }

    #[test]
    fn test_lossy_line_reported() {
        let mut input = b"book|vocalized\nA|ok\nB|".to_vec();
        input.extend_from_slice(&[0xFF, b'x', b'\n']);

        let mut output = Vec::new();
        let mut diagnostics = Vec::new();
        let report = convert(
            Cursor::new(input),
            &mut output,
            &ConvertOptions::default(),
            FakeTransliterator,
            AlwaysAbort,
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(report.lossy_lines, vec![3]);
        assert!(String::from_utf8(diagnostics).unwrap().contains("line 3: invalid UTF-8"));
        assert!(String::from_utf8(output).unwrap().ends_with("B|\u{FFFD}x|\u{FFFD}X\n"));
    }

    fn file_options(dir: &TempDir, input: &str) -> ConvertOptions {
        let input_path = dir.path().join("heb_corpus.csv");
        fs::write(&input_path, input).unwrap();
        ConvertOptions {
            input: input_path,
            output: dir.path().join("heb_corpus_tiberian.csv"),
            policy: ErrorPolicy::skip(),
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn test_convert_file_builtin_transliterator() {
        let dir = TempDir::new().unwrap();
        let mut options = file_options(&dir, "book|chapter|verse|vocalized\nGen|1|1|בְּרֵאשִׁ֖ית\n");
        options.report = Some(dir.path().join("report.json"));

        let report = convert_file(
            &options,
            TiberianTransliterator::new(),
            AlwaysAbort,
            std::io::sink(),
        )
        .unwrap();

        let out = fs::read_to_string(&options.output).unwrap();
        assert_eq!(
            out,
            "book|chapter|verse|vocalized|tiberian\nGen|1|1|בְּרֵאשִׁ֖ית|bərēšīθ\n"
        );
        assert_eq!(report.status, RunStatus::Completed);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
                .unwrap();
        assert_eq!(json["rows_written"], 1);
        assert_eq!(json["status"]["state"], "completed");
    }

    #[test]
    fn test_missing_column_creates_no_output() {
        let dir = TempDir::new().unwrap();
        let options = file_options(&dir, "book|chapter|text\nGen|1|x\n");

        let result = convert_file(&options, FakeTransliterator, AlwaysAbort, std::io::sink());
        match result {
            Err(ConvertError::Parse(ParseError::MissingColumn { column, header })) => {
                assert_eq!(column, "vocalized");
                assert_eq!(header, vec!["book", "chapter", "text"]);
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.status)),
        }
        assert!(!options.output.exists());
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let options = ConvertOptions {
            input: dir.path().join("nope.csv"),
            output: dir.path().join("out.csv"),
            ..ConvertOptions::default()
        };
        let result = convert_file(&options, FakeTransliterator, AlwaysAbort, std::io::sink());
        assert!(matches!(result, Err(ConvertError::InputNotFound(_))));
        assert!(!options.output.exists());
    }

    #[test]
    fn test_output_reads_back_as_input() {
        let dir = TempDir::new().unwrap();
        let options = file_options(&dir, "book|vocalized\n\"x|y\"|ab\nz|\"q\"\"\"\n");
        convert_file(&options, FakeTransliterator, AlwaysAbort, std::io::sink()).unwrap();

        // feed the output back in, transliterating the appended column
        let second = ConvertOptions {
            input: options.output.clone(),
            output: dir.path().join("second.csv"),
            source_column: "tiberian".into(),
            target_column: "again".into(),
            ..options.clone()
        };
        convert_file(&second, FakeTransliterator, AlwaysAbort, std::io::sink()).unwrap();

        let out = fs::read_to_string(&second.output).unwrap();
        assert_eq!(
            out,
            "book|vocalized|tiberian|again\n\"x|y\"|ab|AB|AB\nz|\"q\"\"\"|\"Q\"\"\"|\"Q\"\"\"\n"
        );
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: ConvertOptions =
            serde_json::from_str(r#"{"delimiter": ";", "policy": {"mode": "skip"}}"#).unwrap();
        assert_eq!(options.delimiter, ';');
        assert_eq!(options.policy, ErrorPolicy::skip());
        assert_eq!(options.source_column, DEFAULT_SOURCE_COLUMN);
        assert_eq!(options.excerpt_chars, DEFAULT_EXCERPT_CHARS);
    }
}

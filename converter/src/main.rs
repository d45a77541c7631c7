//! tiberian-csv CLI - add a Tiberian transliteration column to a Hebrew corpus
//!
//! ```bash
//! tiberian-csv                                  # heb_corpus.csv → heb_corpus_tiberian.csv
//! tiberian-csv in.csv out.csv --skip-errors     # log failures, never ask
//! tiberian-csv --debug --report run.json        # isolate offending tokens, save a report
//! ```

use clap::Parser;
use std::path::PathBuf;

use tiberian_csv::convert::pipeline::{
    DEFAULT_EXCERPT_CHARS, DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_SOURCE_COLUMN,
    DEFAULT_TARGET_COLUMN,
};
use tiberian_csv::logs::{log_error, log_info, log_info_indent, log_success, log_warning, LOGGER};
use tiberian_csv::parser::DEFAULT_DELIMITER;
use tiberian_csv::{
    convert_file, ConsolePrompt, ConversionReport, ConvertError, ConvertOptions, ErrorMode,
    ErrorPolicy, RunStatus, Schema, TiberianTransliterator,
};

#[derive(Parser)]
#[command(name = "tiberian-csv")]
#[command(about = "Add a Tiberian transliteration column to a vocalized Hebrew corpus", long_about = None)]
struct Cli {
    /// Input corpus
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Output file (overwritten)
    #[arg(default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Report the offending token and a row excerpt for each failure
    #[arg(long)]
    debug: bool,

    /// Log failures and continue instead of asking
    #[arg(long)]
    skip_errors: bool,

    /// Column holding the vocalized text
    #[arg(long, default_value = DEFAULT_SOURCE_COLUMN)]
    column: String,

    /// Name of the appended column
    #[arg(long, default_value = DEFAULT_TARGET_COLUMN)]
    output_column: String,

    /// Field delimiter
    #[arg(short, long, default_value_t = DEFAULT_DELIMITER)]
    delimiter: char,

    /// Write a JSON run report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Only print warnings, errors and the final status line
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        let mode = if self.skip_errors {
            ErrorMode::Skip
        } else {
            ErrorMode::Interactive
        };

        ConvertOptions {
            input: self.input.clone(),
            output: self.output.clone(),
            source_column: self.column.clone(),
            target_column: self.output_column.clone(),
            delimiter: self.delimiter,
            policy: ErrorPolicy::new(mode, self.debug),
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            report: self.report.clone(),
            schema: Schema::Tiberian,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    LOGGER.set_quiet(cli.quiet);

    let options = cli.options();
    log_info(format!(
        "📄 Converting: {} → {}",
        options.input.display(),
        options.output.display()
    ));

    let result = convert_file(
        &options,
        TiberianTransliterator::new(),
        ConsolePrompt::stdio(),
        std::io::stderr(),
    );

    match &result {
        Ok(report) => print_summary(report, &options),
        Err(e) => eprintln!("❌ Error: {}", e),
    }

    let code = exit_code(&result);
    if code != 0 {
        std::process::exit(code);
    }
}

/// 0 when the input was exhausted, with or without skipped rows; 1 on any
/// fatal error or operator abort.
fn exit_code(result: &Result<ConversionReport, ConvertError>) -> i32 {
    match result {
        Ok(report) if report.status.is_success() => 0,
        Ok(_) | Err(_) => 1,
    }
}

fn print_summary(report: &ConversionReport, options: &ConvertOptions) {
    log_info_indent(report.summary(), 1);
    if let Some(path) = &options.report {
        log_info_indent(format!("💾 Report saved to: {}", path.display()), 1);
    }

    match report.status {
        RunStatus::Completed => {
            log_success("All rows transliterated");
            println!("wrote: {}", options.output.display());
        }
        RunStatus::CompletedWithErrors => {
            log_warning(format!(
                "{} row(s) written with an empty transliteration",
                report.failures.len()
            ));
            println!(
                "wrote: {} ({} row(s) with transliteration errors)",
                options.output.display(),
                report.failures.len()
            );
        }
        RunStatus::Aborted { line } => {
            log_error(format!(
                "Stopped at line {}; {} keeps the rows before it",
                line,
                options.output.display()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiberian_csv::{ParseError, RowFailure};

    fn finished(failures: usize, aborted_at: Option<usize>) -> ConversionReport {
        let mut report = ConversionReport::new(Schema::Tiberian);
        for line in 0..failures {
            report.failures.push(RowFailure {
                line: line + 2,
                location: "Gen|1|1".into(),
                message: "unvocalized word".into(),
                offending_token: None,
                excerpt: None,
            });
        }
        report.finish(aborted_at);
        report
    }

    #[test]
    fn test_exit_code_success_with_or_without_skipped_rows() {
        assert_eq!(exit_code(&Ok(finished(0, None))), 0);
        assert_eq!(exit_code(&Ok(finished(3, None))), 0);
    }

    #[test]
    fn test_exit_code_abort_and_fatal_errors() {
        assert_eq!(exit_code(&Ok(finished(1, Some(2)))), 1);
        assert_eq!(
            exit_code(&Err(ConvertError::InputNotFound("heb_corpus.csv".into()))),
            1
        );
        let missing = ParseError::MissingColumn {
            column: "vocalized".into(),
            header: vec!["book".into()],
        };
        assert_eq!(exit_code(&Err(missing.into())), 1);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["tiberian-csv"]);
        let options = cli.options();
        assert_eq!(options.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(options.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(options.policy, ErrorPolicy::interactive());

        let cli = Cli::parse_from(["tiberian-csv", "in.csv", "out.csv", "--skip-errors", "--debug"]);
        assert_eq!(cli.options().policy, ErrorPolicy::skip().with_debug(true));
    }
}

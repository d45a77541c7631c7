use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use std::io::Write;

use crate::error::ConvertResult;

/// Writes output records, quoting only fields that need it.
///
/// Fields holding the delimiter or a quote are wrapped in quotes with inner
/// quotes doubled, which [`super::split_fields`] undoes.
pub struct RowWriter<W: Write> {
    writer: Writer<W>,
    rows_written: usize,
}

impl<W: Write> RowWriter<W> {
    /// `delimiter` must have passed [`super::validate_delimiter`].
    pub fn new(output: W, delimiter: char) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(delimiter as u8)
            .quote(b'"')
            .double_quote(true)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(output);

        Self {
            writer,
            rows_written: 0,
        }
    }

    pub fn write_header(&mut self, columns: &[String]) -> ConvertResult<()> {
        self.writer.write_record(columns)?;
        Ok(())
    }

    pub fn write_row(&mut self, fields: &[String]) -> ConvertResult<()> {
        self.writer.write_record(fields)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> ConvertResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying stream.
    pub fn finish(self) -> ConvertResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }

    /// Data rows written so far (header excluded)
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

use crate::error::{RastroError, Result};
use std::collections::HashMap;

/// One delimited-text row, keyed by field name.
pub type CsvRecord = HashMap<String, String>;

const DEFAULT_DELIMITER: u8 = b',';
const DEFAULT_QUOTECHAR: u8 = b'"';

/// Lazy parser for delimited-text payloads.
///
/// Content is taken at construction and validated at [`parse`](Self::parse)
/// time; the parsed rows stay `None` until then. Field names default to the
/// header row when not supplied.
pub struct CsvParser {
    content: Option<String>,
    // User-supplied names stay separate from header-derived ones so a
    // repeated parse() still treats the first row as the header.
    fieldnames: Option<Vec<String>>,
    header_fieldnames: Option<Vec<String>>,
    delimiter: u8,
    quotechar: u8,
    data: Option<Vec<CsvRecord>>,
}

impl CsvParser {
    pub fn new(content: Option<&str>) -> Self {
        Self::with_dialect(content, None, DEFAULT_DELIMITER, DEFAULT_QUOTECHAR)
    }

    pub fn with_dialect(
        content: Option<&str>,
        fieldnames: Option<Vec<String>>,
        delimiter: u8,
        quotechar: u8,
    ) -> Self {
        CsvParser {
            content: content.map(str::to_string),
            fieldnames,
            header_fieldnames: None,
            delimiter,
            quotechar,
            data: None,
        }
    }

    /// Effective field names: the supplied list, or after a successful
    /// `parse()`, the names taken from the header row.
    pub fn fieldnames(&self) -> Option<&[String]> {
        self.fieldnames
            .as_deref()
            .or(self.header_fieldnames.as_deref())
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn quotechar(&self) -> u8 {
        self.quotechar
    }

    /// Parsed rows in source order; `None` until `parse()` succeeds.
    pub fn data(&self) -> Option<&[CsvRecord]> {
        self.data.as_deref()
    }

    pub fn parse(&mut self) -> Result<()> {
        let content = self.content.as_deref().ok_or(RastroError::InvalidStream)?;

        // The reader is deliberately flexible: ragged rows are zipped up to
        // the shorter side instead of failing, matching the permissive
        // behavior expected from delimited-text input.
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quotechar)
            .flexible(true)
            .has_headers(self.fieldnames.is_none())
            .from_reader(content.as_bytes());

        let fieldnames: Vec<String> = match &self.fieldnames {
            Some(names) => names.clone(),
            None => reader
                .headers()
                .map_err(|e| RastroError::CsvParse {
                    cause: Some(Box::new(e)),
                })?
                .iter()
                .map(str::to_string)
                .collect(),
        };

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| RastroError::CsvParse {
                cause: Some(Box::new(e)),
            })?;
            let row = fieldnames
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect();
            rows.push(row);
        }

        if self.fieldnames.is_none() {
            self.header_fieldnames = Some(fieldnames);
        }
        self.data = Some(rows);
        Ok(())
    }
}

//! CSV-backed query table: passthrough columns plus the four derived SERP columns.

use std::io::{Read, Write};

use csv::{ReaderBuilder, WriterBuilder};

pub const QUERY_COLUMN: &str = "Target Query";
pub const TITLE_COLUMNS: [&str; 3] = ["SERP Title 1", "SERP Title 2", "SERP Title 3"];
pub const BOLD_COLUMN: &str = "Bold Text";
pub const TITLE_SLOTS: usize = TITLE_COLUMNS.len();

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input has no header row")]
    NoColumns,
}

/// Fields filled in from one search. All empty until the row is searched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedFields {
    pub titles: [String; TITLE_SLOTS],
    pub bold_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Original cells, first one being the query. May be shorter than the header.
    fields: Vec<String>,
    pub derived: DerivedFields,
}

impl Record {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            derived: DerivedFields::default(),
        }
    }

    /// The query cell, or `None` when it is missing or blank.
    pub fn query(&self) -> Option<&str> {
        self.fields
            .first()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Builds a table, renaming the first header to [`QUERY_COLUMN`].
    pub fn new(mut headers: Vec<String>, records: Vec<Record>) -> Result<Self, TableError> {
        let first = headers.first_mut().ok_or(TableError::NoColumns)?;
        if first.as_str() != QUERY_COLUMN {
            *first = QUERY_COLUMN.to_string();
        }
        Ok(Self { headers, records })
    }

    pub fn read_from(reader: impl Read) -> Result<Self, TableError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let records = rdr
            .records()
            .map(|r| r.map(|rec| Record::new(rec.iter().map(str::to_string).collect())))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(headers, records)
    }

    /// Writes the original columns followed by the derived ones. Short rows are padded.
    pub fn write_to(&self, writer: impl Write) -> Result<(), TableError> {
        let mut wtr = WriterBuilder::new().flexible(false).from_writer(writer);

        let header_row = self
            .headers
            .iter()
            .map(String::as_str)
            .chain(TITLE_COLUMNS)
            .chain([BOLD_COLUMN]);
        wtr.write_record(header_row)?;

        let width = self.headers.len();
        for record in &self.records {
            let passthrough = (0..width).map(|i| record.fields().get(i).map_or("", String::as_str));
            let derived = record
                .derived
                .titles
                .iter()
                .map(String::as_str)
                .chain([record.derived.bold_text.as_str()]);
            wtr.write_record(passthrough.chain(derived))?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[cfg(test)]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

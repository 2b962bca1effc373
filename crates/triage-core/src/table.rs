//! Ticket table: semicolon-delimited CSV in, semicolon-delimited CSV out
//!
//! Cells are kept as strings keyed by the header row. Row order is the only
//! row identity, so every operation here preserves it.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Field delimiter for both input and output files
pub const DELIMITER: u8 = b';';

/// Raw ticket description column
pub const DESCRIPTION_COLUMN: &str = "descricao";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TicketTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Parse a table from CSV data
    ///
    /// Short records are padded with empty cells; extra cells are dropped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();

        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(headers, rows))
    }

    /// Load a table from disk
    ///
    /// A file that cannot be opened yields an empty table so the caller can
    /// halt gracefully. Malformed content is still an error.
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open input file {}: {}", path.display(), e);
                return Ok(Self::default());
            }
        };
        let table = Self::from_reader(file)?;
        debug!("Loaded {} rows from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell value at `row` for `column`, if both exist
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// All values of a column in row order (empty if the column is missing)
    pub fn column<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)).map(String::as_str))
    }

    /// Set a column, replacing it if it already exists or appending it otherwise
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::InvalidData(format!(
                "column '{}' has {} values but table has {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Serialize the table as CSV (header row, no index column)
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new()
            .delimiter(DELIMITER)
            .from_writer(writer);

        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the table to `path`
    ///
    /// The data goes to a temporary file in the destination directory first
    /// and is then renamed over `path`, so the destination is either fully
    /// written or untouched.
    pub fn write(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        self.to_writer(tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;

        debug!("Wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }
}

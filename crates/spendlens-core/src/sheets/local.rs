//! Local CSV file summary sheet

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};

use super::SummarySink;
use crate::error::{Error, Result};

/// Summary sheet stored as a CSV file whose first line is the header row
pub struct CsvSheet {
    path: PathBuf,
    name: String,
}

impl CsvSheet {
    /// Open an existing sheet
    ///
    /// The file must already exist; its header row defines the columns.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(Error::SheetNotFound(path.display().to_string()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        let file = File::open(&self.path)
            .map_err(|_| Error::SheetNotFound(self.path.display().to_string()))?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(String::from).collect());
        }
        Ok(rows)
    }
}

impl SummarySink for CsvSheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn header_row(&self) -> Result<Vec<String>> {
        Ok(self.read_rows()?.into_iter().next().unwrap_or_default())
    }

    fn append_row(&self, cells: &[String]) -> Result<usize> {
        let next_row = self.read_rows()?.len() + 1;

        // A last line without a terminator would swallow the new row
        let unterminated = fs::read(&self.path)?.last().is_some_and(|b| *b != b'\n');

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|_| Error::SheetNotFound(self.path.display().to_string()))?;
        if unterminated {
            file.write_all(b"\n")?;
        }
        let mut wtr = WriterBuilder::new().flexible(true).from_writer(file);
        wtr.write_record(cells)?;
        wtr.flush()?;

        Ok(next_row)
    }
}

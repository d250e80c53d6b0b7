//! Delimited text export of a recorded series.
//!
//! ```text
//! t,v_light,v_heavy,x_heavy,y_heavy,z_heavy
//! 0.02,3,0,4,0.5,0
//! 0.04,3,0,4,0.5,0
//! ...
//! ```
//!
//! Values use Rust's shortest round-trip float formatting, so exporting the
//! same series twice gives byte-identical files. Every row is flushed as
//! soon as it is written; a failing sink leaves the rows written so far.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::{Error, Result};
use crate::recorder::{Row, TimeSeries};

pub const DELIMITER: char = ',';

/// Writes a header line and one line per row.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExporter {
    header: Vec<String>,
}

impl CsvExporter {
    pub fn new<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Result<Self> {
        let header: Vec<String> = header.into_iter().map(Into::into).collect();
        if header.is_empty() {
            return Err(Error::config("export header must not be empty"));
        }
        if header
            .iter()
            .any(|h| h.contains(DELIMITER) || h.contains('\n'))
        {
            return Err(Error::config("export labels must not contain the delimiter"));
        }
        Ok(Self { header })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Write the series to `writer`. Returns the number of data rows.
    pub fn write<W: Write, R: Row>(&self, writer: &mut W, series: &TimeSeries<R>) -> Result<usize> {
        writeln!(writer, "{}", self.header.join(","))?;
        writer.flush()?;

        let mut rows = 0;
        for sample in series {
            let fields = sample.fields();
            if fields.len() != self.header.len() {
                return Err(Error::config(format!(
                    "row has {} fields but header has {}",
                    fields.len(),
                    self.header.len()
                )));
            }
            let line = fields
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(",");
            writeln!(writer, "{}", line)?;
            writer.flush()?;
            rows += 1;
        }
        Ok(rows)
    }

    /// Create (or truncate) `path` and write the series into it.
    pub fn write_file<P: AsRef<Path>, R: Row>(&self, path: P, series: &TimeSeries<R>) -> Result<usize> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        let rows = self.write(&mut writer, series)?;
        info!("exported {} rows to {}", rows, path.as_ref().display());
        Ok(rows)
    }

    pub fn to_string<R: Row>(&self, series: &TimeSeries<R>) -> Result<String> {
        let mut buf = Vec::new();
        self.write(&mut buf, series)?;
        String::from_utf8(buf)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

// =============================================================================
// Tests
// =============================================================================

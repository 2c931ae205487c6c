use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::report::PageTable;

/// Byte-order mark so spreadsheet tools detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for report pages. The first write of a run carries the header
/// and starts the resource afresh; later writes append rows only.
pub trait OutputSink {
    fn write_page(&mut self, table: &PageTable, with_header: bool) -> Result<(), SinkError>;
}

/// Comma-separated file with a UTF-8 signature.
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self, with_header: bool) -> Result<File, SinkError> {
        let result = if with_header {
            File::create(&self.path)
        } else {
            OpenOptions::new().append(true).open(&self.path)
        };
        result.map_err(|source| SinkError::Open {
            path: self.path.clone(),
            source,
        })
    }
}

impl OutputSink for CsvFileSink {
    fn write_page(&mut self, table: &PageTable, with_header: bool) -> Result<(), SinkError> {
        let mut out = BufWriter::new(self.open(with_header)?);
        if with_header {
            out.write_all(UTF8_BOM)?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);
        if with_header {
            writer.write_record(&table.columns)?;
        }
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        debug!(
            action = "write",
            component = "csv_sink",
            path = ?self.path,
            rows = table.rows.len(),
            with_header,
            "Wrote page to output file"
        );
        Ok(())
    }
}

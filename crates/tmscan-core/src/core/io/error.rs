use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid record at line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    #[error("Failed to write table: {0}")]
    Write(#[from] csv::Error),
}

impl TableError {
    pub(crate) fn from_csv_read(source: csv::Error) -> Self {
        let line = source.position().map_or(0, |p| p.line());
        TableError::Csv { line, source }
    }
}

use chrono::NaiveDate;

use crate::report::ReportError;
use crate::sink::SinkError;

/// Everything that can stop an extraction run. Every variant is fatal.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("authentication rejected for {day} at offset {offset}: {message}")]
    Authentication {
        day: NaiveDate,
        offset: u64,
        message: String,
    },

    #[error("report request for {day} at offset {offset} failed: {source}")]
    Request {
        day: NaiveDate,
        offset: u64,
        #[source]
        source: ReportError,
    },

    #[error("writing page for {day} at offset {offset} failed: {source}")]
    Sink {
        day: NaiveDate,
        offset: u64,
        #[source]
        source: SinkError,
    },
}

impl ExtractError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Wraps a failed `runReport` call, lifting credential rejections into their own variant.
    pub fn from_report(day: NaiveDate, offset: u64, source: ReportError) -> Self {
        match source {
            ReportError::Authentication(message) => Self::Authentication {
                day,
                offset,
                message,
            },
            source => Self::Request {
                day,
                offset,
                source,
            },
        }
    }
}

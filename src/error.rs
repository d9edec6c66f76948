use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems with the layout of a single GTD file.
///
/// Any of these rejects the whole file; nothing from it reaches the dataset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// No line trims to `Sampling Data` (or it is the very first line)
    #[error("Invalid GTD file format: 'Sampling Data' section not found")]
    MissingSamplingData,
    /// One or more of the `Ch`/`Unit`/`Kind` rows is absent from the lookback window
    #[error("Invalid GTD file format: channel definition row(s) not found before 'Sampling Data': {}", missing.join(", "))]
    MissingDefinitionRows { missing: Vec<&'static str> },
    /// The definition rows exist but the `Ch` row names no channel
    #[error("Invalid GTD file format: no channel columns defined in the 'Ch' row")]
    NoChannelColumns,
}

/// Errors produced while reading, merging, or exporting GTD data
#[derive(Error, Debug)]
pub enum GtdError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Failed to read GTD file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid timestamp '{value}' in channel {channel}")]
    InvalidTimestamp { channel: String, value: String },

    #[error("Channel {channel} record has mismatched lengths: {timestamps} timestamps, {min} min values, {max} max values")]
    MismatchedRecord {
        channel: String,
        timestamps: usize,
        min: usize,
        max: usize,
    },

    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GtdError {
    /// True when the error is a per-file format rejection rather than an I/O or export failure
    pub fn is_format_error(&self) -> bool {
        matches!(self, GtdError::Format(_))
    }
}

pub type Result<T> = std::result::Result<T, GtdError>;

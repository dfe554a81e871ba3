//! Error types for the catalog crate.
//!
//! Errors are layered the same way decoding is:
//! - `FieldError`: one cell could not be converted
//! - `RowDecodeError`: a `FieldError` tagged with the column it came from
//! - `CatalogError`: anything that stops a whole load

use thiserror::Error;

/// Errors raised while converting a single CSV cell.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// A required field was blank or the column was absent
    #[error("missing value")]
    MissingValue,

    /// Embedded structured text was not valid JSON after quote normalization
    #[error("malformed embedded list: {reason}")]
    DecodeError { reason: String },

    /// A JSON value had a type the target field can't hold
    #[error("unsupported type: expected {expected}, found {found}")]
    UnsupportedType {
        expected: &'static str,
        found: String,
    },

    /// An embedded object lacked the id or name key
    #[error("embedded object has no '{key}' key")]
    MissingKey { key: String },

    /// The same id appeared twice in one embedded list
    #[error("duplicate key {key} in embedded list")]
    DuplicateKey { key: String },

    /// A scalar value (number, date) could not be parsed
    #[error("invalid value {value:?}: {reason}")]
    InvalidValue { value: String, reason: String },
}

/// A field-level failure while decoding one row, with the offending column.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("column '{column}': {source}")]
pub struct RowDecodeError {
    pub column: &'static str,
    #[source]
    pub source: FieldError,
}

impl RowDecodeError {
    pub fn new(column: &'static str, source: FieldError) -> Self {
        Self { column, source }
    }
}

/// Errors that can occur while loading a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A row failed to decode under the fail-fast policy
    ///
    /// `line` is the 1-based line in the source text when the rows came
    /// from a CSV reader, or the 1-based row number otherwise.
    #[error("row at line {line} could not be decoded: {source}")]
    RowDecode {
        line: u64,
        #[source]
        source: RowDecodeError,
    },

    /// The CSV header lacks a column the decoder needs
    #[error("required column '{column}' is missing from the header")]
    MissingColumn { column: &'static str },

    /// The CSV reader itself failed (bad UTF-8, I/O inside the reader)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error while opening the source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip archive could not be read
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The archive must hold exactly one entry
    #[error("expected exactly one entry in the archive, found {found}")]
    ArchiveEntryCount { found: usize },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;

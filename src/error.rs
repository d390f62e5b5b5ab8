//! Error types for the traffic dataset cache.

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem access failed for `path`
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Header parsing of a raw source table failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Arrow decode or compute error
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Parquet encode/decode error
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Mapping artifact (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Path configuration parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An allow-listed column is absent from a raw source header
    #[error("column `{column}` missing from {table} table")]
    MissingColumn { table: String, column: String },

    /// A cache artifact decoded, but not into the layout we write
    #[error("cache artifact {} has unexpected layout: {reason}", path.display())]
    SchemaMismatch { path: PathBuf, reason: String },

    /// Two cache artifacts configured at the same location
    #[error("cache artifacts share the path {}", path.display())]
    DuplicateCachePath { path: PathBuf },

    /// A state code that cannot be expressed as two zero-padded digits
    #[error("invalid FIPS state code {value:?}")]
    InvalidStateCode { value: String },

    /// One code observed with two different labels
    #[error("duplicate code {code:?} in `{feature}`: labelled both {first:?} and {second:?}")]
    DuplicateCode {
        feature: String,
        code: String,
        first: String,
        second: String,
    },

    /// One label observed with two different codes
    #[error("duplicate label {label:?} in `{feature}`: used by codes {first:?} and {second:?}")]
    DuplicateLabel {
        feature: String,
        label: String,
        first: String,
        second: String,
    },

    /// Two mappings registered under the same feature name
    #[error("mapping key `{feature}` is already present")]
    MappingKeyCollision { feature: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether rebuilding the cache from raw source could cure this error.
    ///
    /// Missing or undecodable artifacts are recoverable. Anything that a
    /// rebuild would hit again (permissions, full disks, integrity
    /// violations in the source data) is not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Io { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData
            ),
            Error::Arrow(_) | Error::Parquet(_) | Error::Json(_) | Error::SchemaMismatch { .. } => {
                true
            }
            _ => false,
        }
    }
}

//! Error types for cache operations.

use kir_codec::EncodeError;
use kir_validate::ValidationReport;
use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Reads never produce these: a bad artifact is evicted and treated as a
/// miss. They come from writes, from the compiler callback, or from a
/// freshly compiled document failing validation.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An artifact file has an invalid or missing header.
    #[error("invalid artifact header in {path}: {reason}")]
    InvalidHeader {
        /// The artifact file path.
        path: PathBuf,
        /// Description of the header problem.
        reason: String,
    },

    /// The stored checksum does not match the payload.
    #[error("checksum mismatch in {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The artifact file path.
        path: PathBuf,
        /// The checksum recorded in the header.
        expected: String,
        /// The checksum of the payload on disk.
        actual: String,
    },

    /// The artifact format version does not match the current version.
    #[error("version mismatch in {path}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The artifact file path.
        path: PathBuf,
        /// The expected format version.
        expected: u32,
        /// The version found in the file.
        actual: u32,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },

    /// The compiler callback failed.
    #[error("compile failed: {0}")]
    Compile(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The compiled document did not pass validation and was not cached.
    #[error("compiled document rejected with {} fatal diagnostics", .0.fatal_count())]
    Rejected(ValidationReport),

    /// The compiled document could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

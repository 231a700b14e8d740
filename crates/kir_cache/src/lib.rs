//! Content-addressed cache of encoded documents.
//!
//! A [`DocumentCache`] maps a hash of compiler inputs (codec version, source
//! bytes, normalized options) to an encoded document on disk. Every read is
//! fail-safe: a missing, corrupt or rejected artifact is a miss, never an
//! error.

#![warn(missing_docs)]

pub mod artifact;
pub mod cache;
pub mod error;
pub mod index;
pub mod inputs;

pub use cache::{CacheOutcome, CacheStatus, DocumentCache};
pub use error::CacheError;
pub use inputs::{cache_key, CompileOptions};

//! Shared foundational types used across the KIR crates.
//!
//! This crate provides content hashing for cache keys and the CRC-32 used
//! for section-level corruption detection in encoded documents.

#![warn(missing_docs)]

pub mod crc;
pub mod hash;

pub use crc::{crc32, Crc32};
pub use hash::{ContentHash, ContentHasher};

//! Error types for the PPM model and its codec drivers.
//!
//! This module provides the [`PpmError`] type which covers every condition
//! the crate reports as a recoverable error.
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Configuration | [`InvalidConfig`] | Model built with an unusable context length |
//! | Protocol | [`InvalidState`] | Coder drove the model out of sequence |
//! | Frame | [`InvalidHeader`], [`ChecksumMismatch`], [`LengthMismatch`] | Framed input is damaged |
//! | Stream | [`CorruptStream`] | Coded payload does not decode to a valid symbol sequence |
//!
//! Broken internal invariants (a zero count after rescale, a total above the
//! coder ceiling) are not errors; they trip `debug_assert!` instead.
//!
//! ## Example
//!
//! ```rust
//! use ppm_model::{decompress, PpmError};
//!
//! match decompress(b"not a frame") {
//!     Err(PpmError::InvalidHeader) => {}
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```
//!
//! [`InvalidConfig`]: PpmError::InvalidConfig
//! [`InvalidState`]: PpmError::InvalidState
//! [`InvalidHeader`]: PpmError::InvalidHeader
//! [`ChecksumMismatch`]: PpmError::ChecksumMismatch
//! [`LengthMismatch`]: PpmError::LengthMismatch
//! [`CorruptStream`]: PpmError::CorruptStream

use thiserror::Error;

/// Error type for PPM operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PpmError {
    /// The maximum context length is outside the supported range.
    ///
    /// Lengths must satisfy `1 <= max_context_length <= max`.
    #[error("Invalid max context length {requested} (supported: 1..={max})")]
    InvalidConfig {
        /// Length that was requested.
        requested: usize,
        /// Largest supported length.
        max: usize,
    },

    /// The coder called into the model out of sequence.
    ///
    /// Typical causes are asking for the escape interval while the model is
    /// already in the backoff state, asking for `Eof` while a context is
    /// still active, or asking for a byte the active context cannot code.
    #[error("Invalid model state: {0}")]
    InvalidState(&'static str),

    /// The frame header is missing, truncated, or from an unknown version.
    #[error("Invalid or malformed frame header")]
    InvalidHeader,

    /// The decoded payload does not match the checksum in the header.
    #[error("Checksum mismatch: expected 0x{expected:08x}, got 0x{actual:08x}")]
    ChecksumMismatch {
        /// CRC-32 stored in the header.
        expected: u32,
        /// CRC-32 of the decoded bytes.
        actual: u32,
    },

    /// The decoded payload is not the length recorded in the header.
    #[error("Length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Length stored in the header.
        expected: u64,
        /// Number of bytes decoded.
        actual: u64,
    },

    /// The coded payload decoded to an impossible symbol sequence.
    #[error("Corrupt coded stream")]
    CorruptStream,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PpmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = PpmError::InvalidConfig {
            requested: 0,
            max: 64,
        };
        assert_eq!(
            err.to_string(),
            "Invalid max context length 0 (supported: 1..=64)"
        );

        let err = PpmError::ChecksumMismatch {
            expected: 0xCBF43926,
            actual: 0,
        };
        assert_eq!(
            err.to_string(),
            "Checksum mismatch: expected 0xcbf43926, got 0x00000000"
        );

        let err = PpmError::InvalidState("escape requested in backoff state");
        assert!(err.to_string().contains("backoff"));
    }
}

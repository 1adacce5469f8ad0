//! Error types for OBU stream scanning and splitting.

use thiserror::Error;

/// Errors that can occur while scanning an OBU stream.
#[derive(Error, Debug)]
pub enum Av1SplitError {
    /// An OBU with `obu_has_size_field = 0` was encountered. Unit
    /// length cannot be inferred without per-OBU sizes, so the scan
    /// aborts immediately.
    #[error("obu_has_size_field 0 is not supported")]
    MissingSizeField,

    /// An OBU's declared size extends past the logical end of the
    /// buffer. The scan stops, but already-accumulated data is still
    /// flushed.
    #[error("invalid obu_size / truncated OBU: need {expected} bytes, have {available}")]
    Truncated {
        /// Bytes required from the start of the stream to hold the OBU.
        expected: u64,
        /// Bytes actually available in the stream.
        available: u64,
    },
}

/// Result type alias for OBU stream operations.
pub type Result<T> = std::result::Result<T, Av1SplitError>;

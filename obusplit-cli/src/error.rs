use av1_split::Av1SplitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file size ({0} bytes)")]
    SizeLimit(u64),

    #[error("failed to allocate memory ({0} bytes)")]
    Allocation(u64),

    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: u64, actual: u64 },

    #[error(transparent)]
    Split(#[from] Av1SplitError),

    #[error("{0} frame(s) could not be written")]
    SinkFailures(u64),
}

pub type Result<T> = std::result::Result<T, AppError>;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AppError, Result};

/// Smallest input that can hold a single OBU header with a size field.
pub const MIN_INPUT_SIZE: u64 = 2;

/// Upper gate on input size.
pub const MAX_INPUT_SIZE: u64 = 100_000_000_000;

/// Reads the whole input file into memory.
///
/// The file size is gated to `[MIN_INPUT_SIZE, MAX_INPUT_SIZE]` before
/// any allocation, the buffer is reserved up front so allocation
/// failure is reported as such, and a read that comes up short of the
/// metadata length is an error rather than a silently shorter buffer.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    let size = std::fs::metadata(path)?.len();
    if !(MIN_INPUT_SIZE..=MAX_INPUT_SIZE).contains(&size) {
        return Err(AppError::SizeLimit(size));
    }

    let mut data = Vec::new();
    data.try_reserve_exact(size as usize)
        .map_err(|_| AppError::Allocation(size))?;

    let mut reader = File::open(path)?.take(size);
    let read = reader.read_to_end(&mut data)? as u64;
    if read < size {
        return Err(AppError::ShortRead {
            expected: size,
            actual: read,
        });
    }

    Ok(data)
}

//! Offset-based scanning of a low-overhead OBU bitstream.
//!
//! The scanner walks a fully-buffered stream from offset 0, decoding
//! one OBU header at a time and validating the declared size against
//! the buffer extent. It yields `(type, start, len)` records instead
//! of payload copies; the splitter slices the shared buffer once per
//! accumulated frame.

use tracing::debug;

use crate::error::{Av1SplitError, Result};
use crate::obu::{ObuHeader, ObuType};

/// One OBU located in the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObuRecord {
    /// Decoded `obu_type`.
    pub obu_type: ObuType,
    /// Offset of the OBU's first header byte.
    pub start: usize,
    /// Total length in bytes: header, extension and size bytes plus
    /// the declared payload size. `start + len` never exceeds the
    /// buffer length.
    pub len: usize,
}

impl ObuRecord {
    /// Offset one past the OBU's last byte.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Iterator over the OBUs of a low-overhead bitstream.
///
/// Yields one [`ObuRecord`] per OBU in stream order. Errors are
/// terminal: after the first `Err` the iterator only returns `None`.
pub struct ObuScanner<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> ObuScanner<'a> {
    /// Creates a scanner over a fully-buffered stream.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            failed: false,
        }
    }
}

impl Iterator for ObuScanner<'_> {
    type Item = Result<ObuRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }

        let start = self.pos;
        let (header, header_len) = match ObuHeader::parse_at(self.data, start) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.failed = true;
                return Some(Err(err));
            }
        };

        debug!(
            "obu_type: {}({}), obu_size: {}",
            header.obu_type,
            u8::from(header.obu_type),
            header.size
        );

        // The size check comes after the tentative header decode, so a
        // truncated trailing OBU still leaves earlier units intact.
        let end = (start + header_len) as u64 + header.size;
        if end > self.data.len() as u64 {
            self.failed = true;
            return Some(Err(Av1SplitError::Truncated {
                expected: end,
                available: self.data.len() as u64,
            }));
        }

        self.pos = end as usize;
        Some(Ok(ObuRecord {
            obu_type: header.obu_type,
            start,
            len: self.pos - start,
        }))
    }
}

//! Splitting AV1 low-overhead OBU bitstreams into temporal units.
//!
//! An AV1 elementary stream is a plain concatenation of OBUs (Open
//! Bitstream Units) with no outer framing. This crate scans such a
//! stream (requiring `obu_has_size_field=1` on every OBU), locates
//! unit boundaries, and regroups the units into temporal units: every
//! temporal delimiter OBU starts a new unit, and each completed unit
//! is handed to a byte sink as one contiguous blob.
//!
//! - OBU header parsing, including the extension byte and the LEB128
//!   size field
//! - Offset-based scanning over a fully-buffered stream (no payload
//!   copies during the scan)
//! - Temporal-unit accumulation with a pluggable frame sink
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
mod obu;
pub mod scan;
pub mod split;

pub use error::{Av1SplitError, Result};
pub use obu::{ObuExtensionHeader, ObuHeader, ObuType, leb128_size, read_leb128, write_leb128};
pub use scan::{ObuRecord, ObuScanner};
pub use split::{FrameSink, FrameSplitter, SplitOutcome, SplitStats, split_stream};

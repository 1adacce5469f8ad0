//! OBU header decoding and the LEB128 size field.

use std::fmt;
use std::io;

use crate::error::{Av1SplitError, Result};

/// OBU Header
/// AV1-Spec-2 - 5.3.2
///
/// Decoded from the leading bytes of each OBU. This crate requires
/// `obu_has_size_field = 1`, so `size` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct ObuHeader {
    /// `obu_type`
    ///
    /// 4 bits
    pub obu_type: ObuType,
    /// `obu_size`, the declared payload length in bytes
    ///
    /// leb128()
    pub size: u64,
    /// `obu_extension_header()` if `obu_extension_flag` is 1
    pub extension_header: Option<ObuExtensionHeader>,
}

/// Obu Header Extension
/// AV1-Spec-2 - 5.3.3
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct ObuExtensionHeader {
    /// `temporal_id`
    pub temporal_id: u8,
    /// `spatial_id`
    pub spatial_id: u8,
}

impl ObuHeader {
    /// Decodes one OBU header from `data` starting at `offset`.
    ///
    /// Returns the header and the number of bytes it occupies (1 or 2
    /// fixed bytes plus 1-8 LEB128 size bytes). The forbidden bit and
    /// the reserved bit of the first byte are ignored. Fails with
    /// [`Av1SplitError::MissingSizeField`] when `obu_has_size_field`
    /// is 0, and with [`Av1SplitError::Truncated`] when the header
    /// runs past the end of `data`.
    pub fn parse_at(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let byte = read_byte(data, offset)?;
        let obu_type = ObuType::from((byte & 0x78) >> 3);
        let extension_flag = byte & 0x04 != 0;
        let has_size_field = byte & 0x02 != 0;

        if !has_size_field {
            return Err(Av1SplitError::MissingSizeField);
        }

        let mut consumed = 1;

        let extension_header = if extension_flag {
            let ext = read_byte(data, offset + 1)?;
            consumed += 1;
            Some(ObuExtensionHeader {
                temporal_id: (ext & 0xe0) >> 5,
                spatial_id: (ext & 0x18) >> 3,
            })
        } else {
            None
        };

        let (size, size_bytes) = read_leb128(data, offset + consumed)?;
        consumed += size_bytes;

        Ok((
            ObuHeader {
                obu_type,
                size,
                extension_header,
            },
            consumed,
        ))
    }
}

fn read_byte(data: &[u8], offset: usize) -> Result<u8> {
    data.get(offset)
        .copied()
        .ok_or(Av1SplitError::Truncated {
            expected: offset as u64 + 1,
            available: data.len() as u64,
        })
}

/// Read a little-endian variable-length integer from a byte slice.
/// AV1-Spec-2 - 4.10.5
///
/// Returns the decoded value and the number of bytes consumed. At
/// most 8 bytes are read: a set continuation bit on the 8th byte is
/// ignored and the 9th byte is never consumed, so values that would
/// need one decode to their low 56 bits only. This cap is deliberate
/// and matches the reference splitter byte for byte.
pub fn read_leb128(data: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut consumed = 0;
    for i in 0..8 {
        let byte = read_byte(data, offset + i)?;
        consumed += 1;
        value |= ((byte & 0x7f) as u64) << (i * 7);
        if byte & 0x80 == 0 {
            break;
        }
    }
    Ok((value, consumed))
}

/// Write a little-endian variable-length integer.
/// AV1-Spec-2 - 4.10.5
///
/// Returns the number of bytes written (1-8).
pub fn write_leb128<W: io::Write>(writer: &mut W, mut value: u64) -> io::Result<usize> {
    let mut bytes_written = 0;
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        writer.write_all(&[byte])?;
        bytes_written += 1;
        if value == 0 {
            break;
        }
    }
    Ok(bytes_written)
}

/// Returns the number of bytes needed to encode `value` as LEB128.
pub fn leb128_size(mut value: u64) -> usize {
    let mut size = 1;
    while value >= 0x80 {
        value >>= 7;
        size += 1;
    }
    size
}

/// OBU Type
/// AV1-Spec-2 - 6.2.2
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum ObuType {
    /// `OBU_SEQUENCE_HEADER`
    SequenceHeader,
    /// `OBU_TEMPORAL_DELIMITER`
    TemporalDelimiter,
    /// `OBU_FRAME_HEADER`
    FrameHeader,
    /// `OBU_TILE_GROUP`
    TileGroup,
    /// `OBU_METADATA`
    Metadata,
    /// `OBU_FRAME`
    Frame,
    /// `OBU_REDUNDANT_FRAME_HEADER`
    RedundantFrameHeader,
    /// `OBU_TILE_LIST`
    TileList,
    /// `OBU_PADDING`
    Padding,
    /// Reserved
    Reserved(u8),
}

impl From<u8> for ObuType {
    fn from(value: u8) -> Self {
        match value {
            1 => ObuType::SequenceHeader,
            2 => ObuType::TemporalDelimiter,
            3 => ObuType::FrameHeader,
            4 => ObuType::TileGroup,
            5 => ObuType::Metadata,
            6 => ObuType::Frame,
            7 => ObuType::RedundantFrameHeader,
            8 => ObuType::TileList,
            15 => ObuType::Padding,
            _ => ObuType::Reserved(value),
        }
    }
}

impl From<ObuType> for u8 {
    fn from(value: ObuType) -> Self {
        match value {
            ObuType::SequenceHeader => 1,
            ObuType::TemporalDelimiter => 2,
            ObuType::FrameHeader => 3,
            ObuType::TileGroup => 4,
            ObuType::Metadata => 5,
            ObuType::Frame => 6,
            ObuType::RedundantFrameHeader => 7,
            ObuType::TileList => 8,
            ObuType::Padding => 15,
            ObuType::Reserved(value) => value,
        }
    }
}

impl fmt::Display for ObuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObuType::SequenceHeader => f.write_str("OBU_SEQUENCE_HEADER"),
            ObuType::TemporalDelimiter => f.write_str("OBU_TEMPORAL_DELIMITER"),
            ObuType::FrameHeader => f.write_str("OBU_FRAME_HEADER"),
            ObuType::TileGroup => f.write_str("OBU_TILE_GROUP"),
            ObuType::Metadata => f.write_str("OBU_METADATA"),
            ObuType::Frame => f.write_str("OBU_FRAME"),
            ObuType::RedundantFrameHeader => f.write_str("OBU_REDUNDANT_FRAME_HEADER"),
            ObuType::TileList => f.write_str("OBU_TILE_LIST"),
            ObuType::Padding => f.write_str("OBU_PADDING"),
            ObuType::Reserved(value) => write!(f, "OBU_RESERVED_{value}"),
        }
    }
}

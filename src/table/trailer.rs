//! Per-block trailer and checksum.
//!
//! Every block payload is followed by a 5 byte trailer:
//!
//! ```text
//! [compression_type: 1 byte]
//! [masked crc32c: 4 bytes, little endian]
//! ```
//!
//! The checksum covers the payload followed by the compression type byte.

use crate::config::CompressionType;
use crate::error::DecodeError;
use crate::table::TRAILER_LENGTH;

const MASK_DELTA: u32 = 0xa282_ead8;

/// Mask a CRC so that checksums of data that itself embeds CRCs stay
/// well distributed.
pub fn mask_checksum(crc: u32) -> u32 {
    crc.rotate_right(15).wrapping_add(MASK_DELTA)
}

/// Return the crc whose masked representation is `masked`.
pub fn unmask_checksum(masked: u32) -> u32 {
    masked.wrapping_sub(MASK_DELTA).rotate_left(15)
}

/// Masked CRC32C of `payload` followed by the compression tag byte.
pub fn block_checksum(payload: &[u8], compression_tag: u8) -> u32 {
    let crc = crc32c::crc32c_append(crc32c::crc32c(payload), &[compression_tag]);
    mask_checksum(crc)
}

/// The trailer bytes exactly as stored, before the tag is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlockTrailer {
    /// Compression tag byte
    pub compression_tag: u8,
    /// Stored masked checksum
    pub checksum: u32,
}

impl RawBlockTrailer {
    /// Split a trailer into its tag byte and stored checksum.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != TRAILER_LENGTH {
            return Err(DecodeError::Truncated { expected: TRAILER_LENGTH, actual: data.len() });
        }

        let mut checksum = [0u8; 4];
        checksum.copy_from_slice(&data[1..TRAILER_LENGTH]);
        Ok(Self { compression_tag: data[0], checksum: u32::from_le_bytes(checksum) })
    }

    /// Resolve the tag against the known compression types.
    pub fn resolve(self) -> Result<BlockTrailer, DecodeError> {
        let compression_type = CompressionType::from_u8(self.compression_tag)
            .ok_or(DecodeError::UnknownCompressionType(self.compression_tag))?;
        Ok(BlockTrailer { compression_type, checksum: self.checksum })
    }
}

/// A decoded block trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTrailer {
    /// How the block payload is compressed
    pub compression_type: CompressionType,
    /// Masked CRC32C of the payload and compression tag
    pub checksum: u32,
}

impl BlockTrailer {
    /// Create a new BlockTrailer
    pub fn new(compression_type: CompressionType, checksum: u32) -> Self {
        Self { compression_type, checksum }
    }

    /// Build the trailer for a payload stored with `compression_type`
    pub fn for_payload(compression_type: CompressionType, payload: &[u8]) -> Self {
        Self::new(compression_type, block_checksum(payload, compression_type.as_u8()))
    }

    /// Encode the trailer to bytes (5 bytes)
    pub fn encode(&self) -> [u8; TRAILER_LENGTH] {
        let mut buf = [0u8; TRAILER_LENGTH];
        buf[0] = self.compression_type.as_u8();
        buf[1..].copy_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    /// Decode a trailer, rejecting unknown compression tags.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        RawBlockTrailer::decode(data)?.resolve()
    }
}

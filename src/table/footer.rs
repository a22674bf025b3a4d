//! Block handles and the table footer.
//!
//! The footer is a fixed-size (48 bytes) structure at the end of a table
//! file that points at the metaindex and index blocks.

use crate::error::DecodeError;
use crate::table::{BLOCK_HANDLE_MAX_ENCODED_LENGTH, FOOTER_LENGTH, TABLE_MAGIC_NUMBER};
use integer_encoding::VarInt;

/// Longest valid varint64 encoding
const MAX_VARINT64_LENGTH: usize = 10;

/// BlockHandle represents a pointer to a block in the table file.
///
/// `size` counts only the block payload; the trailer that follows it is not
/// included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockHandle {
    /// Offset of the block in the file
    pub offset: u64,
    /// Size of the block payload in bytes
    pub size: u64,
}

impl BlockHandle {
    /// Create a new BlockHandle
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Encode the BlockHandle as two varint64 values
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(BLOCK_HANDLE_MAX_ENCODED_LENGTH);
        self.encode_to(&mut buf);
        buf
    }

    /// Append the encoded handle to `buf`
    pub fn encode_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.offset.encode_var_vec());
        buf.extend_from_slice(&self.size.encode_var_vec());
    }

    /// Decode a BlockHandle from the start of `data`.
    ///
    /// Returns the handle and the number of bytes consumed. Trailing bytes
    /// are left for the caller.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        let (offset, offset_len) = decode_varint64(data, "block offset")?;
        let (size, size_len) = decode_varint64(&data[offset_len..], "block size")?;
        Ok((Self { offset, size }, offset_len + size_len))
    }

    /// Get the end offset of the block payload
    pub fn end_offset(&self) -> Option<u64> {
        self.offset.checked_add(self.size)
    }
}

fn decode_varint64(data: &[u8], field: &str) -> Result<(u64, usize), DecodeError> {
    let window = &data[..data.len().min(MAX_VARINT64_LENGTH)];
    match u64::decode_var(window) {
        Some((value, len)) if len > 0 => Ok((value, len)),
        _ if window.len() < MAX_VARINT64_LENGTH && window.iter().all(|b| b & 0x80 != 0) => {
            Err(DecodeError::malformed(format!("truncated varint in {}", field)))
        }
        _ => Err(DecodeError::malformed(format!("{} varint out of range", field))),
    }
}

/// Footer is the last 48 bytes of a table file.
///
/// Format:
/// ```text
/// [metaindex_handle: varint64 x 2]
/// [index_handle: varint64 x 2]
/// [padding: zeroes up to 40 bytes]
/// [magic: 8 bytes, little endian]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    /// Handle to the metaindex block
    pub metaindex_handle: BlockHandle,
    /// Handle to the index block
    pub index_handle: BlockHandle,
}

impl Footer {
    /// Create a new Footer
    pub fn new(metaindex_handle: BlockHandle, index_handle: BlockHandle) -> Self {
        Self { metaindex_handle, index_handle }
    }

    /// Encode the footer to bytes (48 bytes)
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FOOTER_LENGTH);
        self.metaindex_handle.encode_to(&mut buf);
        self.index_handle.encode_to(&mut buf);

        // Padding keeps the magic number at a fixed offset
        buf.resize(2 * BLOCK_HANDLE_MAX_ENCODED_LENGTH, 0);
        buf.extend_from_slice(&TABLE_MAGIC_NUMBER.to_le_bytes());

        debug_assert_eq!(buf.len(), FOOTER_LENGTH);
        buf
    }

    /// Decode a footer from exactly [`FOOTER_LENGTH`] bytes
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < FOOTER_LENGTH {
            return Err(DecodeError::Truncated { expected: FOOTER_LENGTH, actual: data.len() });
        }
        if data.len() > FOOTER_LENGTH {
            return Err(DecodeError::malformed(format!(
                "footer size mismatch: expected {}, got {}",
                FOOTER_LENGTH,
                data.len()
            )));
        }

        let mut magic = [0u8; 8];
        magic.copy_from_slice(&data[FOOTER_LENGTH - 8..]);
        let magic = u64::from_le_bytes(magic);
        if magic != TABLE_MAGIC_NUMBER {
            return Err(DecodeError::BadMagic { expected: TABLE_MAGIC_NUMBER, actual: magic });
        }

        let handles = &data[..FOOTER_LENGTH - 8];
        let (metaindex_handle, used) = BlockHandle::decode(handles)?;
        let (index_handle, _) = BlockHandle::decode(&handles[used..])?;

        Ok(Self { metaindex_handle, index_handle })
    }
}

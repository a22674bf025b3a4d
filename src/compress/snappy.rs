//! Snappy block codec.
//!
//! Blocks are stored in the raw Snappy format (varint uncompressed length
//! followed by the compressed elements), not the framed stream format.
//! Each call decodes into its own allocation and never touches the scratch
//! arena.

use crate::compress::Codec;
use crate::config::CompressionType;
use crate::error::CodecError;
use bytes::Bytes;

/// Codec for [`CompressionType::Snappy`].
///
/// Without the `snappy` feature every operation fails with
/// [`CodecError::Unsupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SnappyCodec;

#[cfg(feature = "snappy")]
impl Codec for SnappyCodec {
    fn compression_type(&self) -> CompressionType {
        CompressionType::Snappy
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        snap::raw::Encoder::new().compress_vec(input).map_err(|e| CodecError::Compress {
            codec: CompressionType::Snappy,
            reason: e.to_string(),
        })
    }

    fn uncompress(&self, input: &[u8]) -> Result<Bytes, CodecError> {
        let expected = snap::raw::decompress_len(input)
            .map_err(|e| CodecError::corrupt(CompressionType::Snappy, e))?;

        // The decoder rejects any stream whose output differs from the header length
        let mut output = vec![0u8; expected];
        snap::raw::Decoder::new()
            .decompress(input, &mut output)
            .map_err(|e| CodecError::corrupt(CompressionType::Snappy, e))?;

        Ok(Bytes::from(output))
    }
}

#[cfg(not(feature = "snappy"))]
impl Codec for SnappyCodec {
    fn compression_type(&self) -> CompressionType {
        CompressionType::Snappy
    }

    fn compress(&self, _input: &[u8]) -> Result<Vec<u8>, CodecError> {
        Err(CodecError::Unsupported(CompressionType::Snappy))
    }

    fn uncompress(&self, _input: &[u8]) -> Result<Bytes, CodecError> {
        Err(CodecError::Unsupported(CompressionType::Snappy))
    }
}

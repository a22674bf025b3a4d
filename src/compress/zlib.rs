//! zlib and raw DEFLATE block codecs.
//!
//! Both share the inflate loop; they differ only in whether the stream
//! carries the two-byte zlib header and the adler32 trailer.

use crate::compress::{Codec, ScratchArena};
use crate::config::CompressionType;
use crate::error::CodecError;
use bytes::Bytes;
use flate2::write::{DeflateEncoder, ZlibEncoder};
use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::io::Write;

/// Compression level used when writing zlib-family blocks
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 8;

/// Initial scratch size reserved before the first inflate (4KB)
const MIN_SCRATCH_SIZE: usize = 4096;

/// Codec for [`CompressionType::Zlib`] and [`CompressionType::ZlibRaw`].
///
/// Decompression inflates into the arena's scratch buffer while holding its
/// lock, growing the buffer until the stream ends, then copies the result
/// out so the caller owns it.
#[derive(Debug, Clone)]
pub struct ZlibCodec {
    raw: bool,
    scratch: ScratchArena,
}

impl ZlibCodec {
    /// Codec for zlib-framed streams
    pub fn zlib(scratch: ScratchArena) -> Self {
        Self { raw: false, scratch }
    }

    /// Codec for raw DEFLATE streams
    pub fn raw(scratch: ScratchArena) -> Self {
        Self { raw: true, scratch }
    }

    /// The arena this codec inflates into
    pub fn scratch(&self) -> &ScratchArena {
        &self.scratch
    }
}

impl Codec for ZlibCodec {
    fn compression_type(&self) -> CompressionType {
        if self.raw {
            CompressionType::ZlibRaw
        } else {
            CompressionType::Zlib
        }
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let codec = self.compression_type();
        let level = Compression::new(DEFAULT_COMPRESSION_LEVEL);
        let failed = |e: std::io::Error| CodecError::Compress { codec, reason: e.to_string() };

        if self.raw {
            let mut encoder = DeflateEncoder::new(Vec::with_capacity(input.len() / 2), level);
            encoder.write_all(input).map_err(failed)?;
            encoder.finish().map_err(failed)
        } else {
            let mut encoder = ZlibEncoder::new(Vec::with_capacity(input.len() / 2), level);
            encoder.write_all(input).map_err(failed)?;
            encoder.finish().map_err(failed)
        }
    }

    fn uncompress(&self, input: &[u8]) -> Result<Bytes, CodecError> {
        let codec = self.compression_type();
        self.scratch.with_buffer(|buffer| {
            inflate(input, self.raw, codec, buffer)?;
            Ok(Bytes::copy_from_slice(buffer))
        })
    }
}

/// Inflate `input` into `out`, growing it until the stream signals its end.
///
/// Running out of input before the end of the stream is an error; no
/// partial output is ever considered valid.
fn inflate(
    input: &[u8],
    raw: bool,
    codec: CompressionType,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    let mut inflater = Decompress::new(!raw);
    if out.capacity() < MIN_SCRATCH_SIZE {
        out.reserve(MIN_SCRATCH_SIZE);
    }

    loop {
        if out.len() == out.capacity() {
            out.reserve(out.capacity());
        }

        let consumed = inflater.total_in() as usize;
        let produced = inflater.total_out();
        let status = inflater
            .decompress_vec(&input[consumed..], out, FlushDecompress::None)
            .map_err(|e| CodecError::corrupt(codec, e))?;

        if status == Status::StreamEnd {
            return Ok(());
        }

        let progressed =
            inflater.total_in() as usize > consumed || inflater.total_out() > produced;
        if !progressed && out.len() < out.capacity() {
            return Err(CodecError::corrupt(codec, "unexpected end of deflate stream"));
        }
    }
}

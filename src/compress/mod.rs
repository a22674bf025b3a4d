//! Block compression codecs.
//!
//! The set of codecs is closed: every [`CompressionType`] maps to exactly
//! one [`Codec`] owned by the [`CodecRegistry`]. Adding a codec means adding
//! a variant, a registry field and a match arm; callers only ever name a
//! `CompressionType`.
//!
//! | Tag    | Codec              | Scratch arena |
//! |--------|--------------------|---------------|
//! | `0x00` | [`NoCompression`]  | no            |
//! | `0x01` | [`SnappyCodec`]    | no            |
//! | `0x02` | [`ZlibCodec`]      | yes           |
//! | `0x04` | [`ZlibCodec`] raw  | yes           |

pub mod scratch;
pub mod snappy;
pub mod zlib;

pub use scratch::ScratchArena;
pub use snappy::SnappyCodec;
pub use zlib::ZlibCodec;

use crate::config::CompressionType;
use crate::error::CodecError;
use bytes::Bytes;

/// A block compression algorithm.
pub trait Codec: Send + Sync {
    /// The trailer tag this codec handles
    fn compression_type(&self) -> CompressionType;

    /// Compress a block payload.
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Decompress a block payload. The returned bytes are owned by the
    /// caller and do not alias `input`.
    fn uncompress(&self, input: &[u8]) -> Result<Bytes, CodecError>;
}

/// Identity codec for uncompressed blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompression;

impl Codec for NoCompression {
    fn compression_type(&self) -> CompressionType {
        CompressionType::None
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(input.to_vec())
    }

    fn uncompress(&self, input: &[u8]) -> Result<Bytes, CodecError> {
        Ok(Bytes::copy_from_slice(input))
    }
}

/// Maps compression types to codecs.
///
/// The zlib-family codecs share the registry's [`ScratchArena`].
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    none: NoCompression,
    snappy: SnappyCodec,
    zlib: ZlibCodec,
    zlib_raw: ZlibCodec,
}

impl CodecRegistry {
    /// Create a registry whose zlib codecs inflate into `scratch`
    pub fn new(scratch: ScratchArena) -> Self {
        Self {
            none: NoCompression,
            snappy: SnappyCodec,
            zlib: ZlibCodec::zlib(scratch.clone()),
            zlib_raw: ZlibCodec::raw(scratch),
        }
    }

    /// The codec registered for `compression`
    pub fn codec(&self, compression: CompressionType) -> &dyn Codec {
        match compression {
            CompressionType::None => &self.none,
            CompressionType::Snappy => &self.snappy,
            CompressionType::Zlib => &self.zlib,
            CompressionType::ZlibRaw => &self.zlib_raw,
        }
    }

    /// Compress `input` with the codec for `compression`.
    pub fn compress(&self, compression: CompressionType, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.codec(compression).compress(input)
    }

    /// Decompress `input` with the codec for `compression`.
    pub fn uncompress(&self, compression: CompressionType, input: &[u8]) -> Result<Bytes, CodecError> {
        self.codec(compression).uncompress(input)
    }

    /// The arena shared by the zlib-family codecs
    pub fn scratch(&self) -> &ScratchArena {
        self.zlib.scratch()
    }
}

impl Default for CodecRegistry {
    /// A registry using the process-wide scratch arena.
    fn default() -> Self {
        Self::new(ScratchArena::global())
    }
}

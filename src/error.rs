//! Error types for ldbtable.
//!
//! Decoding of fixed on-disk structures fails with [`DecodeError`], the
//! compression layer fails with [`CodecError`], and every table operation
//! surfaces one [`Error`] to its caller. Nothing here is retried.

use crate::config::CompressionType;
use std::io;
use thiserror::Error;

/// The result type used throughout ldbtable.
pub type Result<T> = std::result::Result<T, Error>;

/// A structural decode failure in a footer, block handle or block trailer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer bytes were available than the structure requires.
    #[error("truncated input: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Number of bytes the structure needs.
        expected: usize,
        /// Number of bytes that were available.
        actual: usize,
    },

    /// The trailing magic number does not identify a table file.
    #[error("bad table magic number: expected {expected:#x}, got {actual:#x}")]
    BadMagic {
        /// The magic number of the format.
        expected: u64,
        /// The value found in the file.
        actual: u64,
    },

    /// A variable-length field was out of range or cut short.
    #[error("malformed encoding: {0}")]
    Malformed(String),

    /// The compression tag is not one of the known codecs.
    #[error("unknown compression type tag: {0:#04x}")]
    UnknownCompressionType(u8),
}

impl DecodeError {
    /// Creates a new malformed-encoding error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        DecodeError::Malformed(msg.into())
    }
}

/// A failure inside a compression codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The compressed stream was rejected by the decoder.
    #[error("{codec} stream is corrupt: {reason}")]
    Corrupt {
        /// Codec that rejected the input.
        codec: CompressionType,
        /// Decoder diagnostic.
        reason: String,
    },

    /// The codec is not compiled into this build.
    #[error("{0} compression is not supported in this build")]
    Unsupported(CompressionType),

    /// Compressing a payload failed.
    #[error("{codec} compression failed: {reason}")]
    Compress {
        /// Codec that failed.
        codec: CompressionType,
        /// Encoder diagnostic.
        reason: String,
    },
}

impl CodecError {
    /// Creates a new corrupt-stream error.
    pub fn corrupt(codec: CompressionType, reason: impl ToString) -> Self {
        CodecError::Corrupt { codec, reason: reason.to_string() }
    }
}

/// The error type for table operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The byte source could not satisfy a read.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The table footer could not be decoded; the file is not a usable table.
    #[error("corrupt table footer: {0}")]
    CorruptFooter(#[source] DecodeError),

    /// A block read returned, or would return, fewer bytes than requested.
    #[error("truncated read at offset {offset}: expected {expected} bytes, got {actual}")]
    Truncated {
        /// File offset of the read.
        offset: u64,
        /// Number of bytes requested.
        expected: u64,
        /// Number of bytes available.
        actual: u64,
    },

    /// A block handle or trailer could not be decoded.
    #[error("block decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// The stored block checksum does not match the block contents.
    #[error("checksum mismatch: expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch {
        /// Masked checksum stored in the block trailer.
        expected: u32,
        /// Masked checksum computed over the block.
        actual: u32,
    },

    /// The block could not be decompressed.
    #[error("codec failure: {0}")]
    Codec(#[from] CodecError),

    /// An invalid argument was provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Returns true if the error indicates on-disk corruption rather than an
    /// I/O failure or a caller mistake.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::CorruptFooter(_)
                | Error::Truncated { .. }
                | Error::Decode(_)
                | Error::ChecksumMismatch { .. }
                | Error::Codec(CodecError::Corrupt { .. })
        )
    }
}

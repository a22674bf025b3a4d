//! Configuration options for reading tables.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Options used when opening a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Verify the masked CRC32C of every block before decoding it.
    /// With this off, a corrupted block that still decompresses is returned
    /// as-is.
    /// Default: true
    pub verify_checksums: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self { verify_checksums: true }
    }
}

impl TableOptions {
    /// Creates a new TableOptions with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether block checksums are verified.
    pub fn verify_checksums(mut self, value: bool) -> Self {
        self.verify_checksums = value;
        self
    }

    /// Parses options from a JSON document. Missing fields take their
    /// default values.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::invalid_argument(format!("invalid table options: {}", e)))
    }
}

/// Compression algorithms a block may be stored with.
///
/// The discriminant is the tag byte written in the block trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CompressionType {
    /// No compression.
    None = 0x00,

    /// Snappy block compression.
    Snappy = 0x01,

    /// DEFLATE with the zlib header and adler32 trailer.
    Zlib = 0x02,

    /// Raw DEFLATE stream, no zlib framing.
    ZlibRaw = 0x04,
}

impl CompressionType {
    /// All compression types, in tag order.
    pub const ALL: [CompressionType; 4] = [
        CompressionType::None,
        CompressionType::Snappy,
        CompressionType::Zlib,
        CompressionType::ZlibRaw,
    ];

    /// Convert from the trailer tag byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(CompressionType::None),
            0x01 => Some(CompressionType::Snappy),
            0x02 => Some(CompressionType::Zlib),
            0x04 => Some(CompressionType::ZlibRaw),
            _ => None,
        }
    }

    /// The trailer tag byte
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns true for the codecs that inflate through the shared scratch
    /// buffer.
    pub fn is_zlib_family(self) -> bool {
        matches!(self, CompressionType::Zlib | CompressionType::ZlibRaw)
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompressionType::None => "none",
            CompressionType::Snappy => "snappy",
            CompressionType::Zlib => "zlib",
            CompressionType::ZlibRaw => "zlib-raw",
        };
        f.write_str(name)
    }
}

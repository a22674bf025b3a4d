//! Table file block retrieval.
//!
//! Tables are immutable LevelDB-format files. This module locates, verifies
//! and decodes individual blocks; parsing entries inside a block is left to
//! the block layer.
//!
//! ## File Format
//!
//! ```text
//! [Data Block 1][Trailer]
//! [Data Block 2][Trailer]
//! ...
//! [Meta Block][Trailer]
//! [Metaindex Block][Trailer]
//! [Index Block][Trailer]
//! [Footer: 48B]      // Points to the metaindex and index blocks
//! ```
//!
//! ## Trailer Format
//!
//! ```text
//! [compression_type: 1 byte]
//! [masked crc32c of block + compression_type: 4 bytes]
//! ```

pub mod footer;
pub mod reader;
pub mod source;
pub mod trailer;

pub use footer::{BlockHandle, Footer};
pub use reader::{DecodedBlock, Table};
pub use source::{FileSource, MemorySource, MmapSource, RandomAccessSource};
pub use trailer::{block_checksum, mask_checksum, unmask_checksum, BlockTrailer, RawBlockTrailer};

/// Footer size in bytes (fixed)
pub const FOOTER_LENGTH: usize = 48;

/// Block trailer size in bytes: compression tag + checksum
pub const TRAILER_LENGTH: usize = 5;

/// Maximum encoded size of a block handle (two varint64)
pub const BLOCK_HANDLE_MAX_ENCODED_LENGTH: usize = 20;

/// Magic number for table files
pub const TABLE_MAGIC_NUMBER: u64 = 0xdb47_7524_8b80_fb57;

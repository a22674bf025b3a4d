//! # ldbtable - Block retrieval for LevelDB-format tables
//!
//! ldbtable is the layer of an LSM-tree storage engine that turns a block
//! handle into verified, decompressed block bytes. It reads the fixed footer
//! that anchors a table file, checks the masked CRC32C in each block
//! trailer and dispatches to the block's codec.
//!
//! ## Components
//!
//! - **Footer / BlockHandle**: the fixed on-disk pointers into a table
//! - **BlockTrailer**: compression tag and checksum after every block
//! - **CodecRegistry**: none, snappy, zlib and raw-deflate codecs
//! - **ScratchArena**: the shared, lock-guarded inflate buffer
//! - **Table**: opens a byte source and reads blocks from it
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ldbtable::{BytewiseComparator, FileSource, Table, TableOptions};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), ldbtable::Error> {
//! let source = Arc::new(FileSource::open("./data/000007.ldb")?);
//! let options = TableOptions::default().verify_checksums(true);
//! let table = Table::open("000007.ldb", source, Arc::new(BytewiseComparator), options)?;
//!
//! let index = table.read_index_block()?;
//! println!("index block holds {} bytes", index.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod comparator;
pub mod compress;
pub mod config;
pub mod error;
pub mod table;

// Re-exports
pub use comparator::{BytewiseComparator, Comparator};
pub use compress::{Codec, CodecRegistry, ScratchArena};
pub use config::{CompressionType, TableOptions};
pub use error::{CodecError, DecodeError, Error, Result};
pub use table::{
    BlockHandle, BlockTrailer, DecodedBlock, FileSource, Footer, MemorySource, MmapSource,
    RandomAccessSource, Table, FOOTER_LENGTH, TRAILER_LENGTH,
};

//! Table reader implementation.
//!
//! Opens a table by decoding its footer, then reads, verifies and
//! decompresses individual blocks on request.

use crate::comparator::Comparator;
use crate::compress::{CodecRegistry, ScratchArena};
use crate::config::{CompressionType, TableOptions};
use crate::error::{DecodeError, Error, Result};
use crate::table::footer::{BlockHandle, Footer};
use crate::table::source::RandomAccessSource;
use crate::table::trailer::{block_checksum, RawBlockTrailer};
use crate::table::{FOOTER_LENGTH, TRAILER_LENGTH};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Decoded contents of one block, ready for the block parser.
///
/// Carries the comparator of the table it came from so the block can order
/// its entries.
#[derive(Clone)]
pub struct DecodedBlock {
    data: Bytes,
    compression_type: CompressionType,
    comparator: Arc<dyn Comparator>,
}

impl DecodedBlock {
    /// The uncompressed block bytes
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Size of the uncompressed block
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the block is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Compression the block was stored with
    pub fn compression_type(&self) -> CompressionType {
        self.compression_type
    }

    /// Comparator of the owning table
    pub fn comparator(&self) -> &Arc<dyn Comparator> {
        &self.comparator
    }

    /// Split into the bytes and the comparator
    pub fn into_parts(self) -> (Bytes, Arc<dyn Comparator>) {
        (self.data, self.comparator)
    }
}

impl fmt::Debug for DecodedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedBlock")
            .field("len", &self.data.len())
            .field("compression_type", &self.compression_type)
            .field("comparator", &self.comparator.name())
            .finish()
    }
}

/// Table provides block-level read access to a table file.
///
/// A table is immutable once opened, so `read_block` may be called from
/// many threads at once. Only zlib-family blocks contend, on the scratch
/// arena of the table's codec registry.
///
/// Usage:
/// ```no_run
/// use ldbtable::{BytewiseComparator, FileSource, Table, TableOptions};
/// use std::sync::Arc;
///
/// let source = Arc::new(FileSource::open("000005.ldb").unwrap());
/// let table = Table::open("000005.ldb", source, Arc::new(BytewiseComparator), TableOptions::default()).unwrap();
/// let index = table.read_index_block().unwrap();
/// println!("index block: {} bytes", index.len());
/// ```
pub struct Table<S: RandomAccessSource + ?Sized> {
    name: String,
    source: Arc<S>,
    file_size: u64,
    footer: Footer,
    comparator: Arc<dyn Comparator>,
    verify_checksums: bool,
    codecs: CodecRegistry,
}

impl<S: RandomAccessSource + ?Sized> Table<S> {
    /// Open a table, sharing the process-wide scratch arena.
    pub fn open(
        name: impl Into<String>,
        source: Arc<S>,
        comparator: Arc<dyn Comparator>,
        options: TableOptions,
    ) -> Result<Self> {
        Self::open_with_codecs(name, source, comparator, options, CodecRegistry::default())
    }

    /// Open a table whose zlib-family codecs inflate into `arena`.
    pub fn open_with_arena(
        name: impl Into<String>,
        source: Arc<S>,
        comparator: Arc<dyn Comparator>,
        options: TableOptions,
        arena: ScratchArena,
    ) -> Result<Self> {
        Self::open_with_codecs(name, source, comparator, options, CodecRegistry::new(arena))
    }

    /// Open a table with an explicit codec registry.
    ///
    /// Reads the last [`FOOTER_LENGTH`] bytes of the source and decodes the
    /// footer. I/O errors surface as [`Error::Io`]; a missing or undecodable
    /// footer as [`Error::CorruptFooter`].
    pub fn open_with_codecs(
        name: impl Into<String>,
        source: Arc<S>,
        comparator: Arc<dyn Comparator>,
        options: TableOptions,
        codecs: CodecRegistry,
    ) -> Result<Self> {
        let name = name.into();
        let file_size = source.size()?;
        if file_size < FOOTER_LENGTH as u64 {
            return Err(Error::CorruptFooter(DecodeError::Truncated {
                expected: FOOTER_LENGTH,
                actual: file_size as usize,
            }));
        }

        let footer_data = source.read_at(file_size - FOOTER_LENGTH as u64, FOOTER_LENGTH)?;
        let footer = Footer::decode(&footer_data).map_err(Error::CorruptFooter)?;

        log::debug!(
            "Opened table {}: {} bytes, index {:?}, metaindex {:?}",
            name,
            file_size,
            footer.index_handle,
            footer.metaindex_handle
        );

        Ok(Self {
            name,
            source,
            file_size,
            footer,
            comparator,
            verify_checksums: options.verify_checksums,
            codecs,
        })
    }

    /// Read, verify and decompress the block at `handle`.
    ///
    /// Fails with [`Error::Truncated`] if the block and its trailer do not
    /// fit in the file, [`Error::ChecksumMismatch`] if verification is on and
    /// the block is corrupt, [`Error::Decode`] for an unknown compression
    /// tag and [`Error::Codec`] if decompression fails. No partial data is
    /// ever returned.
    pub fn read_block(&self, handle: BlockHandle) -> Result<DecodedBlock> {
        let raw = self.read_raw_block(handle)?;
        let payload_len = raw.len() - TRAILER_LENGTH;
        let (payload, trailer) = raw.split_at(payload_len);
        let trailer = RawBlockTrailer::decode(trailer)?;

        // Verify against the raw tag byte so a flipped tag is reported as
        // corruption rather than as an unknown codec
        if self.verify_checksums {
            let actual = block_checksum(payload, trailer.compression_tag);
            if actual != trailer.checksum {
                log::warn!(
                    "Checksum mismatch in table {} at {:?}: stored {:#x}, computed {:#x}",
                    self.name,
                    handle,
                    trailer.checksum,
                    actual
                );
                return Err(Error::ChecksumMismatch { expected: trailer.checksum, actual });
            }
        }

        let compression_type = trailer.resolve()?.compression_type;
        let data = self.codecs.uncompress(compression_type, payload).map_err(|e| {
            log::warn!("Failed to decode block {:?} of table {}: {}", handle, self.name, e);
            Error::Codec(e)
        })?;

        log::trace!(
            "Read block {:?} from table {}: {} -> {} bytes ({})",
            handle,
            self.name,
            payload_len,
            data.len(),
            compression_type
        );

        Ok(DecodedBlock { data, compression_type, comparator: Arc::clone(&self.comparator) })
    }

    /// Decode a block handle from an index entry value and read that block.
    pub fn open_block(&self, block_entry: &[u8]) -> Result<DecodedBlock> {
        let (handle, _) = BlockHandle::decode(block_entry)?;
        self.read_block(handle)
    }

    /// Read the index block named by the footer
    pub fn read_index_block(&self) -> Result<DecodedBlock> {
        self.read_block(self.footer.index_handle)
    }

    /// Read the metaindex block named by the footer
    pub fn read_metaindex_block(&self) -> Result<DecodedBlock> {
        self.read_block(self.footer.metaindex_handle)
    }

    /// Read payload and trailer in one request, rejecting handles that
    /// reach past the end of the file before allocating anything.
    fn read_raw_block(&self, handle: BlockHandle) -> Result<Bytes> {
        let expected = handle.size.saturating_add(TRAILER_LENGTH as u64);
        let available = self.file_size.saturating_sub(handle.offset);
        let fits = handle
            .offset
            .checked_add(expected)
            .is_some_and(|end| end <= self.file_size);
        if !fits {
            return Err(Error::Truncated { offset: handle.offset, expected, actual: available });
        }

        let len = usize::try_from(expected)
            .map_err(|_| Error::invalid_argument(format!("block too large: {:?}", handle)))?;
        let data = self.source.read_at(handle.offset, len)?;
        if data.len() < len {
            return Err(Error::Truncated {
                offset: handle.offset,
                expected,
                actual: data.len() as u64,
            });
        }

        Ok(data.slice(..len))
    }

    /// Name the table was opened with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the underlying source at open time
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// The decoded footer
    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    /// Comparator handed to every decoded block
    pub fn comparator(&self) -> &Arc<dyn Comparator> {
        &self.comparator
    }

    /// Whether block checksums are verified
    pub fn verify_checksums(&self) -> bool {
        self.verify_checksums
    }

    /// The codec registry used for decompression
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// The byte source, shared with the caller
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }
}

impl<S: RandomAccessSource + ?Sized> fmt::Debug for Table<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("file_size", &self.file_size)
            .field("footer", &self.footer)
            .field("comparator", &self.comparator.name())
            .field("verify_checksums", &self.verify_checksums)
            .finish()
    }
}

impl<S: RandomAccessSource + ?Sized> fmt::Display for Table<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Table {{ name: {}, size: {} }}", self.name, self.file_size)
    }
}

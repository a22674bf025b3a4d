// Shared helpers for table integration tests

#![allow(dead_code)]

use ldbtable::table::block_checksum;
use ldbtable::{
    BlockHandle, BlockTrailer, BytewiseComparator, CodecRegistry, CompressionType, Footer,
    MemorySource, RandomAccessSource, ScratchArena, Table, TableOptions,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Writes blocks and a footer the way a table builder lays them out.
pub struct TableFileWriter {
    data: Vec<u8>,
    codecs: CodecRegistry,
}

impl TableFileWriter {
    pub fn new() -> Self {
        Self { data: Vec::new(), codecs: CodecRegistry::new(ScratchArena::new()) }
    }

    /// Compress and append a block with a valid trailer
    pub fn add_block(&mut self, compression: CompressionType, contents: &[u8]) -> BlockHandle {
        let payload = self.codecs.compress(compression, contents).unwrap();
        let handle = BlockHandle::new(self.data.len() as u64, payload.len() as u64);
        self.data.extend_from_slice(&payload);
        self.data.extend_from_slice(&BlockTrailer::for_payload(compression, &payload).encode());
        handle
    }

    /// Append a payload with an arbitrary tag byte and its matching checksum
    pub fn add_raw_block(&mut self, tag: u8, payload: &[u8]) -> BlockHandle {
        let handle = BlockHandle::new(self.data.len() as u64, payload.len() as u64);
        self.data.extend_from_slice(payload);
        self.data.push(tag);
        self.data.extend_from_slice(&block_checksum(payload, tag).to_le_bytes());
        handle
    }

    pub fn finish(mut self, metaindex: BlockHandle, index: BlockHandle) -> Vec<u8> {
        self.data.extend_from_slice(&Footer::new(metaindex, index).encode());
        self.data
    }
}

pub fn open_memory(file: Vec<u8>, verify_checksums: bool) -> Table<MemorySource> {
    Table::open_with_arena(
        "memory.ldb",
        Arc::new(MemorySource::new(file)),
        Arc::new(BytewiseComparator),
        TableOptions::default().verify_checksums(verify_checksums),
        ScratchArena::new(),
    )
    .unwrap()
}

/// Deterministic, moderately compressible payload unique to `seed`
pub fn payload(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1;
    (0..len)
        .map(|i| {
            if i % 4 == 0 {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
            }
            (state >> ((i % 4) * 8)) as u8 % 16 + b'a'
        })
        .collect()
}

/// Serves every read one byte short of what was asked.
pub struct ShortReadSource {
    pub inner: MemorySource,
    pub reads: AtomicUsize,
}

impl ShortReadSource {
    pub fn new(file: Vec<u8>) -> Self {
        Self { inner: MemorySource::new(file), reads: AtomicUsize::new(0) }
    }
}

impl RandomAccessSource for ShortReadSource {
    fn read_at(&self, offset: u64, len: usize) -> io::Result<bytes::Bytes> {
        let data = self.inner.read_at(offset, len)?;
        // The footer read is served in full so the table can open
        if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(data);
        }
        Ok(data.slice(..data.len().saturating_sub(1)))
    }

    fn size(&self) -> io::Result<u64> {
        self.inner.size()
    }
}

/// Fails every read after the footer with an I/O error.
pub struct FailingSource {
    pub inner: MemorySource,
    pub fail_footer: bool,
}

impl RandomAccessSource for FailingSource {
    fn read_at(&self, offset: u64, len: usize) -> io::Result<bytes::Bytes> {
        let size = self.inner.size()?;
        if self.fail_footer || offset + (len as u64) < size {
            return Err(io::Error::new(io::ErrorKind::Other, "device error"));
        }
        self.inner.read_at(offset, len)
    }

    fn size(&self) -> io::Result<u64> {
        self.inner.size()
    }
}

// Block Read Tests for ldbtable
// These tests open whole table images and read blocks back through every codec

mod common;

use common::{open_memory, payload, FailingSource, ShortReadSource, TableFileWriter};
use ldbtable::{
    BlockHandle, BytewiseComparator, CodecError, CompressionType, DecodeError, Error, FileSource,
    MemorySource, MmapSource, ScratchArena, Table, TableOptions, TRAILER_LENGTH,
};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// One NONE block of 100 bytes, footer pointing back at it
#[test]
fn test_single_uncompressed_block_scenario() {
    common::init_logging();

    let contents: Vec<u8> = (0..100u8).collect();
    let mut writer = TableFileWriter::new();
    let handle = writer.add_block(CompressionType::None, &contents);
    let file = writer.finish(handle, handle);

    // Block payload, then tag 0x00, then the checksum
    assert_eq!(file[100], 0x00);
    assert_eq!(handle, BlockHandle::new(0, 100));

    let table = open_memory(file.clone(), true);
    let block = table.read_block(handle).unwrap();
    assert_eq!(&block.data()[..], &contents[..]);

    // A handle reaching one byte past the end of the file
    let file_size = file.len() as u64;
    let beyond = BlockHandle::new(file_size - TRAILER_LENGTH as u64 - 99, 100);
    let result = table.read_block(beyond);
    assert!(matches!(result, Err(Error::Truncated { expected: 105, actual: 104, .. })));
}

#[test]
fn test_short_read_is_truncated() {
    let mut writer = TableFileWriter::new();
    let handle = writer.add_block(CompressionType::None, &[7u8; 100]);
    let file = writer.finish(handle, handle);

    let table = Table::open(
        "short.ldb",
        Arc::new(ShortReadSource::new(file)),
        Arc::new(BytewiseComparator),
        TableOptions::default(),
    )
    .unwrap();

    let result = table.read_block(handle);
    assert!(matches!(
        result,
        Err(Error::Truncated { offset: 0, expected: 105, actual: 104 })
    ));
}

#[test]
fn test_uncompressed_blocks_roundtrip() {
    let mut writer = TableFileWriter::new();
    let blocks: Vec<(BlockHandle, Vec<u8>)> = [0usize, 1, 17, 4096, 65_537]
        .iter()
        .enumerate()
        .map(|(i, &len)| {
            let contents = payload(i as u64, len);
            (writer.add_block(CompressionType::None, &contents), contents)
        })
        .collect();
    let file = writer.finish(blocks[0].0, blocks[1].0);

    let table = open_memory(file, true);
    for (handle, contents) in &blocks {
        let block = table.read_block(*handle).unwrap();
        assert_eq!(block.data(), contents);
        assert_eq!(block.compression_type(), CompressionType::None);
    }
}

#[test]
fn test_compressed_blocks_roundtrip() {
    let mut types = vec![CompressionType::Zlib, CompressionType::ZlibRaw];
    if cfg!(feature = "snappy") {
        types.push(CompressionType::Snappy);
    }

    let mut writer = TableFileWriter::new();
    let mut blocks = Vec::new();
    for (i, ty) in types.iter().enumerate() {
        let contents = payload(100 + i as u64, 32 * 1024);
        blocks.push((*ty, writer.add_block(*ty, &contents), contents));
    }
    let file = writer.finish(blocks[0].1, blocks[1].1);

    let table = open_memory(file, true);
    for (ty, handle, contents) in &blocks {
        let block = table.read_block(*handle).unwrap();
        assert_eq!(block.data(), contents, "{} block", ty);
        assert_eq!(block.compression_type(), *ty);
    }
}

#[test]
fn test_verify_flag_does_not_change_valid_reads() {
    let mut writer = TableFileWriter::new();
    let a = writer.add_block(CompressionType::None, b"plain block");
    let b = writer.add_block(CompressionType::Zlib, &payload(9, 10_000));
    let file = writer.finish(a, b);

    let verified = open_memory(file.clone(), true);
    let unverified = open_memory(file, false);
    assert!(verified.verify_checksums());
    assert!(!unverified.verify_checksums());

    for handle in [a, b] {
        assert_eq!(
            verified.read_block(handle).unwrap().data(),
            unverified.read_block(handle).unwrap().data()
        );
    }
}

#[test]
fn test_unknown_tag_is_rejected_without_decompressing() {
    let arena = ScratchArena::new();
    let mut writer = TableFileWriter::new();
    let handle = writer.add_raw_block(0x07, &[0x78, 0x9c, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01]);
    let file = writer.finish(handle, handle);

    for verify in [true, false] {
        let table = Table::open_with_arena(
            "unknown.ldb",
            Arc::new(MemorySource::new(file.clone())),
            Arc::new(BytewiseComparator),
            TableOptions::default().verify_checksums(verify),
            arena.clone(),
        )
        .unwrap();

        let result = table.read_block(handle);
        assert!(matches!(result, Err(Error::Decode(DecodeError::UnknownCompressionType(0x07)))));
    }
    assert_eq!(arena.capacity(), 0);
}

#[cfg(not(feature = "snappy"))]
#[test]
fn test_snappy_block_unsupported() {
    let mut writer = TableFileWriter::new();
    let handle = writer.add_raw_block(CompressionType::Snappy.as_u8(), b"\x05hello");
    let file = writer.finish(handle, handle);

    let table = open_memory(file, true);
    assert!(matches!(
        table.read_block(handle),
        Err(Error::Codec(CodecError::Unsupported(CompressionType::Snappy)))
    ));
}

#[test]
fn test_corrupt_compressed_stream_is_codec_failure() {
    let mut writer = TableFileWriter::new();
    let good = writer.add_block(CompressionType::ZlibRaw, &payload(3, 20_000));
    let file = writer.finish(good, good);

    // Rewrite the stream cut in half, with a matching checksum
    let compressed = &file[..good.size as usize];
    let mut writer = TableFileWriter::new();
    let cut = &compressed[..compressed.len() / 2];
    let handle = writer.add_raw_block(CompressionType::ZlibRaw.as_u8(), cut);
    let file = writer.finish(handle, handle);

    let table = open_memory(file, true);
    let result = table.read_block(handle);
    assert!(matches!(result, Err(Error::Codec(CodecError::Corrupt { .. }))));
}

#[test]
fn test_open_io_failure() {
    let mut writer = TableFileWriter::new();
    let handle = writer.add_block(CompressionType::None, b"data");
    let file = writer.finish(handle, handle);

    let result = Table::open(
        "failing.ldb",
        Arc::new(FailingSource { inner: MemorySource::new(file.clone()), fail_footer: true }),
        Arc::new(BytewiseComparator),
        TableOptions::default(),
    );
    assert!(matches!(result, Err(Error::Io(_))));

    let table = Table::open(
        "failing.ldb",
        Arc::new(FailingSource { inner: MemorySource::new(file), fail_footer: false }),
        Arc::new(BytewiseComparator),
        TableOptions::default(),
    )
    .unwrap();
    assert!(matches!(table.read_block(handle), Err(Error::Io(_))));
}

#[test]
fn test_open_corrupt_footer() {
    let mut writer = TableFileWriter::new();
    let handle = writer.add_block(CompressionType::None, b"data");
    let mut file = writer.finish(handle, handle);
    let last = file.len() - 1;
    file[last] ^= 0x01;

    let result = Table::open(
        "bad_magic.ldb",
        Arc::new(MemorySource::new(file)),
        Arc::new(BytewiseComparator),
        TableOptions::default(),
    );
    assert!(matches!(result, Err(Error::CorruptFooter(DecodeError::BadMagic { .. }))));
}

#[test]
fn test_file_backed_table() {
    let mut writer = TableFileWriter::new();
    let data_block = writer.add_block(CompressionType::Zlib, &payload(42, 50_000));
    let index_block = writer.add_block(CompressionType::None, &data_block.encode());
    let file = writer.finish(BlockHandle::default(), index_block);

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(&file).unwrap();
    temp_file.flush().unwrap();

    let source = Arc::new(FileSource::open(temp_file.path()).unwrap());
    let table =
        Table::open("file.ldb", source, Arc::new(BytewiseComparator), TableOptions::default())
            .unwrap();
    assert_eq!(table.file_size(), file.len() as u64);

    // Follow the index block to the data block
    let index = table.read_index_block().unwrap();
    let block = table.open_block(index.data()).unwrap();
    assert_eq!(block.data(), &payload(42, 50_000));
}

#[test]
fn test_mmap_backed_table() {
    let mut writer = TableFileWriter::new();
    let first = writer.add_block(CompressionType::ZlibRaw, &payload(7, 20_000));
    let second = writer.add_block(CompressionType::None, &payload(8, 3_000));
    let index_block = writer.add_block(CompressionType::None, &first.encode());
    let file = writer.finish(second, index_block);

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(&file).unwrap();
    temp_file.flush().unwrap();

    let source = Arc::new(MmapSource::open(temp_file.path()).unwrap());
    let table =
        Table::open("mmap.ldb", source, Arc::new(BytewiseComparator), TableOptions::default())
            .unwrap();
    assert_eq!(table.file_size(), file.len() as u64);

    let index = table.read_index_block().unwrap();
    let block = table.open_block(index.data()).unwrap();
    assert_eq!(block.data(), &payload(7, 20_000));

    // Uncompressed blocks read through the mapping as well
    let metaindex = table.read_metaindex_block().unwrap();
    assert_eq!(metaindex.data(), &payload(8, 3_000));
    assert_eq!(metaindex.compression_type(), CompressionType::None);

    // A handle past the end of the mapping is truncated, not a panic
    let past_end = BlockHandle::new(file.len() as u64 - 10, 100);
    assert!(matches!(table.read_block(past_end), Err(Error::Truncated { .. })));
}

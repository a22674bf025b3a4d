//! Random-access byte sources a table can be read from.

use bytes::Bytes;
use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::Path;

/// Positional read access to an immutable table image.
///
/// Implementations must be usable from several threads at once; a read
/// never depends on or moves a shared cursor.
pub trait RandomAccessSource: Send + Sync {
    /// Read up to `len` bytes starting at `offset`.
    ///
    /// A result shorter than `len` means the source ended first.
    fn read_at(&self, offset: u64, len: usize) -> io::Result<Bytes>;

    /// Total size of the source in bytes
    fn size(&self) -> io::Result<u64>;
}

/// A table file on disk.
#[derive(Debug)]
pub struct FileSource {
    file: File,
}

impl FileSource {
    /// Wrap an open file
    pub fn new(file: File) -> Self {
        Self { file }
    }

    /// Open the file at `path` for reading
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }

    /// Hand the file back to the caller
    pub fn into_inner(self) -> File {
        self.file
    }

    #[cfg(unix)]
    fn pread(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        use std::os::unix::fs::FileExt;
        self.file.read_at(buf, offset)
    }

    #[cfg(windows)]
    fn pread(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        use std::os::windows::fs::FileExt;
        self.file.seek_read(buf, offset)
    }
}

impl RandomAccessSource for FileSource {
    fn read_at(&self, offset: u64, len: usize) -> io::Result<Bytes> {
        let mut buf = vec![0u8; len];
        let mut filled = 0;

        while filled < len {
            match self.pread(&mut buf[filled..], offset + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        buf.truncate(filled);
        Ok(Bytes::from(buf))
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}

/// A table image held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    /// Create a source over `data`
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl RandomAccessSource for MemorySource {
    fn read_at(&self, offset: u64, len: usize) -> io::Result<Bytes> {
        Ok(slice_at(&self.data, offset, len))
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }
}

/// A table file mapped read-only into memory.
///
/// Reads slice the mapping without copying; returned slices keep the map
/// alive until they are dropped.
#[derive(Debug, Clone)]
pub struct MmapSource {
    data: Bytes,
}

impl MmapSource {
    /// Map an open file
    pub fn new(file: &File) -> io::Result<Self> {
        if file.metadata()?.len() == 0 {
            return Ok(Self { data: Bytes::new() });
        }

        // SAFETY: the map is read-only and table files are never modified
        // once written, so the mapped bytes do not change underneath readers.
        // Truncating the file while it is mapped is outside that contract.
        let map = unsafe { Mmap::map(file)? };
        Ok(Self { data: Bytes::from_owner(map) })
    }

    /// Map the file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::new(&File::open(path)?)
    }
}

impl RandomAccessSource for MmapSource {
    fn read_at(&self, offset: u64, len: usize) -> io::Result<Bytes> {
        Ok(slice_at(&self.data, offset, len))
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }
}

/// Up to `len` bytes of `data` from `offset`, empty past the end
fn slice_at(data: &Bytes, offset: u64, len: usize) -> Bytes {
    if offset > data.len() as u64 {
        return Bytes::new();
    }
    let start = offset as usize;
    let end = start.saturating_add(len).min(data.len());
    data.slice(start..end)
}

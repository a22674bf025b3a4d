//! Shared decompression scratch buffer.

use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

/// A reusable output buffer for the zlib-family codecs.
///
/// Every decompression that goes through an arena holds its lock for the
/// whole call, so all zlib-family reads sharing one arena are serialized.
/// That bounds memory to the largest block inflated so far at the price of
/// decompression parallelism. Tables that need parallel inflation can be
/// given their own arena with [`ScratchArena::new`].
///
/// Cloning an arena yields another handle to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct ScratchArena {
    buffer: Arc<Mutex<Vec<u8>>>,
}

static GLOBAL: OnceLock<ScratchArena> = OnceLock::new();

impl ScratchArena {
    /// Create a new, empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buffer: Arc::new(Mutex::new(Vec::with_capacity(capacity))) }
    }

    /// The process-wide arena shared by tables opened without one.
    pub fn global() -> Self {
        GLOBAL.get_or_init(ScratchArena::new).clone()
    }

    /// Current capacity of the buffer. Never decreases.
    pub fn capacity(&self) -> usize {
        self.buffer.lock().capacity()
    }

    /// Returns true if both handles refer to the same buffer
    pub fn same_arena(&self, other: &ScratchArena) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }

    /// Run `f` with exclusive access to the cleared buffer.
    ///
    /// The buffer is cleared again afterwards, keeping its capacity.
    pub(crate) fn with_buffer<R>(&self, f: impl FnOnce(&mut Vec<u8>) -> R) -> R {
        let mut buffer = self.buffer.lock();
        buffer.clear();
        let result = f(&mut buffer);
        buffer.clear();
        result
    }
}

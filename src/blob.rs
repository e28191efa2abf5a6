//! Owned, size-tagged byte buffers for keys and values.

use crate::config::Allocator;

/// An owned byte buffer inside an entry.
///
/// Blobs are always copies made through the map's injected allocator; they
/// never alias caller memory. Two blobs are equal iff their sizes match and
/// all bytes match.
#[derive(Debug)]
pub(crate) struct Blob {
    bytes: Vec<u8>,
}

impl Blob {
    /// Copy `src` into a freshly allocated buffer.
    pub(crate) fn copy_in(alloc: &Allocator, src: &[u8]) -> Self {
        let mut bytes = alloc.allocate(src.len());
        bytes.clear();
        bytes.extend_from_slice(src);
        Self { bytes }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Byte-exact comparison against caller data: sizes first, then content.
    pub(crate) fn matches(&self, other: &[u8]) -> bool {
        self.bytes.len() == other.len() && self.bytes == other
    }

    /// Copy the blob's bytes into the caller's destination buffer.
    pub(crate) fn copy_out(&self, dst: &mut Vec<u8>) {
        dst.clear();
        dst.extend_from_slice(&self.bytes);
    }

    /// Overwrite the blob's content with `src`. The lengths must already
    /// agree; length changes go through reallocation so the counters stay in
    /// sync.
    pub(crate) fn overwrite(&mut self, src: &[u8]) {
        debug_assert_eq!(self.bytes.len(), src.len());
        self.bytes.copy_from_slice(src);
    }

    /// Surrender the underlying buffer so it can be handed back to the
    /// caller's release fn.
    pub(crate) fn into_buffer(self) -> Vec<u8> {
        self.bytes
    }
}

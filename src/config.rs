//! Creation-time map definition: bucket count, hash selection, allocator.

use crate::hasher::BlobHasher;
use std::rc::Rc;

/// Allocates a buffer with capacity for at least `len` bytes. The buffer's
/// contents are unspecified; the map clears it before copying payload in.
pub type AllocateFn = Rc<dyn Fn(usize) -> Vec<u8>>;

/// Receives back a buffer previously handed out by the paired [`AllocateFn`].
/// Called for every live buffer by the time `destroy` (or drop) returns.
pub type ReleaseFn = Rc<dyn Fn(Vec<u8>)>;

/// Hash strategy selector.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum HashKind {
    /// The built-in SDBM polynomial hash.
    #[default]
    Sdbm,
    /// A caller-supplied [`BlobHasher`]; requires
    /// [`MapConfig::with_custom_hasher`].
    Custom,
}

/// Definition of a map to be created.
///
/// A definition is inert data; nothing is validated until it is handed to
/// [`BlobMap::create`](crate::BlobMap::create). The allocate and release fns
/// are both required there, and `HashKind::Custom` requires a hasher.
#[derive(Clone)]
pub struct MapConfig {
    pub bucket_count: usize,
    pub hash_kind: HashKind,
    pub custom_hasher: Option<Rc<dyn BlobHasher>>,
    pub allocate: Option<AllocateFn>,
    pub release: Option<ReleaseFn>,
}

impl MapConfig {
    /// A definition with `bucket_count` buckets, SDBM hashing and no
    /// allocator yet.
    pub fn new(bucket_count: usize) -> Self {
        Self {
            bucket_count,
            hash_kind: HashKind::Sdbm,
            custom_hasher: None,
            allocate: None,
            release: None,
        }
    }

    /// Supply the allocator pair. Both halves are required at creation.
    pub fn with_allocator(mut self, allocate: AllocateFn, release: ReleaseFn) -> Self {
        self.allocate = Some(allocate);
        self.release = Some(release);
        self
    }

    /// Select a caller-supplied hash strategy.
    pub fn with_custom_hasher(mut self, hasher: Rc<dyn BlobHasher>) -> Self {
        self.hash_kind = HashKind::Custom;
        self.custom_hasher = Some(hasher);
        self
    }
}

/// Validated allocator pair held for the map's lifetime. The map never
/// substitutes its own allocation strategy for entry payloads.
#[derive(Clone)]
pub(crate) struct Allocator {
    allocate: AllocateFn,
    release: ReleaseFn,
}

impl Allocator {
    pub(crate) fn new(allocate: AllocateFn, release: ReleaseFn) -> Self {
        Self { allocate, release }
    }

    pub(crate) fn allocate(&self, len: usize) -> Vec<u8> {
        (self.allocate)(len)
    }

    pub(crate) fn release(&self, buf: Vec<u8>) {
        (self.release)(buf)
    }
}

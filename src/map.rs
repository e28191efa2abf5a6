//! BlobMap: the public policy layer over the structural store.

use crate::blob::Blob;
use crate::config::{Allocator, HashKind, MapConfig};
use crate::error::MapError;
use crate::hasher::{BlobHasher, HashValue, SdbmHasher};
use crate::store::{Entry, EntryStore};
use log::debug;
use std::rc::Rc;

/// A chained hash map from opaque byte keys to opaque byte values.
///
/// Created once from a [`MapConfig`] and destroyed exactly once; after
/// [`destroy`](Self::destroy) the handle is uninitialized and every operation
/// except [`contains`](Self::contains) reports [`MapError::Uninitialized`].
/// Dropping an undestroyed map performs the same teardown, routing every
/// payload buffer back through the caller's release fn.
///
/// Single-threaded by contract: the map is `!Send`/`!Sync` and performs no
/// internal synchronization. Embedders sharing a map across threads must
/// serialize access externally.
pub struct BlobMap {
    inner: Option<MapInner>,
}

struct MapInner {
    store: EntryStore,
    hasher: Rc<dyn BlobHasher>,
    alloc: Allocator,
}

impl std::fmt::Debug for BlobMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobMap")
            .field("initialized", &self.inner.is_some())
            .finish()
    }
}

impl BlobMap {
    /// Create a map from `config`.
    ///
    /// Fails with [`MapError::InvalidArgument`] when `bucket_count` is zero,
    /// and with [`MapError::InvalidDefinition`] when the allocate fn or the
    /// release fn is missing, or when [`HashKind::Custom`] is selected
    /// without a hasher. The map starts empty.
    pub fn create(config: MapConfig) -> Result<Self, MapError> {
        if config.bucket_count == 0 {
            return Err(MapError::InvalidArgument);
        }
        let (allocate, release) = match (config.allocate, config.release) {
            (Some(a), Some(r)) => (a, r),
            _ => return Err(MapError::InvalidDefinition),
        };
        let hasher: Rc<dyn BlobHasher> = match config.hash_kind {
            HashKind::Custom => config.custom_hasher.ok_or(MapError::InvalidDefinition)?,
            HashKind::Sdbm => Rc::new(SdbmHasher),
        };

        debug!("blobmap created with {} buckets", config.bucket_count);
        Ok(Self {
            inner: Some(MapInner {
                store: EntryStore::new(config.bucket_count),
                hasher,
                alloc: Allocator::new(allocate, release),
            }),
        })
    }

    /// Tear the map down, destroying every remaining entry and releasing its
    /// buffers through the caller's release fn.
    ///
    /// Calling again on a destroyed handle reports
    /// [`MapError::Uninitialized`] rather than silently succeeding.
    pub fn destroy(&mut self) -> Result<(), MapError> {
        let inner = self.inner.take().ok_or(MapError::Uninitialized)?;
        debug!(
            "blobmap destroyed with {} entries remaining",
            inner.store.entry_count()
        );
        drop(inner);
        Ok(())
    }

    /// Set the value for `key`, creating the entry if the key is absent.
    ///
    /// A new entry is pushed onto the head of its bucket chain. An existing
    /// entry has its value replaced in place: same-length values are copied
    /// over the stored buffer, different lengths release and reallocate it.
    /// The key is never modified on update and the entry keeps its chain
    /// position.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), MapError> {
        let inner = self.inner.as_mut().ok_or(MapError::Uninitialized)?;
        let hash = inner.hasher.hash_blob(key);
        match inner.store.find_by_key(hash, key) {
            Some(slot) => {
                if inner.store.value_of(slot).len() == value.len() {
                    inner.store.overwrite_value(slot, value);
                } else {
                    let fresh = Blob::copy_in(&inner.alloc, value);
                    let old = inner.store.replace_value(slot, fresh);
                    inner.alloc.release(old.into_buffer());
                }
            }
            None => {
                let entry = Entry::new(
                    Blob::copy_in(&inner.alloc, key),
                    Blob::copy_in(&inner.alloc, value),
                    hash,
                );
                let slot = inner.store.insert(entry);
                inner.store.link_front(slot);
            }
        }
        Ok(())
    }

    /// Copy the value for `key` into `out`.
    ///
    /// Copy-out semantics: `out` is cleared and receives the stored bytes.
    /// Fails with [`MapError::KeyNotFound`] when the key is absent.
    pub fn get(&self, key: &[u8], out: &mut Vec<u8>) -> Result<(), MapError> {
        let inner = self.inner.as_ref().ok_or(MapError::Uninitialized)?;
        let hash = inner.hasher.hash_blob(key);
        let slot = inner
            .store
            .find_by_key(hash, key)
            .ok_or(MapError::KeyNotFound)?;
        inner.store.value_of(slot).copy_out(out);
        Ok(())
    }

    /// Remove the entry for `key`. Succeeds as a no-op when the key is
    /// absent.
    pub fn remove(&mut self, key: &[u8]) -> Result<(), MapError> {
        let inner = self.inner.as_mut().ok_or(MapError::Uninitialized)?;
        let hash = inner.hasher.hash_blob(key);
        if let Some(slot) = inner.store.find_by_key(hash, key) {
            inner.store.unlink(slot);
            let entry = inner.store.remove(slot);
            let (key_buf, value_buf) = entry.into_buffers();
            inner.alloc.release(key_buf);
            inner.alloc.release(value_buf);
        }
        Ok(())
    }

    /// Whether `key` is present. Never surfaces an error: a destroyed handle
    /// answers `false`.
    pub fn contains(&self, key: &[u8]) -> bool {
        match &self.inner {
            Some(inner) => {
                let hash = inner.hasher.hash_blob(key);
                inner.store.find_by_key(hash, key).is_some()
            }
            None => false,
        }
    }

    /// Number of live entries.
    pub fn entry_count(&self) -> Result<usize, MapError> {
        self.live().map(|inner| inner.store.entry_count())
    }

    /// Whether the map holds no entries.
    pub fn is_empty(&self) -> Result<bool, MapError> {
        self.live().map(|inner| inner.store.entry_count() == 0)
    }

    /// Total footprint in bytes: every entry's key, value and fixed overhead
    /// plus the map and bucket-array overhead.
    pub fn total_size(&self) -> Result<usize, MapError> {
        self.live().map(|inner| inner.store.footprint())
    }

    /// Sum of all stored key lengths.
    pub fn total_key_bytes(&self) -> Result<usize, MapError> {
        self.live().map(|inner| inner.store.key_bytes())
    }

    /// Sum of all stored value lengths.
    pub fn total_value_bytes(&self) -> Result<usize, MapError> {
        self.live().map(|inner| inner.store.value_bytes())
    }

    /// The fixed number of buckets chosen at creation.
    pub fn bucket_count(&self) -> Result<usize, MapError> {
        self.live().map(|inner| inner.store.bucket_count())
    }

    /// Hash `data` through the map's configured strategy without mutating
    /// state.
    pub fn hash_of(&self, data: &[u8]) -> Result<HashValue, MapError> {
        self.live().map(|inner| inner.hasher.hash_blob(data))
    }

    fn live(&self) -> Result<&MapInner, MapError> {
        self.inner.as_ref().ok_or(MapError::Uninitialized)
    }
}

impl Drop for MapInner {
    fn drop(&mut self) {
        // Pop every chain head until all buckets are empty, handing each
        // entry's buffers back to the caller's release fn.
        for bucket in 0..self.store.bucket_count() {
            while let Some(slot) = self.store.bucket_head(bucket) {
                self.store.unlink(slot);
                let entry = self.store.remove(slot);
                let (key_buf, value_buf) = entry.into_buffers();
                self.alloc.release(key_buf);
                self.alloc.release(value_buf);
            }
        }
    }
}

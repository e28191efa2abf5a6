//! blobmap: a single-threaded chained hash map over opaque byte keys and
//! values, built for embedding where the caller supplies the memory
//! allocator and may supply the hash function.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the hash-table engine itself — bucket resolution, collision
//!   chains, entry lifecycle, memory accounting — in small, separately
//!   verifiable layers.
//! - Layers:
//!   - EntryStore: structural map. Owns the entry arena, the fixed bucket
//!     array, the per-bucket doubly-linked chains and the running byte
//!     counters. Never invokes caller code.
//!   - BlobMap: policy layer and public API. Owns the hashing strategy and
//!     the injected allocator pair, validates configuration, and maps every
//!     failure to an explicit `MapError` code.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by design (strategies are `Rc`-held).
//! - Keys and values are owned copies inside the map; caller memory is never
//!   aliased past the duration of one call, and lookups copy values out.
//! - The bucket array is fixed at creation. There is no rehashing and no
//!   growth; chains lengthen as entries accumulate.
//! - Entries live in a `slotmap` arena and chains link entries by stable
//!   arena keys, so unlink is O(1) and no raw pointers are involved.
//! - Every payload buffer is obtained from the caller's allocate fn and
//!   handed back through the caller's release fn, including at teardown.
//!
//! Why this split?
//! - Localize invariants: the store maintains chain/counter consistency and
//!   can be tested without any allocator or hasher in the picture.
//! - Clear failure boundaries: all fallible validation happens in `BlobMap`
//!   before the store is touched; store operations cannot fail.
//!
//! Lifecycle
//! - `BlobMap::create` validates the definition (allocate fn, release fn,
//!   hash selection) and returns an initialized handle; `destroy` tears the
//!   map down and leaves the handle in an observable uninitialized state
//!   where every operation except `contains` reports `Uninitialized`.
//!   Dropping an undestroyed map performs the same teardown.
//!
//! Notes and non-goals
//! - No iteration, no entry enumeration, no ordering guarantees.
//! - No automatic resize: lookup degrades toward linear scan as chains grow.
//! - Concurrent use is the embedder's problem; the types do not cross
//!   threads.
//! - Public surface is `BlobMap`, `MapConfig`, `MapError` and the hashing
//!   strategy types; the store layer is an implementation detail.

mod blob;
mod config;
mod error;
mod hasher;
mod map;
mod map_proptest;
mod store;

// Public surface
pub use config::{AllocateFn, HashKind, MapConfig, ReleaseFn};
pub use error::MapError;
pub use hasher::{BlobHasher, HashValue, SdbmHasher};
pub use map::BlobMap;

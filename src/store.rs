//! EntryStore: structural layer owning the arena, the buckets and the
//! counters.
//!
//! Chains are doubly linked through stable `slotmap` keys instead of raw
//! pointers, which keeps unlink O(1) without aliasing. The store never calls
//! caller code: hashing and allocation happen above it, so every method here
//! is infallible and leaves the chain/counter invariants intact.

use crate::blob::Blob;
use crate::hasher::HashValue;
use slotmap::{DefaultKey, SlotMap};

/// One key/value pair plus its cached hash and chain links.
#[derive(Debug)]
pub(crate) struct Entry {
    key: Blob,
    value: Blob,
    key_hash: HashValue,
    next: Option<DefaultKey>,
    previous: Option<DefaultKey>,
    footprint: usize,
}

impl Entry {
    /// A fresh, unlinked entry. `key_hash` must be the map strategy's hash of
    /// `key`; it is cached for the entry's entire lifetime.
    pub(crate) fn new(key: Blob, value: Blob, key_hash: HashValue) -> Self {
        let footprint = key.len() + value.len() + std::mem::size_of::<Entry>();
        Self {
            key,
            value,
            key_hash,
            next: None,
            previous: None,
            footprint,
        }
    }

    pub(crate) fn value(&self) -> &Blob {
        &self.value
    }

    /// Surrender both payload buffers for release.
    pub(crate) fn into_buffers(self) -> (Vec<u8>, Vec<u8>) {
        (self.key.into_buffer(), self.value.into_buffer())
    }
}

pub(crate) struct EntryStore {
    slots: SlotMap<DefaultKey, Entry>,
    buckets: Vec<Option<DefaultKey>>,
    key_bytes: usize,
    value_bytes: usize,
    // Total footprint, seeded with the fixed map/bucket-array overhead so it
    // tracks the cost of the container itself, not just the payload.
    footprint: usize,
}

impl EntryStore {
    /// A store with `bucket_count` empty chains. The count is fixed for the
    /// store's lifetime; there is no rehashing.
    pub(crate) fn new(bucket_count: usize) -> Self {
        let base = std::mem::size_of::<Self>()
            + bucket_count * std::mem::size_of::<Option<DefaultKey>>();
        Self {
            slots: SlotMap::with_key(),
            buckets: vec![None; bucket_count],
            key_bytes: 0,
            value_bytes: 0,
            footprint: base,
        }
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn entry_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn key_bytes(&self) -> usize {
        self.key_bytes
    }

    pub(crate) fn value_bytes(&self) -> usize {
        self.value_bytes
    }

    pub(crate) fn footprint(&self) -> usize {
        self.footprint
    }

    fn bucket_index(&self, hash: HashValue) -> usize {
        (hash % self.buckets.len() as HashValue) as usize
    }

    pub(crate) fn bucket_head(&self, bucket: usize) -> Option<DefaultKey> {
        self.buckets[bucket]
    }

    /// Add an unlinked entry to the arena and the counters. The caller is
    /// responsible for linking it into its bucket chain.
    pub(crate) fn insert(&mut self, entry: Entry) -> DefaultKey {
        self.key_bytes += entry.key.len();
        self.value_bytes += entry.value.len();
        self.footprint += entry.footprint;
        self.slots.insert(entry)
    }

    /// Remove an entry from the arena and the counters. The entry must have
    /// been unlinked from its chain first.
    pub(crate) fn remove(&mut self, slot: DefaultKey) -> Entry {
        let entry = self.slots.remove(slot).expect("live arena slot");
        debug_assert!(entry.next.is_none() && entry.previous.is_none());
        self.key_bytes -= entry.key.len();
        self.value_bytes -= entry.value.len();
        self.footprint -= entry.footprint;
        entry
    }

    /// Push `slot` onto the head of the bucket chain its cached hash resolves
    /// to.
    pub(crate) fn link_front(&mut self, slot: DefaultKey) {
        let bucket = self.bucket_index(self.slots[slot].key_hash);
        let old_head = self.buckets[bucket];
        self.slots[slot].next = old_head;
        self.slots[slot].previous = None;
        if let Some(head) = old_head {
            self.slots[head].previous = Some(slot);
        }
        self.buckets[bucket] = Some(slot);
    }

    /// Detach `slot` from its chain, fixing the previous entry's `next`, the
    /// next entry's `previous`, or the bucket head depending on position.
    pub(crate) fn unlink(&mut self, slot: DefaultKey) {
        let (previous, next, hash) = {
            let entry = &self.slots[slot];
            (entry.previous, entry.next, entry.key_hash)
        };
        match previous {
            Some(prev) => self.slots[prev].next = next,
            None => {
                let bucket = self.bucket_index(hash);
                self.buckets[bucket] = next;
            }
        }
        if let Some(next) = next {
            self.slots[next].previous = previous;
        }
        let entry = &mut self.slots[slot];
        entry.next = None;
        entry.previous = None;
    }

    /// Find the entry whose key matches `key` byte-for-byte, or `None`.
    ///
    /// Two phases, as the engine has always worked: walk the bucket chain the
    /// hash resolves to, collecting every entry whose cached hash equals
    /// `hash`, then linear-scan only those candidates for an exact key match.
    /// The scan covers the entire chain; no number of exact-hash collisions
    /// can push a key out of the candidate set.
    pub(crate) fn find_by_key(&self, hash: HashValue, key: &[u8]) -> Option<DefaultKey> {
        let mut candidates = Vec::new();
        let mut cursor = self.buckets[self.bucket_index(hash)];
        while let Some(slot) = cursor {
            let entry = &self.slots[slot];
            if entry.key_hash == hash {
                candidates.push(slot);
            }
            cursor = entry.next;
        }

        candidates
            .into_iter()
            .find(|&slot| self.slots[slot].key.matches(key))
    }

    pub(crate) fn value_of(&self, slot: DefaultKey) -> &Blob {
        self.slots[slot].value()
    }

    /// Overwrite the value in place. Only valid when the new data has the
    /// stored value's length; length changes must go through
    /// [`replace_value`](Self::replace_value).
    pub(crate) fn overwrite_value(&mut self, slot: DefaultKey, data: &[u8]) {
        self.slots[slot].value.overwrite(data);
    }

    /// Swap in a value blob of a different length, adjusting the byte and
    /// footprint counters by the size delta. Returns the old blob for
    /// release.
    pub(crate) fn replace_value(&mut self, slot: DefaultKey, value: Blob) -> Blob {
        let entry = &mut self.slots[slot];
        let old_len = entry.value.len();
        let new_len = value.len();
        entry.footprint = entry.footprint - old_len + new_len;
        self.value_bytes = self.value_bytes - old_len + new_len;
        self.footprint = self.footprint - old_len + new_len;
        std::mem::replace(&mut entry.value, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Allocator;
    use std::rc::Rc;

    fn alloc() -> Allocator {
        Allocator::new(Rc::new(|len| Vec::with_capacity(len)), Rc::new(|buf: Vec<u8>| drop(buf)))
    }

    fn entry(a: &Allocator, key: &[u8], value: &[u8], hash: HashValue) -> Entry {
        Entry::new(Blob::copy_in(a, key), Blob::copy_in(a, value), hash)
    }

    /// Invariant: insert+link makes the entry the chain head; counters track
    /// key/value bytes and footprint.
    #[test]
    fn insert_links_at_head_and_counts() {
        let a = alloc();
        let mut store = EntryStore::new(4);
        let base = store.footprint();

        let s1 = store.insert(entry(&a, b"key", b"value", 7));
        store.link_front(s1);
        assert_eq!(store.entry_count(), 1);
        assert_eq!(store.key_bytes(), 3);
        assert_eq!(store.value_bytes(), 5);
        assert_eq!(
            store.footprint(),
            base + 3 + 5 + std::mem::size_of::<Entry>()
        );
        // hash 7 with 4 buckets lands in bucket 3
        assert_eq!(store.bucket_head(3), Some(s1));

        let s2 = store.insert(entry(&a, b"other", b"v", 3));
        store.link_front(s2);
        // same bucket; the newer entry is the head
        assert_eq!(store.bucket_head(3), Some(s2));
        assert_eq!(store.entry_count(), 2);
    }

    /// Invariant: unlinking the head, an interior entry and the tail all keep
    /// the remaining chain reachable.
    #[test]
    fn unlink_at_every_position() {
        let a = alloc();
        for victim in 0..3usize {
            let mut store = EntryStore::new(1);
            let slots: Vec<_> = (0..3)
                .map(|i| {
                    let s = store.insert(entry(&a, &[i as u8], b"v", 0));
                    store.link_front(s);
                    s
                })
                .collect();
            // chain head is the last-linked entry: slots[2] -> slots[1] -> slots[0]
            store.unlink(slots[victim]);
            let _ = store.remove(slots[victim]);

            for (i, &s) in slots.iter().enumerate() {
                let found = store.find_by_key(0, &[i as u8]);
                if i == victim {
                    assert_eq!(found, None);
                } else {
                    assert_eq!(found, Some(s));
                }
            }
            assert_eq!(store.entry_count(), 2);
        }
    }

    /// Invariant: remove reverses insert's counter updates exactly.
    #[test]
    fn remove_restores_counters() {
        let a = alloc();
        let mut store = EntryStore::new(2);
        let base = store.footprint();

        let s = store.insert(entry(&a, b"k", b"vv", 1));
        store.link_front(s);
        store.unlink(s);
        let e = store.remove(s);
        let (kbuf, vbuf) = e.into_buffers();
        assert_eq!((kbuf.len(), vbuf.len()), (1, 2));
        assert_eq!(store.entry_count(), 0);
        assert_eq!(store.key_bytes(), 0);
        assert_eq!(store.value_bytes(), 0);
        assert_eq!(store.footprint(), base);
    }

    /// Invariant: the candidate scan covers the whole chain, so entries with
    /// the same exact hash remain findable regardless of how many precede
    /// them.
    #[test]
    fn find_scans_full_chain_of_equal_hashes() {
        let a = alloc();
        let mut store = EntryStore::new(1);
        let n = 12u8;
        let slots: Vec<_> = (0..n)
            .map(|i| {
                let s = store.insert(entry(&a, &[i], b"v", 42));
                store.link_front(s);
                s
            })
            .collect();
        // The earliest-linked entry sits deepest in the chain.
        for (i, &s) in slots.iter().enumerate() {
            assert_eq!(store.find_by_key(42, &[i as u8]), Some(s));
        }
        assert_eq!(store.find_by_key(42, &[n]), None);
    }

    /// Invariant: candidates are filtered by cached hash before any byte
    /// comparison; a same-bucket entry with a different hash never matches.
    #[test]
    fn find_filters_by_cached_hash() {
        let a = alloc();
        let mut store = EntryStore::new(1);
        let s1 = store.insert(entry(&a, b"k", b"v", 5));
        store.link_front(s1);
        // Same key bytes, different cached hash: invisible to a lookup for
        // hash 5 and vice versa.
        let s2 = store.insert(entry(&a, b"k", b"v", 6));
        store.link_front(s2);

        assert_eq!(store.find_by_key(5, b"k"), Some(s1));
        assert_eq!(store.find_by_key(6, b"k"), Some(s2));
        assert_eq!(store.find_by_key(7, b"k"), None);
    }

    /// Invariant: replace_value moves the counters by exactly the size delta
    /// and returns the old buffer.
    #[test]
    fn replace_value_adjusts_by_delta() {
        let a = alloc();
        let mut store = EntryStore::new(2);
        let s = store.insert(entry(&a, b"k", b"12", 0));
        store.link_front(s);
        let before = store.footprint();

        let old = store.replace_value(s, Blob::copy_in(&a, b"12345"));
        assert_eq!(old.into_buffer(), b"12".to_vec());
        assert_eq!(store.value_bytes(), 5);
        assert_eq!(store.footprint(), before + 3);

        let old = store.replace_value(s, Blob::copy_in(&a, b""));
        assert_eq!(old.into_buffer(), b"12345".to_vec());
        assert_eq!(store.value_bytes(), 0);
        assert_eq!(store.footprint(), before - 2);
    }
}

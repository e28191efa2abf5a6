//! Error codes for the `blobmap` crate.

/// Failures reported by [`BlobMap`](crate::BlobMap) operations.
///
/// Every failure is an explicit result code to the immediate caller; the
/// crate never panics on a bad definition or a missing key, and nothing is
/// retried internally.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum MapError {
    /// A required argument carried a degenerate value.
    ///
    /// The one representable case is a `bucket_count` of zero at creation:
    /// bucket resolution indexes by `hash % bucket_count`, so a map with no
    /// buckets cannot exist.
    #[error("invalid argument")]
    InvalidArgument,

    /// The creation-time definition is incomplete.
    ///
    /// Either the allocate fn or the release fn is missing, or a custom hash
    /// strategy was selected without supplying a hasher.
    #[error("invalid map definition")]
    InvalidDefinition,

    /// The map handle was already destroyed, or was never created.
    #[error("map is uninitialized")]
    Uninitialized,

    /// A lookup-dependent read found no entry for the key.
    #[error("key not in map")]
    KeyNotFound,
}

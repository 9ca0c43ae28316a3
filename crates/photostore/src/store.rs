//! The store contract consumed by the photopool engine

use async_trait::async_trait;

use crate::error::Result;

/// A single write in an atomic batch.
///
/// This is the vocabulary the bulk loader commits with: hash-field inserts
/// for the photo table and set unions for the category structures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Set one field of a hash
    HashSet {
        /// Hash key
        key: String,
        /// Field within the hash
        field: String,
        /// Serialized value
        value: String,
    },

    /// Add members to a set (ignored when `members` is empty)
    SetAdd {
        /// Set key
        key: String,
        /// Members to add
        members: Vec<String>,
    },
}

/// Contract over a shared key-value store with hashes, sets and atomic
/// batched writes.
///
/// Implementations reproduce the usual Redis collection semantics: reads of
/// absent keys behave like reads of empty collections, and a collection key
/// disappears once its last member is removed.
#[async_trait]
pub trait Store: Send + Sync {
    /// Set one field of the hash at `key`.
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()>;

    /// Read one field of the hash at `key`.
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Read every field/value pair of the hash at `key`.
    async fn hash_get_all(&self, key: &str) -> Result<Vec<(String, String)>>;

    /// Number of fields in the hash at `key` (0 when absent).
    async fn hash_len(&self, key: &str) -> Result<usize>;

    /// Delete one field of the hash at `key`. Absent fields are a no-op.
    async fn hash_del(&self, key: &str, field: &str) -> Result<()>;

    /// Pick one field of the hash at `key` uniformly at random.
    async fn hash_random_field(&self, key: &str) -> Result<Option<String>>;

    /// Add members to the set at `key`. Empty `members` is a no-op.
    async fn set_add(&self, key: &str, members: &[String]) -> Result<()>;

    /// Remove members from the set at `key`. Absent members are a no-op.
    async fn set_remove(&self, key: &str, members: &[String]) -> Result<()>;

    /// Union of the sets at `keys`, in no particular order.
    async fn set_union(&self, keys: &[String]) -> Result<Vec<String>>;

    /// Cardinality of the set at `key` (0 when absent).
    async fn set_card(&self, key: &str) -> Result<usize>;

    /// Delete a key of any kind. Absent keys are a no-op.
    async fn delete_key(&self, key: &str) -> Result<()>;

    /// All keys starting with `prefix`.
    async fn scan_keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Commit a batch of writes atomically: either every op lands or, from
    /// the point of view of a concurrent reader, none do.
    async fn apply_batch(&self, ops: Vec<BatchOp>) -> Result<()>;
}

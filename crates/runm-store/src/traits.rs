use async_trait::async_trait;

use crate::error::StoreResult;

/// Ordered key-value store.
///
/// All implementations must satisfy these invariants:
/// - Keys are compared bytewise; `range` returns entries in key order.
/// - `compare_and_swap` is atomic with respect to every other operation on
///   the same key.
/// - Concurrent use from many in-flight requests is safe.
/// - Backend failures are returned as errors, never silently ignored.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`. Returns `Ok(None)` if absent.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Unconditionally write `value` under `key`.
    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Delete `key`. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// All entries whose key starts with `prefix`, in key order.
    async fn range(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>>;

    /// Atomically replace the value under `key` if it currently equals
    /// `expected`.
    ///
    /// `expected == None` requires the key to be absent; `new == None`
    /// deletes it. Returns `false` (and changes nothing) when the current
    /// value differs from `expected`.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: Option<Vec<u8>>,
    ) -> StoreResult<bool>;
}

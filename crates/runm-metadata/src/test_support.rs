//! Fixtures shared by the service tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use runm_store::{InMemoryKvStore, KeyLayout, KvStore, MetadataStore, StoreError, StoreResult};
use runm_types::{ObjectType, ObjectTypeScope, Session};

use crate::context::RequestContext;

/// In-memory KV store that fails any operation on an injected key prefix,
/// or only the next write to one.
#[derive(Debug, Clone, Default)]
pub struct FaultyKvStore {
    inner: Arc<InMemoryKvStore>,
    fail_prefixes: Arc<Mutex<Vec<String>>>,
    write_fault: Arc<Mutex<Option<String>>>,
    latency: Option<Duration>,
}

impl FaultyKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Injects a failure for every key starting with `prefix`.
    pub fn inject_failure(&self, prefix: impl Into<String>) {
        self.fail_prefixes.lock().expect("lock").push(prefix.into());
    }

    /// Fails the next write (put or compare-and-swap) to a key starting
    /// with `prefix`, then behaves normally again.
    pub fn fail_next_write(&self, prefix: impl Into<String>) {
        *self.write_fault.lock().expect("lock") = Some(prefix.into());
    }

    fn check_write_failure(&self, key: &str) -> StoreResult<()> {
        let mut armed = self.write_fault.lock().expect("lock");
        if armed.as_deref().is_some_and(|p| key.starts_with(p)) {
            *armed = None;
            return Err(StoreError::Backend(format!("injected write failure for key: {key}")));
        }
        Ok(())
    }

    fn check_failure(&self, key: &str) -> StoreResult<()> {
        let prefixes = self.fail_prefixes.lock().expect("lock");
        if prefixes.iter().any(|p| key.starts_with(p.as_str())) {
            return Err(StoreError::Backend(format!("injected failure for key: {key}")));
        }
        Ok(())
    }

    async fn maybe_delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl KvStore for FaultyKvStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.maybe_delay().await;
        self.check_failure(key)?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.maybe_delay().await;
        self.check_failure(key)?;
        self.check_write_failure(key)?;
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        self.maybe_delay().await;
        self.check_failure(key)?;
        self.inner.delete(key).await
    }

    async fn range(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        self.maybe_delay().await;
        self.check_failure(prefix)?;
        self.inner.range(prefix).await
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: Option<Vec<u8>>,
    ) -> StoreResult<bool> {
        self.maybe_delay().await;
        self.check_failure(key)?;
        self.check_write_failure(key)?;
        self.inner.compare_and_swap(key, expected, new).await
    }
}

/// Session `alice` in project `acme`, partition `p1`.
pub fn ctx() -> RequestContext {
    RequestContext::new(Session::new("alice", "acme", "p1"))
}

pub async fn seed(store: &MetadataStore) {
    store.partition_create("p1").await.unwrap();
    store
        .object_type_create(ObjectType::new("runm.machine", ObjectTypeScope::Project))
        .await
        .unwrap();
    store
        .object_type_create(ObjectType::new("runm.provider", ObjectTypeScope::Partition))
        .await
        .unwrap();
}

/// In-memory store with partition `p1`, PROJECT-scoped `runm.machine` and
/// PARTITION-scoped `runm.provider`.
pub async fn seeded_store() -> MetadataStore {
    let store = MetadataStore::in_memory();
    seed(&store).await;
    store
}

/// Like [`seeded_store`] but backed by a [`FaultyKvStore`].
pub async fn faulty_store(kv: FaultyKvStore) -> MetadataStore {
    let store = MetadataStore::new(Arc::new(kv), KeyLayout::default());
    seed(&store).await;
    store
}

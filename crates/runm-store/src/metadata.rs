use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use runm_types::{
    matches_any, ConditionSet, Object, ObjectDraft, ObjectListFilter, ObjectType, ObjectTypeFilter,
    ObjectWithReferences, Partition, PartitionFilter, PropertyDefinition,
    PropertyDefinitionWithReferences,
};

use crate::error::{StoreError, StoreResult};
use crate::keys::KeyLayout;
use crate::memory::InMemoryKvStore;
use crate::traits::KvStore;

fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

fn decode_uuid(bytes: &[u8]) -> StoreResult<Uuid> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| StoreError::Serialization("malformed uuid index entry".into()))
}

fn uuid_bytes(uuid: &Uuid) -> Vec<u8> {
    uuid.to_string().into_bytes()
}

fn optional<T>(result: StoreResult<T>) -> StoreResult<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Typed access to metadata records stored in an ordered [`KvStore`].
///
/// Single-record lookups return [`StoreError::NotFound`] when nothing
/// matches; list operations return an empty vector instead. Creation and
/// update use compare-and-swap on the uniqueness keys, so two concurrent
/// writers can never both create the same identity.
#[derive(Clone)]
pub struct MetadataStore {
    kv: Arc<dyn KvStore>,
    keys: KeyLayout,
}

impl std::fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore")
            .field("prefix", &self.keys.prefix())
            .finish()
    }
}

impl MetadataStore {
    pub fn new(kv: Arc<dyn KvStore>, keys: KeyLayout) -> Self {
        Self { kv, keys }
    }

    /// A store backed by a fresh [`InMemoryKvStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryKvStore::new()), KeyLayout::default())
    }

    pub fn keys(&self) -> &KeyLayout {
        &self.keys
    }

    /// Empty values are fences left by name reclamation and read as absent.
    async fn load<T: DeserializeOwned>(&self, kind: &'static str, key: &str) -> StoreResult<T> {
        match self.kv.get(key).await? {
            Some(bytes) if !bytes.is_empty() => decode(&bytes),
            _ => Err(StoreError::not_found(kind, key)),
        }
    }

    async fn scan<T: DeserializeOwned>(&self, prefix: &str) -> StoreResult<Vec<T>> {
        self.kv
            .range(prefix)
            .await?
            .iter()
            .filter(|(_, bytes)| !bytes.is_empty())
            .map(|(_, bytes)| decode(bytes))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Partitions
    // -----------------------------------------------------------------------

    /// Look up a partition by UUID or, failing that, by name.
    pub async fn partition_get(&self, id: &str) -> StoreResult<Partition> {
        if let Ok(uuid) = Uuid::parse_str(id) {
            match self.load("partition", &self.keys.partition(&uuid)).await {
                Err(e) if e.is_not_found() => {}
                other => return other,
            }
        }
        match self.kv.get(&self.keys.partition_name(id)).await? {
            Some(bytes) => {
                let uuid = decode_uuid(&bytes)?;
                self.load("partition", &self.keys.partition(&uuid)).await
            }
            None => Err(StoreError::not_found("partition", id)),
        }
    }

    /// Partitions matching any filter (all partitions for an empty slice).
    pub async fn partition_list(&self, filters: &[PartitionFilter]) -> StoreResult<Vec<Partition>> {
        let all: Vec<Partition> = self.scan(&self.keys.partitions()).await?;
        Ok(all
            .into_iter()
            .filter(|p| filters.is_empty() || filters.iter().any(|f| f.matches(p)))
            .collect())
    }

    pub async fn partition_create(&self, name: &str) -> StoreResult<Partition> {
        let partition = Partition::new(name);
        let name_key = self.keys.partition_name(name);
        if !self
            .kv
            .compare_and_swap(&name_key, None, Some(uuid_bytes(&partition.uuid)))
            .await?
        {
            return Err(StoreError::AlreadyExists {
                kind: "partition",
                key: name.to_string(),
            });
        }
        self.kv
            .put(&self.keys.partition(&partition.uuid), encode(&partition)?)
            .await?;
        tracing::debug!(partition = %partition, "partition created");
        Ok(partition)
    }

    // -----------------------------------------------------------------------
    // Object types
    // -----------------------------------------------------------------------

    pub async fn object_type_get(&self, code: &str) -> StoreResult<ObjectType> {
        self.load("object type", &self.keys.object_type(code)).await
    }

    pub async fn object_type_list(&self, filters: &[ObjectTypeFilter]) -> StoreResult<Vec<ObjectType>> {
        let all: Vec<ObjectType> = self.scan(&self.keys.object_types()).await?;
        Ok(all
            .into_iter()
            .filter(|t| filters.is_empty() || filters.iter().any(|f| f.matches(t)))
            .collect())
    }

    pub async fn object_type_create(&self, object_type: ObjectType) -> StoreResult<ObjectType> {
        let key = self.keys.object_type(&object_type.code);
        if !self
            .kv
            .compare_and_swap(&key, None, Some(encode(&object_type)?))
            .await?
        {
            return Err(StoreError::AlreadyExists {
                kind: "object type",
                key: object_type.code,
            });
        }
        tracing::debug!(code = %object_type.code, scope = %object_type.scope, "object type created");
        Ok(object_type)
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    fn object_name_key(&self, object: &Object, object_type: &ObjectType) -> String {
        let project = if object_type.is_project_scoped() {
            object.project.as_deref()
        } else {
            None
        };
        self.keys
            .object_name(&object.partition, &object.object_type, project, &object.name)
    }

    /// Reserves the uniqueness key `name_key` for `uuid`.
    ///
    /// A reservation left behind by an interrupted write (the record it
    /// points at is missing, or now carries another identity) is cleared
    /// and the reservation retried once. Returns `false` when a live object
    /// holds the key.
    async fn reserve_object_name(
        &self,
        name_key: &str,
        object_type: &ObjectType,
        uuid: &Uuid,
    ) -> StoreResult<bool> {
        let id = uuid_bytes(uuid);
        if self.kv.compare_and_swap(name_key, None, Some(id.clone())).await? {
            return Ok(true);
        }
        let Some(held) = self.kv.get(name_key).await? else {
            return self.kv.compare_and_swap(name_key, None, Some(id)).await;
        };
        let holder = decode_uuid(&held)?;
        let record_key = self.keys.object(&holder);

        // Fence the holder's empty record slot so a create still in flight
        // for it can no longer land.
        let fenced = self
            .kv
            .compare_and_swap(&record_key, None, Some(Vec::new()))
            .await?;
        if !fenced && self.names_object(&record_key, object_type, name_key).await? {
            return Ok(false);
        }
        tracing::warn!(key = %name_key, %holder, "clearing stale object name reservation");
        let cleared = self
            .kv
            .compare_and_swap(name_key, Some(held.as_slice()), None)
            .await;
        if fenced {
            if let Err(e) = self
                .kv
                .compare_and_swap(&record_key, Some(b"".as_slice()), None)
                .await
            {
                tracing::warn!(key = %record_key, error = %e, "failed to lift record fence");
            }
        }
        if !cleared? {
            return Ok(false);
        }
        // A rename in flight may have landed its record meanwhile.
        if !fenced && self.names_object(&record_key, object_type, name_key).await? {
            self.kv.compare_and_swap(name_key, None, Some(held)).await?;
            return Ok(false);
        }
        self.kv.compare_and_swap(name_key, None, Some(id)).await
    }

    /// Whether the record under `record_key` is a live object whose
    /// uniqueness key is `name_key`.
    async fn names_object(
        &self,
        record_key: &str,
        object_type: &ObjectType,
        name_key: &str,
    ) -> StoreResult<bool> {
        let record: Option<Object> = optional(self.load("object", record_key).await)?;
        Ok(record.is_some_and(|o| self.object_name_key(&o, object_type) == name_key))
    }

    /// Best-effort release of a reservation this writer holds. A failure is
    /// logged; the next reservation attempt clears the leftover.
    async fn release_object_name(&self, name_key: &str, id: &[u8]) {
        if let Err(e) = self.kv.compare_and_swap(name_key, Some(id), None).await {
            tracing::warn!(key = %name_key, error = %e, "failed to release object name reservation");
        }
    }

    async fn holds_object_name(&self, name_key: &str, id: &[u8]) -> StoreResult<bool> {
        Ok(self.kv.get(name_key).await?.as_deref() == Some(id))
    }

    pub async fn object_get(&self, uuid: &Uuid) -> StoreResult<Object> {
        self.load("object", &self.keys.object(uuid)).await
    }

    /// Objects matching any list filter (all objects for an empty slice).
    pub async fn object_list(&self, filters: &[ObjectListFilter]) -> StoreResult<Vec<Object>> {
        let all: Vec<Object> = self.scan(&self.keys.objects()).await?;
        Ok(all
            .into_iter()
            .filter(|o| filters.is_empty() || filters.iter().any(|f| f.matches(o)))
            .collect())
    }

    /// Objects matching any condition set, with partition and type resolved.
    pub async fn object_list_with_references(
        &self,
        conditions: &[ConditionSet],
    ) -> StoreResult<Vec<ObjectWithReferences>> {
        let all: Vec<Object> = self.scan(&self.keys.objects()).await?;
        let matched = all
            .into_iter()
            .filter(|o| matches_any(conditions, o))
            .collect();
        self.objects_with_references(matched).await
    }

    /// Resolves the partition and object type of each object.
    ///
    /// Objects whose partition or type no longer exists are skipped.
    pub async fn objects_with_references(
        &self,
        objects: Vec<Object>,
    ) -> StoreResult<Vec<ObjectWithReferences>> {
        let mut partitions: HashMap<Uuid, Option<Partition>> = HashMap::new();
        let mut types: HashMap<String, Option<ObjectType>> = HashMap::new();
        let mut out = Vec::with_capacity(objects.len());

        for object in objects {
            if !partitions.contains_key(&object.partition) {
                let found =
                    optional(self.load("partition", &self.keys.partition(&object.partition)).await)?;
                partitions.insert(object.partition, found);
            }
            if !types.contains_key(&object.object_type) {
                let found = optional(self.object_type_get(&object.object_type).await)?;
                types.insert(object.object_type.clone(), found);
            }
            match (&partitions[&object.partition], &types[&object.object_type]) {
                (Some(partition), Some(object_type)) => out.push(ObjectWithReferences {
                    partition: partition.clone(),
                    object_type: object_type.clone(),
                    object,
                }),
                _ => tracing::warn!(uuid = %object.uuid, "object references a missing partition or type; skipping"),
            }
        }
        Ok(out)
    }

    /// Creates an object, assigning a UUID unless the draft carries one.
    ///
    /// The uniqueness key is reserved first; if a live object holds it the
    /// call fails with [`StoreError::AlreadyExists`] and nothing is written.
    /// A failed record write releases the reservation again.
    pub async fn object_create(&self, draft: ObjectDraft) -> StoreResult<ObjectWithReferences> {
        let uuid = draft.uuid.unwrap_or_else(Uuid::now_v7);
        let owr = draft.into_object(uuid);
        let name_key = self.object_name_key(&owr.object, &owr.object_type);
        let record = encode(&owr.object)?;
        let id = uuid_bytes(&uuid);

        if !self.reserve_object_name(&name_key, &owr.object_type, &uuid).await? {
            return Err(StoreError::AlreadyExists {
                kind: "object",
                key: owr.object.name,
            });
        }
        let record_key = self.keys.object(&uuid);
        match self
            .kv
            .compare_and_swap(&record_key, None, Some(record.clone()))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                self.release_object_name(&name_key, &id).await;
                return Err(StoreError::AlreadyExists {
                    kind: "object",
                    key: uuid.to_string(),
                });
            }
            Err(e) => {
                self.release_object_name(&name_key, &id).await;
                return Err(e);
            }
        }
        // Another writer may have judged the reservation stale while the
        // record was still unwritten.
        if !self.holds_object_name(&name_key, &id).await? {
            self.kv
                .compare_and_swap(&record_key, Some(record.as_slice()), None)
                .await?;
            return Err(StoreError::AlreadyExists {
                kind: "object",
                key: owr.object.name,
            });
        }
        tracing::debug!(%uuid, key = %name_key, "object record written");
        Ok(owr)
    }

    /// Replaces `before` with `after`, which must share its UUID.
    ///
    /// Fails with [`StoreError::Conflict`] if the stored record no longer
    /// equals `before`, and with [`StoreError::AlreadyExists`] if a rename
    /// collides with another object.
    pub async fn object_update(
        &self,
        before: &ObjectWithReferences,
        after: ObjectWithReferences,
    ) -> StoreResult<ObjectWithReferences> {
        let uuid = before.object.uuid;
        if after.object.uuid != uuid {
            return Err(StoreError::Conflict {
                kind: "object",
                key: uuid.to_string(),
            });
        }
        let id = uuid_bytes(&uuid);
        let old_name = self.object_name_key(&before.object, &before.object_type);
        let new_name = self.object_name_key(&after.object, &after.object_type);
        let renamed = old_name != new_name;
        let expected = encode(&before.object)?;
        let replacement = encode(&after.object)?;

        if renamed && !self.reserve_object_name(&new_name, &after.object_type, &uuid).await? {
            return Err(StoreError::AlreadyExists {
                kind: "object",
                key: after.object.name,
            });
        }

        let record_key = self.keys.object(&uuid);
        let swapped = self
            .kv
            .compare_and_swap(&record_key, Some(expected.as_slice()), Some(replacement.clone()))
            .await;
        if renamed && !matches!(swapped, Ok(true)) {
            self.release_object_name(&new_name, &id).await;
        }
        if !swapped? {
            return Err(StoreError::Conflict {
                kind: "object",
                key: uuid.to_string(),
            });
        }
        if renamed {
            if !self.holds_object_name(&new_name, &id).await? {
                self.kv
                    .compare_and_swap(&record_key, Some(replacement.as_slice()), Some(expected))
                    .await?;
                return Err(StoreError::AlreadyExists {
                    kind: "object",
                    key: after.object.name,
                });
            }
            self.release_object_name(&old_name, &id).await;
        }
        tracing::debug!(%uuid, renamed, "object record replaced");
        Ok(after)
    }

    /// Deletes the record, then its uniqueness key.
    ///
    /// Once the record is gone the delete has happened; a failure to clear
    /// the key is only logged, since a key without a record is reclaimed by
    /// the next reservation.
    pub async fn object_delete(&self, owr: &ObjectWithReferences) -> StoreResult<()> {
        let uuid = owr.object.uuid;
        if !self.kv.delete(&self.keys.object(&uuid)).await? {
            return Err(StoreError::not_found("object", uuid.to_string()));
        }
        let name_key = self.object_name_key(&owr.object, &owr.object_type);
        self.release_object_name(&name_key, &uuid_bytes(&uuid)).await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Property definitions
    // -----------------------------------------------------------------------

    /// The definition bound to exactly this (partition, type, key) triple.
    pub async fn property_definition_get(
        &self,
        partition: &Uuid,
        object_type: &str,
        key: &str,
    ) -> StoreResult<PropertyDefinition> {
        let index = self.keys.property_definition_key(partition, object_type, key);
        match self.kv.get(&index).await? {
            Some(bytes) => {
                let uuid = decode_uuid(&bytes)?;
                self.load("property definition", &self.keys.property_definition(&uuid))
                    .await
            }
            None => Err(StoreError::not_found("property definition", index)),
        }
    }

    /// Definitions matching any condition set, with references resolved.
    pub async fn property_definition_list(
        &self,
        conditions: &[ConditionSet],
    ) -> StoreResult<Vec<PropertyDefinitionWithReferences>> {
        let all: Vec<PropertyDefinition> = self.scan(&self.keys.property_definitions()).await?;
        let mut partitions: HashMap<Uuid, Option<Partition>> = HashMap::new();
        let mut types: HashMap<String, Option<ObjectType>> = HashMap::new();
        let mut out = Vec::new();

        for definition in all.into_iter().filter(|d| matches_any(conditions, d)) {
            if !partitions.contains_key(&definition.partition) {
                let found = optional(
                    self.load("partition", &self.keys.partition(&definition.partition)).await,
                )?;
                partitions.insert(definition.partition, found);
            }
            if !types.contains_key(&definition.object_type) {
                let found = optional(self.object_type_get(&definition.object_type).await)?;
                types.insert(definition.object_type.clone(), found);
            }
            if let (Some(partition), Some(object_type)) =
                (&partitions[&definition.partition], &types[&definition.object_type])
            {
                out.push(PropertyDefinitionWithReferences {
                    partition: partition.clone(),
                    object_type: object_type.clone(),
                    definition,
                });
            }
        }
        Ok(out)
    }

    /// Creates or replaces the definition for its (partition, type, key)
    /// triple. An existing definition keeps its UUID.
    pub async fn property_definition_set(
        &self,
        mut pdwr: PropertyDefinitionWithReferences,
    ) -> StoreResult<PropertyDefinitionWithReferences> {
        let def = &pdwr.definition;
        let index = self
            .keys
            .property_definition_key(&def.partition, &def.object_type, &def.key);

        match self.kv.get(&index).await? {
            Some(bytes) => {
                let uuid = decode_uuid(&bytes)?;
                let record_key = self.keys.property_definition(&uuid);
                let existing = self.kv.get(&record_key).await?;
                pdwr.definition.uuid = uuid;
                let swapped = self
                    .kv
                    .compare_and_swap(&record_key, existing.as_deref(), Some(encode(&pdwr.definition)?))
                    .await?;
                if !swapped {
                    return Err(StoreError::Conflict {
                        kind: "property definition",
                        key: pdwr.definition.key,
                    });
                }
                tracing::debug!(%uuid, key = %pdwr.definition.key, "property definition replaced");
            }
            None => {
                if pdwr.definition.uuid.is_nil() {
                    pdwr.definition.uuid = Uuid::now_v7();
                }
                let uuid = pdwr.definition.uuid;
                if !self
                    .kv
                    .compare_and_swap(&index, None, Some(uuid_bytes(&uuid)))
                    .await?
                {
                    return Err(StoreError::AlreadyExists {
                        kind: "property definition",
                        key: pdwr.definition.key,
                    });
                }
                self.kv
                    .put(&self.keys.property_definition(&uuid), encode(&pdwr.definition)?)
                    .await?;
                tracing::debug!(%uuid, key = %pdwr.definition.key, "property definition created");
            }
        }
        Ok(pdwr)
    }

    pub async fn property_definition_delete(
        &self,
        pdwr: &PropertyDefinitionWithReferences,
    ) -> StoreResult<()> {
        let def = &pdwr.definition;
        if !self.kv.delete(&self.keys.property_definition(&def.uuid)).await? {
            return Err(StoreError::not_found("property definition", def.uuid.to_string()));
        }
        let index = self
            .keys
            .property_definition_key(&def.partition, &def.object_type, &def.key);
        self.kv
            .compare_and_swap(&index, Some(&uuid_bytes(&def.uuid)), None)
            .await?;
        Ok(())
    }
}

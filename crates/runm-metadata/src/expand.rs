//! Filter expansion: turning caller filters into concrete list filters.
//!
//! A caller filter may name partitions and object types by prefix, so one
//! filter can stand for many (partition, type) scopes. Expansion resolves
//! those against storage and emits one list filter per scope, each carrying
//! the caller's residual search terms.

use runm_store::MetadataStore;
use runm_types::{
    ObjectFilter, ObjectListFilter, ObjectType, ObjectTypeFilter, Partition, PartitionFilter,
    PropertyDefinitionFilter, PropertyDefinitionListFilter,
};

use crate::context::RequestContext;
use crate::error::{MetadataError, MetadataResult};

/// A concrete (partition, optional object type) pair.
pub type Scope = (Partition, Option<ObjectType>);

async fn resolve_partitions(
    store: &MetadataStore,
    ctx: &RequestContext,
    filter: Option<&PartitionFilter>,
) -> MetadataResult<Vec<Partition>> {
    match filter {
        Some(f) => {
            let found = ctx
                .call("expanding partition filter", store.partition_list(std::slice::from_ref(f)))
                .await?;
            if found.is_empty() {
                return Err(MetadataError::NotFound(format!("partition '{}'", f.search)));
            }
            Ok(found)
        }
        None => {
            let id = &ctx.session.partition;
            match ctx.store(store.partition_get(id)).await {
                Ok(p) => Ok(vec![p]),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(partition = %id, "session partition does not exist");
                    Ok(Vec::new())
                }
                Err(e) => Err(MetadataError::from_store("resolving session partition", e)),
            }
        }
    }
}

/// `None` means "any type".
async fn resolve_object_types(
    store: &MetadataStore,
    ctx: &RequestContext,
    filter: Option<&ObjectTypeFilter>,
) -> MetadataResult<Option<Vec<ObjectType>>> {
    let Some(f) = filter else {
        return Ok(None);
    };
    let found = ctx
        .call("expanding object type filter", store.object_type_list(std::slice::from_ref(f)))
        .await?;
    if found.is_empty() {
        return Err(MetadataError::NotFound(format!("object type '{}'", f.search)));
    }
    Ok(Some(found))
}

/// Resolves partition and type sub-filters into the cross-product of
/// concrete scopes.
///
/// Fails with `NotFound` when an explicit sub-filter matches nothing. An
/// unknown session partition yields no scopes rather than an error.
pub async fn scopes(
    store: &MetadataStore,
    ctx: &RequestContext,
    partition: Option<&PartitionFilter>,
    object_type: Option<&ObjectTypeFilter>,
) -> MetadataResult<Vec<Scope>> {
    let partitions = resolve_partitions(store, ctx, partition).await?;
    let types = resolve_object_types(store, ctx, object_type).await?;

    let mut out = Vec::new();
    for p in &partitions {
        match &types {
            None => out.push((p.clone(), None)),
            Some(types) => out.extend(types.iter().map(|t| (p.clone(), Some(t.clone())))),
        }
    }
    Ok(out)
}

/// Expands one object filter. The project defaults to the session's.
pub async fn expand(
    store: &MetadataStore,
    ctx: &RequestContext,
    filter: &ObjectFilter,
) -> MetadataResult<Vec<ObjectListFilter>> {
    let project = if filter.project.is_empty() {
        ctx.session.project().map(String::from)
    } else {
        Some(filter.project.clone())
    };
    let scopes = scopes(store, ctx, filter.partition.as_ref(), filter.object_type.as_ref()).await?;
    Ok(scopes
        .into_iter()
        .map(|(partition, object_type)| ObjectListFilter {
            partition,
            object_type,
            project: project.clone(),
            search: filter.search.clone(),
            use_prefix: filter.use_prefix,
        })
        .collect())
}

/// Expands one property definition filter.
pub async fn expand_property_definitions(
    store: &MetadataStore,
    ctx: &RequestContext,
    filter: &PropertyDefinitionFilter,
) -> MetadataResult<Vec<PropertyDefinitionListFilter>> {
    let scopes = scopes(store, ctx, filter.partition.as_ref(), filter.object_type.as_ref()).await?;
    Ok(scopes
        .into_iter()
        .map(|(partition, object_type)| PropertyDefinitionListFilter {
            partition,
            object_type,
            key: filter.key.clone(),
            use_prefix: filter.use_prefix,
        })
        .collect())
}

/// Adds an expansion result to the union, skipping filters whose partition
/// or type does not exist.
fn absorb<T: PartialEq>(out: &mut Vec<T>, expanded: MetadataResult<Vec<T>>) -> MetadataResult<()> {
    match expanded {
        Ok(filters) => {
            for f in filters {
                if !out.contains(&f) {
                    out.push(f);
                }
            }
            Ok(())
        }
        Err(MetadataError::NotFound(what)) => {
            tracing::debug!(%what, "filter matched nothing; skipping");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Expands a batch of object filters with OR semantics.
///
/// With no filters the session default (session partition, any type,
/// session project) applies. When filters were given but none of them
/// resolves, the result is empty: it never falls back to the default.
pub async fn normalize_any(
    store: &MetadataStore,
    ctx: &RequestContext,
    filters: &[ObjectFilter],
) -> MetadataResult<Vec<ObjectListFilter>> {
    if filters.is_empty() {
        return absorb_default(expand(store, ctx, &ObjectFilter::default()).await);
    }
    let mut out = Vec::new();
    for f in filters {
        absorb(&mut out, expand(store, ctx, f).await)?;
    }
    Ok(out)
}

/// [`normalize_any`] for property definition filters.
pub async fn normalize_property_definition_filters(
    store: &MetadataStore,
    ctx: &RequestContext,
    filters: &[PropertyDefinitionFilter],
) -> MetadataResult<Vec<PropertyDefinitionListFilter>> {
    if filters.is_empty() {
        let default = PropertyDefinitionFilter::default();
        return absorb_default(expand_property_definitions(store, ctx, &default).await);
    }
    let mut out = Vec::new();
    for f in filters {
        absorb(&mut out, expand_property_definitions(store, ctx, f).await)?;
    }
    Ok(out)
}

fn absorb_default<T: PartialEq>(expanded: MetadataResult<Vec<T>>) -> MetadataResult<Vec<T>> {
    let mut out = Vec::new();
    absorb(&mut out, expanded)?;
    Ok(out)
}

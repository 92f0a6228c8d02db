//! Object identity: which stored object, if any, an incoming draft names.
//!
//! A draft carrying a UUID names that object and nothing else. Without one,
//! identity is the uniqueness scope of the object's type: partition, type
//! and name, plus the project for PROJECT-scoped types. A set operation
//! resolves identity first, then either creates, updates in place, or does
//! nothing when [`object_changed`] reports no difference.

use runm_store::MetadataStore;
use runm_types::{Condition, ConditionSet, Object, ObjectDraft, ObjectWithReferences};

use crate::context::RequestContext;
use crate::error::{MetadataError, MetadataResult};

/// Conditions that locate the stored object a draft refers to.
///
/// A supplied UUID is the whole identity. Otherwise the object is named by
/// partition, type and name, plus project for PROJECT-scoped types.
pub fn identity_conditions(draft: &ObjectDraft) -> ConditionSet {
    if let Some(uuid) = draft.uuid {
        return ConditionSet::new().with(Condition::uuid_equal(uuid));
    }
    let mut set = ConditionSet::new()
        .with(Condition::partition_equal(&draft.partition))
        .with(Condition::object_type_equal(&draft.object_type))
        .with(Condition::name_equal(draft.name.as_str()));
    if draft.object_type.is_project_scoped() {
        if let Some(project) = &draft.project {
            set.push(Condition::project_equal(project.as_str()));
        }
    }
    set
}

/// Finds the existing object for `draft`, if any.
///
/// More than one match means the uniqueness invariant was broken and is
/// reported as a conflict.
pub async fn resolve(
    store: &MetadataStore,
    ctx: &RequestContext,
    draft: &ObjectDraft,
) -> MetadataResult<Option<ObjectWithReferences>> {
    let conditions = identity_conditions(draft);
    let mut found = ctx
        .call(
            "resolving object identity",
            store.object_list_with_references(std::slice::from_ref(&conditions)),
        )
        .await?;
    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop()),
        n => {
            tracing::error!(%conditions, matches = n, "identity matched multiple objects");
            Err(MetadataError::Conflict(format!(
                "multiple objects match '{}'",
                draft.name
            )))
        }
    }
}

/// Returns `true` if `incoming` differs from `existing` in anything a set
/// can change. Tags compare as sets.
pub fn object_changed(existing: &Object, incoming: &Object) -> bool {
    existing.partition != incoming.partition
        || existing.object_type != incoming.object_type
        || existing.uuid != incoming.uuid
        || existing.name != incoming.name
        || existing.project != incoming.project
        || existing.tag_set() != incoming.tag_set()
        || existing.properties != incoming.properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, seeded_store};
    use runm_types::{ConditionKind, ObjectType, ObjectTypeScope, Partition};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn draft(scope: ObjectTypeScope, project: Option<&str>) -> ObjectDraft {
        ObjectDraft {
            partition: Partition::new("p1"),
            object_type: ObjectType::new("runm.machine", scope),
            uuid: None,
            name: "web-01".into(),
            project: project.map(String::from),
            tags: vec!["a".into(), "b".into()],
            properties: BTreeMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // 1. Identity conditions
    // -----------------------------------------------------------------------
    #[test]
    fn uuid_alone_identifies() {
        let mut d = draft(ObjectTypeScope::Project, Some("acme"));
        d.uuid = Some(Uuid::now_v7());
        let set = identity_conditions(&d);
        assert_eq!(set.conditions().len(), 1);
        assert!(set.get(ConditionKind::Uuid).is_some());
    }

    #[test]
    fn project_scope_adds_project_term() {
        let set = identity_conditions(&draft(ObjectTypeScope::Project, Some("acme")));
        assert!(set.get(ConditionKind::Project).is_some());
        assert!(set.get(ConditionKind::Name).is_some());

        let set = identity_conditions(&draft(ObjectTypeScope::Partition, Some("acme")));
        assert!(set.get(ConditionKind::Project).is_none());
        assert!(set.get(ConditionKind::Partition).is_some());
    }

    // -----------------------------------------------------------------------
    // 2. Change detection
    // -----------------------------------------------------------------------
    #[test]
    fn tag_order_is_not_a_change() {
        let a = draft(ObjectTypeScope::Project, Some("acme")).into_object(Uuid::nil()).object;
        let mut b = a.clone();
        b.tags.reverse();
        assert!(!object_changed(&a, &b));

        b.tags.push("c".into());
        assert!(object_changed(&a, &b));
    }

    #[test]
    fn property_values_are_compared() {
        let a = draft(ObjectTypeScope::Project, Some("acme")).into_object(Uuid::nil()).object;
        let mut b = a.clone();
        b.properties.insert("arch".into(), "arm64".into());
        assert!(object_changed(&a, &b));

        let mut c = a.clone();
        c.project = Some("globex".into());
        assert!(object_changed(&a, &c));
    }

    // -----------------------------------------------------------------------
    // 3. Resolution against storage
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn resolve_finds_by_name_or_uuid() {
        let store = seeded_store().await;
        let partition = store.partition_get("p1").await.unwrap();
        let machine = store.object_type_get("runm.machine").await.unwrap();
        let mut d = draft(ObjectTypeScope::Project, Some("acme"));
        d.partition = partition;
        d.object_type = machine;

        assert!(resolve(&store, &ctx(), &d).await.unwrap().is_none());
        let created = store.object_create(d.clone()).await.unwrap();

        let by_name = resolve(&store, &ctx(), &d).await.unwrap().unwrap();
        assert_eq!(by_name.object.uuid, created.object.uuid);

        let mut by_uuid = d.clone();
        by_uuid.uuid = Some(created.object.uuid);
        by_uuid.name = "renamed".into();
        let found = resolve(&store, &ctx(), &by_uuid).await.unwrap().unwrap();
        assert_eq!(found.object.name, "web-01");

        let mut other_project = d.clone();
        other_project.project = Some("globex".into());
        assert!(resolve(&store, &ctx(), &other_project).await.unwrap().is_none());
    }
}

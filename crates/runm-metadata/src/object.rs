//! Object operations: set (create or update), get, list and batch delete.

use runm_store::StoreError;
use runm_types::{Object, ObjectDraft, ObjectFilter, ObjectWithReferences};

use crate::context::RequestContext;
use crate::error::{DeleteResponse, MetadataError, MetadataResult};
use crate::expand;
use crate::identity;
use crate::payload::ObjectDocument;
use crate::service::MetadataService;

impl MetadataService {
    /// Decodes and validates an object payload into a draft with resolved
    /// references. Nothing is written.
    async fn object_draft(&self, ctx: &RequestContext, payload: &str) -> MetadataResult<ObjectDraft> {
        let doc = ObjectDocument::decode(payload)?;
        let partition = ctx
            .call("validating partition", self.store.partition_get(&doc.partition))
            .await?;
        let object_type = ctx
            .call("validating object type", self.store.object_type_get(&doc.object_type))
            .await?;

        let mut project = doc.project.clone().filter(|p| !p.is_empty());
        if object_type.is_project_scoped() && project.is_none() {
            project = ctx.session.project().map(String::from);
            if project.is_none() {
                return Err(MetadataError::InvalidInput(format!(
                    "project is required for objects of type '{}'",
                    object_type.code
                )));
            }
        }

        let properties = doc.properties()?;
        self.validate_properties(ctx, &partition, &object_type, &properties)
            .await?;

        Ok(ObjectDraft {
            partition,
            object_type,
            uuid: doc.uuid,
            name: doc.name,
            project,
            tags: doc.tags,
            properties,
        })
    }

    /// Creates the object described by `payload`, or updates the object it
    /// identifies. Setting an unchanged object writes nothing.
    pub async fn object_set(&self, ctx: &RequestContext, payload: &str) -> MetadataResult<Object> {
        ctx.check_session()?;
        let draft = self.object_draft(ctx, payload).await?;

        let mut retried = false;
        loop {
            if let Some(existing) = identity::resolve(&self.store, ctx, &draft).await? {
                return self.object_apply(ctx, existing, draft).await;
            }
            if draft.name.is_empty() {
                return Err(MetadataError::InvalidInput(
                    "name is required to create an object".into(),
                ));
            }
            match ctx.store(self.store.object_create(draft.clone())).await {
                Ok(created) => {
                    tracing::info!(
                        uuid = %created.object.uuid,
                        object_type = %created.object_type.code,
                        partition = %created.partition.uuid,
                        name = %created.object.name,
                        "created object"
                    );
                    return Ok(created.object);
                }
                Err(StoreError::AlreadyExists { .. }) if !retried => {
                    tracing::debug!(name = %draft.name, "lost create race; resolving identity again");
                    retried = true;
                }
                Err(e) => return Err(MetadataError::from_store("creating object", e)),
            }
        }
    }

    /// Compares `existing` with the draft and updates it when they differ.
    /// The stored UUID always wins; an omitted name keeps the stored one.
    async fn object_apply(
        &self,
        ctx: &RequestContext,
        existing: ObjectWithReferences,
        mut draft: ObjectDraft,
    ) -> MetadataResult<Object> {
        if draft.name.is_empty() {
            draft.name = existing.object.name.clone();
        }
        let uuid = existing.object.uuid;
        let incoming = draft.into_object(uuid);
        if !identity::object_changed(&existing.object, &incoming.object) {
            tracing::debug!(%uuid, "no changes to object");
            return Ok(existing.object);
        }
        let updated = ctx
            .call("updating object", self.store.object_update(&existing, incoming))
            .await?;
        tracing::info!(%uuid, "updated object");
        Ok(updated.object)
    }

    /// The single object matching `filter`.
    pub async fn object_get(&self, ctx: &RequestContext, filter: &ObjectFilter) -> MetadataResult<Object> {
        ctx.check_session()?;
        let filters = expand::expand(&self.store, ctx, filter).await?;
        if filters.is_empty() {
            return Err(MetadataError::PreconditionFailed(
                "failed to expand object filters".into(),
            ));
        }
        let mut objects = ctx
            .call("getting object", self.store.object_list(&filters))
            .await?;
        match objects.len() {
            0 => Err(MetadataError::NotFound("object".into())),
            1 => objects.pop().ok_or(MetadataError::Internal),
            _ => Err(MetadataError::PreconditionFailed(
                "multiple objects match the filter".into(),
            )),
        }
    }

    /// Objects matching any of `filters`; the session default applies when
    /// none are given.
    pub async fn object_list(&self, ctx: &RequestContext, filters: &[ObjectFilter]) -> MetadataResult<Vec<Object>> {
        ctx.check_session()?;
        let filters = expand::normalize_any(&self.store, ctx, filters).await?;
        if filters.is_empty() {
            return Ok(Vec::new());
        }
        ctx.call("listing objects", self.store.object_list(&filters))
            .await
    }

    /// Deletes every object matching any of `filters`.
    ///
    /// At least one filter is required. Each object is deleted
    /// independently; failures are collected and reported as
    /// [`MetadataError::DeleteFailed`] alongside the number deleted.
    pub async fn object_delete(&self, ctx: &RequestContext, filters: &[ObjectFilter]) -> MetadataResult<DeleteResponse> {
        ctx.check_session()?;
        if filters.is_empty() {
            return Err(MetadataError::PreconditionFailed(
                "at least one object filter is required".into(),
            ));
        }
        let filters = expand::normalize_any(&self.store, ctx, filters).await?;
        if filters.is_empty() {
            return Ok(DeleteResponse::default());
        }

        let objects = ctx
            .call("listing objects to delete", self.store.object_list(&filters))
            .await?;
        let owrs = ctx
            .call("resolving objects to delete", self.store.objects_with_references(objects))
            .await?;

        let mut response = DeleteResponse::default();
        for owr in &owrs {
            let uuid = owr.object.uuid;
            match ctx.store(self.store.object_delete(owr)).await {
                Ok(()) => {
                    tracing::info!(user = %ctx.session.user, %uuid, "deleted object");
                    response.num_deleted += 1;
                }
                Err(e) => {
                    tracing::error!(%uuid, error = %e, "failed to delete object");
                    response.errors.push(format!("failed to delete object {uuid}"));
                }
            }
        }

        if response.is_success() {
            Ok(response)
        } else {
            Err(MetadataError::DeleteFailed(response))
        }
    }
}

//! Property definition operations.
//!
//! A property definition binds a value schema (and permission grants) to a
//! property key of one object type in one partition. Object sets validate
//! property values against the matching definition.

use runm_schema::translate_permissions;
use runm_types::{
    ConditionSet, PropertyDefinition, PropertyDefinitionFilter, PropertyDefinitionListFilter,
    PropertyDefinitionWithReferences,
};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::{DeleteResponse, MetadataError, MetadataResult};
use crate::expand;
use crate::payload::PropertyDefinitionDocument;
use crate::service::MetadataService;

fn conditions(filters: &[PropertyDefinitionListFilter]) -> Vec<ConditionSet> {
    filters.iter().map(PropertyDefinitionListFilter::conditions).collect()
}

impl MetadataService {
    /// Creates or replaces the definition described by `payload`.
    ///
    /// Unknown schema type or format names are dropped with a warning. An
    /// existing definition for the same (partition, type, key) keeps its
    /// UUID.
    pub async fn property_definition_set(
        &self,
        ctx: &RequestContext,
        payload: &str,
    ) -> MetadataResult<PropertyDefinitionWithReferences> {
        ctx.check_session()?;
        let doc = PropertyDefinitionDocument::decode(payload)?;
        let partition = ctx
            .call("validating partition", self.store.partition_get(&doc.partition))
            .await?;
        let object_type = ctx
            .call("validating object type", self.store.object_type_get(&doc.object_type))
            .await?;

        let translated = doc.schema.translate()?;

        let pdwr = PropertyDefinitionWithReferences {
            definition: PropertyDefinition {
                uuid: Uuid::nil(),
                partition: partition.uuid,
                object_type: object_type.code.clone(),
                key: doc.key,
                required: doc.required,
                schema: translated.schema,
                permissions: translate_permissions(&doc.permissions),
            },
            partition,
            object_type,
        };
        let saved = ctx
            .call("saving property definition", self.store.property_definition_set(pdwr))
            .await?;
        tracing::info!(
            uuid = %saved.definition.uuid,
            partition = %saved.partition.uuid,
            object_type = %saved.object_type.code,
            key = %saved.definition.key,
            "saved property definition"
        );
        Ok(saved)
    }

    /// The single definition matching `filter`.
    pub async fn property_definition_get(
        &self,
        ctx: &RequestContext,
        filter: &PropertyDefinitionFilter,
    ) -> MetadataResult<PropertyDefinitionWithReferences> {
        ctx.check_session()?;
        let filters = expand::expand_property_definitions(&self.store, ctx, filter).await?;
        if filters.is_empty() {
            return Err(MetadataError::PreconditionFailed(
                "failed to expand property definition filters".into(),
            ));
        }
        let mut found = ctx
            .call(
                "getting property definition",
                self.store.property_definition_list(&conditions(&filters)),
            )
            .await?;
        match found.len() {
            0 => Err(MetadataError::NotFound("property definition".into())),
            1 => found.pop().ok_or(MetadataError::Internal),
            _ => Err(MetadataError::PreconditionFailed(
                "multiple property definitions match the filter".into(),
            )),
        }
    }

    pub async fn property_definition_list(
        &self,
        ctx: &RequestContext,
        filters: &[PropertyDefinitionFilter],
    ) -> MetadataResult<Vec<PropertyDefinitionWithReferences>> {
        ctx.check_session()?;
        let filters = expand::normalize_property_definition_filters(&self.store, ctx, filters).await?;
        if filters.is_empty() {
            return Ok(Vec::new());
        }
        ctx.call(
            "listing property definitions",
            self.store.property_definition_list(&conditions(&filters)),
        )
        .await
    }

    /// Best-effort batch delete; see [`MetadataService::object_delete`].
    pub async fn property_definition_delete(
        &self,
        ctx: &RequestContext,
        filters: &[PropertyDefinitionFilter],
    ) -> MetadataResult<DeleteResponse> {
        ctx.check_session()?;
        if filters.is_empty() {
            return Err(MetadataError::PreconditionFailed(
                "at least one property definition filter is required".into(),
            ));
        }
        let filters = expand::normalize_property_definition_filters(&self.store, ctx, filters).await?;
        if filters.is_empty() {
            return Ok(DeleteResponse::default());
        }
        let found = ctx
            .call(
                "listing property definitions to delete",
                self.store.property_definition_list(&conditions(&filters)),
            )
            .await?;

        let mut response = DeleteResponse::default();
        for pdwr in &found {
            let uuid = pdwr.definition.uuid;
            match ctx.store(self.store.property_definition_delete(pdwr)).await {
                Ok(()) => {
                    tracing::info!(user = %ctx.session.user, %uuid, key = %pdwr.definition.key, "deleted property definition");
                    response.num_deleted += 1;
                }
                Err(e) => {
                    tracing::error!(%uuid, error = %e, "failed to delete property definition");
                    response
                        .errors
                        .push(format!("failed to delete property definition {uuid}"));
                }
            }
        }

        if response.is_success() {
            Ok(response)
        } else {
            Err(MetadataError::PropertyDefinitionDeleteFailed(response))
        }
    }
}

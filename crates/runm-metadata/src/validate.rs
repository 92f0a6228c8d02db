//! Property values checked against their bound definitions.

use std::collections::BTreeMap;

use runm_types::{Condition, ConditionSet, ObjectType, Partition};

use crate::context::RequestContext;
use crate::error::{MetadataError, MetadataResult};
use crate::service::MetadataService;

impl MetadataService {
    /// Checks one property value against the definition bound to exactly
    /// (partition, type, key). Keys without a definition accept any value.
    pub async fn validate_property(
        &self,
        ctx: &RequestContext,
        partition: &Partition,
        object_type: &ObjectType,
        key: &str,
        value: &str,
    ) -> MetadataResult<()> {
        let lookup = self
            .store
            .property_definition_get(&partition.uuid, &object_type.code, key);
        let definition = match ctx.store(lookup).await {
            Ok(definition) => definition,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(MetadataError::from_store("looking up property definition", e)),
        };

        let result = self.validator.validate(key, value, &definition.schema)?;
        match result.failure {
            None => Ok(()),
            Some(reason) => Err(MetadataError::ValidationFailed {
                key: key.to_string(),
                reason,
            }),
        }
    }

    /// Validates every supplied value, then checks that each definition
    /// marked `required` for (partition, type) has a value.
    pub async fn validate_properties(
        &self,
        ctx: &RequestContext,
        partition: &Partition,
        object_type: &ObjectType,
        properties: &BTreeMap<String, String>,
    ) -> MetadataResult<()> {
        for (key, value) in properties {
            self.validate_property(ctx, partition, object_type, key, value)
                .await?;
        }

        let scope = ConditionSet::new()
            .with(Condition::partition_equal(partition))
            .with(Condition::object_type_equal(object_type));
        let definitions = ctx
            .call(
                "listing required property definitions",
                self.store.property_definition_list(&[scope]),
            )
            .await?;
        for pdwr in definitions {
            let def = pdwr.definition;
            if def.required && !properties.contains_key(&def.key) {
                return Err(MetadataError::ValidationFailed {
                    key: def.key,
                    reason: "required property is missing".into(),
                });
            }
        }
        Ok(())
    }
}

use std::sync::Arc;

use runm_schema::SchemaValidator;
use runm_store::MetadataStore;

/// The metadata service core.
///
/// Stateless apart from its handles, so it is cheap to clone into every
/// request handler. Operations live in [`crate::object`],
/// [`crate::property_definition`] and [`crate::validate`].
#[derive(Clone)]
pub struct MetadataService {
    pub(crate) store: MetadataStore,
    pub(crate) validator: Arc<SchemaValidator>,
}

impl MetadataService {
    /// A service validating property values with the default check pipeline.
    pub fn new(store: MetadataStore) -> Self {
        Self::with_validator(store, SchemaValidator::with_default_checks())
    }

    pub fn with_validator(store: MetadataStore, validator: SchemaValidator) -> Self {
        Self {
            store,
            validator: Arc::new(validator),
        }
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }
}

impl std::fmt::Debug for MetadataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataService")
            .field("store", &self.store)
            .field("checks", &self.validator.check_count())
            .finish()
    }
}

use std::sync::Arc;

use tokio::net::TcpListener;

use runm_metadata::MetadataService;
use runm_store::{InMemoryKvStore, KeyLayout, MetadataStore, StoreError};
use runm_types::ObjectType;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// The runm metadata HTTP server.
pub struct MetadataServer {
    config: ServerConfig,
    service: MetadataService,
}

impl MetadataServer {
    /// A server over a fresh in-memory store.
    pub fn new(config: ServerConfig) -> Self {
        let store = MetadataStore::new(
            Arc::new(InMemoryKvStore::new()),
            KeyLayout::new(&config.storage.key_prefix),
        );
        Self::with_store(config, store)
    }

    pub fn with_store(config: ServerConfig, store: MetadataStore) -> Self {
        Self {
            config,
            service: MetadataService::new(store),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn service(&self) -> &MetadataService {
        &self.service
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState {
            service: self.service.clone(),
            service_name: self.config.service_name.clone(),
            request_timeout: self.config.request_timeout(),
        })
    }

    /// Creates the configured partitions and object types that do not
    /// exist yet. Existing records are left alone.
    pub async fn bootstrap(&self) -> ServerResult<()> {
        let store = self.service.store();
        for name in &self.config.bootstrap.partitions {
            match store.partition_get(name).await {
                Ok(_) => continue,
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(ServerError::Bootstrap(e.to_string())),
            }
            match store.partition_create(name).await {
                Ok(p) => tracing::info!(partition = %p, "bootstrapped partition"),
                Err(StoreError::AlreadyExists { .. }) => {}
                Err(e) => return Err(ServerError::Bootstrap(e.to_string())),
            }
        }
        for seed in &self.config.bootstrap.object_types {
            match store.object_type_create(ObjectType::from(seed)).await {
                Ok(t) => tracing::info!(code = %t.code, scope = %t.scope, "bootstrapped object type"),
                Err(StoreError::AlreadyExists { .. }) => {
                    tracing::debug!(code = %seed.code, "object type already exists");
                }
                Err(e) => return Err(ServerError::Bootstrap(e.to_string())),
            }
        }
        Ok(())
    }

    /// Bootstrap, then start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        self.bootstrap().await?;
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            service = %self.config.service_name,
            addr = %self.config.bind_addr,
            "metadata server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all metadata endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health))
        .route("/v1/objects/set", post(handler::object_set))
        .route("/v1/objects/get", post(handler::object_get))
        .route("/v1/objects/list", post(handler::object_list))
        .route("/v1/objects/delete", post(handler::object_delete))
        .route("/v1/property-definitions/set", post(handler::property_definition_set))
        .route("/v1/property-definitions/get", post(handler::property_definition_get))
        .route("/v1/property-definitions/list", post(handler::property_definition_list))
        .route("/v1/property-definitions/delete", post(handler::property_definition_delete))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use std::time::Duration;

use axum::extract::State;
use axum::Json;

use runm_metadata::{DeleteResponse, MetadataService, RequestContext};
use runm_types::{
    Object, ObjectFilter, PropertyDefinitionFilter, PropertyDefinitionWithReferences, Session,
};

use crate::api::{
    AnyRequest, GetRequest, HealthResponse, ObjectSetResponse, PropertyDefinitionSetResponse,
    SetRequest,
};
use crate::error::ApiError;

/// Shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: MetadataService,
    pub service_name: String,
    pub request_timeout: Option<Duration>,
}

impl AppState {
    fn context(&self, session: Session) -> RequestContext {
        let ctx = RequestContext::new(session);
        match self.request_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        service: state.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

pub async fn object_set(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> ApiResult<ObjectSetResponse> {
    let ctx = state.context(req.session);
    let object = state.service.object_set(&ctx, &req.payload).await?;
    Ok(Json(ObjectSetResponse { object }))
}

pub async fn object_get(
    State(state): State<AppState>,
    Json(req): Json<GetRequest<ObjectFilter>>,
) -> ApiResult<Object> {
    let ctx = state.context(req.session);
    Ok(Json(state.service.object_get(&ctx, &req.filter).await?))
}

pub async fn object_list(
    State(state): State<AppState>,
    Json(req): Json<AnyRequest<ObjectFilter>>,
) -> ApiResult<Vec<Object>> {
    let ctx = state.context(req.session);
    Ok(Json(state.service.object_list(&ctx, &req.any).await?))
}

pub async fn object_delete(
    State(state): State<AppState>,
    Json(req): Json<AnyRequest<ObjectFilter>>,
) -> ApiResult<DeleteResponse> {
    let ctx = state.context(req.session);
    Ok(Json(state.service.object_delete(&ctx, &req.any).await?))
}

// ---------------------------------------------------------------------------
// Property definitions
// ---------------------------------------------------------------------------

pub async fn property_definition_set(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> ApiResult<PropertyDefinitionSetResponse> {
    let ctx = state.context(req.session);
    let property_definition = state
        .service
        .property_definition_set(&ctx, &req.payload)
        .await?;
    Ok(Json(PropertyDefinitionSetResponse { property_definition }))
}

pub async fn property_definition_get(
    State(state): State<AppState>,
    Json(req): Json<GetRequest<PropertyDefinitionFilter>>,
) -> ApiResult<PropertyDefinitionWithReferences> {
    let ctx = state.context(req.session);
    Ok(Json(state.service.property_definition_get(&ctx, &req.filter).await?))
}

pub async fn property_definition_list(
    State(state): State<AppState>,
    Json(req): Json<AnyRequest<PropertyDefinitionFilter>>,
) -> ApiResult<Vec<PropertyDefinitionWithReferences>> {
    let ctx = state.context(req.session);
    Ok(Json(state.service.property_definition_list(&ctx, &req.any).await?))
}

pub async fn property_definition_delete(
    State(state): State<AppState>,
    Json(req): Json<AnyRequest<PropertyDefinitionFilter>>,
) -> ApiResult<DeleteResponse> {
    let ctx = state.context(req.session);
    Ok(Json(state.service.property_definition_delete(&ctx, &req.any).await?))
}

//! HTTP server for the runm metadata service.
//!
//! Exposes the metadata operations as JSON-over-HTTP endpoints under `/v1`
//! and maps service errors onto status codes.

pub mod api;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{BootstrapConfig, ObjectTypeSeed, ServerConfig, StorageConfig};
pub use error::{ApiError, ErrorBody, ServerError, ServerResult};
pub use handler::AppState;
pub use server::MetadataServer;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use runm_metadata::DeleteResponse;
    use runm_types::{Object, ObjectTypeScope};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    async fn app() -> Router {
        let mut config = ServerConfig::default();
        config.bootstrap.partitions = vec!["p1".into()];
        config.bootstrap.object_types.push(ObjectTypeSeed {
            code: "runm.machine".into(),
            scope: ObjectTypeScope::Project,
            description: String::new(),
        });
        let server = MetadataServer::new(config);
        server.bootstrap().await.unwrap();
        server.router()
    }

    fn session() -> Value {
        json!({"user": "alice", "project": "acme", "partition": "p1"})
    }

    async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn set_machine(app: &Router, name: &str) -> Object {
        let payload = format!("partition: p1\ntype: runm.machine\nname: {name}\n");
        let (status, body) = post(
            app,
            "/v1/objects/set",
            json!({"session": session(), "payload": payload}),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        serde_json::from_value(body["object"].clone()).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = app().await;
        let response = app
            .oneshot(Request::builder().uri("/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: api::HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.service, "runmachine-metadata");
    }

    #[tokio::test]
    async fn set_get_list_delete() {
        let app = app().await;
        let web = set_machine(&app, "web-01").await;
        set_machine(&app, "web-02").await;

        let (status, body) = post(
            &app,
            "/v1/objects/get",
            json!({"session": session(), "filter": {"search": "web-01"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uuid"], web.uuid.to_string());

        let (status, body) = post(&app, "/v1/objects/list", json!({"session": session()})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = post(
            &app,
            "/v1/objects/delete",
            json!({"session": session(), "any": [{"search": "web-", "use_prefix": true}]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let response: DeleteResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.num_deleted, 2);
    }

    #[tokio::test]
    async fn error_kinds_map_to_statuses() {
        let app = app().await;

        let (status, body) = post(
            &app,
            "/v1/objects/list",
            json!({"session": {"user": "", "partition": "p1"}}),
        )
        .await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body["kind"], "precondition_failed");

        let (status, _) = post(
            &app,
            "/v1/objects/set",
            json!({"session": session(), "payload": "type: runm.machine\nname: x\n"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post(
            &app,
            "/v1/objects/get",
            json!({"session": session(), "filter": {"search": "missing"}}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");

        let (status, _) = post(&app, "/v1/objects/delete", json!({"session": session(), "any": []})).await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    }

    #[tokio::test]
    async fn validation_failure_names_key() {
        let app = app().await;
        let definition = "partition: p1\ntype: runm.machine\nkey: arch\nschema:\n  type: [string]\n  max_length: 6\n";
        let (status, body) = post(
            &app,
            "/v1/property-definitions/set",
            json!({"session": session(), "payload": definition}),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["property_definition"]["definition"]["key"], "arch");

        let payload = "partition: p1\ntype: runm.machine\nname: web\nproperties:\n  arch: x86_64_v4\n";
        let (status, body) = post(
            &app,
            "/v1/objects/set",
            json!({"session": session(), "payload": payload}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "validation_failed");
        assert_eq!(body["key"], "arch");
    }

    #[tokio::test]
    async fn property_definition_endpoints() {
        let app = app().await;
        for key in ["arch", "cores"] {
            let payload = format!("partition: p1\ntype: runm.machine\nkey: {key}\n");
            let (status, _) = post(
                &app,
                "/v1/property-definitions/set",
                json!({"session": session(), "payload": payload}),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = post(
            &app,
            "/v1/property-definitions/get",
            json!({"session": session(), "filter": {"key": "cores"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["definition"]["key"], "cores");

        let (_, body) = post(&app, "/v1/property-definitions/list", json!({"session": session()})).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = post(
            &app,
            "/v1/property-definitions/delete",
            json!({"session": session(), "any": [{"key": "arch"}]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["num_deleted"], 1);
    }
}

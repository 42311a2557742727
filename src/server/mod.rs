//! HTTP surface over the record store.
//!
//! JSON over REST, one route pair per record kind. The handlers translate
//! store errors into status codes; validation itself stays in the store
//! layer so this surface and the interactive session enforce identical
//! rules.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::store::{InventoryDraft, RecordStore, StoreError};

/// Store handle shared across handlers. Requests take the lock for the
/// duration of one store call; every mutation is serialized behind it.
pub type SharedStore = Arc<Mutex<Box<dyn RecordStore>>>;

pub fn shared(store: Box<dyn RecordStore>) -> SharedStore {
    Arc::new(Mutex::new(store))
}

fn lock(store: &SharedStore) -> MutexGuard<'_, Box<dyn RecordStore>> {
    store.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Deserialize)]
struct CreateUnitRequest {
    name: String,
}

pub fn build_router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/inventory", get(list_inventory).post(create_inventory))
        .route("/api/inventory/:id", delete(delete_inventory))
        .route(
            "/api/packaging-units",
            get(list_packaging_units).post(create_packaging_unit),
        )
        .route("/api/packaging-units/:id", delete(delete_packaging_unit))
        .layer(Extension(store))
}

/// Binds `addr` and serves the router until the process exits.
pub fn serve(addr: &str, store: SharedStore) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async {
        let app = build_router(store);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        crate::log(&format!("API listening on {}", listener.local_addr()?));
        axum::serve(listener, app).await?;
        Ok(())
    })
}

fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

fn store_error_to_response(err: StoreError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        StoreError::InvalidDraft(_) => json_error(StatusCode::BAD_REQUEST, "invalid_draft", message),
        StoreError::InvalidUnitName(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_unit_name", message)
        }
        StoreError::DuplicateUnit(_) => {
            json_error(StatusCode::BAD_REQUEST, "duplicate_unit", message)
        }
        StoreError::ProtectedUnit => json_error(StatusCode::BAD_REQUEST, "protected_unit", message),
        StoreError::Load(_) | StoreError::Save(_) | StoreError::Delete(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
        }
    }
}

async fn list_inventory(Extension(store): Extension<SharedStore>) -> axum::response::Response {
    match lock(&store).inventory() {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => store_error_to_response(e),
    }
}

async fn create_inventory(
    Extension(store): Extension<SharedStore>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let draft: InventoryDraft = match serde_json::from_value(body) {
        Ok(draft) => draft,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, "invalid_draft", e.to_string()),
    };

    match lock(&store).add_inventory(draft) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => store_error_to_response(e),
    }
}

async fn delete_inventory(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: i64 = match id.parse() {
        Ok(id) => id,
        Err(_) => return json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid record id"),
    };

    match lock(&store).delete_inventory(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error_to_response(e),
    }
}

async fn list_packaging_units(Extension(store): Extension<SharedStore>) -> axum::response::Response {
    match lock(&store).packaging_units() {
        Ok(units) => (StatusCode::OK, Json(units)).into_response(),
        Err(e) => store_error_to_response(e),
    }
}

async fn create_packaging_unit(
    Extension(store): Extension<SharedStore>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let request: CreateUnitRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, "invalid_unit_name", e.to_string()),
    };

    match lock(&store).add_packaging_unit(&request.name) {
        Ok(unit) => (StatusCode::CREATED, Json(unit)).into_response(),
        Err(e) => store_error_to_response(e),
    }
}

async fn delete_packaging_unit(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: i64 = match id.parse() {
        Ok(id) => id,
        Err(_) => return json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid unit id"),
    };

    match lock(&store).delete_packaging_unit(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error_to_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router() -> Router {
        build_router(shared(Box::new(MemStore::new(true))))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn delete_req(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_inventory_roundtrip() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(post(
                "/api/inventory",
                json!({
                    "productNumber": "8801234567",
                    "packagingUnit": "카톤",
                    "quantity": 5
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["productNumber"], "8801234567");
        assert_eq!(created["id"], 1);

        let response = app.clone().oneshot(get_req("/api/inventory")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(delete_req("/api/inventory/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.clone().oneshot(get_req("/api/inventory")).await.unwrap();
        assert!(body_json(response).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_inventory_bad_schema_is_400() {
        let app = test_router();
        let response = app
            .oneshot(post("/api/inventory", json!({"productNumber": "1234"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_draft");
    }

    #[tokio::test]
    async fn test_create_inventory_invalid_quantity_is_400() {
        let app = test_router();
        let response = app
            .oneshot(post(
                "/api/inventory",
                json!({
                    "productNumber": "1234",
                    "packagingUnit": "카톤",
                    "quantity": 0
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_non_numeric_id_is_400() {
        let app = test_router();
        let response = app
            .oneshot(delete_req("/api/inventory/abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_id");
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_still_204() {
        let app = test_router();
        let response = app
            .oneshot(delete_req("/api/inventory/999"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_packaging_units_sorted_and_seeded() {
        let app = test_router();
        let response = app
            .oneshot(get_req("/api/packaging-units"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let units = body_json(response).await;
        let names: Vec<_> = units
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["name"].as_str().unwrap().to_string())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_unit_is_400() {
        let app = test_router();
        let response = app
            .clone()
            .oneshot(post("/api/packaging-units", json!({"name": "박스"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(post("/api/packaging-units", json!({"name": "박스"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "duplicate_unit");
    }

    #[tokio::test]
    async fn test_protected_unit_delete_is_400() {
        let app = test_router();
        // Seeded defaults get ids 1..3.
        let response = app
            .oneshot(delete_req("/api/packaging-units/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "protected_unit");
    }
}

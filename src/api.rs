// 🌐 REST API - receipt intake and points lookup over Axum
//
// Routes:
//   GET  /status
//   POST /receipts/process
//   GET  /receipts
//   GET  /receipts/:id
//   GET  /receipts/:id/points
//
// Every error body is {"error": "<message>"}.

use crate::config::Config;
use crate::error::{ParseError, StoreError, ValidationError};
use crate::points::score;
use crate::receipt::Receipt;
use crate::store::ReceiptStore;
use crate::validation::{is_guid, validate};
use axum::{
    body::{to_bytes, Body},
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Largest receipt body accepted
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: ReceiptStore,
    read_timeout: Duration,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing content-type header.")]
    MissingContentType,

    #[error("Unsupported content type. Only `application/json` is supported.")]
    UnsupportedContentType,

    #[error("Timed out reading the request body.")]
    BodyTimeout,

    #[error("The receipt is invalid.")]
    MalformedReceipt,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("invalid receipt id format")]
    InvalidId,

    #[error("no receipt found")]
    NotFound,

    #[error("unknown error")]
    Store(#[from] StoreError),

    #[error("unknown error while calculating receipt points")]
    Scoring(#[from] ParseError),

    #[error("Route not found.")]
    NoRoute,

    #[error("Method not allowed.")]
    NoMethod,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingContentType
            | ApiError::MalformedReceipt
            | ApiError::Invalid(_)
            | ApiError::InvalidId => StatusCode::BAD_REQUEST,
            // a non-JSON body is a 405 here, not a 415
            ApiError::UnsupportedContentType | ApiError::NoMethod => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BodyTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::NotFound | ApiError::NoRoute => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Scoring(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Build the application router with tracing, CORS and timeouts applied
pub fn app(store: ReceiptStore, config: &Config) -> Router {
    let state = AppState {
        store,
        read_timeout: config.read_timeout,
    };

    Router::new()
        .route("/status", get(status).fallback(no_method))
        .route("/receipts/process", post(process_receipt).fallback(no_method))
        .route("/receipts", get(list_receipts).fallback(no_method))
        .route("/receipts/:id", get(get_receipt).fallback(no_method))
        .route("/receipts/:id/points", get(get_points).fallback(no_method))
        .fallback(no_route)
        .with_state(state)
        .layer(TimeoutLayer::new(config.write_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /status - Health check
async fn status() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

/// POST /receipts/process - Validate and store a receipt, returning its new id
async fn process_receipt(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<Value>, ApiError> {
    let content_type = headers.get(CONTENT_TYPE).ok_or(ApiError::MissingContentType)?;
    let is_json = content_type
        .to_str()
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err(ApiError::UnsupportedContentType);
    }

    let bytes = tokio::time::timeout(state.read_timeout, to_bytes(body, MAX_BODY_BYTES))
        .await
        .map_err(|_| ApiError::BodyTimeout)?
        .map_err(|e| {
            tracing::debug!(error = %e, "unable to read receipt body");
            ApiError::MalformedReceipt
        })?;

    // a client-supplied id is never trusted; the store assigns one
    let receipt = serde_json::from_slice::<Receipt>(&bytes)
        .map_err(|e| {
            tracing::debug!(error = %e, "unable to decode receipt");
            ApiError::MalformedReceipt
        })?
        .without_id();

    validate(&receipt)?;

    let id = state.store.insert(receipt).map_err(|e| {
        tracing::error!(error = %e, "error while inserting receipt record");
        e
    })?;
    tracing::info!(%id, "stored receipt");

    Ok(Json(json!({ "id": id })))
}

/// GET /receipts - All stored receipts
async fn list_receipts(State(state): State<AppState>) -> Result<Json<Vec<Receipt>>, ApiError> {
    let receipts = state.store.all()?;
    Ok(Json(receipts.iter().map(|r| r.as_ref().clone()).collect()))
}

/// GET /receipts/:id - One receipt
async fn get_receipt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Receipt>, ApiError> {
    let receipt = find_receipt(&state, &id)?;
    Ok(Json(receipt.as_ref().clone()))
}

/// GET /receipts/:id/points - Points awarded to one receipt
async fn get_points(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let receipt = find_receipt(&state, &id)?;

    let points = score(&receipt).map_err(|e| {
        tracing::error!(%id, error = %e, "error while calculating points");
        e
    })?;

    Ok(Json(json!({ "points": points })))
}

async fn no_route() -> ApiError {
    ApiError::NoRoute
}

async fn no_method() -> ApiError {
    ApiError::NoMethod
}

fn find_receipt(state: &AppState, id: &str) -> Result<Arc<Receipt>, ApiError> {
    if !is_guid(id) {
        tracing::warn!(id, "invalid receipt id provided");
        return Err(ApiError::InvalidId);
    }

    state.store.get(id)?.ok_or_else(|| {
        tracing::info!(id, "no receipt found");
        ApiError::NotFound
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    const TARGET_ID: &str = "392abbcf-4783-49f4-901c-ae0c708783df";

    const TARGET_RECEIPT: &str = r#"{
        "retailer": "Target",
        "purchaseDate": "2022-01-01",
        "purchaseTime": "13:01",
        "items": [
            {"shortDescription": "Mountain Dew 12PK", "price": "6.49"},
            {"shortDescription": "Emils Cheese Pizza", "price": "12.25"},
            {"shortDescription": "Knorr Creamy Chicken", "price": "1.26"},
            {"shortDescription": "Doritos Nacho Cheese", "price": "3.35"},
            {"shortDescription": "   Klarbrunn 12-PK 12 FL OZ  ", "price": "12.00"}
        ],
        "total": "35.35"
    }"#;

    fn test_app() -> Router {
        let store = ReceiptStore::with_example_data().unwrap();
        app(store, &Config::default())
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/receipts/process")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_status() {
        let (status, body) = send(test_app(), get_request("/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "OK" }));
    }

    #[tokio::test]
    async fn test_process_then_score() {
        let app = test_app();

        let (status, body) = send(app.clone(), post_json(TARGET_RECEIPT)).await;
        assert_eq!(status, StatusCode::OK);
        let id = body["id"].as_str().unwrap().to_string();
        assert!(is_guid(&id));

        let (status, body) = send(app.clone(), get_request(&format!("/receipts/{id}/points"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "points": 28 }));

        let (status, body) = send(app, get_request(&format!("/receipts/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["retailer"], "Target");
        assert_eq!(body["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_client_supplied_id_is_replaced() {
        let mut receipt: Value = serde_json::from_str(TARGET_RECEIPT).unwrap();
        receipt["id"] = json!(TARGET_ID);

        let (status, body) = send(test_app(), post_json(&receipt.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(body["id"], TARGET_ID);
    }

    #[tokio::test]
    async fn test_process_requires_content_type() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/receipts/process")
            .body(Body::from(TARGET_RECEIPT))
            .unwrap();

        let (status, body) = send(test_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing content-type header.");
    }

    #[tokio::test]
    async fn test_process_rejects_non_json_content_type() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/receipts/process")
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::from(TARGET_RECEIPT))
            .unwrap();

        let (status, body) = send(test_app(), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body["error"],
            "Unsupported content type. Only `application/json` is supported."
        );
    }

    #[tokio::test]
    async fn test_process_rejects_malformed_json() {
        let (status, body) = send(test_app(), post_json(r#"{"retailer": "Target"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "The receipt is invalid.");
    }

    #[tokio::test]
    async fn test_process_reports_every_validation_failure() {
        let receipt = r#"{
            "retailer": "Target!",
            "purchaseDate": "2022-01-01",
            "purchaseTime": "1pm",
            "items": [],
            "total": "35.35"
        }"#;

        let (status, body) = send(test_app(), post_json(receipt)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "The receipt is invalid. invalid retailer, invalid purchaseTime value, \
             at least one receipt item must be provided"
        );
    }

    #[tokio::test]
    async fn test_list_receipts() {
        let (status, body) = send(test_app(), get_request("/receipts")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 4);
        assert_eq!(body[0]["id"], TARGET_ID);
    }

    #[tokio::test]
    async fn test_points_for_example_receipt() {
        let uri = "/receipts/cbf19128-6408-4b47-9d20-08c2e84a9341/points";
        let (status, body) = send(test_app(), get_request(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "points": 109 }));
    }

    #[tokio::test]
    async fn test_braced_id_is_found() {
        let uri = format!("/receipts/%7B{TARGET_ID}%7D/points");
        let (status, body) = send(test_app(), get_request(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "points": 28 }));
    }

    #[tokio::test]
    async fn test_bad_id_format() {
        let (status, body) = send(test_app(), get_request("/receipts/not-a-guid/points")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid receipt id format");
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let uri = "/receipts/00000000-0000-4000-8000-000000000000";
        let (status, body) = send(test_app(), get_request(uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no receipt found");
    }

    #[tokio::test]
    async fn test_unscorable_receipt_is_server_error() {
        let store = ReceiptStore::new();
        let id = store
            .insert(Receipt::new(
                "Target",
                "2022-02-30",
                "13:01",
                "1.00",
                vec![crate::receipt::ReceiptItem::new("Pepsi", "1.00")],
            ))
            .unwrap();
        let app = app(store, &Config::default());

        let (status, body) = send(app, get_request(&format!("/receipts/{id}/points"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "unknown error while calculating receipt points");
    }

    #[tokio::test]
    async fn test_large_price_scores_without_overflow() {
        let receipt = r#"{
            "retailer": "T",
            "purchaseDate": "2022-01-02",
            "purchaseTime": "10:00",
            "items": [
                {"shortDescription": "Pep", "price": "99999999999.00"},
                {"shortDescription": "Pep", "price": "99999999999.00"}
            ],
            "total": "199999999998.00"
        }"#;
        let app = test_app();

        let (status, body) = send(app.clone(), post_json(receipt)).await;
        assert_eq!(status, StatusCode::OK);
        let id = body["id"].as_str().unwrap().to_string();

        let (status, body) = send(app, get_request(&format!("/receipts/{id}/points"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "points": 40_000_000_081u64 }));
    }

    #[tokio::test]
    async fn test_no_route_and_no_method() {
        let (status, body) = send(test_app(), get_request("/nowhere")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found.");

        let (status, body) = send(test_app(), get_request("/receipts/process")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed.");
    }
}

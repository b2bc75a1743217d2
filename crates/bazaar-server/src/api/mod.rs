mod collections;
mod marketplace;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use bazaar_catalog::CatalogDataset;
use bazaar_core::{CatalogKind, LineItem};
use bazaar_store::{Cart, Wishlist, DEMO_USER_HEADER};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{demo_user, request_id, RequestId, REQUEST_ID_HEADER};

/// Collections keyed by demo user, then by collection name.
pub type CollectionMap = HashMap<String, HashMap<&'static str, Vec<LineItem>>>;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogDataset>,
    pub collections: Arc<RwLock<CollectionMap>>,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: CatalogDataset) -> Self {
        Self {
            catalog: Arc::new(catalog),
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    studios: usize,
    materials: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderName::from_static(DEMO_USER_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cart", get(collections::list::<Cart>))
        .route("/cart/add", post(collections::add::<Cart>))
        .route("/cart/update", post(collections::update_cart))
        .route("/cart/remove", post(collections::remove::<Cart>))
        .route("/wishlist", get(collections::list::<Wishlist>))
        .route("/wishlist/add", post(collections::add::<Wishlist>))
        .route("/wishlist/remove", post(collections::remove::<Wishlist>))
        .route("/marketplace/{kind}", get(marketplace::query_marketplace))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(axum::middleware::from_fn(demo_user)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            studios: state.catalog.entities(CatalogKind::Studios).len(),
            materials: state.catalog.entities(CatalogKind::Materials).len(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}


#[cfg(test)]
#[path = "symmetry_test.rs"]
mod symmetry_tests;

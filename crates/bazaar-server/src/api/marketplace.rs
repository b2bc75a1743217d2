use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use bazaar_catalog::{evaluate, CatalogError, CatalogMeta, CatalogResponse, QueryParams};
use bazaar_core::CatalogKind;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

/// `GET /marketplace/{kind}`: filters the dataset, aggregates facets over
/// the filtered set, then paginates.
pub(super) async fn query_marketplace(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(kind): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let kind: CatalogKind = kind
        .parse()
        .map_err(|e: String| ApiError::new(req_id.0.clone(), "not_found", e))?;

    let params = QueryParams::from_query_pairs(kind, pairs)
        .and_then(|params| params.validate().map(|()| params))
        .map_err(|e| map_catalog_error(&req_id, &e))?;

    let result = evaluate(state.catalog.entities(kind), &params);
    tracing::debug!(%kind, total = result.total, "marketplace query evaluated");

    Ok(Json(CatalogResponse {
        items: result.items,
        meta: CatalogMeta {
            total: Some(result.total),
            page: Some(result.page),
            page_size: Some(result.page_size),
            facets: result.facets.into(),
        },
    }))
}

fn map_catalog_error(req_id: &RequestId, error: &CatalogError) -> ApiError {
    match error {
        CatalogError::InvalidParams(message) => {
            ApiError::new(req_id.0.clone(), "validation_error", message.clone())
        }
        other => {
            tracing::error!(error = %other, "marketplace query failed");
            ApiError::new(req_id.0.clone(), "internal_error", "marketplace query failed")
        }
    }
}

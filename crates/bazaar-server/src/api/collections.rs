//! Reference implementation of the cart and wishlist endpoints.
//!
//! Write bodies go through the same normalization the client applies to
//! remote records, and merges follow the client's [`CollectionKind`] rules,
//! so a client in local fallback and this server agree on the result.

use axum::{extract::State, Extension, Json};
use bazaar_core::{normalize_line_item, LineItem, RemoteLineItem, UpstreamItem};
use bazaar_store::{Cart, CollectionKind};
use serde::{Deserialize, Serialize};

use crate::middleware::{DemoUser, RequestId};

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CollectionBody {
    items: Vec<LineItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateBody {
    product_id: serde_json::Value,
    quantity: i64,
}

pub(super) async fn list<K: CollectionKind>(
    State(state): State<AppState>,
    Extension(user): Extension<DemoUser>,
) -> Json<CollectionBody> {
    let collections = state.collections.read().await;
    let items = collections
        .get(&user.0)
        .and_then(|by_kind| by_kind.get(K::NAME))
        .cloned()
        .unwrap_or_default();
    Json(CollectionBody { items })
}

pub(super) async fn add<K: CollectionKind>(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<DemoUser>,
    Json(body): Json<RemoteLineItem>,
) -> Result<Json<CollectionBody>, ApiError> {
    let item = K::prepare(normalize_body(&req_id, body)?);
    let items = mutate::<K>(&state, &user, |items| {
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => K::merge(existing, &item),
            None => items.push(item),
        }
    })
    .await;
    Ok(Json(CollectionBody { items }))
}

pub(super) async fn update_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<DemoUser>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<CollectionBody>, ApiError> {
    let id = normalize_body(
        &req_id,
        RemoteLineItem {
            product_id: Some(body.product_id),
            ..RemoteLineItem::default()
        },
    )?
    .id;

    let items = mutate::<Cart>(&state, &user, |items| {
        if body.quantity <= 0 {
            items.retain(|i| i.id != id);
        } else if let Some(existing) = items.iter_mut().find(|i| i.id == id) {
            existing.quantity = u32::try_from(body.quantity).unwrap_or(u32::MAX);
        }
    })
    .await;
    Ok(Json(CollectionBody { items }))
}

pub(super) async fn remove<K: CollectionKind>(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<DemoUser>,
    Json(body): Json<RemoteLineItem>,
) -> Result<Json<CollectionBody>, ApiError> {
    let id = normalize_body(&req_id, body)?.id;
    let items = mutate::<K>(&state, &user, |items| items.retain(|i| i.id != id)).await;
    Ok(Json(CollectionBody { items }))
}

fn normalize_body(req_id: &RequestId, body: RemoteLineItem) -> Result<LineItem, ApiError> {
    let item = normalize_line_item(UpstreamItem::Remote(body));
    if item.id.is_empty() {
        return Err(ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "productId is required",
        ));
    }
    Ok(item)
}

/// Applies `f` to the user's collection under the write lock and returns
/// the resulting snapshot.
async fn mutate<K: CollectionKind>(
    state: &AppState,
    user: &DemoUser,
    f: impl FnOnce(&mut Vec<LineItem>),
) -> Vec<LineItem> {
    let mut collections = state.collections.write().await;
    let items = collections
        .entry(user.0.clone())
        .or_default()
        .entry(K::NAME)
        .or_default();
    f(items);
    tracing::debug!(
        collection = K::NAME,
        user = %user.0,
        size = items.len(),
        "collection updated"
    );
    items.clone()
}

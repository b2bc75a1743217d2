use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use bazaar_store::DEMO_USER_HEADER;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Partition used for requests that carry no demo identity.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Demo identity the request's collections are partitioned under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DemoUser(pub String);

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is inserted into request
/// extensions as [`RequestId`] and echoed on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    res
}

/// Axum middleware that reads the optional demo identity header into a
/// [`DemoUser`] extension. Blank or missing values map to
/// [`ANONYMOUS_USER`].
pub async fn demo_user(mut req: Request, next: Next) -> Response {
    let user = req
        .headers()
        .get(DEMO_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS_USER)
        .to_owned();

    req.extensions_mut().insert(DemoUser(user));
    next.run(req).await
}

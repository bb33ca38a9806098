use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use jdb_store::DocumentStore;
use jdb_tree::DocPath;
use serde_json::Value;
use tracing::debug;

use crate::api::{self, Reply, Verb};
use crate::error::ServerResult;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
}

/// Catch-all handler: every method on every path lands here.
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let path = DocPath::from_uri_path(uri.path())?;
    let body = json_body(&headers, &body);
    let verb = Verb::parse(method.as_str());
    Ok(api::handle(&state.store, verb, &path, body).await.into_response())
}

/// The request body as JSON, when it is declared and parses as such.
fn json_body(headers: &HeaderMap, body: &[u8]) -> Option<Value> {
    let content_type = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if !essence.eq_ignore_ascii_case("application/json") {
        return None;
    }
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "ignoring unparseable JSON body");
            None
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Ok(node) => (StatusCode::OK, Json(node)).into_response(),
            Reply::OkEmpty => StatusCode::OK.into_response(),
            Reply::NoContent => StatusCode::NO_CONTENT.into_response(),
            Reply::NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

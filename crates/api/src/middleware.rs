use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

/// Shared-secret credential for the privileged routes.
#[derive(Clone)]
pub struct ApiKeyState {
    pub api_key: Arc<String>,
}

impl ApiKeyState {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key: Arc::new(api_key),
        }
    }
}

/// Rejects requests whose `x-api-key` header does not match the shared
/// secret.
pub async fn api_key_middleware(
    State(state): State<ApiKeyState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let presented = extract_api_key(req.headers())?;

    if presented != state.api_key.as_str() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(req).await)
}

fn extract_api_key(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers.get("x-api-key").ok_or(StatusCode::UNAUTHORIZED)?;

    let key = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?.trim();
    if key.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(key)
}

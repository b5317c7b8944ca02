//! Bearer-token middleware for protected routes.
//!
//! The token comes from the env var named by `config.server.api_token_env`
//! (default `MH_API_TOKEN`), read once at startup; only its SHA-256 digest
//! is kept. With no token configured every request passes (dev mode).

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::error_response;
use crate::state::AppState;

pub async fn require_api_token(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected_hash) = &state.api_token_hash else {
        return next.run(req).await;
    };

    let provided = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    // Compare fixed-length digests in constant time.
    let provided_hash = Sha256::digest(provided.as_bytes());
    if !bool::from(provided_hash.as_slice().ct_eq(expected_hash.as_slice())) {
        return error_response(StatusCode::UNAUTHORIZED, "invalid or missing API token");
    }

    next.run(req).await
}

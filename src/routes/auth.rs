/**
 * Authentication Routes
 * HTTP Basic authentication for the admin surface
 */
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::errors::ApiError;
use crate::state::AppState;

/// Decoded `Authorization: Basic` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

/// Reads the Basic credential from the request headers. A missing header,
/// another scheme, bad base64 or a payload without `:` all yield `None`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<BasicCredentials> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Gate for every `/admin` route.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(credentials) = basic_credentials(request.headers()) else {
        return Err(ApiError::Unauthorized("Authentication required".to_string()));
    };

    let admin = state.config.admin.clone();
    let username = credentials.username.clone();
    // bcrypt is CPU bound; keep it off the async workers.
    let valid = tokio::task::spawn_blocking(move || {
        admin.verify(&credentials.username, &credentials.password)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("credential check failed: {}", e)))?;

    if !valid {
        tracing::warn!(username = %username, "admin authentication failed");
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    Ok(next.run(request).await)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub username: String,
}

/// GET /admin/verify - Login probe; only reachable with valid credentials
pub async fn verify(State(state): State<AppState>) -> Json<Envelope<VerifyResponse>> {
    Json(Envelope::ok(VerifyResponse {
        username: state.config.admin.username.clone(),
    }))
}

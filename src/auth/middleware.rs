use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::jwt::JwtKeys;
use crate::error::AppError;

/// Identity resolved from a verified bearer token, placed in the request
/// extensions by [`require_bearer`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

/// Rejects the request with 401 unless it carries a valid
/// `Authorization: Bearer <token>` header.
pub async fn require_bearer(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !req.headers().contains_key(AUTHORIZATION) {
        return Err(AppError::Unauthorized("missing Authorization header"));
    }
    let token = bearer_token(req.headers())
        .ok_or(AppError::Unauthorized("invalid Authorization header"))?;

    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        AppError::Unauthorized("invalid or expired token")
    })?;

    debug!(email = %claims.sub, "request authenticated");
    req.extensions_mut().insert(AuthUser { email: claims.sub });
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

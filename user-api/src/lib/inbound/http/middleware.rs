use std::sync::Arc;

use auth::Authenticator;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use super::handlers::NOT_AUTHENTICATED;
use super::handlers::TOKEN_NOT_PROVIDED;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;

/// Identity taken from a verified bearer token, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: Role,
}

/// Middleware that validates the bearer token and adds the caller to request extensions.
///
/// A missing `Authorization` header and any other failure (wrong scheme,
/// bad signature, expiry, issuer or audience mismatch) get distinct messages.
pub async fn authenticate(
    State(authenticator): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let claims = authenticator.validate_token(token).map_err(|e| {
        tracing::warn!(error = %e, "JWT validation failed");
        not_authenticated()
    })?;

    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::warn!(error = %e, "Token subject is not a user id");
        not_authenticated()
    })?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id,
        role: Role::new(claims.role),
    });

    Ok(next.run(req).await)
}

fn not_authenticated() -> ApiError {
    ApiError::Unauthorized(NOT_AUTHENTICATED.to_string())
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized(TOKEN_NOT_PROVIDED.to_string()))?;

    let auth_str = auth_header.to_str().map_err(|_| not_authenticated())?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(not_authenticated)
}

/// Baseline hardening headers. Headers already set by a handler are kept.
pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers
        .entry(header::X_CONTENT_TYPE_OPTIONS)
        .or_insert(HeaderValue::from_static("nosniff"));
    headers
        .entry(header::X_FRAME_OPTIONS)
        .or_insert(HeaderValue::from_static("DENY"));
    headers
        .entry(header::X_XSS_PROTECTION)
        .or_insert(HeaderValue::from_static("1; mode=block"));
    headers
        .entry(header::REFERRER_POLICY)
        .or_insert(HeaderValue::from_static("strict-origin-when-cross-origin"));

    response
}

/// Re-renders rate limiter rejections in the error envelope.
///
/// The limiter answers with a plain-text body; its `retry-after` and
/// `x-ratelimit-*` headers are carried over.
pub async fn rate_limit_envelope(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let mut rendered = ApiError::TooManyRequests.into_response();
    for (name, value) in response.headers() {
        if name == header::RETRY_AFTER || name.as_str().starts_with("x-ratelimit") {
            rendered.headers_mut().insert(name.clone(), value.clone());
        }
    }

    rendered
}

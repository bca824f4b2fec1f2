//! Authentication middleware.
//!
//! Resolves the current user from a bearer token or the session cookie and
//! injects a [`CurrentUser`] into request extensions. Two variants exist:
//! [`inject_user`] for routes that only personalize their output, and
//! [`require_user`] for routes that refuse anonymous access.
//!
//! Token resolution order:
//! 1. `Authorization: Bearer <token>` (API clients)
//! 2. Cookie: `picstash_session=<token>` (web browser)

use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use ps_core::UserId;
use ps_db::pool::DbPool;

use crate::context::AppContext;

/// Cookie name for browser sessions.
pub const SESSION_COOKIE: &str = "picstash_session";

/// The authenticated user attached to a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
}

/// Extract a bearer token or session cookie value from request headers.
pub(crate) fn extract_token(headers: &axum::http::HeaderMap) -> Option<String> {
    // The Authorization header wins over the cookie.
    if let Some(auth) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(val) = auth.to_str() {
            if let Some(token) = val.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie) = headers.get(axum::http::header::COOKIE) {
        if let Ok(cookies_str) = cookie.to_str() {
            for part in cookies_str.split(';') {
                let part = part.trim();
                if let Some(value) = part.strip_prefix(&format!("{SESSION_COOKIE}=")) {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

/// Resolve a token to its user. Expired or unparseable tokens count as absent.
pub fn resolve_user(db: &DbPool, token: &str) -> Option<CurrentUser> {
    let conn = ps_db::pool::get_conn(db).ok()?;
    let tok = ps_db::queries::auth::get_token(&conn, token).ok()??;

    let expires = chrono::DateTime::parse_from_rfc3339(&tok.expires_at).ok()?;
    if expires.with_timezone(&chrono::Utc) < chrono::Utc::now() {
        return None;
    }

    let user = ps_db::queries::users::get_user_by_id(&conn, tok.user_id).ok()??;
    Some(CurrentUser {
        id: user.id,
        username: user.username,
    })
}

/// Middleware that resolves the session, if any, without rejecting.
///
/// Always inserts an `Option<CurrentUser>` extension so downstream handlers
/// can personalize output for anonymous and logged-in viewers alike.
pub async fn inject_user(
    State(ctx): State<AppContext>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let user = extract_token(request.headers()).and_then(|token| resolve_user(&ctx.db, &token));
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Middleware for routes that require an authenticated user.
///
/// On success, inserts the resolved [`CurrentUser`] into request extensions.
pub async fn require_user(
    State(ctx): State<AppContext>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let user = extract_token(request.headers()).and_then(|token| resolve_user(&ctx.db, &token));

    match user {
        Some(user) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        None => Err((StatusCode::UNAUTHORIZED, "Authentication required").into_response()),
    }
}

/// Generate a bcrypt password hash.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

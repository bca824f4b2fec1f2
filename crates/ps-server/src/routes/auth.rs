//! Authentication route handlers: register, login, logout, status.

use axum::extract::{Extension, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::auth::{extract_token, hash_password, CurrentUser, SESSION_COOKIE};

/// Registration request payload.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Login request payload.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Success envelope for auth operations.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Auth status response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

fn validate_username(username: &str) -> ps_core::Result<()> {
    let ok = (3..=32).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if ok {
        Ok(())
    } else {
        Err(ps_core::Error::Validation(
            "Username must be 3-32 characters of letters, digits or underscore".into(),
        ))
    }
}

/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid username or password"),
        (status = 403, description = "Registration is disabled"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register(
    State(ctx): State<AppContext>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !ctx.config.auth.allow_registration {
        return Err(ps_core::Error::Forbidden("Registration is disabled".into()).into());
    }

    validate_username(&payload.username)?;

    if payload.password.len() < 8 {
        return Err(
            ps_core::Error::Validation("Password must be at least 8 characters".into()).into(),
        );
    }

    let hash = hash_password(&payload.password)
        .map_err(|e| ps_core::Error::Internal(format!("bcrypt error: {e}")))?;

    let conn = ps_db::pool::get_conn(&ctx.db)?;
    let user = ps_db::queries::users::create_user(&conn, &payload.username, &hash)?;

    tracing::info!(username = %user.username, "Registered new user");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Account created successfully".into(),
            token: None,
            username: Some(user.username),
        }),
    ))
}

/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let conn = ps_db::pool::get_conn(&ctx.db)?;

    let user = ps_db::queries::users::get_user_by_username(&conn, &payload.username)?
        .ok_or_else(|| ps_core::Error::Unauthorized("Invalid username or password".into()))?;

    let valid = bcrypt::verify(&payload.password, &user.password_hash).unwrap_or(false);
    if !valid {
        return Err(ps_core::Error::Unauthorized("Invalid username or password".into()).into());
    }

    let hours = ctx.config.auth.session_timeout_hours as i64;
    let token = uuid::Uuid::new_v4().to_string();
    let expires = Utc::now() + Duration::hours(hours);

    ps_db::queries::auth::create_token(&conn, user.id, &token, &expires.to_rfc3339())?;

    // Opportunistic sweep so the tokens table does not grow unbounded.
    if let Err(e) = ps_db::queries::auth::delete_expired_tokens(&conn, &Utc::now().to_rfc3339()) {
        tracing::warn!("Failed to sweep expired tokens: {e}");
    }

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(hours))
        .build();

    tracing::info!(username = %user.username, "User logged in");

    Ok((
        jar.add(cookie),
        Json(AuthResponse {
            success: true,
            message: "Login successful".into(),
            token: Some(token),
            username: Some(user.username),
        }),
    ))
}

/// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = AuthResponse)
    )
)]
pub async fn logout(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = extract_token(&headers) {
        if let Ok(conn) = ps_db::pool::get_conn(&ctx.db) {
            let _ = ps_db::queries::auth::delete_token(&conn, &token);
        }
    }

    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();

    Ok((
        jar.remove(cookie),
        Json(AuthResponse {
            success: true,
            message: "Logged out".into(),
            token: None,
            username: None,
        }),
    ))
}

/// GET /api/auth/status
#[utoipa::path(
    get,
    path = "/api/auth/status",
    responses(
        (status = 200, description = "Current session state", body = AuthStatusResponse)
    )
)]
pub async fn auth_status(
    Extension(user): Extension<Option<CurrentUser>>,
) -> Json<AuthStatusResponse> {
    match user {
        Some(user) => Json(AuthStatusResponse {
            authenticated: true,
            username: Some(user.username),
        }),
        None => Json(AuthStatusResponse {
            authenticated: false,
            username: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_accept_word_characters() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_42").is_ok());
        assert!(validate_username("ABC").is_ok());
    }

    #[test]
    fn usernames_reject_bad_lengths() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn usernames_reject_special_characters() {
        assert!(validate_username("al ice").is_err());
        assert!(validate_username("alice!").is_err());
        assert!(validate_username("a/b/c").is_err());
    }
}

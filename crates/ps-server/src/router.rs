//! Axum router construction.
//!
//! Builds the full application router with all route groups, middleware
//! layers, and static file serving.
//!
//! The image paths use the same `{image}` parameter name everywhere. Groups
//! carrying different middleware are merged, and the shared router requires
//! one name per path position.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::{Extension, Router};
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::auth::{inject_user, require_user};
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::auth::register,
        routes::auth::login,
        routes::auth::logout,
        routes::auth::auth_status,
        routes::comments::list_comments,
        routes::comments::create_comment,
        routes::images::upload_image,
        routes::images::delete_image,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::auth::RegisterRequest,
        routes::auth::LoginRequest,
        routes::auth::AuthResponse,
        routes::auth::AuthStatusResponse,
        routes::comments::CommentView,
        routes::comments::CommentListResponse,
        routes::comments::CommentRequest,
        routes::comments::CommentPostResponse,
        routes::images::UploadResponse,
        routes::images::DeleteResponse,
    ))
)]
struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Session-aware image routes. Anonymous viewers pass through; the
    // resolved user only personalizes the rendered page.
    let public_images = Router::new()
        .route("/images/{image}", get(routes::images::serve_image))
        .route(
            "/images/{image}/comments",
            get(routes::comments::list_comments),
        )
        .layer(middleware::from_fn_with_state(ctx.clone(), inject_user));

    // Mutating image routes. Layer order matters: the limiter extension is
    // outermost, then the auth check, then the rate limit, so anonymous
    // requests are rejected before they consume quota.
    let protected_images = Router::new()
        .route(
            "/images",
            post(routes::images::upload_image)
                .layer(DefaultBodyLimit::max(ctx.config.uploads.max_bytes)),
        )
        .route("/images/{image}", delete(routes::images::delete_image))
        .route(
            "/images/{image}/comments",
            post(routes::comments::create_comment),
        )
        .layer(middleware::from_fn(rate_limit_middleware))
        .layer(middleware::from_fn_with_state(ctx.clone(), require_user))
        .layer(Extension(ctx.limiter.clone()));

    // Account routes under /api. The session is injected here too so the
    // status route can report who is logged in.
    let api = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/status", get(routes::auth::auth_status))
        .layer(middleware::from_fn_with_state(ctx.clone(), inject_user));

    let mut app = Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", api)
        .merge(public_images)
        .merge(protected_images)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Static file serving for UI build.
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                tower_http::services::ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(tower_http::services::ServeFile::new(index_path)),
            );
        }
    }

    app
}

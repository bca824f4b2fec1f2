//! Comment route handlers: list and post comments on an image.

use axum::extract::{Extension, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use ps_core::ImageId;
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::auth::CurrentUser;

const MAX_COMMENT_CHARS: usize = 2000;

/// Public shape of a comment. Internal row IDs are not exposed.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CommentView {
    pub username: String,
    pub image_id: String,
    pub comment: String,
    pub posted_date: String,
}

impl CommentView {
    fn from_model(c: ps_db::models::Comment) -> Self {
        Self {
            username: c.username,
            image_id: c.image_id.to_string(),
            comment: c.comment,
            posted_date: c.posted_date,
        }
    }
}

/// Comment list envelope.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CommentListResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<CommentView>,
}

/// New comment payload.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CommentRequest {
    pub comment: String,
}

/// Single comment envelope, returned after posting.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CommentPostResponse {
    pub success: bool,
    pub message: String,
    pub data: CommentView,
}

/// Comment lists must never be served stale, so every response carries the
/// full set of no-cache headers, including the legacy `Expires`/`Pragma` pair.
fn no_cache_headers() -> [(header::HeaderName, &'static str); 3] {
    [
        (header::CACHE_CONTROL, "private, max-age=0, must-revalidate"),
        (header::EXPIRES, "-1"),
        (header::PRAGMA, "no-cache"),
    ]
}

fn parse_image_id(raw: &str) -> ps_core::Result<ImageId> {
    raw.parse()
        .map_err(|_| ps_core::Error::Validation("Incorrect or malformed image ID.".into()))
}

fn validate_comment(comment: &str) -> ps_core::Result<&str> {
    let trimmed = comment.trim();

    if trimmed.is_empty() {
        return Err(ps_core::Error::Validation("Comment cannot be blank.".into()));
    }
    if trimmed.chars().count() > MAX_COMMENT_CHARS {
        return Err(ps_core::Error::Validation(format!(
            "Comment is too long ({MAX_COMMENT_CHARS} characters max)."
        )));
    }

    Ok(trimmed)
}

/// GET /images/{image}/comments
#[utoipa::path(
    get,
    path = "/images/{image}/comments",
    params(
        ("image" = String, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Comments for the image, newest first", body = CommentListResponse),
        (status = 400, description = "Malformed image ID")
    )
)]
pub async fn list_comments(
    State(ctx): State<AppContext>,
    Path(image): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let image_id = parse_image_id(&image)?;

    let conn = ps_db::pool::get_conn(&ctx.db)?;
    let comments =
        ps_db::queries::comments::list_comments_for_image(&conn, &image_id).map_err(|e| {
            tracing::error!("Failed to load comments for image {image_id}: {e}");
            ps_core::Error::database(format!(
                "Could not load comments for image of image ID {image_id}."
            ))
        })?;

    let body = if comments.is_empty() {
        CommentListResponse {
            success: true,
            message: "There are currently no comments to display.".into(),
            data: vec![],
        }
    } else {
        CommentListResponse {
            success: true,
            message: format!("Loaded {} comment(s).", comments.len()),
            data: comments.into_iter().map(CommentView::from_model).collect(),
        }
    };

    Ok((no_cache_headers(), Json(body)))
}

/// POST /images/{image}/comments
#[utoipa::path(
    post,
    path = "/images/{image}/comments",
    request_body = CommentRequest,
    params(
        ("image" = String, Path, description = "Image ID")
    ),
    responses(
        (status = 201, description = "Comment posted", body = CommentPostResponse),
        (status = 400, description = "Malformed ID or invalid comment"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Image does not exist"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn create_comment(
    State(ctx): State<AppContext>,
    Path(image): Path<String>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let image_id = parse_image_id(&image)?;
    let text = validate_comment(&payload.comment)?;

    let conn = ps_db::pool::get_conn(&ctx.db)?;

    // The comments table has a foreign key on images; check first so the
    // caller gets a 404 instead of a constraint error.
    if ps_db::queries::images::get_image_meta(&conn, &image_id)?.is_none() {
        return Err(ps_core::Error::not_found("image", image_id.as_str()).into());
    }

    let comment = ps_db::queries::comments::create_comment(&conn, &image_id, &user.username, text)?;

    tracing::info!(
        image = %image_id,
        username = %user.username,
        "Posted comment"
    );

    Ok((
        StatusCode::CREATED,
        Json(CommentPostResponse {
            success: true,
            message: "Comment posted successfully.".into(),
            data: CommentView::from_model(comment),
        }),
    ))
}

//! Image route handlers: byte serving, the HTML page, upload, and delete.
//!
//! A single GET path serves two shapes of request. `GET /images/{id}.{ext}`
//! streams raw image bytes with long-lived public cache headers, and
//! `GET /images/{id}` renders the HTML detail page. The handler dispatches
//! on the presence of a dot because the two differ only in extension.
//!
//! Byte serving never 404s for missing or removed IDs: stale direct links
//! are common (chat logs, old forum posts), so those requests get the
//! placeholder image with a 200 instead of a broken-image icon.

use axum::body::Bytes;
use axum::extract::{Extension, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use ps_core::{ImageFormat, ImageId};
use serde::Serialize;

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::auth::CurrentUser;
use crate::pages;

/// Cache lifetime for immutable image bytes: 30 days.
const PUBLIC_CACHE: &str = "public, max-age=2592000";

const PAGE_CACHE: &str = "private, max-age=0, must-revalidate";

/// Where mismatched direct links get sent.
const REMOVED_LINK: &str = "/images/removed.png";

/// Upload success envelope.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub id: String,
}

/// Delete success envelope.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// GET /images/{image}
///
/// Dispatches between byte serving (`{id}.{ext}`) and the HTML page (`{id}`).
pub async fn serve_image(
    State(ctx): State<AppContext>,
    Extension(viewer): Extension<Option<CurrentUser>>,
    Path(image): Path<String>,
) -> Response {
    // A trailing dot is neither a valid extension nor a valid ID.
    if image.ends_with('.') {
        return (StatusCode::BAD_REQUEST, "Malformed url.").into_response();
    }

    match image.rsplit_once('.') {
        Some((front, ext)) => serve_bytes(&ctx, front, ext),
        None => serve_page(&ctx, &image, viewer.as_ref()),
    }
}

fn placeholder_response(ctx: &AppContext) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, PUBLIC_CACHE),
        ],
        ctx.placeholder.as_ref().clone(),
    )
        .into_response()
}

fn serve_bytes(ctx: &AppContext, front: &str, ext: &str) -> Response {
    let id = match front.parse::<ImageId>() {
        Ok(id) if !id.is_removed() => id,
        _ => {
            tracing::info!("Served 'removed' placeholder image by direct link");
            return placeholder_response(ctx);
        }
    };

    let looked_up = ps_db::pool::get_conn(&ctx.db)
        .and_then(|conn| ps_db::queries::images::get_image(&conn, &id));

    let image = match looked_up {
        Ok(Some(image)) => image,
        Ok(None) => {
            tracing::info!(image = %id, "Unknown image requested by direct link; served placeholder");
            return placeholder_response(ctx);
        }
        Err(e) => {
            tracing::error!(image = %id, "Failed to look up image: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error finding image. Please try again later.",
            )
                .into_response();
        }
    };

    // The extension in the URL must agree with the stored MIME type, so a
    // link claiming `.png` can never serve a GIF.
    let requested = ImageFormat::from_extension(ext).map(|f| f.mime_type());
    if requested != Some(image.mimetype.as_str()) {
        tracing::info!(image = %id, ext, "Extension does not match stored type; redirecting");
        return Redirect::to(REMOVED_LINK).into_response();
    }

    tracing::info!(image = %id, "Served image by direct link");

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, image.mimetype),
            (header::CACHE_CONTROL, PUBLIC_CACHE.to_string()),
        ],
        image.data,
    )
        .into_response()
}

fn serve_page(ctx: &AppContext, raw: &str, viewer: Option<&CurrentUser>) -> Response {
    let id = match raw.parse::<ImageId>() {
        Ok(id) => id,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, "Incorrect or malformed image ID.").into_response();
        }
    };

    let looked_up = ps_db::pool::get_conn(&ctx.db)
        .and_then(|conn| ps_db::queries::images::get_image_meta(&conn, &id));

    let meta = match looked_up {
        Ok(Some(meta)) => meta,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                "Image of this ID does not exist on the database.",
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(image = %id, "Failed to look up image for page: {e}");
            return (
                StatusCode::NOT_FOUND,
                "Image of this ID does not exist on the database.",
            )
                .into_response();
        }
    };

    let extension = ImageFormat::from_mime_type(&meta.mimetype)
        .map(|f| f.extension())
        .unwrap_or("png");
    let image_src = format!("{id}.{extension}");
    let uploaded_date = meta.uploaded_date.as_deref().unwrap_or("Unknown Date");

    let page = pages::ImagePage {
        id: id.as_str(),
        image_src: &image_src,
        uploaded_date,
        author: &meta.username,
        viewer: viewer.map(|u| u.username.as_str()),
    };

    tracing::info!(image = %id, "Served image page");

    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, PAGE_CACHE)],
        Html(pages::render_image_page(&page)),
    )
        .into_response()
}

/// Best-effort client address for audit entries. The service is expected to
/// sit behind a reverse proxy, so only the forwarded header is consulted.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// POST /images
#[utoipa::path(
    post,
    path = "/images",
    request_body(content = Vec<u8>, content_type = "image/png"),
    responses(
        (status = 201, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Empty body or unsupported image type"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "Image exceeds the upload size limit"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn upload_image(
    State(ctx): State<AppContext>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .unwrap_or_default();

    if !ctx
        .config
        .uploads
        .allowed_types
        .iter()
        .any(|t| t == &content_type)
    {
        return Err(ps_core::Error::Validation(format!(
            "Unsupported image type '{content_type}'"
        ))
        .into());
    }

    if body.is_empty() {
        return Err(ps_core::Error::Validation("Empty image upload".into()).into());
    }

    let conn = ps_db::pool::get_conn(&ctx.db)?;
    let image = ps_db::queries::images::create_image(&conn, &body, &content_type, &user.username)?;

    tracing::info!(
        image = %image.id,
        username = %user.username,
        size = body.len(),
        "Uploaded image"
    );

    let info = serde_json::json!({
        "mimetype": content_type,
        "size_bytes": body.len(),
    });
    if let Err(e) = ps_db::queries::action_history::record_action(
        &conn,
        "upload_image",
        image.id.as_str(),
        &user.username,
        client_ip(&headers).as_deref(),
        &info,
    ) {
        tracing::warn!(image = %image.id, "Failed to record upload in action history: {e}");
    }

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            message: "Image uploaded successfully.".into(),
            id: image.id.to_string(),
        }),
    ))
}

/// DELETE /images/{image}
#[utoipa::path(
    delete,
    path = "/images/{image}",
    params(
        ("image" = String, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image deleted", body = DeleteResponse),
        (status = 400, description = "Malformed image ID"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Requester does not own the image"),
        (status = 404, description = "Image does not exist"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn delete_image(
    State(ctx): State<AppContext>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Path(image): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id: ImageId = image
        .parse()
        .map_err(|_| ps_core::Error::Validation("Incorrect or malformed image ID.".into()))?;

    let conn = ps_db::pool::get_conn(&ctx.db)?;

    let meta = ps_db::queries::images::get_image_meta(&conn, &id)?
        .ok_or_else(|| ps_core::Error::not_found("image", id.as_str()))?;

    if meta.username != user.username {
        return Err(
            ps_core::Error::Forbidden("You are not authorized to delete this image.".into()).into(),
        );
    }

    if !ps_db::queries::images::delete_image(&conn, &id)? {
        return Err(ps_core::Error::not_found("image", id.as_str()).into());
    }

    tracing::info!(image = %id, username = %user.username, "Deleted image");

    // Audit failures must not fail the request.
    let info = serde_json::json!({
        "path": format!("/images/{id}"),
        "author": meta.username,
    });
    if let Err(e) = ps_db::queries::action_history::record_action(
        &conn,
        "delete_image",
        id.as_str(),
        &user.username,
        client_ip(&headers).as_deref(),
        &info,
    ) {
        tracing::warn!(image = %id, "Failed to record delete in action history: {e}");
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: format!("Image of ID {id} deleted successfully."),
    }))
}

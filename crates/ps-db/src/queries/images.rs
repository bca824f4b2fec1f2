//! Image storage operations.
//!
//! Two read paths exist on purpose: [`get_image`] pulls the blob for
//! direct-link serving, while [`get_image_meta`] skips the `data` column
//! for page rendering and ownership checks.

use chrono::Utc;
use ps_core::{Error, ImageId, Result};
use rusqlite::Connection;

use crate::models::{Image, ImageMeta};

const COLS: &str = "id, data, mimetype, username, uploaded_date";
const META_COLS: &str = "id, mimetype, username, uploaded_date";

/// Store a new image and return its record.
pub fn create_image(
    conn: &Connection,
    data: &[u8],
    mimetype: &str,
    username: &str,
) -> Result<Image> {
    let id = ImageId::new();
    let uploaded_date = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO images (id, data, mimetype, username, uploaded_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id.as_str(), data, mimetype, username, &uploaded_date],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Image {
        id,
        data: data.to_vec(),
        mimetype: mimetype.to_string(),
        username: username.to_string(),
        uploaded_date: Some(uploaded_date),
    })
}

/// Load a full image row, bytes included.
pub fn get_image(conn: &Connection, id: &ImageId) -> Result<Option<Image>> {
    let q = format!("SELECT {COLS} FROM images WHERE id = ?1");
    let result = conn.query_row(&q, [id.as_str()], Image::from_row);
    match result {
        Ok(img) => Ok(Some(img)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Load image attributes without the blob column.
pub fn get_image_meta(conn: &Connection, id: &ImageId) -> Result<Option<ImageMeta>> {
    let q = format!("SELECT {META_COLS} FROM images WHERE id = ?1");
    let result = conn.query_row(&q, [id.as_str()], ImageMeta::from_row);
    match result {
        Ok(meta) => Ok(Some(meta)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Delete an image by ID. Returns true if a row was deleted.
///
/// Comments cascade via the FK, so callers only log the one deletion.
pub fn delete_image(conn: &Connection, id: &ImageId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM images WHERE id = ?1", [id.as_str()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

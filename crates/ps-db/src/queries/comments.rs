//! Comment operations.

use chrono::Utc;
use ps_core::{CommentId, Error, ImageId, Result};
use rusqlite::Connection;

use crate::models::Comment;

const COLS: &str = "id, image_id, username, comment, posted_date";

/// Attach a new comment to an image.
pub fn create_comment(
    conn: &Connection,
    image_id: &ImageId,
    username: &str,
    comment: &str,
) -> Result<Comment> {
    let id = CommentId::new();
    let posted_date = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO comments (id, image_id, username, comment, posted_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id.to_string(), image_id.as_str(), username, comment, &posted_date],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Comment {
        id,
        image_id: image_id.clone(),
        username: username.to_string(),
        comment: comment.to_string(),
        posted_date,
    })
}

/// List comments for an image, newest first.
pub fn list_comments_for_image(conn: &Connection, image_id: &ImageId) -> Result<Vec<Comment>> {
    let q = format!(
        "SELECT {COLS} FROM comments WHERE image_id = ?1
         ORDER BY posted_date DESC, id ASC"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([image_id.as_str()], Comment::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

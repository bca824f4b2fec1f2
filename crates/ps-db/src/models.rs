//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`.

use ps_core::{ActionId, CommentId, ImageId, InvalidImageId, SessionId, UserId};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(T::from(uuid))
}

/// Parse an image short code from a text column.
fn parse_image_id(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<ImageId> {
    let s: String = row.get(idx)?;
    s.parse().map_err(|e: InvalidImageId| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

impl User {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

// ---------------------------------------------------------------------------
// AuthToken
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AuthToken {
    pub id: SessionId,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: String,
}

impl AuthToken {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            user_id: parse_id(row, 1)?,
            token: row.get(2)?,
            expires_at: row.get(3)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Image
// ---------------------------------------------------------------------------

/// Full image row including the stored bytes.
///
/// Only the direct-link route should load this; everything else reads
/// [`ImageMeta`] to keep blobs out of memory.
#[derive(Debug, Clone)]
pub struct Image {
    pub id: ImageId,
    pub data: Vec<u8>,
    pub mimetype: String,
    pub username: String,
    pub uploaded_date: Option<String>,
}

impl Image {
    /// Build from a row selected as:
    /// id, data, mimetype, username, uploaded_date
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_image_id(row, 0)?,
            data: row.get(1)?,
            mimetype: row.get(2)?,
            username: row.get(3)?,
            uploaded_date: row.get(4)?,
        })
    }
}

/// Image attributes without the blob column.
#[derive(Debug, Clone)]
pub struct ImageMeta {
    pub id: ImageId,
    pub mimetype: String,
    pub username: String,
    pub uploaded_date: Option<String>,
}

impl ImageMeta {
    /// Build from a row selected as:
    /// id, mimetype, username, uploaded_date
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_image_id(row, 0)?,
            mimetype: row.get(1)?,
            username: row.get(2)?,
            uploaded_date: row.get(3)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: CommentId,
    pub image_id: ImageId,
    pub username: String,
    pub comment: String,
    pub posted_date: String,
}

impl Comment {
    /// Build from a row selected as:
    /// id, image_id, username, comment, posted_date
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            image_id: parse_image_id(row, 1)?,
            username: row.get(2)?,
            comment: row.get(3)?,
            posted_date: row.get(4)?,
        })
    }
}

// ---------------------------------------------------------------------------
// ActionEntry
// ---------------------------------------------------------------------------

/// One row of the mutation audit log.
#[derive(Debug, Clone)]
pub struct ActionEntry {
    pub id: ActionId,
    pub action_type: String,
    pub item: String,
    pub username: String,
    pub ip_address: Option<String>,
    pub info: serde_json::Value,
    pub created_at: String,
}

impl ActionEntry {
    /// Build from a row selected as:
    /// id, action_type, item, username, ip_address, info, created_at
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let info_json: String = row.get(5)?;
        Ok(Self {
            id: parse_id(row, 0)?,
            action_type: row.get(1)?,
            item: row.get(2)?,
            username: row.get(3)?,
            ip_address: row.get(4)?,
            info: serde_json::from_str(&info_json)
                .unwrap_or(serde_json::Value::Object(Default::default())),
            created_at: row.get(6)?,
        })
    }
}

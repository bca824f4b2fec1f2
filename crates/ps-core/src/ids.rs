//! Typed ID wrappers providing compile-time safety for entity identifiers.
//!
//! UUID-backed newtypes cover users, sessions, comments, and action-history
//! entries. Images use [`ImageId`], a short alphanumeric code suitable for
//! direct links, with the literal `removed` reserved as a sentinel.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generate a newtype ID wrapper over `Uuid`.
///
/// The macro produces a struct with:
/// - `new()` to create a random v4 UUID
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Serialize`, `Deserialize`
/// - `Display` and `FromStr` delegating to the inner UUID
/// - `From<Uuid>` and `Into<Uuid>` conversions
/// - `Default` that generates a new random ID
macro_rules! typed_id {
    ($($(#[doc = $doc:expr])* $name:ident),+ $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(Uuid);

            impl $name {
                /// Create a new random ID.
                #[must_use]
                pub fn new() -> Self {
                    Self(Uuid::new_v4())
                }

                /// Return the inner UUID value.
                #[must_use]
                pub fn as_uuid(&self) -> &Uuid {
                    &self.0
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = uuid::Error;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    Uuid::parse_str(s).map(Self)
                }
            }

            impl From<Uuid> for $name {
                fn from(uuid: Uuid) -> Self {
                    Self(uuid)
                }
            }

            impl From<$name> for Uuid {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

typed_id! {
    /// Unique identifier for a user account.
    UserId,
    /// Unique identifier for an authentication session.
    SessionId,
    /// Unique identifier for a comment on an image.
    CommentId,
    /// Unique identifier for an action-history entry.
    ActionId,
}

/// Length of generated image codes.
const IMAGE_ID_LEN: usize = 10;

/// Longest identifier accepted when parsing from a URL.
const IMAGE_ID_MAX_LEN: usize = 32;

/// Reserved identifier that always resolves to the placeholder image.
/// Never issued by [`ImageId::new`] (generated codes are 10 characters).
pub const REMOVED_IMAGE_ID: &str = "removed";

/// Error returned when parsing an [`ImageId`] fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid image ID")]
pub struct InvalidImageId;

/// Short alphanumeric identifier for a stored image.
///
/// Generated codes are 10 random ASCII-alphanumeric characters; parsing
/// accepts 1 to 32 alphanumerics so historical short codes and the
/// `removed` sentinel round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Generate a new random image code.
    #[must_use]
    pub fn new() -> Self {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(IMAGE_ID_LEN)
            .map(char::from)
            .collect();
        Self(code)
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the reserved `removed` sentinel.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.0 == REMOVED_IMAGE_ID
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ImageId {
    type Err = InvalidImageId;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() || s.len() > IMAGE_ID_MAX_LEN {
            return Err(InvalidImageId);
        }
        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InvalidImageId);
        }
        Ok(Self(s.to_string()))
    }
}

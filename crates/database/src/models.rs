//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Well-known avatar reference for the bundled default image.
///
/// Written into `avatar_ref` whenever a custom avatar turns out to be
/// unusable; a contact with neither avatar field set also renders this
/// image, without the sentinel being stored.
pub const DEFAULT_AVATAR_REF: i64 = 0;

/// A contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Contact {
    /// Auto-incrementing ID. Zero means not yet persisted.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Phone number, as entered.
    pub phone: String,
    /// Email address, if any.
    pub email: Option<String>,
    /// Postal address, if any.
    pub address: Option<String>,
    /// Date of birth as epoch milliseconds, if known.
    pub date_of_birth: Option<i64>,
    /// Built-in avatar reference, if one is selected.
    pub avatar_ref: Option<i64>,
    /// URI of an externally supplied avatar image, if one is set.
    pub avatar_uri: Option<String>,
    /// Creation timestamp in epoch milliseconds. Set once, never updated.
    pub created_at: i64,
}

/// Where a contact's avatar image comes from, in display precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarSource<'a> {
    /// Load from an external URI.
    Uri(&'a str),
    /// Render a built-in avatar by reference.
    BuiltIn(i64),
    /// No custom avatar; render the default image.
    Default,
}

impl Contact {
    /// The avatar to display for this contact.
    ///
    /// An external URI wins over a built-in reference; with neither set
    /// the default image is used.
    pub fn avatar(&self) -> AvatarSource<'_> {
        match (&self.avatar_uri, self.avatar_ref) {
            (Some(uri), _) => AvatarSource::Uri(uri),
            (None, Some(avatar_ref)) => AvatarSource::BuiltIn(avatar_ref),
            (None, None) => AvatarSource::Default,
        }
    }

    /// True if the contact carries a custom avatar (reference or URI).
    pub fn has_custom_avatar(&self) -> bool {
        self.avatar_ref.is_some() || self.avatar_uri.is_some()
    }
}

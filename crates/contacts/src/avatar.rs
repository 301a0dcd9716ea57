//! Avatar reconciliation.
//!
//! A contact can name a built-in avatar (`avatar_ref`) or an externally
//! supplied image (`avatar_uri`). Either can go stale: a catalog can
//! shrink between app versions, and a URI's read permission can be
//! revoked or its file deleted. [`resolve`] repairs a candidate contact
//! against what the host can actually render before it is persisted,
//! falling back to the default image rather than dropping the custom
//! avatar silently.

use database::models::{Contact, DEFAULT_AVATAR_REF};
use tracing::debug;

/// Host-supplied probes for avatar renderability, plus the catalog of
/// built-in avatars the host bundles.
///
/// Both probes are read-only; `uri_accessible` is expected to attempt
/// an actual read (permissions can be revoked without the URI changing).
pub trait AvatarHost: Send + Sync {
    /// Whether `avatar_ref` names a renderable built-in avatar.
    fn resource_exists(&self, avatar_ref: i64) -> bool;

    /// Whether the image behind `uri` can still be read.
    fn uri_accessible(&self, uri: &str) -> bool;

    /// References of all built-in avatars, for picker UIs.
    fn available_avatars(&self) -> Vec<i64>;
}

/// Reconcile a contact's avatar fields with what the host can render.
///
/// - An `avatar_ref` the host no longer bundles is replaced with
///   [`DEFAULT_AVATAR_REF`].
/// - An unreadable `avatar_uri` is cleared, and `avatar_ref` set to
///   [`DEFAULT_AVATAR_REF`].
/// - A contact needing no repair is returned as-is.
///
/// Idempotent, and never an error: unusable avatars are corrected, not
/// reported.
pub fn resolve(host: &dyn AvatarHost, contact: Contact) -> Contact {
    let mut avatar_ref = contact.avatar_ref;
    let mut avatar_uri = contact.avatar_uri.clone();

    if let Some(reference) = contact.avatar_ref {
        if !host.resource_exists(reference) {
            debug!(reference, "avatar reference no longer exists, using default");
            avatar_ref = Some(DEFAULT_AVATAR_REF);
        }
    }

    if let Some(uri) = &contact.avatar_uri {
        if !host.uri_accessible(uri) {
            debug!(uri = %uri, "avatar uri no longer accessible, using default");
            avatar_uri = None;
            avatar_ref = Some(DEFAULT_AVATAR_REF);
        }
    }

    if avatar_ref == contact.avatar_ref && avatar_uri == contact.avatar_uri {
        contact
    } else {
        Contact {
            avatar_ref,
            avatar_uri,
            ..contact
        }
    }
}

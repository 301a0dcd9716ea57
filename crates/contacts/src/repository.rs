//! Repository layer over the contact store.
//!
//! Adds avatar reconciliation on every write path; reads pass through
//! untouched. The store handle and the avatar host are injected at
//! construction, so there is no hidden global state.

use std::sync::Arc;

use database::contact::{self, ContactFeed};
use database::models::Contact;
use database::{Database, Result};
use tracing::debug;

use crate::avatar::{self, AvatarHost};

/// Repository for contact data operations.
///
/// Clones share the same database handle and avatar host.
#[derive(Clone)]
pub struct ContactRepository {
    db: Database,
    host: Arc<dyn AvatarHost>,
}

impl ContactRepository {
    /// Create a repository over a connected database and the host's
    /// avatar capabilities.
    pub fn new(db: Database, host: Arc<dyn AvatarHost>) -> Self {
        Self { db, host }
    }

    /// Insert a new contact after avatar reconciliation. Returns the
    /// assigned ID.
    pub async fn insert(&self, candidate: Contact) -> Result<i64> {
        let fixed = avatar::resolve(self.host.as_ref(), candidate);
        debug!(name = %fixed.name, "inserting contact");
        contact::insert(&self.db, &fixed).await
    }

    /// Update an existing contact after avatar reconciliation.
    pub async fn update(&self, candidate: Contact) -> Result<()> {
        let fixed = avatar::resolve(self.host.as_ref(), candidate);
        debug!(id = fixed.id, "updating contact");
        contact::update(&self.db, &fixed).await
    }

    /// Delete a contact.
    pub async fn delete(&self, contact: &Contact) -> Result<()> {
        contact::delete(&self.db, contact).await
    }

    /// Delete all contacts.
    pub async fn delete_all(&self) -> Result<()> {
        contact::delete_all(&self.db).await
    }

    /// Get a contact by ID, or `None` if it doesn't exist.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Contact>> {
        contact::get_by_id(self.db.pool(), id).await
    }

    /// Count all contacts.
    pub async fn count(&self) -> Result<i64> {
        contact::count(self.db.pool()).await
    }

    /// Live feed of all contacts, ordered by name ascending.
    pub fn observe_all(&self) -> ContactFeed {
        contact::observe_all(&self.db)
    }

    /// Live feed of contacts matching a name/phone substring search.
    pub fn observe_search(&self, query: &str) -> ContactFeed {
        contact::observe_search(&self.db, query)
    }

    /// References of all built-in avatars the host bundles.
    pub fn available_avatars(&self) -> Vec<i64> {
        self.host.available_avatars()
    }

    /// The underlying database handle (preferences, change feeds).
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::models::DEFAULT_AVATAR_REF;

    struct FakeHost;

    impl AvatarHost for FakeHost {
        fn resource_exists(&self, avatar_ref: i64) -> bool {
            avatar_ref == DEFAULT_AVATAR_REF || avatar_ref == 1
        }

        fn uri_accessible(&self, uri: &str) -> bool {
            uri == "content://ok"
        }

        fn available_avatars(&self) -> Vec<i64> {
            vec![1]
        }
    }

    async fn test_repo() -> ContactRepository {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        ContactRepository::new(db, Arc::new(FakeHost))
    }

    fn contact(name: &str) -> Contact {
        Contact {
            id: 0,
            name: name.to_string(),
            phone: "+14155551234".to_string(),
            email: None,
            address: None,
            date_of_birth: None,
            avatar_ref: None,
            avatar_uri: None,
            created_at: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_leaves_avatars_unset() {
        let repo = test_repo().await;

        let id = repo.insert(contact("Alice")).await.unwrap();
        assert!(id > 0);

        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Alice");
        assert_eq!(stored.avatar_ref, None);
        assert_eq!(stored.avatar_uri, None);
    }

    #[tokio::test]
    async fn test_insert_repairs_stale_avatar_ref() {
        let repo = test_repo().await;

        let id = repo
            .insert(Contact {
                avatar_ref: Some(99),
                ..contact("Alice")
            })
            .await
            .unwrap();

        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.avatar_ref, Some(DEFAULT_AVATAR_REF));
    }

    #[tokio::test]
    async fn test_update_repairs_unreadable_uri() {
        let repo = test_repo().await;

        let id = repo.insert(contact("Alice")).await.unwrap();
        let stored = repo.get_by_id(id).await.unwrap().unwrap();

        repo.update(Contact {
            avatar_uri: Some("content://revoked".to_string()),
            ..stored
        })
        .await
        .unwrap();

        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.avatar_uri, None);
        assert_eq!(stored.avatar_ref, Some(DEFAULT_AVATAR_REF));
    }

    #[tokio::test]
    async fn test_update_keeps_valid_custom_avatar() {
        let repo = test_repo().await;

        let id = repo.insert(contact("Alice")).await.unwrap();
        let stored = repo.get_by_id(id).await.unwrap().unwrap();

        repo.update(Contact {
            avatar_ref: Some(1),
            ..stored
        })
        .await
        .unwrap();

        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.avatar_ref, Some(1));
    }

    #[tokio::test]
    async fn test_observe_all_sees_inserts() {
        let repo = test_repo().await;

        repo.insert(contact("Bob")).await.unwrap();

        let mut feed = repo.observe_all();
        let snapshot = feed.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);

        repo.insert(contact("Alice")).await.unwrap();
        let next = feed.next().await.unwrap();
        let names: Vec<&str> = next.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn test_delete_all_and_count() {
        let repo = test_repo().await;

        repo.insert(contact("Alice")).await.unwrap();
        repo.insert(contact("Bob")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);

        repo.delete_all().await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}

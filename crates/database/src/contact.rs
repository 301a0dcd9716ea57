//! Contact CRUD operations and live query feeds.
//!
//! Write operations take [`Database`] rather than a bare pool so every
//! committed change bumps the change notifier that drives
//! [`observe_all`] and [`observe_search`].

use sqlx::SqlitePool;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{DatabaseError, Result};
use crate::models::Contact;
use crate::Database;

const CONTACT_COLUMNS: &str =
    "id, name, phone, email, address, date_of_birth, avatar_ref, avatar_uri, created_at";

/// Insert a new contact. Returns the assigned ID.
///
/// The contact's own `id` field is ignored; SQLite assigns the row ID.
pub async fn insert(db: &Database, contact: &Contact) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO contacts (name, phone, email, address, date_of_birth, avatar_ref, avatar_uri, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&contact.name)
    .bind(&contact.phone)
    .bind(&contact.email)
    .bind(&contact.address)
    .bind(contact.date_of_birth)
    .bind(contact.avatar_ref)
    .bind(&contact.avatar_uri)
    .bind(contact.created_at)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    debug!(id, name = %contact.name, "inserted contact");
    db.notify_contacts_changed();

    Ok(id)
}

/// Update an existing contact, replacing the whole record.
pub async fn update(db: &Database, contact: &Contact) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE contacts
        SET name = ?, phone = ?, email = ?, address = ?, date_of_birth = ?,
            avatar_ref = ?, avatar_uri = ?, created_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&contact.name)
    .bind(&contact.phone)
    .bind(&contact.email)
    .bind(&contact.address)
    .bind(contact.date_of_birth)
    .bind(contact.avatar_ref)
    .bind(&contact.avatar_uri)
    .bind(contact.created_at)
    .bind(contact.id)
    .execute(db.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Contact",
            id: contact.id.to_string(),
        });
    }

    debug!(id = contact.id, "updated contact");
    db.notify_contacts_changed();

    Ok(())
}

/// Delete a contact.
pub async fn delete(db: &Database, contact: &Contact) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM contacts
        WHERE id = ?
        "#,
    )
    .bind(contact.id)
    .execute(db.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Contact",
            id: contact.id.to_string(),
        });
    }

    debug!(id = contact.id, "deleted contact");
    db.notify_contacts_changed();

    Ok(())
}

/// Delete all contacts.
pub async fn delete_all(db: &Database) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM contacts
        "#,
    )
    .execute(db.pool())
    .await?;

    debug!("deleted all contacts");
    db.notify_contacts_changed();

    Ok(())
}

/// Get a contact by ID. Absence is a normal outcome, not an error.
pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Contact>> {
    let contact = sqlx::query_as::<_, Contact>(&format!(
        r#"
        SELECT {CONTACT_COLUMNS}
        FROM contacts
        WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(contact)
}

/// Count all contacts.
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM contacts
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// List all contacts ordered by name ascending.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Contact>> {
    let contacts = sqlx::query_as::<_, Contact>(&format!(
        r#"
        SELECT {CONTACT_COLUMNS}
        FROM contacts
        ORDER BY name ASC
        "#
    ))
    .fetch_all(pool)
    .await?;

    Ok(contacts)
}

/// Search contacts whose name or phone contains `query`,
/// case-insensitively, ordered by name ascending.
pub async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<Contact>> {
    let contacts = sqlx::query_as::<_, Contact>(&format!(
        r#"
        SELECT {CONTACT_COLUMNS}
        FROM contacts
        WHERE name LIKE '%' || ? || '%' OR phone LIKE '%' || ? || '%'
        ORDER BY name ASC
        "#
    ))
    .bind(query)
    .bind(query)
    .fetch_all(pool)
    .await?;

    Ok(contacts)
}

/// Live feed of all contacts, ordered by name ascending.
pub fn observe_all(db: &Database) -> ContactFeed {
    ContactFeed::new(db, FeedQuery::All)
}

/// Live feed of contacts matching a name/phone substring search.
pub fn observe_search(db: &Database, query: &str) -> ContactFeed {
    ContactFeed::new(db, FeedQuery::Search(query.to_string()))
}

enum FeedQuery {
    All,
    Search(String),
}

/// A live, restartable query over the contacts table.
///
/// [`ContactFeed::next`] yields the full current result set: the first
/// call returns a snapshot immediately, each later call waits for a
/// write and re-queries. Bursts of writes may coalesce into a single
/// emission carrying the latest state.
pub struct ContactFeed {
    db: Database,
    changes: watch::Receiver<u64>,
    query: FeedQuery,
    primed: bool,
}

impl ContactFeed {
    fn new(db: &Database, query: FeedQuery) -> Self {
        Self {
            db: db.clone(),
            changes: db.subscribe_contacts(),
            query,
            primed: false,
        }
    }

    /// Current result set for this feed's query.
    pub async fn snapshot(&self) -> Result<Vec<Contact>> {
        match &self.query {
            FeedQuery::All => list_all(self.db.pool()).await,
            FeedQuery::Search(query) => search(self.db.pool(), query).await,
        }
    }

    /// Wait until the contacts table changes.
    ///
    /// Cancel safe: dropping the future before it resolves leaves the
    /// pending change unconsumed.
    pub async fn changed(&mut self) -> Result<()> {
        self.changes
            .changed()
            .await
            .map_err(|_| DatabaseError::FeedClosed)
    }

    /// Next emission: the snapshot on first call, then the full result
    /// set after each subsequent write.
    pub async fn next(&mut self) -> Result<Vec<Contact>> {
        if self.primed {
            self.changed().await?;
        } else {
            self.primed = true;
        }
        self.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn contact(name: &str, phone: &str) -> Contact {
        Contact {
            id: 0,
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            address: None,
            date_of_birth: None,
            avatar_ref: None,
            avatar_uri: None,
            created_at: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_contact_crud() {
        let db = test_db().await;

        // Create
        let id = insert(&db, &contact("Alice", "+14155551234")).await.unwrap();
        assert!(id > 0);

        // Read
        let fetched = get_by_id(db.pool(), id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Alice");
        assert_eq!(fetched.avatar_ref, None);
        assert_eq!(fetched.avatar_uri, None);

        // Update
        let updated = Contact {
            address: Some("221B Baker Street".to_string()),
            ..fetched.clone()
        };
        update(&db, &updated).await.unwrap();
        let fetched = get_by_id(db.pool(), id).await.unwrap().unwrap();
        assert_eq!(fetched.address.as_deref(), Some("221B Baker Street"));

        // Count
        assert_eq!(count(db.pool()).await.unwrap(), 1);

        // Delete
        delete(&db, &fetched).await.unwrap();
        assert_eq!(get_by_id(db.pool(), id).await.unwrap(), None);
        assert_eq!(count(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_contact() {
        let db = test_db().await;

        let ghost = Contact {
            id: 999,
            ..contact("Ghost", "+14155551234")
        };
        let result = update(&db, &ghost).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_by_id_absent_is_none() {
        let db = test_db().await;
        assert_eq!(get_by_id(db.pool(), 42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_search_matches_name_and_phone() {
        let db = test_db().await;

        insert(&db, &contact("Alice", "+14155551234")).await.unwrap();
        insert(&db, &contact("Bob", "+4915112345678")).await.unwrap();

        // Case-insensitive name match.
        let hits = search(db.pool(), "alice").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Alice");

        // Phone substring match.
        let hits = search(db.pool(), "49151").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Bob");

        let hits = search(db.pool(), "nobody").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_list_all_ordered_by_name() {
        let db = test_db().await;

        insert(&db, &contact("Carol", "+12025550100")).await.unwrap();
        insert(&db, &contact("Alice", "+12025550101")).await.unwrap();
        insert(&db, &contact("Bob", "+12025550102")).await.unwrap();

        let names: Vec<String> = list_all(db.pool())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Alice", "Bob", "Carol"]);
    }

    #[tokio::test]
    async fn test_feed_emits_snapshot_then_updates() {
        let db = test_db().await;

        insert(&db, &contact("Alice", "+12025550101")).await.unwrap();

        let mut feed = observe_all(&db);

        // New subscriber gets the current snapshot immediately.
        let first = feed.next().await.unwrap();
        assert_eq!(first.len(), 1);

        insert(&db, &contact("Bob", "+12025550102")).await.unwrap();

        let second = feed.next().await.unwrap();
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn test_search_feed_tracks_writes() {
        let db = test_db().await;

        let mut feed = observe_search(&db, "bob");
        assert!(feed.next().await.unwrap().is_empty());

        insert(&db, &contact("Alice", "+12025550101")).await.unwrap();
        // The feed re-emits on every write, even ones outside the filter.
        assert!(feed.next().await.unwrap().is_empty());

        insert(&db, &contact("Bob", "+12025550102")).await.unwrap();
        let hits = feed.next().await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Bob");
    }

    #[tokio::test]
    async fn test_feed_is_restartable() {
        let db = test_db().await;

        insert(&db, &contact("Alice", "+12025550101")).await.unwrap();

        // A second, later subscriber still sees the current state first.
        let mut early = observe_all(&db);
        assert_eq!(early.next().await.unwrap().len(), 1);

        insert(&db, &contact("Bob", "+12025550102")).await.unwrap();

        let mut late = observe_all(&db);
        assert_eq!(late.next().await.unwrap().len(), 2);
        assert_eq!(early.next().await.unwrap().len(), 2);
    }
}

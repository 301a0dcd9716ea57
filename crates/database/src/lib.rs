//! SQLite persistence layer for Rolo.
//!
//! This crate provides async storage for contacts and app preferences
//! using SQLx with SQLite, plus the pure validation rules for contact
//! form fields. Contact queries are available both as one-shot calls
//! and as live feeds that re-emit the full result set on every write.
//!
//! # Example
//!
//! ```no_run
//! use database::{contact, models::Contact, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:rolo.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let alice = Contact {
//!         id: 0,
//!         name: "Alice".to_string(),
//!         phone: "+14155551234".to_string(),
//!         email: None,
//!         address: None,
//!         date_of_birth: None,
//!         avatar_ref: None,
//!         avatar_uri: None,
//!         created_at: 1_700_000_000_000,
//!     };
//!     let id = contact::insert(&db, &alice).await?;
//!     println!("inserted contact {id}");
//!
//!     Ok(())
//! }
//! ```

pub mod contact;
pub mod error;
pub mod models;
pub mod preference;
pub mod validation;

pub use contact::ContactFeed;
pub use error::{DatabaseError, Result};
pub use models::{AvatarSource, Contact, DEFAULT_AVATAR_REF};
pub use preference::SortOrder;
pub use validation::{ValidationError, ValidationResult};

use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tokio::sync::watch;

/// Database connection wrapper.
///
/// Cloning is cheap; clones share the pool and the change notifier
/// that drives live contact feeds.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    contacts_changed: Arc<watch::Sender<u64>>,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 5;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/rolo.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        let (contacts_changed, _) = watch::channel(0);

        Ok(Self {
            pool,
            contacts_changed: Arc::new(contacts_changed),
        })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Subscribe to contact table change notifications.
    ///
    /// The carried value is a generation counter; consumers re-query on
    /// every observed change rather than reading the counter.
    pub fn subscribe_contacts(&self) -> watch::Receiver<u64> {
        self.contacts_changed.subscribe()
    }

    /// Signal that the contacts table changed. Called by write
    /// operations after commit.
    pub(crate) fn notify_contacts_changed(&self) {
        self.contacts_changed.send_modify(|generation| *generation += 1);
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

//! Contact orchestration layer for Rolo.
//!
//! Sits between a host UI and the `database` crate: the repository
//! reconciles avatar state on every write, the list query engine turns
//! debounced search plus a persisted sort preference into one live
//! result stream, and edit sessions manage form validation, dirtiness,
//! and saves.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use contacts::{AvatarHost, ContactRepository, EditSession, ListQueryEngine};
//! use database::Database;
//!
//! struct Host;
//!
//! impl AvatarHost for Host {
//!     fn resource_exists(&self, avatar_ref: i64) -> bool {
//!         (0..=7).contains(&avatar_ref)
//!     }
//!     fn uri_accessible(&self, _uri: &str) -> bool {
//!         false
//!     }
//!     fn available_avatars(&self) -> Vec<i64> {
//!         (1..=7).collect()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:rolo.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let repo = ContactRepository::new(db, Arc::new(Host));
//!
//!     let mut session = EditSession::new(repo.clone());
//!     session.update_name("Alice");
//!     session.update_phone("+14155551234");
//!     let id = session.save().await?;
//!     println!("saved contact {id}");
//!
//!     let engine = ListQueryEngine::start(repo).await?;
//!     engine.set_search_query("ali");
//!
//!     Ok(())
//! }
//! ```

pub mod avatar;
pub mod error;
pub mod query;
pub mod repository;
pub mod session;

pub use avatar::AvatarHost;
pub use error::SessionError;
pub use query::ListQueryEngine;
pub use repository::ContactRepository;
pub use session::{EditSession, SessionSnapshot};

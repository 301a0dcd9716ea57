//! Edit session: form state for creating or editing one contact.
//!
//! Tracks field values, per-field validation, the aggregate
//! save-enabled flag, and dirtiness against the loaded original.
//! A session can be frozen into a [`SessionSnapshot`] and later
//! restored, which is how hosts carry form state across process
//! restarts.

use chrono::Utc;
use database::models::Contact;
use database::validation::{self, ValidationResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SessionError;
use crate::repository::ContactRepository;

/// Serializable form state, persisted and restored by the host around
/// the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// ID of the contact being edited, if this is an edit session.
    pub contact_id: Option<i64>,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: Option<i64>,
    pub avatar_ref: Option<i64>,
    pub avatar_uri: Option<String>,
    pub dirty: bool,
}

/// In-progress create/edit form for a single contact.
pub struct EditSession {
    repo: ContactRepository,

    // Loaded original, None for a new contact.
    original: Option<Contact>,

    name: String,
    phone: String,
    email: String,
    address: String,
    date_of_birth: Option<i64>,
    avatar_ref: Option<i64>,
    avatar_uri: Option<String>,

    name_validation: ValidationResult,
    phone_validation: ValidationResult,
    email_validation: ValidationResult,

    save_enabled: bool,
    dirty: bool,
    discarded: bool,
}

impl EditSession {
    /// Start a session for a new contact.
    pub fn new(repo: ContactRepository) -> Self {
        Self {
            repo,
            original: None,
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            date_of_birth: None,
            avatar_ref: None,
            avatar_uri: None,
            name_validation: Ok(()),
            phone_validation: Ok(()),
            email_validation: Ok(()),
            save_enabled: false,
            dirty: false,
            discarded: false,
        }
    }

    /// Restore a session from a host-persisted snapshot.
    ///
    /// If the snapshot names a contact, it is re-fetched so dirty
    /// comparison works against the stored record; fields carried by
    /// the snapshot are kept over the fetched values.
    pub async fn restore(
        repo: ContactRepository,
        snapshot: SessionSnapshot,
    ) -> Result<EditSession, SessionError> {
        let mut session = Self::new(repo);
        session.name = snapshot.name;
        session.phone = snapshot.phone;
        session.email = snapshot.email;
        session.address = snapshot.address;
        session.date_of_birth = snapshot.date_of_birth;
        session.avatar_ref = snapshot.avatar_ref;
        session.avatar_uri = snapshot.avatar_uri;
        session.dirty = snapshot.dirty;

        if let Some(contact_id) = snapshot.contact_id {
            session.load_contact(contact_id).await?;
        }

        if !session.name.is_empty() || !session.phone.is_empty() {
            session.validate_all();
        }

        Ok(session)
    }

    /// Freeze the current form state for host persistence.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            contact_id: self.original.as_ref().map(|c| c.id),
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            date_of_birth: self.date_of_birth,
            avatar_ref: self.avatar_ref,
            avatar_uri: self.avatar_uri.clone(),
            dirty: self.dirty,
        }
    }

    /// Load an existing contact into the session.
    ///
    /// Returns `Ok(true)` when the contact was found. Fields that
    /// already hold text (restored state) are not overwritten. A
    /// non-positive or unknown ID leaves the session empty and returns
    /// `Ok(false)`.
    pub async fn load_contact(&mut self, id: i64) -> Result<bool, SessionError> {
        if self.discarded {
            return Err(SessionError::Discarded);
        }
        if id <= 0 {
            return Ok(false);
        }

        let Some(loaded) = self.repo.get_by_id(id).await? else {
            debug!(id, "contact to edit not found");
            return Ok(false);
        };

        if self.name.is_empty() {
            self.name = loaded.name.clone();
        }
        if self.phone.is_empty() {
            self.phone = loaded.phone.clone();
        }
        if self.email.is_empty() {
            self.email = loaded.email.clone().unwrap_or_default();
        }
        if self.address.is_empty() {
            self.address = loaded.address.clone().unwrap_or_default();
        }
        if self.date_of_birth.is_none() {
            self.date_of_birth = loaded.date_of_birth;
        }
        if self.avatar_ref.is_none() {
            self.avatar_ref = loaded.avatar_ref;
        }
        if self.avatar_uri.is_none() {
            self.avatar_uri = loaded.avatar_uri.clone();
        }

        self.original = Some(loaded);
        self.validate_all();
        self.update_dirty();

        Ok(true)
    }

    /// Set the name field and revalidate it.
    pub fn update_name(&mut self, name: impl Into<String>) {
        if self.discarded {
            return;
        }
        self.name = name.into();
        self.name_validation = validation::validate_name(&self.name);
        self.update_save_enabled();
        self.update_dirty();
    }

    /// Set the phone field and revalidate it.
    pub fn update_phone(&mut self, phone: impl Into<String>) {
        if self.discarded {
            return;
        }
        self.phone = phone.into();
        self.phone_validation = validation::validate_phone(&self.phone);
        self.update_save_enabled();
        self.update_dirty();
    }

    /// Set the email field and revalidate it.
    pub fn update_email(&mut self, email: impl Into<String>) {
        if self.discarded {
            return;
        }
        self.email = email.into();
        self.email_validation = validation::validate_email(&self.email);
        self.update_save_enabled();
        self.update_dirty();
    }

    /// Set the address field. Addresses are never validated.
    pub fn update_address(&mut self, address: impl Into<String>) {
        if self.discarded {
            return;
        }
        self.address = address.into();
        self.update_dirty();
    }

    /// Set or clear the date of birth.
    pub fn update_date_of_birth(&mut self, date_of_birth: Option<i64>) {
        if self.discarded {
            return;
        }
        self.date_of_birth = date_of_birth;
        self.update_dirty();
    }

    /// Set the avatar selection.
    pub fn update_avatar(&mut self, avatar_ref: Option<i64>, avatar_uri: Option<String>) {
        if self.discarded {
            return;
        }
        self.avatar_ref = avatar_ref;
        self.avatar_uri = avatar_uri;
        self.update_dirty();
    }

    /// Save the form: revalidate, then insert or update through the
    /// repository. Returns the contact's ID.
    ///
    /// After a successful create, the session switches to edit mode for
    /// the new record, so saving again updates rather than duplicates.
    pub async fn save(&mut self) -> Result<i64, SessionError> {
        if self.discarded {
            return Err(SessionError::Discarded);
        }

        self.validate_all();
        if !self.save_enabled {
            return Err(SessionError::FormInvalid);
        }

        let candidate = self.build_contact();

        let id = match &self.original {
            Some(original) => {
                self.repo.update(candidate.clone()).await?;
                original.id
            }
            None => self.repo.insert(candidate.clone()).await?,
        };

        self.original = Some(Contact { id, ..candidate });
        self.dirty = false;
        debug!(id, "saved contact");

        Ok(id)
    }

    /// Tear the session down. Every later mutation is a no-op and
    /// `save`/`load_contact` report [`SessionError::Discarded`].
    pub fn discard(&mut self) {
        self.discarded = true;
    }

    fn build_contact(&self) -> Contact {
        let (id, created_at) = match &self.original {
            Some(original) => (original.id, original.created_at),
            None => (0, Utc::now().timestamp_millis()),
        };

        Contact {
            id,
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: non_empty(&self.email),
            address: non_empty(&self.address),
            date_of_birth: self.date_of_birth,
            avatar_ref: self.avatar_ref,
            avatar_uri: self.avatar_uri.clone(),
            created_at,
        }
    }

    fn validate_all(&mut self) {
        self.name_validation = validation::validate_name(&self.name);
        self.phone_validation = validation::validate_phone(&self.phone);
        self.email_validation = validation::validate_email(&self.email);
        self.update_save_enabled();
    }

    fn update_save_enabled(&mut self) {
        self.save_enabled = validation::is_form_valid(
            &self.name_validation,
            &self.phone_validation,
            &self.email_validation,
        );
    }

    fn update_dirty(&mut self) {
        self.dirty = match &self.original {
            Some(original) => {
                self.name.trim() != original.name
                    || self.phone.trim() != original.phone
                    || non_empty(&self.email) != original.email
                    || non_empty(&self.address) != original.address
                    || self.date_of_birth != original.date_of_birth
                    || self.avatar_ref != original.avatar_ref
                    || self.avatar_uri != original.avatar_uri
            }
            None => {
                !self.name.trim().is_empty()
                    || !self.phone.trim().is_empty()
                    || !self.email.trim().is_empty()
                    || !self.address.trim().is_empty()
                    || self.date_of_birth.is_some()
                    || self.avatar_ref.is_some()
                    || self.avatar_uri.is_some()
            }
        };
    }

    /// Current name field value.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current phone field value.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Current email field value.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Current address field value.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Current date of birth, epoch milliseconds.
    pub fn date_of_birth(&self) -> Option<i64> {
        self.date_of_birth
    }

    /// Current avatar selection as (built-in reference, URI).
    pub fn avatar(&self) -> (Option<i64>, Option<&str>) {
        (self.avatar_ref, self.avatar_uri.as_deref())
    }

    /// Latest name validation result.
    pub fn name_validation(&self) -> &ValidationResult {
        &self.name_validation
    }

    /// Latest phone validation result.
    pub fn phone_validation(&self) -> &ValidationResult {
        &self.phone_validation
    }

    /// Latest email validation result.
    pub fn email_validation(&self) -> &ValidationResult {
        &self.email_validation
    }

    /// Whether all save-gating fields currently validate.
    pub fn is_save_enabled(&self) -> bool {
        self.save_enabled
    }

    /// Whether the form differs from the original snapshot (or, for a
    /// new contact, holds any content).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the session was torn down.
    pub fn is_discarded(&self) -> bool {
        self.discarded
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

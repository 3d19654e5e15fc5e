//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters (SQLite store, in-memory store, local audio
//! directory, system clock, configured identity).

use crate::domain::{
    ActionItem, DomainError, Meeting, NewActionItem, NewMeeting, SharedMeeting, User,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

/// Meeting storage.
#[async_trait::async_trait]
pub trait MeetingRepo: Send + Sync {
    /// Insert one meeting and return the stored row.
    async fn insert_meeting(&self, meeting: &NewMeeting) -> Result<Meeting, DomainError>;

    async fn get_meeting(&self, id: Uuid) -> Result<Option<Meeting>, DomainError>;

    /// All meetings ordered by date ascending. `title_query` filters by
    /// case-insensitive substring of the title.
    async fn list_meetings(&self, title_query: Option<&str>) -> Result<Vec<Meeting>, DomainError>;

    async fn update_notes(&self, id: Uuid, notes: &str) -> Result<(), DomainError>;

    async fn update_color(&self, id: Uuid, color: &str) -> Result<(), DomainError>;

    async fn set_share_token(&self, id: Uuid, token: &str) -> Result<(), DomainError>;

    /// Meeting plus organizer name for a share token. `None` for unknown tokens.
    async fn find_by_share_token(&self, token: &str)
    -> Result<Option<SharedMeeting>, DomainError>;

    async fn set_audio_url(&self, id: Uuid, url: &str) -> Result<(), DomainError>;

    /// Delete meetings (with their participants and action items). Returns rows removed.
    async fn delete_meetings(&self, ids: &[Uuid]) -> Result<usize, DomainError>;
}

/// Meeting membership.
#[async_trait::async_trait]
pub trait ParticipantRepo: Send + Sync {
    /// Fails with `DomainError::DuplicateParticipant` if the pair already exists.
    async fn add_participant(&self, meeting_id: Uuid, user_id: Uuid) -> Result<(), DomainError>;

    async fn list_participants(&self, meeting_id: Uuid) -> Result<Vec<User>, DomainError>;
}

/// Action-item storage.
#[async_trait::async_trait]
pub trait ActionItemRepo: Send + Sync {
    async fn insert_action_item(&self, item: &NewActionItem) -> Result<ActionItem, DomainError>;

    /// Insert all items or none of them.
    async fn insert_action_items(&self, items: &[NewActionItem]) -> Result<(), DomainError>;

    async fn set_completed(&self, id: Uuid, completed: bool) -> Result<(), DomainError>;

    /// Items of one meeting, oldest first.
    async fn list_for_meeting(&self, meeting_id: Uuid) -> Result<Vec<ActionItem>, DomainError>;

    /// Items assigned to a user, by deadline (none last) then newest first.
    async fn list_assigned_to(&self, user_id: Uuid) -> Result<Vec<ActionItem>, DomainError>;
}

/// Registered users (profiles).
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Return the user with this email, creating the profile if missing.
    async fn upsert_user(&self, email: &str, full_name: Option<&str>)
    -> Result<User, DomainError>;

    async fn set_avatar_url(&self, user_id: Uuid, url: &str) -> Result<(), DomainError>;
}

/// Who is acting. Used to stamp ownership on created records.
#[async_trait::async_trait]
pub trait IdentityPort: Send + Sync {
    async fn current_user(&self) -> Result<User, DomainError>;
}

/// Object storage (meeting audio, avatars). One instance per bucket.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` (overwriting) and return its public URL.
    async fn upload(&self, key: &str, bytes: &[u8]) -> Result<String, DomainError>;
}

/// Time source. Keeps "today" and local-time conversion out of the pure code.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Today's date in the user's time zone.
    fn today(&self) -> NaiveDate;

    /// Interpret a wall-clock time in the user's time zone.
    fn local_to_utc(&self, local: NaiveDateTime) -> DateTime<Utc>;
}

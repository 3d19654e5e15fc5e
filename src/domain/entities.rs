//! Domain entities. Pure data structures for the core business.
//!
//! No database/IO types here; adapters map rows into these.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Colour shown for meetings that never had one picked.
pub const DEFAULT_MEETING_COLOR: &str = "#667eea";

/// A registered user (profile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    /// Public URL of the profile picture.
    pub avatar_url: Option<String>,
}

impl User {
    /// Name for display: full name when known, email otherwise.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// A scheduled meeting as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub agenda: Option<String>,
    pub notes: Option<String>,
    pub organizer_id: Uuid,
    pub color: Option<String>,
    pub category: Option<String>,
    pub share_token: Option<String>,
    pub audio_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Meeting {
    pub fn color_or_default(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_MEETING_COLOR)
    }

    /// Title search used by every store: Unicode case-insensitive substring.
    /// A blank query matches everything.
    pub fn title_matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty() || self.title.to_lowercase().contains(&needle)
    }
}

/// Insert payload for a meeting. The store assigns id and created_at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeeting {
    pub title: String,
    pub date: DateTime<Utc>,
    pub agenda: Option<String>,
    pub category: Option<String>,
    pub organizer_id: Uuid,
}

/// Read-only projection served through a share link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedMeeting {
    pub meeting: Meeting,
    pub organizer_name: Option<String>,
}

/// A task attached to a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub description: String,
    pub assignee_id: Option<Uuid>,
    pub deadline: Option<NaiveDate>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for an action item. New items always start open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActionItem {
    pub meeting_id: Uuid,
    pub description: String,
    pub assignee_id: Option<Uuid>,
    pub deadline: Option<NaiveDate>,
}

/// Everything the meeting detail view shows.
#[derive(Debug, Clone)]
pub struct MeetingDetails {
    pub meeting: Meeting,
    pub participants: Vec<User>,
    pub action_items: Vec<ActionItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting(title: &str) -> Meeting {
        Meeting {
            id: Uuid::new_v4(),
            title: title.to_string(),
            date: Utc::now(),
            agenda: None,
            notes: None,
            organizer_id: Uuid::new_v4(),
            color: None,
            category: None,
            share_token: None,
            audio_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_title_matches_folds_unicode_case() {
        assert!(meeting("ŘÍZENÍ projektu").title_matches("řízení"));
        assert!(meeting("Úkoly týmu").title_matches(" ÚKOLY "));
        assert!(meeting("Weekly Sync").title_matches(""));
        assert!(!meeting("Weekly Sync").title_matches("retro"));
    }
}

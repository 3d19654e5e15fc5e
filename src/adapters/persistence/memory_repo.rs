//! In-process store implementing every persistence port.
//!
//! Used by tests and for trying the app without a database file. Failures
//! can be injected per meeting title and for action-item batches, which is
//! how the import and extraction error paths are exercised.

use crate::domain::{
    ActionItem, DomainError, Meeting, NewActionItem, NewMeeting, SharedMeeting, User,
};
use crate::ports::{ActionItemRepo, MeetingRepo, ParticipantRepo, UserDirectory};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    meetings: Vec<Meeting>,
    participants: Vec<(Uuid, Uuid)>,
    action_items: Vec<ActionItem>,
}

/// Memory-backed store. Cheap to construct; share via Arc.
#[derive(Debug, Default)]
pub struct MemoryRepo {
    state: RwLock<MemoryState>,
    failing_titles: std::sync::Mutex<HashSet<String>>,
    fail_action_batches: AtomicBool,
    meeting_insert_attempts: AtomicUsize,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `insert_meeting` fail for meetings with this exact title.
    pub fn fail_meeting_title(&self, title: &str) {
        if let Ok(mut titles) = self.failing_titles.lock() {
            titles.insert(title.to_string());
        }
    }

    /// Make every `insert_action_items` batch fail.
    pub fn fail_action_batches(&self, fail: bool) {
        self.fail_action_batches.store(fail, Ordering::SeqCst);
    }

    /// Number of `insert_meeting` calls so far, failed ones included.
    pub fn meeting_insert_attempts(&self) -> usize {
        self.meeting_insert_attempts.load(Ordering::SeqCst)
    }

    pub async fn meeting_count(&self) -> usize {
        self.state.read().await.meetings.len()
    }

    fn title_fails(&self, title: &str) -> bool {
        self.failing_titles
            .lock()
            .map(|t| t.contains(title))
            .unwrap_or(false)
    }

    fn to_action_item(item: &NewActionItem) -> ActionItem {
        ActionItem {
            id: Uuid::new_v4(),
            meeting_id: item.meeting_id,
            description: item.description.clone(),
            assignee_id: item.assignee_id,
            deadline: item.deadline,
            is_completed: false,
            created_at: Utc::now(),
        }
    }
}

fn with_meeting<T>(
    state: &mut MemoryState,
    id: Uuid,
    f: impl FnOnce(&mut Meeting) -> T,
) -> Result<T, DomainError> {
    state
        .meetings
        .iter_mut()
        .find(|m| m.id == id)
        .map(f)
        .ok_or_else(|| DomainError::NotFound(format!("meeting {}", id)))
}

#[async_trait::async_trait]
impl MeetingRepo for MemoryRepo {
    async fn insert_meeting(&self, meeting: &NewMeeting) -> Result<Meeting, DomainError> {
        self.meeting_insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.title_fails(&meeting.title) {
            return Err(DomainError::Persistence(format!(
                "insert rejected for '{}'",
                meeting.title
            )));
        }
        let stored = Meeting {
            id: Uuid::new_v4(),
            title: meeting.title.clone(),
            date: meeting.date,
            agenda: meeting.agenda.clone(),
            notes: None,
            organizer_id: meeting.organizer_id,
            color: None,
            category: meeting.category.clone(),
            share_token: None,
            audio_url: None,
            created_at: Utc::now(),
        };
        self.state.write().await.meetings.push(stored.clone());
        Ok(stored)
    }

    async fn get_meeting(&self, id: Uuid) -> Result<Option<Meeting>, DomainError> {
        let state = self.state.read().await;
        Ok(state.meetings.iter().find(|m| m.id == id).cloned())
    }

    async fn list_meetings(&self, title_query: Option<&str>) -> Result<Vec<Meeting>, DomainError> {
        let query = title_query.unwrap_or_default();
        let state = self.state.read().await;
        let mut meetings: Vec<Meeting> = state
            .meetings
            .iter()
            .filter(|m| m.title_matches(query))
            .cloned()
            .collect();
        meetings.sort_by_key(|m| m.date);
        Ok(meetings)
    }

    async fn update_notes(&self, id: Uuid, notes: &str) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        with_meeting(&mut state, id, |m| m.notes = Some(notes.to_string()))
    }

    async fn update_color(&self, id: Uuid, color: &str) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        with_meeting(&mut state, id, |m| m.color = Some(color.to_string()))
    }

    async fn set_share_token(&self, id: Uuid, token: &str) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        with_meeting(&mut state, id, |m| m.share_token = Some(token.to_string()))
    }

    async fn find_by_share_token(
        &self,
        token: &str,
    ) -> Result<Option<SharedMeeting>, DomainError> {
        let state = self.state.read().await;
        let Some(meeting) = state
            .meetings
            .iter()
            .find(|m| m.share_token.as_deref() == Some(token))
        else {
            return Ok(None);
        };
        let organizer_name = state
            .users
            .iter()
            .find(|u| u.id == meeting.organizer_id)
            .map(|u| u.display_name().to_string());
        Ok(Some(SharedMeeting {
            meeting: meeting.clone(),
            organizer_name,
        }))
    }

    async fn set_audio_url(&self, id: Uuid, url: &str) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        with_meeting(&mut state, id, |m| m.audio_url = Some(url.to_string()))
    }

    async fn delete_meetings(&self, ids: &[Uuid]) -> Result<usize, DomainError> {
        let mut state = self.state.write().await;
        let before = state.meetings.len();
        state.meetings.retain(|m| !ids.contains(&m.id));
        state.participants.retain(|(m, _)| !ids.contains(m));
        state.action_items.retain(|a| !ids.contains(&a.meeting_id));
        Ok(before - state.meetings.len())
    }
}

#[async_trait::async_trait]
impl ParticipantRepo for MemoryRepo {
    async fn add_participant(&self, meeting_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.participants.contains(&(meeting_id, user_id)) {
            return Err(DomainError::DuplicateParticipant);
        }
        state.participants.push((meeting_id, user_id));
        Ok(())
    }

    async fn list_participants(&self, meeting_id: Uuid) -> Result<Vec<User>, DomainError> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .participants
            .iter()
            .filter(|(m, _)| *m == meeting_id)
            .filter_map(|(_, u)| state.users.iter().find(|user| user.id == *u).cloned())
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }
}

#[async_trait::async_trait]
impl ActionItemRepo for MemoryRepo {
    async fn insert_action_item(&self, item: &NewActionItem) -> Result<ActionItem, DomainError> {
        let stored = Self::to_action_item(item);
        self.state.write().await.action_items.push(stored.clone());
        Ok(stored)
    }

    async fn insert_action_items(&self, items: &[NewActionItem]) -> Result<(), DomainError> {
        if self.fail_action_batches.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence("batch insert rejected".into()));
        }
        let mut state = self.state.write().await;
        state
            .action_items
            .extend(items.iter().map(Self::to_action_item));
        Ok(())
    }

    async fn set_completed(&self, id: Uuid, completed: bool) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let item = state
            .action_items
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("action item {}", id)))?;
        item.is_completed = completed;
        Ok(())
    }

    async fn list_for_meeting(&self, meeting_id: Uuid) -> Result<Vec<ActionItem>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .action_items
            .iter()
            .filter(|a| a.meeting_id == meeting_id)
            .cloned()
            .collect())
    }

    async fn list_assigned_to(&self, user_id: Uuid) -> Result<Vec<ActionItem>, DomainError> {
        let state = self.state.read().await;
        let mut items: Vec<ActionItem> = state
            .action_items
            .iter()
            .filter(|a| a.assignee_id == Some(user_id))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            (a.deadline.is_none(), a.deadline)
                .cmp(&(b.deadline.is_none(), b.deadline))
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(items)
    }
}

#[async_trait::async_trait]
impl UserDirectory for MemoryRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let needle = email.trim().to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == needle)
            .cloned())
    }

    async fn upsert_user(
        &self,
        email: &str,
        full_name: Option<&str>,
    ) -> Result<User, DomainError> {
        let needle = email.trim().to_lowercase();
        let mut state = self.state.write().await;
        if let Some(user) = state
            .users
            .iter_mut()
            .find(|u| u.email.to_lowercase() == needle)
        {
            if full_name.is_some() {
                user.full_name = full_name.map(str::to_string);
            }
            return Ok(user.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.trim().to_string(),
            full_name: full_name.map(str::to_string),
            avatar_url: None,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn set_avatar_url(&self, user_id: Uuid, url: &str) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| DomainError::NotFound(format!("user {}", user_id)))?;
        user.avatar_url = Some(url.to_string());
        Ok(())
    }
}

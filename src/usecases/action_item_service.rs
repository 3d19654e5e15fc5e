//! Action items: extraction from notes ("AI summary"), manual creation,
//! completion toggling and the personal task list.
//!
//! Extracted items are written as one batch. Unlike the importer there is no
//! partial success: the batch is stored completely or the call fails.

use crate::domain::{
    ActionItem, DomainError, ExtractionPass, NewActionItem, extract_action_items,
};
use crate::ports::{ActionItemRepo, IdentityPort, MeetingRepo, UserDirectory};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// What an extraction run created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Items stored. Zero means nothing in the notes looked like a task.
    pub count: usize,
    pub pass: ExtractionPass,
}

/// The current user's assigned items, split for display.
#[derive(Debug, Clone, Default)]
pub struct MyActionItems {
    pub pending: Vec<ActionItem>,
    pub completed: Vec<ActionItem>,
}

pub struct ActionItemService {
    meetings: Arc<dyn MeetingRepo>,
    items: Arc<dyn ActionItemRepo>,
    users: Arc<dyn UserDirectory>,
    identity: Arc<dyn IdentityPort>,
}

impl ActionItemService {
    pub fn new(
        meetings: Arc<dyn MeetingRepo>,
        items: Arc<dyn ActionItemRepo>,
        users: Arc<dyn UserDirectory>,
        identity: Arc<dyn IdentityPort>,
    ) -> Self {
        Self {
            meetings,
            items,
            users,
            identity,
        }
    }

    /// Extract action items from `notes` and store them for `meeting_id`.
    pub async fn generate_from_notes(
        &self,
        meeting_id: Uuid,
        notes: &str,
    ) -> Result<ExtractionSummary, DomainError> {
        let outcome = extract_action_items(notes);
        let summary = ExtractionSummary {
            count: outcome.count(),
            pass: outcome.pass,
        };
        if outcome.is_empty() {
            info!(%meeting_id, pass = %outcome.pass, "no action items found in notes");
            return Ok(summary);
        }

        let batch: Vec<NewActionItem> = outcome
            .items
            .into_iter()
            .map(|draft| NewActionItem {
                meeting_id,
                description: draft.description,
                assignee_id: None,
                deadline: None,
            })
            .collect();

        if let Err(e) = self.items.insert_action_items(&batch).await {
            error!(%meeting_id, error = %e, "creating extracted action items failed");
            return Err(DomainError::Persistence(format!(
                "Failed to create action items: {}",
                e
            )));
        }

        info!(%meeting_id, count = summary.count, pass = %summary.pass, "action items extracted");
        Ok(summary)
    }

    /// Same as [`generate_from_notes`](Self::generate_from_notes) using the stored notes.
    pub async fn generate_for_meeting(
        &self,
        meeting_id: Uuid,
    ) -> Result<ExtractionSummary, DomainError> {
        let meeting = self
            .meetings
            .get_meeting(meeting_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("meeting {}", meeting_id)))?;
        let notes = meeting.notes.unwrap_or_default();
        self.generate_from_notes(meeting_id, &notes).await
    }

    /// Add one item by hand. The assignee, if given, must be a registered email.
    pub async fn add_action_item(
        &self,
        meeting_id: Uuid,
        description: &str,
        assignee_email: Option<&str>,
        deadline: Option<NaiveDate>,
    ) -> Result<ActionItem, DomainError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(DomainError::Validation(
                "action item description is empty".into(),
            ));
        }

        let assignee_id = match assignee_email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => Some(
                self.users
                    .find_by_email(email)
                    .await?
                    .ok_or_else(|| DomainError::UserNotFound {
                        email: email.to_string(),
                    })?
                    .id,
            ),
            None => None,
        };

        let item = self
            .items
            .insert_action_item(&NewActionItem {
                meeting_id,
                description: description.to_string(),
                assignee_id,
                deadline,
            })
            .await?;
        info!(%meeting_id, item_id = %item.id, "action item added");
        Ok(item)
    }

    pub async fn toggle_action_item(&self, id: Uuid, completed: bool) -> Result<(), DomainError> {
        self.items.set_completed(id, completed).await
    }

    pub async fn list_for_meeting(&self, meeting_id: Uuid) -> Result<Vec<ActionItem>, DomainError> {
        self.items.list_for_meeting(meeting_id).await
    }

    /// Items assigned to the current user, pending ones first.
    pub async fn my_action_items(&self) -> Result<MyActionItems, DomainError> {
        let me = self.identity.current_user().await?;
        let (completed, pending): (Vec<ActionItem>, Vec<ActionItem>) = self
            .items
            .list_assigned_to(me.id)
            .await?
            .into_iter()
            .partition(|i| i.is_completed);
        Ok(MyActionItems { pending, completed })
    }
}

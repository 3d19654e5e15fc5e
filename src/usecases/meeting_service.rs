//! Meeting use cases: create, browse, notes, participants, colour, share
//! links, audio attachment, bulk delete.

use crate::domain::{DomainError, Meeting, MeetingDetails, NewMeeting, SharedMeeting};
use crate::ports::{
    ActionItemRepo, Clock, IdentityPort, MeetingRepo, ObjectStore, ParticipantRepo, UserDirectory,
};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Accepted inputs for a meeting start (local time). Seconds are optional.
const MEETING_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Content type of recordings; fixes the object key extension.
pub const AUDIO_EXTENSION: &str = "webm";

/// Parse a `YYYY-MM-DDTHH:MM[:SS]` (or space-separated) start time.
pub fn parse_meeting_start(input: &str) -> Result<NaiveDateTime, DomainError> {
    let input = input.trim();
    MEETING_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| {
            DomainError::Validation(format!(
                "'{}' is not a date and time like 2025-01-20T09:00",
                input
            ))
        })
}

/// Normalise a `#rrggbb` colour to lower case; anything else is rejected.
pub fn normalize_color(input: &str) -> Result<String, DomainError> {
    let input = input.trim();
    let valid = input.len() == 7
        && input.starts_with('#')
        && input[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(input.to_ascii_lowercase())
    } else {
        Err(DomainError::Validation(format!(
            "'{}' is not a colour like #667eea",
            input
        )))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub struct MeetingService {
    meetings: Arc<dyn MeetingRepo>,
    participants: Arc<dyn ParticipantRepo>,
    items: Arc<dyn ActionItemRepo>,
    users: Arc<dyn UserDirectory>,
    identity: Arc<dyn IdentityPort>,
    audio: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    share_base_url: String,
}

impl MeetingService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        meetings: Arc<dyn MeetingRepo>,
        participants: Arc<dyn ParticipantRepo>,
        items: Arc<dyn ActionItemRepo>,
        users: Arc<dyn UserDirectory>,
        identity: Arc<dyn IdentityPort>,
        audio: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        share_base_url: String,
    ) -> Self {
        Self {
            meetings,
            participants,
            items,
            users,
            identity,
            audio,
            clock,
            share_base_url,
        }
    }

    /// Create a meeting owned by the current user, who also becomes a participant.
    pub async fn create_meeting(
        &self,
        title: &str,
        start: &str,
        agenda: Option<&str>,
        category: Option<&str>,
    ) -> Result<Meeting, DomainError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::Validation("meeting title is empty".into()));
        }
        let local_start = parse_meeting_start(start)?;
        let organizer = self.identity.current_user().await?;

        let meeting = self
            .meetings
            .insert_meeting(&NewMeeting {
                title: title.to_string(),
                date: self.clock.local_to_utc(local_start),
                agenda: non_blank(agenda),
                category: non_blank(category),
                organizer_id: organizer.id,
            })
            .await?;

        if let Err(e) = self
            .participants
            .add_participant(meeting.id, organizer.id)
            .await
        {
            warn!(meeting_id = %meeting.id, error = %e, "adding organizer as participant failed");
        }
        info!(meeting_id = %meeting.id, title = %meeting.title, "meeting created");
        Ok(meeting)
    }

    /// Meetings by date; `query` filters titles case-insensitively.
    pub async fn list_meetings(&self, query: Option<&str>) -> Result<Vec<Meeting>, DomainError> {
        self.meetings.list_meetings(query).await
    }

    pub async fn meeting(&self, id: Uuid) -> Result<Meeting, DomainError> {
        self.meetings
            .get_meeting(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("meeting {}", id)))
    }

    pub async fn meeting_details(&self, id: Uuid) -> Result<MeetingDetails, DomainError> {
        let meeting = self.meeting(id).await?;
        let participants = self.participants.list_participants(id).await?;
        let action_items = self.items.list_for_meeting(id).await?;
        Ok(MeetingDetails {
            meeting,
            participants,
            action_items,
        })
    }

    pub async fn update_notes(&self, id: Uuid, notes: &str) -> Result<(), DomainError> {
        self.meetings.update_notes(id, notes).await?;
        info!(meeting_id = %id, chars = notes.chars().count(), "notes saved");
        Ok(())
    }

    pub async fn update_color(&self, id: Uuid, color: &str) -> Result<String, DomainError> {
        let color = normalize_color(color)?;
        self.meetings.update_color(id, &color).await?;
        Ok(color)
    }

    /// Add a registered user (by email) to a meeting.
    pub async fn add_participant(&self, id: Uuid, email: &str) -> Result<(), DomainError> {
        let email = email.trim();
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::UserNotFound {
                email: email.to_string(),
            })?;
        self.participants.add_participant(id, user.id).await?;
        info!(meeting_id = %id, user_id = %user.id, "participant added");
        Ok(())
    }

    /// Share link for a meeting. The token is generated once and then reused.
    pub async fn share_link(&self, id: Uuid) -> Result<String, DomainError> {
        let meeting = self.meeting(id).await?;
        let token = match meeting.share_token {
            Some(token) => token,
            None => {
                let token = Uuid::new_v4().to_string();
                self.meetings.set_share_token(id, &token).await?;
                info!(meeting_id = %id, "share token generated");
                token
            }
        };
        Ok(format!("{}{}", self.share_base_url, token))
    }

    /// Read-only view behind a share token; `None` if the token is unknown.
    pub async fn shared_meeting(&self, token: &str) -> Result<Option<SharedMeeting>, DomainError> {
        let token = token.trim();
        let token = token
            .strip_prefix(self.share_base_url.as_str())
            .unwrap_or(token);
        if token.is_empty() {
            return Ok(None);
        }
        self.meetings.find_by_share_token(token).await
    }

    /// Upload a recording as `<meeting-id>/<unix-millis>.webm` and link it to the meeting.
    pub async fn attach_audio(&self, id: Uuid, bytes: &[u8]) -> Result<String, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::Validation("no audio data provided".into()));
        }
        self.meeting(id).await?;
        let key = format!(
            "{}/{}.{}",
            id,
            self.clock.now().timestamp_millis(),
            AUDIO_EXTENSION
        );
        let url = self.audio.upload(&key, bytes).await?;
        self.meetings.set_audio_url(id, &url).await?;
        info!(meeting_id = %id, key = %key, "audio attached");
        Ok(url)
    }

    /// Delete meetings in bulk. Returns how many existed.
    pub async fn delete_meetings(&self, ids: &[Uuid]) -> Result<usize, DomainError> {
        let removed = self.meetings.delete_meetings(ids).await?;
        info!(requested = ids.len(), removed, "meetings deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::identity::ConfigIdentity;
    use crate::adapters::persistence::MemoryRepo;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    /// Records uploads instead of writing files.
    #[derive(Default)]
    struct RecordingStore {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl ObjectStore for RecordingStore {
        async fn upload(&self, key: &str, _bytes: &[u8]) -> Result<String, DomainError> {
            self.keys.lock().unwrap().push(key.to_string());
            Ok(format!("memory://{}", key))
        }
    }

    fn service(repo: &Arc<MemoryRepo>, audio: Arc<RecordingStore>) -> MeetingService {
        let identity = Arc::new(ConfigIdentity::new(
            "ana@example.com".into(),
            Some("Ana".into()),
            repo.clone(),
        ));
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap());
        MeetingService::new(
            repo.clone(),
            repo.clone(),
            repo.clone(),
            repo.clone(),
            identity,
            audio,
            Arc::new(clock),
            "https://notes.example.com/share/".into(),
        )
    }

    #[test]
    fn test_parse_meeting_start_seconds_optional() {
        let a = parse_meeting_start("2025-01-20T10:30").unwrap();
        let b = parse_meeting_start("2025-01-20T10:30:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_meeting_start("2025-01-20").is_err());
        assert!(parse_meeting_start("tomorrow").is_err());
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#AABBCC").unwrap(), "#aabbcc");
        assert!(normalize_color("aabbcc").is_err());
        assert!(normalize_color("#abc").is_err());
        assert!(normalize_color("#gggggg").is_err());
    }

    #[tokio::test]
    async fn test_create_meeting_adds_organizer() {
        let repo = Arc::new(MemoryRepo::new());
        let svc = service(&repo, Arc::default());
        let m = svc
            .create_meeting(" Kickoff ", "2025-01-20T10:30", Some("  "), Some(" Workshop "))
            .await
            .unwrap();
        assert_eq!(m.title, "Kickoff");
        assert_eq!(m.agenda, None);
        assert_eq!(m.category.as_deref(), Some("Workshop"));
        assert_eq!(m.date, Utc.with_ymd_and_hms(2025, 1, 20, 10, 30, 0).unwrap());

        let details = svc.meeting_details(m.id).await.unwrap();
        assert_eq!(details.participants.len(), 1);
        assert_eq!(details.participants[0].display_name(), "Ana");

        assert!(matches!(
            svc.create_meeting("", "2025-01-20T10:30", None, None).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_participants_unknown_and_duplicate() {
        let repo = Arc::new(MemoryRepo::new());
        let svc = service(&repo, Arc::default());
        let m = svc.create_meeting("Sync", "2025-01-20T10:30", None, None).await.unwrap();
        repo.upsert_user("bob@example.com", None).await.unwrap();

        assert!(matches!(
            svc.add_participant(m.id, "nobody@example.com").await,
            Err(DomainError::UserNotFound { .. })
        ));
        svc.add_participant(m.id, "bob@example.com").await.unwrap();
        assert!(matches!(
            svc.add_participant(m.id, "BOB@example.com").await,
            Err(DomainError::DuplicateParticipant)
        ));
    }

    #[tokio::test]
    async fn test_share_link_is_stable_and_resolves() {
        let repo = Arc::new(MemoryRepo::new());
        let svc = service(&repo, Arc::default());
        let m = svc.create_meeting("Board", "2025-02-01T14:00", None, None).await.unwrap();

        let first = svc.share_link(m.id).await.unwrap();
        let second = svc.share_link(m.id).await.unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("https://notes.example.com/share/"));

        let shared = svc.shared_meeting(&first).await.unwrap().unwrap();
        assert_eq!(shared.meeting.id, m.id);
        assert_eq!(shared.organizer_name.as_deref(), Some("Ana"));
        assert!(svc.shared_meeting("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attach_audio_key_and_url() {
        let repo = Arc::new(MemoryRepo::new());
        let audio = Arc::new(RecordingStore::default());
        let svc = service(&repo, audio.clone());
        let m = svc.create_meeting("Demo", "2025-02-01T14:00", None, None).await.unwrap();

        let url = svc.attach_audio(m.id, b"OggS").await.unwrap();

        let expected_key = format!("{}/{}.webm", m.id, 1_792_310_400_000i64);
        assert_eq!(audio.keys.lock().unwrap().clone(), vec![expected_key.clone()]);
        assert_eq!(url, format!("memory://{}", expected_key));
        assert_eq!(svc.meeting(m.id).await.unwrap().audio_url, Some(url));
        assert!(svc.attach_audio(m.id, b"").await.is_err());
    }

    #[tokio::test]
    async fn test_color_and_delete() {
        let repo = Arc::new(MemoryRepo::new());
        let svc = service(&repo, Arc::default());
        let a = svc.create_meeting("A", "2025-02-01T14:00", None, None).await.unwrap();
        let b = svc.create_meeting("B", "2025-02-02T14:00", None, None).await.unwrap();

        assert_eq!(svc.update_color(a.id, "#FF0000").await.unwrap(), "#ff0000");
        assert_eq!(svc.meeting(a.id).await.unwrap().color_or_default(), "#ff0000");
        assert_eq!(svc.meeting(b.id).await.unwrap().color_or_default(), "#667eea");

        assert_eq!(svc.delete_meetings(&[a.id, Uuid::new_v4()]).await.unwrap(), 1);
        let left = svc.list_meetings(None).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, b.id);
    }
}

//! End-to-end import and extraction flows over the in-memory store and the
//! SQLite store, driven through the services the TUI uses.

use chrono::{TimeZone, Utc};
use meeting_notes::adapters::clock::FixedClock;
use meeting_notes::adapters::identity::ConfigIdentity;
use meeting_notes::adapters::persistence::{MemoryRepo, SqliteRepo};
use meeting_notes::domain::{ExtractionPass, ImportErrorKind};
use meeting_notes::ports::{ActionItemRepo, MeetingRepo, ParticipantRepo, UserDirectory};
use meeting_notes::usecases::{ActionItemService, ImportService, ImportStatus};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

// =============================================================================
// Helpers
// =============================================================================

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at_date(2026, 10, 18).unwrap())
}

fn identity(users: Arc<dyn UserDirectory>) -> Arc<ConfigIdentity> {
    Arc::new(ConfigIdentity::new(
        "ana@example.com".into(),
        Some("Ana".into()),
        users,
    ))
}

fn memory_services(repo: &Arc<MemoryRepo>) -> (ImportService, ActionItemService) {
    let id = identity(repo.clone());
    let import = ImportService::new(repo.clone(), repo.clone(), id.clone(), clock());
    let items = ActionItemService::new(repo.clone(), repo.clone(), repo.clone(), id);
    (import, items)
}

// =============================================================================
// Import
// =============================================================================

/// Valid, invalid, valid: two meetings, two inserts, message names line 2.
#[tokio::test]
async fn e2e_import_fixture_with_one_bad_line() {
    let text = std::fs::read_to_string(fixture("meetings.txt")).unwrap();
    let repo = Arc::new(MemoryRepo::new());
    let (import, _) = memory_services(&repo);

    let report = import.import_meetings(&text).await;

    assert!(report.success(), "unexpected report: {}", report.message());
    assert_eq!(report.created(), 2);
    assert_eq!(repo.meeting_insert_attempts(), 2);
    assert_eq!(repo.meeting_count().await, 2);
    assert_eq!(
        report.status,
        ImportStatus::Imported {
            created: 2,
            skipped: 1
        }
    );
    assert_eq!(report.errors[0].line, 2);
    assert!(matches!(
        &report.errors[0].kind,
        ImportErrorKind::InvalidDate { token, .. } if token == "2025-13-45"
    ));
    let msg = report.message();
    assert!(msg.contains("line 2"), "message was: {msg}");
    assert!(msg.contains("2025-13-45"), "message was: {msg}");

    let titles: Vec<String> = repo
        .list_meetings(None)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(titles, vec!["Weekly Sync", "Quarterly Review"]);
}

/// Windows line endings and alternate date formats import the same way.
#[tokio::test]
async fn e2e_import_crlf_and_date_variants() {
    let repo = Arc::new(MemoryRepo::new());
    let (import, _) = memory_services(&repo);

    let report = import
        .import_meetings("20.01.2025 Retro\r\n2025/01/21 Planning\r\n2025-01-22T14:30 Demo\r\n")
        .await;

    assert_eq!(report.created(), 3);
    assert!(report.errors.is_empty());
    let demo = &report.meetings[2];
    assert_eq!(demo.date, Utc.with_ymd_and_hms(2025, 1, 22, 14, 30, 0).unwrap());
}

/// An import then an extraction on one of the imported meetings.
#[tokio::test]
async fn e2e_import_then_extract_action_items() {
    let repo = Arc::new(MemoryRepo::new());
    let (import, items) = memory_services(&repo);

    let report = import.import_meetings("2025-01-20 Weekly Sync").await;
    let meeting_id = report.meetings[0].id;
    repo.update_notes(
        meeting_id,
        "Status of the rollout\nTODO: update the runbook\n- [ ] book the venue\n",
    )
    .await
    .unwrap();

    let summary = items.generate_for_meeting(meeting_id).await.unwrap();

    assert_eq!(summary.count, 2);
    assert_eq!(summary.pass, ExtractionPass::Strict);
    let stored: Vec<String> = repo
        .list_for_meeting(meeting_id)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.description)
        .collect();
    assert_eq!(stored, vec!["update the runbook", "book the venue"]);
}

// =============================================================================
// SQLite
// =============================================================================

/// Same fixture against the on-disk store.
#[tokio::test]
async fn e2e_import_into_sqlite() {
    let dir = std::env::temp_dir().join(format!("meeting-notes-e2e-{}", Uuid::new_v4()));
    let repo = Arc::new(SqliteRepo::connect(&dir).await.unwrap());
    let id = identity(repo.clone());
    let import = ImportService::new(repo.clone(), repo.clone(), id.clone(), clock());

    let text = std::fs::read_to_string(fixture("meetings.txt")).unwrap();
    let report = import.import_meetings(&text).await;

    assert_eq!(report.created(), 2);
    let stored = repo.list_meetings(Some("review")).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Quarterly Review");
    let participants = repo.list_participants(stored[0].id).await.unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].display_name(), "Ana");

    let _ = std::fs::remove_dir_all(&dir);
}

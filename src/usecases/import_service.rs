//! Bulk import use case: parse an uploaded text file, insert one meeting per
//! valid line, report the outcome.
//!
//! - Parsing is delegated to `domain::import` (pure)
//! - Each draft is inserted on its own; a failed insert is logged and skipped
//! - The organizer is added as participant of every created meeting
//! - Failures outside the per-line loop become a `Critical` report, never an Err

use crate::domain::import::snippet;
use crate::domain::{DomainError, ImportErrorKind, LineError, Meeting, NewMeeting, parse_import};
use crate::ports::{Clock, IdentityPort, MeetingRepo, ParticipantRepo};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How an import ended, from the user's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
    /// At least one meeting created. `skipped` counts lines with a recorded error.
    Imported { created: usize, skipped: usize },
    /// Nothing created; the first recorded line error.
    Failed(LineError),
    /// Nothing created and nothing even looked like a meeting line.
    NoInputMatched { first_line: String },
    /// The operation itself broke (identity, store unavailable, ...).
    Critical(String),
}

/// Result handed back to the UI.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub status: ImportStatus,
    /// Meetings created, in source line order.
    pub meetings: Vec<Meeting>,
    /// Invalid dates and failed inserts, in source line order.
    pub errors: Vec<LineError>,
    /// Lines skipped silently (fewer than two tokens).
    pub malformed: usize,
}

impl ImportReport {
    fn critical(reason: String) -> Self {
        Self {
            status: ImportStatus::Critical(reason),
            meetings: Vec::new(),
            errors: Vec::new(),
            malformed: 0,
        }
    }

    fn from_parts(
        meetings: Vec<Meeting>,
        errors: Vec<LineError>,
        malformed: usize,
        first_line: Option<String>,
    ) -> Self {
        let status = if !meetings.is_empty() {
            ImportStatus::Imported {
                created: meetings.len(),
                skipped: errors.len(),
            }
        } else if let Some(first) = errors.first() {
            ImportStatus::Failed(first.clone())
        } else {
            ImportStatus::NoInputMatched {
                first_line: first_line.unwrap_or_default(),
            }
        };
        Self {
            status,
            meetings,
            errors,
            malformed,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self.status, ImportStatus::Imported { .. })
    }

    pub fn created(&self) -> usize {
        self.meetings.len()
    }

    /// Structured kind of the reported failure, if any.
    pub fn error_kind(&self) -> Option<ImportErrorKind> {
        match &self.status {
            ImportStatus::Failed(e) => Some(e.kind.clone()),
            ImportStatus::NoInputMatched { .. } => Some(ImportErrorKind::NoInputMatched),
            _ => None,
        }
    }

    /// One human-readable status line. Only the first line error is quoted.
    pub fn message(&self) -> String {
        match &self.status {
            ImportStatus::Imported { created, skipped } => {
                let mut msg = format!(
                    "Import complete: {} {} created.",
                    created,
                    plural(*created, "meeting")
                );
                if *skipped > 0 {
                    msg.push_str(&format!(" {} {} skipped", skipped, plural(*skipped, "line")));
                    if let Some(first) = self.errors.first() {
                        msg.push_str(&format!(" (first: {})", first));
                    }
                    msg.push('.');
                }
                msg
            }
            ImportStatus::Failed(err) => format!("Import failed: {}", err),
            ImportStatus::NoInputMatched { first_line } => format!(
                "Import failed: {}. First line of the file: \"{}\"",
                ImportErrorKind::NoInputMatched,
                first_line
            ),
            ImportStatus::Critical(reason) => {
                format!("Import failed with a critical error: {}", reason)
            }
        }
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// Import service. Owns no state between calls.
pub struct ImportService {
    meetings: Arc<dyn MeetingRepo>,
    participants: Arc<dyn ParticipantRepo>,
    identity: Arc<dyn IdentityPort>,
    clock: Arc<dyn Clock>,
}

impl ImportService {
    pub fn new(
        meetings: Arc<dyn MeetingRepo>,
        participants: Arc<dyn ParticipantRepo>,
        identity: Arc<dyn IdentityPort>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            meetings,
            participants,
            identity,
            clock,
        }
    }

    /// Import meetings from file contents. Always returns a report.
    pub async fn import_meetings(&self, text: &str) -> ImportReport {
        match self.try_import(text).await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "import critical error");
                ImportReport::critical(e.to_string())
            }
        }
    }

    async fn try_import(&self, text: &str) -> Result<ImportReport, DomainError> {
        let owner = self.identity.current_user().await?;
        let outcome = parse_import(text, self.clock.today());
        info!(
            drafts = outcome.valid_count(),
            invalid = outcome.errors.len(),
            malformed = outcome.malformed.len(),
            "import file parsed"
        );

        for skipped in &outcome.malformed {
            debug!(%skipped, "import: line skipped");
        }

        let mut errors = outcome.errors;
        let mut created = Vec::with_capacity(outcome.drafts.len());

        for draft in &outcome.drafts {
            let new_meeting = NewMeeting {
                title: draft.title.clone(),
                date: self.clock.local_to_utc(draft.date),
                agenda: None,
                category: None,
                organizer_id: owner.id,
            };
            let meeting = match self.meetings.insert_meeting(&new_meeting).await {
                Ok(m) => m,
                Err(e) => {
                    warn!(
                        line = draft.line,
                        title = %draft.title,
                        error = %e,
                        "import: meeting insert failed"
                    );
                    errors.push(LineError {
                        line: draft.line,
                        kind: ImportErrorKind::PersistenceFailure {
                            reason: e.to_string(),
                        },
                        snippet: snippet(&draft.source),
                    });
                    continue;
                }
            };

            if let Err(e) = self.participants.add_participant(meeting.id, owner.id).await {
                warn!(meeting_id = %meeting.id, error = %e, "import: adding organizer as participant failed");
            }
            created.push(meeting);
        }

        errors.sort_by_key(|e| e.line);
        let report = ImportReport::from_parts(
            created,
            errors,
            outcome.malformed.len(),
            outcome.first_line,
        );
        info!(
            created = report.created(),
            errors = report.errors.len(),
            "import finished"
        );
        Ok(report)
    }
}

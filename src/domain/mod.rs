//! Core domain layer. No external I/O dependencies.
//!
//! Entities, the import parser and the action-item extractor live here.
//! Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod extraction;
pub mod import;

pub use entities::{
    ActionItem, DEFAULT_MEETING_COLOR, Meeting, MeetingDetails, NewActionItem, NewMeeting,
    SharedMeeting, User,
};
pub use errors::{DomainError, ImportErrorKind, LineError};
pub use extraction::{ActionItemDraft, ExtractionOutcome, ExtractionPass, extract_action_items};
pub use import::{ImportOutcome, ParsedMeetingDraft, parse_import};

//! Application use cases. Orchestrate domain logic via ports.

pub mod action_item_service;
pub mod import_service;
pub mod meeting_service;
pub mod profile_service;

pub use action_item_service::{ActionItemService, ExtractionSummary, MyActionItems};
pub use import_service::{ImportReport, ImportService, ImportStatus};
pub use meeting_service::MeetingService;
pub use profile_service::ProfileService;

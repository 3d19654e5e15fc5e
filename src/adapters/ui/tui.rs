//! Implements InputPort. Inquire-based interactive menus.
//!
//! Every prompt uses `prompt_skippable`: Esc goes back one level, Ctrl-C
//! leaves the app. Use case failures are printed and the menu continues.

use crate::adapters::ui::progress::with_spinner;
use crate::domain::{ActionItem, DomainError, Meeting, MeetingDetails};
use crate::ports::InputPort;
use crate::usecases::{ActionItemService, ImportService, MeetingService, ProfileService};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Confirm, Editor, InquireError, MultiSelect, Select, Text};
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Applies the indigo theme to all subsequent inquire prompts.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightBlue))
        .with_highlighted_option_prefix(Styled::new("▸").with_fg(Color::LightMagenta))
        .with_selected_checkbox(Styled::new("◉").with_fg(Color::LightMagenta))
        .with_unselected_checkbox(Styled::new("○").with_fg(Color::DarkGrey));
    inquire::set_global_render_config(config);
}

fn ui_err(e: InquireError) -> DomainError {
    DomainError::Ui(e.to_string())
}

fn local_time(meeting: &Meeting) -> String {
    meeting
        .date
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainAction {
    Dashboard,
    NewMeeting,
    Import,
    OpenMeeting,
    MyActionItems,
    OpenSharedLink,
    DeleteMeetings,
    Profile,
    Exit,
}

impl MainAction {
    const ALL: [MainAction; 9] = [
        MainAction::Dashboard,
        MainAction::NewMeeting,
        MainAction::Import,
        MainAction::OpenMeeting,
        MainAction::MyActionItems,
        MainAction::OpenSharedLink,
        MainAction::DeleteMeetings,
        MainAction::Profile,
        MainAction::Exit,
    ];
}

impl fmt::Display for MainAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MainAction::Dashboard => "Dashboard (list / search meetings)",
            MainAction::NewMeeting => "New meeting",
            MainAction::Import => "Import meetings from text file",
            MainAction::OpenMeeting => "Open meeting",
            MainAction::MyActionItems => "My action items",
            MainAction::OpenSharedLink => "Open share link",
            MainAction::DeleteMeetings => "Delete meetings",
            MainAction::Profile => "Profile & avatar",
            MainAction::Exit => "Exit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeetingAction {
    Details,
    EditNotes,
    GenerateActionItems,
    AddActionItem,
    ToggleActionItem,
    AddParticipant,
    ChangeColor,
    ShareLink,
    AttachAudio,
    Delete,
    Back,
}

impl MeetingAction {
    const ALL: [MeetingAction; 11] = [
        MeetingAction::Details,
        MeetingAction::EditNotes,
        MeetingAction::GenerateActionItems,
        MeetingAction::AddActionItem,
        MeetingAction::ToggleActionItem,
        MeetingAction::AddParticipant,
        MeetingAction::ChangeColor,
        MeetingAction::ShareLink,
        MeetingAction::AttachAudio,
        MeetingAction::Delete,
        MeetingAction::Back,
    ];
}

impl fmt::Display for MeetingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MeetingAction::Details => "Show details",
            MeetingAction::EditNotes => "Edit notes",
            MeetingAction::GenerateActionItems => "Generate action items from notes",
            MeetingAction::AddActionItem => "Add action item",
            MeetingAction::ToggleActionItem => "Mark action item done / open",
            MeetingAction::AddParticipant => "Add participant",
            MeetingAction::ChangeColor => "Change colour",
            MeetingAction::ShareLink => "Share link",
            MeetingAction::AttachAudio => "Attach audio recording",
            MeetingAction::Delete => "Delete meeting",
            MeetingAction::Back => "Back",
        };
        f.write_str(label)
    }
}

/// Select option wrapping a meeting.
struct MeetingChoice(Meeting);

impl fmt::Display for MeetingChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", local_time(&self.0), self.0.title)
    }
}

/// Select option wrapping an action item.
struct ItemChoice(ActionItem);

impl fmt::Display for ItemChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.0.is_completed { "[x]" } else { "[ ]" };
        write!(f, "{} {}", mark, self.0.description)
    }
}

fn print_item(item: &ActionItem) {
    let deadline = item
        .deadline
        .map(|d| format!(" (due {})", d))
        .unwrap_or_default();
    println!("  {}{}", ItemChoice(item.clone()), deadline);
}

fn print_details(details: &MeetingDetails) {
    let m = &details.meeting;
    println!();
    println!("■ {}  [{}]", m.title, m.color_or_default());
    println!("  When:  {}", local_time(m));
    if let Some(category) = &m.category {
        println!("  Category: {}", category);
    }
    if let Some(agenda) = &m.agenda {
        println!("  Agenda: {}", agenda);
    }
    if let Some(url) = &m.audio_url {
        println!("  Audio: {}", url);
    }
    let names: Vec<&str> = details.participants.iter().map(|u| u.display_name()).collect();
    println!("  Participants: {}", names.join(", "));
    println!("  Notes:");
    match m.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(notes) => notes.lines().for_each(|l| println!("    {}", l)),
        None => println!("    (none)"),
    }
    println!("  Action items:");
    if details.action_items.is_empty() {
        println!("    (none)");
    }
    details.action_items.iter().for_each(print_item);
    println!();
}

/// TUI adapter. Inquire prompts over the application services.
pub struct TuiInputPort {
    meetings: Arc<MeetingService>,
    items: Arc<ActionItemService>,
    import: Arc<ImportService>,
    profile: Arc<ProfileService>,
}

impl TuiInputPort {
    pub fn new(
        meetings: Arc<MeetingService>,
        items: Arc<ActionItemService>,
        import: Arc<ImportService>,
        profile: Arc<ProfileService>,
    ) -> Self {
        Self {
            meetings,
            items,
            import,
            profile,
        }
    }

    async fn pick_meeting(&self) -> Result<Option<Meeting>, DomainError> {
        let query = Text::new("Filter by title (empty for all):")
            .prompt_skippable()
            .map_err(ui_err)?;
        let Some(query) = query else {
            return Ok(None);
        };
        let meetings = self.meetings.list_meetings(Some(&query)).await?;
        if meetings.is_empty() {
            println!("No meetings found.");
            return Ok(None);
        }
        let choices = meetings.into_iter().map(MeetingChoice).collect();
        Ok(Select::new("Meeting:", choices)
            .with_page_size(15)
            .prompt_skippable()
            .map_err(ui_err)?
            .map(|c| c.0))
    }

    async fn dashboard(&self) -> Result<(), DomainError> {
        let Some(query) = Text::new("Search titles (empty for all):")
            .prompt_skippable()
            .map_err(ui_err)?
        else {
            return Ok(());
        };
        let meetings = self.meetings.list_meetings(Some(&query)).await?;
        if meetings.is_empty() {
            println!("No meetings found.");
        }
        for m in &meetings {
            println!("  {}", MeetingChoice(m.clone()));
        }
        Ok(())
    }

    async fn new_meeting(&self) -> Result<(), DomainError> {
        let Some(title) = Text::new("Title:").prompt_skippable().map_err(ui_err)? else {
            return Ok(());
        };
        let this_hour = Local::now().format("%Y-%m-%dT%H:00").to_string();
        let Some(start) = Text::new("Start (YYYY-MM-DDTHH:MM):")
            .with_default(&this_hour)
            .prompt_skippable()
            .map_err(ui_err)?
        else {
            return Ok(());
        };
        let agenda = Text::new("Agenda (optional):")
            .prompt_skippable()
            .map_err(ui_err)?;
        let category = Text::new("Category (optional):")
            .prompt_skippable()
            .map_err(ui_err)?;
        let meeting = self
            .meetings
            .create_meeting(&title, &start, agenda.as_deref(), category.as_deref())
            .await?;
        println!("✓ Created \"{}\" on {}", meeting.title, local_time(&meeting));
        Ok(())
    }

    async fn import_file(&self) -> Result<(), DomainError> {
        let Some(path) = Text::new("Path to .txt file:")
            .prompt_skippable()
            .map_err(ui_err)?
        else {
            return Ok(());
        };
        let bytes = tokio::fs::read(path.trim())
            .await
            .map_err(|e| DomainError::Validation(format!("cannot read {}: {}", path.trim(), e)))?;
        let text = String::from_utf8_lossy(&bytes);
        let report = with_spinner("Importing meetings…", self.import.import_meetings(&text)).await;

        let mark = if report.success() { "✓" } else { "✗" };
        println!("{} {}", mark, report.message());
        for err in report.errors.iter().skip(1) {
            println!("    {}", err);
        }
        Ok(())
    }

    async fn my_action_items(&self) -> Result<(), DomainError> {
        let mine = self.items.my_action_items().await?;
        println!("Pending ({}):", mine.pending.len());
        mine.pending.iter().for_each(print_item);
        println!("Completed ({}):", mine.completed.len());
        mine.completed.iter().for_each(print_item);
        Ok(())
    }

    async fn open_shared_link(&self) -> Result<(), DomainError> {
        let Some(link) = Text::new("Share link or token:")
            .prompt_skippable()
            .map_err(ui_err)?
        else {
            return Ok(());
        };
        match self.meetings.shared_meeting(&link).await? {
            Some(shared) => {
                let m = &shared.meeting;
                println!("■ {} ({})", m.title, local_time(m));
                if let Some(category) = &m.category {
                    println!("  Category: {}", category);
                }
                if let Some(name) = &shared.organizer_name {
                    println!("  Organizer: {}", name);
                }
                if let Some(agenda) = &m.agenda {
                    println!("  Agenda: {}", agenda);
                }
                if let Some(notes) = &m.notes {
                    notes.lines().for_each(|l| println!("    {}", l));
                }
            }
            None => println!("✗ No meeting is shared under this link."),
        }
        Ok(())
    }

    async fn delete_meetings(&self) -> Result<(), DomainError> {
        let meetings = self.meetings.list_meetings(None).await?;
        if meetings.is_empty() {
            println!("No meetings to delete.");
            return Ok(());
        }
        let choices = meetings.into_iter().map(MeetingChoice).collect();
        let Some(selected) = MultiSelect::new("Meetings to delete:", choices)
            .with_page_size(15)
            .prompt_skippable()
            .map_err(ui_err)?
        else {
            return Ok(());
        };
        if selected.is_empty() || !self.confirm(&format!("Delete {} meeting(s)?", selected.len()))? {
            return Ok(());
        }
        let ids: Vec<Uuid> = selected.iter().map(|c| c.0.id).collect();
        let removed = self.meetings.delete_meetings(&ids).await?;
        println!("✓ Deleted {} meeting(s).", removed);
        Ok(())
    }

    async fn profile_menu(&self) -> Result<(), DomainError> {
        let me = self.profile.current_profile().await?;
        println!("■ {}", me.display_name());
        println!("  Email:  {}", me.email);
        println!("  Avatar: {}", me.avatar_url.as_deref().unwrap_or("(none)"));
        let Some(path) = Text::new("Path to new avatar image (Esc to go back):")
            .prompt_skippable()
            .map_err(ui_err)?
            .filter(|p| !p.trim().is_empty())
        else {
            return Ok(());
        };
        let bytes = tokio::fs::read(path.trim())
            .await
            .map_err(|e| DomainError::Validation(format!("cannot read {}: {}", path.trim(), e)))?;
        let url = with_spinner(
            "Uploading avatar…",
            self.profile.upload_avatar(path.trim(), &bytes),
        )
        .await?;
        println!("✓ Avatar updated: {}", url);
        Ok(())
    }

    fn confirm(&self, message: &str) -> Result<bool, DomainError> {
        Ok(Confirm::new(message)
            .with_default(false)
            .prompt_skippable()
            .map_err(ui_err)?
            .unwrap_or(false))
    }

    async fn meeting_menu(&self, meeting: Meeting) -> Result<(), DomainError> {
        let id = meeting.id;
        println!("■ {}", meeting.title);
        loop {
            let Some(action) = Select::new("Meeting:", MeetingAction::ALL.to_vec())
                .with_page_size(11)
                .prompt_skippable()
                .map_err(ui_err)?
            else {
                return Ok(());
            };
            if action == MeetingAction::Back {
                return Ok(());
            }
            let deleted = action == MeetingAction::Delete;
            match self.meeting_action(id, action).await {
                Ok(true) if deleted => return Ok(()),
                Ok(_) => {}
                Err(e @ DomainError::Ui(_)) => return Err(e),
                Err(e) => {
                    warn!(meeting_id = %id, %action, error = %e, "meeting action failed");
                    println!("✗ {}", e);
                }
            }
        }
    }

    /// Runs one submenu action. Returns whether it changed anything.
    async fn meeting_action(&self, id: Uuid, action: MeetingAction) -> Result<bool, DomainError> {
        match action {
            MeetingAction::Details => {
                print_details(&self.meetings.meeting_details(id).await?);
                Ok(false)
            }
            MeetingAction::EditNotes => {
                let current = self.meetings.meeting(id).await?.notes.unwrap_or_default();
                let Some(notes) = Editor::new("Notes:")
                    .with_predefined_text(&current)
                    .with_file_extension(".md")
                    .prompt_skippable()
                    .map_err(ui_err)?
                else {
                    return Ok(false);
                };
                self.meetings.update_notes(id, &notes).await?;
                println!("✓ Notes saved.");
                Ok(true)
            }
            MeetingAction::GenerateActionItems => {
                let summary = with_spinner(
                    "Extracting action items…",
                    self.items.generate_for_meeting(id),
                )
                .await?;
                if summary.count == 0 {
                    println!("No action items found in the notes.");
                } else {
                    println!("✓ Created {} action item(s) ({} pass).", summary.count, summary.pass);
                }
                Ok(summary.count > 0)
            }
            MeetingAction::AddActionItem => {
                let Some(description) = Text::new("Description:")
                    .prompt_skippable()
                    .map_err(ui_err)?
                else {
                    return Ok(false);
                };
                let assignee = Text::new("Assignee email (optional):")
                    .prompt_skippable()
                    .map_err(ui_err)?;
                let deadline = Text::new("Deadline YYYY-MM-DD (optional):")
                    .prompt_skippable()
                    .map_err(ui_err)?
                    .filter(|d| !d.trim().is_empty())
                    .map(|d| {
                        NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|_| {
                            DomainError::Validation(format!("'{}' is not a date like 2025-01-31", d))
                        })
                    })
                    .transpose()?;
                let item = self
                    .items
                    .add_action_item(id, &description, assignee.as_deref(), deadline)
                    .await?;
                println!("✓ Added \"{}\".", item.description);
                Ok(true)
            }
            MeetingAction::ToggleActionItem => {
                let items = self.items.list_for_meeting(id).await?;
                if items.is_empty() {
                    println!("This meeting has no action items.");
                    return Ok(false);
                }
                let choices = items.into_iter().map(ItemChoice).collect();
                let Some(choice) = Select::new("Action item:", choices)
                    .prompt_skippable()
                    .map_err(ui_err)?
                else {
                    return Ok(false);
                };
                self.items
                    .toggle_action_item(choice.0.id, !choice.0.is_completed)
                    .await?;
                Ok(true)
            }
            MeetingAction::AddParticipant => {
                let Some(email) = Text::new("Participant email:")
                    .prompt_skippable()
                    .map_err(ui_err)?
                else {
                    return Ok(false);
                };
                self.meetings.add_participant(id, &email).await?;
                println!("✓ Participant added.");
                Ok(true)
            }
            MeetingAction::ChangeColor => {
                let current = self.meetings.meeting(id).await?;
                let Some(color) = Text::new("Colour (#rrggbb):")
                    .with_default(current.color_or_default())
                    .prompt_skippable()
                    .map_err(ui_err)?
                else {
                    return Ok(false);
                };
                let color = self.meetings.update_color(id, &color).await?;
                println!("✓ Colour set to {}.", color);
                Ok(true)
            }
            MeetingAction::ShareLink => {
                let link = self.meetings.share_link(id).await?;
                println!("Share link: {}", link);
                Ok(false)
            }
            MeetingAction::AttachAudio => {
                let Some(path) = Text::new("Path to audio file:")
                    .prompt_skippable()
                    .map_err(ui_err)?
                else {
                    return Ok(false);
                };
                let bytes = tokio::fs::read(path.trim()).await.map_err(|e| {
                    DomainError::Validation(format!("cannot read {}: {}", path.trim(), e))
                })?;
                let url =
                    with_spinner("Uploading audio…", self.meetings.attach_audio(id, &bytes)).await?;
                println!("✓ Audio stored at {}", url);
                Ok(true)
            }
            MeetingAction::Delete => {
                if !self.confirm("Delete this meeting with its notes and action items?")? {
                    return Ok(false);
                }
                self.meetings.delete_meetings(&[id]).await?;
                println!("✓ Meeting deleted.");
                Ok(true)
            }
            MeetingAction::Back => Ok(false),
        }
    }

    async fn dispatch(&self, action: MainAction) -> Result<(), DomainError> {
        match action {
            MainAction::Dashboard => self.dashboard().await,
            MainAction::NewMeeting => self.new_meeting().await,
            MainAction::Import => self.import_file().await,
            MainAction::OpenMeeting => match self.pick_meeting().await? {
                Some(meeting) => self.meeting_menu(meeting).await,
                None => Ok(()),
            },
            MainAction::MyActionItems => self.my_action_items().await,
            MainAction::OpenSharedLink => self.open_shared_link().await,
            MainAction::DeleteMeetings => self.delete_meetings().await,
            MainAction::Profile => self.profile_menu().await,
            MainAction::Exit => Ok(()),
        }
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let action = match Select::new("Main menu", MainAction::ALL.to_vec())
                .with_page_size(MainAction::ALL.len())
                .prompt_skippable()
            {
                Ok(Some(action)) => action,
                Ok(None) | Err(InquireError::OperationInterrupted) => return Ok(()),
                Err(e) => return Err(ui_err(e)),
            };
            if action == MainAction::Exit {
                return Ok(());
            }
            match self.dispatch(action).await {
                Ok(()) => {}
                Err(DomainError::Ui(msg)) => {
                    // Ctrl-C inside a prompt ends the session.
                    warn!(error = %msg, "prompt aborted");
                    return Ok(());
                }
                Err(e) => {
                    warn!(%action, error = %e, "menu action failed");
                    println!("✗ {}", e);
                }
            }
        }
    }
}

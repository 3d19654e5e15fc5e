//! SQLite-backed store via libsql. Implements every persistence port.
//!
//! One database file: data/meetings.db. Ids are UUID text, instants are
//! RFC 3339 text in UTC, deadlines are `YYYY-MM-DD` text.

use crate::domain::{
    ActionItem, DomainError, Meeting, NewActionItem, NewMeeting, SharedMeeting, User,
};
use crate::ports::{ActionItemRepo, MeetingRepo, ParticipantRepo, UserDirectory};
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{Connection, Database, Row, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

const USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    full_name TEXT,
    avatar_url TEXT
)"#;
/// Databases created before avatars existed lack the column.
const USERS_AVATAR_COLUMN: &str = "ALTER TABLE users ADD COLUMN avatar_url TEXT";

const MEETINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS meetings (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    date TEXT NOT NULL,
    agenda TEXT,
    notes TEXT,
    organizer_id TEXT NOT NULL,
    color TEXT,
    category TEXT,
    share_token TEXT UNIQUE,
    audio_url TEXT,
    created_at TEXT NOT NULL
)"#;
const MEETINGS_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_meetings_date ON meetings (date)";

const PARTICIPANTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS participants (
    meeting_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    PRIMARY KEY (meeting_id, user_id)
)"#;

const ACTION_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS action_items (
    id TEXT PRIMARY KEY,
    meeting_id TEXT NOT NULL,
    description TEXT NOT NULL,
    assignee_id TEXT,
    deadline TEXT,
    is_completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
)"#;
const ACTION_ITEMS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_action_items_meeting ON action_items (meeting_id)";

const MEETING_COLUMNS: &str = "id, title, date, agenda, notes, organizer_id, color, category, share_token, audio_url, created_at";
const ACTION_ITEM_COLUMNS: &str =
    "id, meeting_id, description, assignee_id, deadline, is_completed, created_at";

fn repo_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Persistence(e.to_string())
}

fn parse_uuid(s: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(s).map_err(|e| DomainError::Persistence(format!("bad uuid '{}': {}", s, e)))
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::Persistence(format!("bad timestamp '{}': {}", s, e)))
}

/// SQLite store. Safe to share via Arc; each call opens its own connection.
pub struct SqliteRepo {
    db: Database,
    db_path: PathBuf,
}

impl SqliteRepo {
    /// Connect to (or create) `<base_dir>/meetings.db` and ensure the schema exists.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(repo_err)?;
        let db_path = base.join("meetings.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(repo_err)?;
        let conn = db.connect().map_err(repo_err)?;

        // PRAGMA returns a row; consume it (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::Persistence(format!("WAL pragma failed: {}", e)))?;
        while wal_rows.next().await.map_err(repo_err)?.is_some() {}

        for ddl in [
            USERS_TABLE,
            MEETINGS_TABLE,
            MEETINGS_INDEX,
            PARTICIPANTS_TABLE,
            ACTION_ITEMS_TABLE,
            ACTION_ITEMS_INDEX,
        ] {
            conn.execute(ddl, ()).await.map_err(repo_err)?;
        }
        if let Err(e) = conn.execute(USERS_AVATAR_COLUMN, ()).await {
            let msg = e.to_string();
            if !msg.contains("duplicate column") {
                return Err(repo_err(msg));
            }
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");

        Ok(Self { db, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(repo_err)
    }

    fn row_to_meeting(row: &Row) -> Result<Meeting, DomainError> {
        let id: String = row.get(0).map_err(repo_err)?;
        let title: String = row.get(1).map_err(repo_err)?;
        let date: String = row.get(2).map_err(repo_err)?;
        let organizer_id: String = row.get(5).map_err(repo_err)?;
        let created_at: String = row.get(10).map_err(repo_err)?;
        Ok(Meeting {
            id: parse_uuid(&id)?,
            title,
            date: parse_instant(&date)?,
            agenda: row.get::<String>(3).ok(),
            notes: row.get::<String>(4).ok(),
            organizer_id: parse_uuid(&organizer_id)?,
            color: row.get::<String>(6).ok(),
            category: row.get::<String>(7).ok(),
            share_token: row.get::<String>(8).ok(),
            audio_url: row.get::<String>(9).ok(),
            created_at: parse_instant(&created_at)?,
        })
    }

    fn row_to_action_item(row: &Row) -> Result<ActionItem, DomainError> {
        let id: String = row.get(0).map_err(repo_err)?;
        let meeting_id: String = row.get(1).map_err(repo_err)?;
        let description: String = row.get(2).map_err(repo_err)?;
        let assignee_id = match row.get::<String>(3).ok() {
            Some(s) => Some(parse_uuid(&s)?),
            None => None,
        };
        let deadline = row
            .get::<String>(4)
            .ok()
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok());
        let is_completed: i64 = row.get(5).map_err(repo_err)?;
        let created_at: String = row.get(6).map_err(repo_err)?;
        Ok(ActionItem {
            id: parse_uuid(&id)?,
            meeting_id: parse_uuid(&meeting_id)?,
            description,
            assignee_id,
            deadline,
            is_completed: is_completed != 0,
            created_at: parse_instant(&created_at)?,
        })
    }

    fn row_to_user(row: &Row) -> Result<User, DomainError> {
        let id: String = row.get(0).map_err(repo_err)?;
        let email: String = row.get(1).map_err(repo_err)?;
        Ok(User {
            id: parse_uuid(&id)?,
            email,
            full_name: row.get::<String>(2).ok(),
            avatar_url: row.get::<String>(3).ok(),
        })
    }

    async fn query_meetings(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Meeting>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn.query(sql, params).await.map_err(repo_err)?;
        let mut meetings = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            meetings.push(Self::row_to_meeting(&row)?);
        }
        Ok(meetings)
    }

    async fn query_action_items(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<ActionItem>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn.query(sql, params).await.map_err(repo_err)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            items.push(Self::row_to_action_item(&row)?);
        }
        Ok(items)
    }

    /// Run an UPDATE on one meeting; NotFound when no row matched.
    async fn update_meeting_column(
        &self,
        column: &str,
        id: Uuid,
        value: &str,
    ) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let sql = format!("UPDATE meetings SET {} = ?1 WHERE id = ?2", column);
        let changed = conn
            .execute(&sql, params![value, id.to_string()])
            .await
            .map_err(repo_err)?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("meeting {}", id)));
        }
        Ok(())
    }

    fn action_item_params(
        id: Uuid,
        item: &NewActionItem,
        created_at: &DateTime<Utc>,
    ) -> impl libsql::params::IntoParams {
        params![
            id.to_string(),
            item.meeting_id.to_string(),
            item.description.as_str(),
            item.assignee_id.map(|a| a.to_string()),
            item.deadline.map(|d| d.format("%Y-%m-%d").to_string()),
            created_at.to_rfc3339()
        ]
    }
}

const INSERT_ACTION_ITEM: &str = r#"
INSERT INTO action_items (id, meeting_id, description, assignee_id, deadline, is_completed, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
"#;

#[async_trait::async_trait]
impl MeetingRepo for SqliteRepo {
    async fn insert_meeting(&self, meeting: &NewMeeting) -> Result<Meeting, DomainError> {
        let conn = self.conn()?;
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        conn.execute(
            r#"
            INSERT INTO meetings (id, title, date, agenda, category, organizer_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                id.to_string(),
                meeting.title.as_str(),
                meeting.date.to_rfc3339(),
                meeting.agenda.clone(),
                meeting.category.clone(),
                meeting.organizer_id.to_string(),
                created_at.to_rfc3339()
            ],
        )
        .await
        .map_err(repo_err)?;
        debug!(meeting_id = %id, title = %meeting.title, "meeting inserted");

        Ok(Meeting {
            id,
            title: meeting.title.clone(),
            date: meeting.date,
            agenda: meeting.agenda.clone(),
            notes: None,
            organizer_id: meeting.organizer_id,
            color: None,
            category: meeting.category.clone(),
            share_token: None,
            audio_url: None,
            created_at,
        })
    }

    async fn get_meeting(&self, id: Uuid) -> Result<Option<Meeting>, DomainError> {
        let sql = format!("SELECT {} FROM meetings WHERE id = ?1", MEETING_COLUMNS);
        let mut found = self.query_meetings(&sql, params![id.to_string()]).await?;
        Ok(found.pop())
    }

    async fn list_meetings(&self, title_query: Option<&str>) -> Result<Vec<Meeting>, DomainError> {
        // SQLite LIKE/lower() only fold ASCII; filter in Rust so "Úkoly" matches "úkoly".
        let sql = format!("SELECT {} FROM meetings ORDER BY date ASC", MEETING_COLUMNS);
        let meetings = self.query_meetings(&sql, ()).await?;
        let query = title_query.unwrap_or_default();
        Ok(meetings
            .into_iter()
            .filter(|m| m.title_matches(query))
            .collect())
    }

    async fn update_notes(&self, id: Uuid, notes: &str) -> Result<(), DomainError> {
        self.update_meeting_column("notes", id, notes).await
    }

    async fn update_color(&self, id: Uuid, color: &str) -> Result<(), DomainError> {
        self.update_meeting_column("color", id, color).await
    }

    async fn set_share_token(&self, id: Uuid, token: &str) -> Result<(), DomainError> {
        self.update_meeting_column("share_token", id, token).await
    }

    async fn find_by_share_token(
        &self,
        token: &str,
    ) -> Result<Option<SharedMeeting>, DomainError> {
        let sql = format!(
            "SELECT {} FROM meetings WHERE share_token = ?1",
            MEETING_COLUMNS
        );
        let Some(meeting) = self.query_meetings(&sql, params![token]).await?.pop() else {
            return Ok(None);
        };

        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT full_name, email FROM users WHERE id = ?1",
                params![meeting.organizer_id.to_string()],
            )
            .await
            .map_err(repo_err)?;
        let organizer_name = match rows.next().await.map_err(repo_err)? {
            Some(row) => row.get::<String>(0).ok().or_else(|| row.get::<String>(1).ok()),
            None => None,
        };

        Ok(Some(SharedMeeting {
            meeting,
            organizer_name,
        }))
    }

    async fn set_audio_url(&self, id: Uuid, url: &str) -> Result<(), DomainError> {
        self.update_meeting_column("audio_url", id, url).await
    }

    async fn delete_meetings(&self, ids: &[Uuid]) -> Result<usize, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(repo_err)?;
        let mut removed = 0usize;
        for id in ids {
            let id = id.to_string();
            tx.execute(
                "DELETE FROM action_items WHERE meeting_id = ?1",
                params![id.as_str()],
            )
            .await
            .map_err(repo_err)?;
            tx.execute(
                "DELETE FROM participants WHERE meeting_id = ?1",
                params![id.as_str()],
            )
            .await
            .map_err(repo_err)?;
            removed += tx
                .execute("DELETE FROM meetings WHERE id = ?1", params![id.as_str()])
                .await
                .map_err(repo_err)? as usize;
        }
        tx.commit().await.map_err(repo_err)?;
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl ParticipantRepo for SqliteRepo {
    async fn add_participant(&self, meeting_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO participants (meeting_id, user_id) VALUES (?1, ?2)",
            params![meeting_id.to_string(), user_id.to_string()],
        )
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") || msg.contains("PRIMARY KEY") {
                DomainError::DuplicateParticipant
            } else {
                DomainError::Persistence(msg)
            }
        })?;
        Ok(())
    }

    async fn list_participants(&self, meeting_id: Uuid) -> Result<Vec<User>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                r#"
                SELECT u.id, u.email, u.full_name, u.avatar_url
                FROM participants p JOIN users u ON u.id = p.user_id
                WHERE p.meeting_id = ?1
                ORDER BY u.email
                "#,
                params![meeting_id.to_string()],
            )
            .await
            .map_err(repo_err)?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            users.push(Self::row_to_user(&row)?);
        }
        Ok(users)
    }
}

#[async_trait::async_trait]
impl ActionItemRepo for SqliteRepo {
    async fn insert_action_item(&self, item: &NewActionItem) -> Result<ActionItem, DomainError> {
        let conn = self.conn()?;
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        conn.execute(
            INSERT_ACTION_ITEM,
            Self::action_item_params(id, item, &created_at),
        )
        .await
        .map_err(repo_err)?;
        Ok(ActionItem {
            id,
            meeting_id: item.meeting_id,
            description: item.description.clone(),
            assignee_id: item.assignee_id,
            deadline: item.deadline,
            is_completed: false,
            created_at,
        })
    }

    async fn insert_action_items(&self, items: &[NewActionItem]) -> Result<(), DomainError> {
        if items.is_empty() {
            return Ok(());
        }
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(repo_err)?;
        let created_at = Utc::now();
        for (i, item) in items.iter().enumerate() {
            if let Err(e) = tx
                .execute(
                    INSERT_ACTION_ITEM,
                    Self::action_item_params(Uuid::new_v4(), item, &created_at),
                )
                .await
            {
                warn!(row = i + 1, total = items.len(), error = %e, "action item batch rolled back");
                if let Err(rb) = tx.rollback().await {
                    warn!(error = %rb, "rollback failed");
                }
                return Err(repo_err(e));
            }
        }
        tx.commit().await.map_err(repo_err)?;
        info!(count = items.len(), "action items inserted");
        Ok(())
    }

    async fn set_completed(&self, id: Uuid, completed: bool) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE action_items SET is_completed = ?1 WHERE id = ?2",
                params![completed as i64, id.to_string()],
            )
            .await
            .map_err(repo_err)?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("action item {}", id)));
        }
        Ok(())
    }

    async fn list_for_meeting(&self, meeting_id: Uuid) -> Result<Vec<ActionItem>, DomainError> {
        let sql = format!(
            "SELECT {} FROM action_items WHERE meeting_id = ?1 ORDER BY created_at ASC, rowid ASC",
            ACTION_ITEM_COLUMNS
        );
        self.query_action_items(&sql, params![meeting_id.to_string()])
            .await
    }

    async fn list_assigned_to(&self, user_id: Uuid) -> Result<Vec<ActionItem>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM action_items
            WHERE assignee_id = ?1
            ORDER BY deadline IS NULL, deadline ASC, created_at DESC
            "#,
            ACTION_ITEM_COLUMNS
        );
        self.query_action_items(&sql, params![user_id.to_string()])
            .await
    }
}

#[async_trait::async_trait]
impl UserDirectory for SqliteRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT id, email, full_name, avatar_url FROM users WHERE lower(email) = lower(?1)",
                params![email.trim()],
            )
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn upsert_user(
        &self,
        email: &str,
        full_name: Option<&str>,
    ) -> Result<User, DomainError> {
        if let Some(mut user) = self.find_by_email(email).await? {
            if full_name.is_some() && user.full_name.as_deref() != full_name {
                let conn = self.conn()?;
                conn.execute(
                    "UPDATE users SET full_name = ?1 WHERE id = ?2",
                    params![full_name, user.id.to_string()],
                )
                .await
                .map_err(repo_err)?;
                user.full_name = full_name.map(str::to_string);
            }
            return Ok(user);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.trim().to_string(),
            full_name: full_name.map(str::to_string),
            avatar_url: None,
        };
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (id, email, full_name) VALUES (?1, ?2, ?3)",
            params![
                user.id.to_string(),
                user.email.as_str(),
                user.full_name.clone()
            ],
        )
        .await
        .map_err(repo_err)?;
        info!(user_id = %user.id, email = %user.email, "user profile created");
        Ok(user)
    }

    async fn set_avatar_url(&self, user_id: Uuid, url: &str) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE users SET avatar_url = ?1 WHERE id = ?2",
                params![url, user_id.to_string()],
            )
            .await
            .map_err(repo_err)?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn temp_repo() -> (SqliteRepo, PathBuf) {
        let dir = std::env::temp_dir().join(format!("meeting-notes-test-{}", Uuid::new_v4()));
        let repo = SqliteRepo::connect(&dir).await.unwrap();
        (repo, dir)
    }

    fn new_meeting(title: &str, organizer_id: Uuid, day: u32) -> NewMeeting {
        NewMeeting {
            title: title.to_string(),
            date: Utc.with_ymd_and_hms(2025, 1, day, 9, 0, 0).unwrap(),
            agenda: None,
            category: None,
            organizer_id,
        }
    }

    #[tokio::test]
    async fn test_meeting_roundtrip_and_search() {
        let (repo, dir) = temp_repo().await;
        let user = repo.upsert_user("ana@example.com", Some("Ana")).await.unwrap();

        repo.insert_meeting(&new_meeting("Weekly Sync", user.id, 21))
            .await
            .unwrap();
        let retro = repo
            .insert_meeting(&new_meeting("Sprint retro", user.id, 20))
            .await
            .unwrap();

        let all = repo.list_meetings(None).await.unwrap();
        let titles: Vec<_> = all.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Sprint retro", "Weekly Sync"]);

        let hits = repo.list_meetings(Some("weekly")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Weekly Sync");

        repo.insert_meeting(&new_meeting("Úkoly týmu", user.id, 22))
            .await
            .unwrap();
        repo.insert_meeting(&new_meeting("ŘÍZENÍ projektu", user.id, 23))
            .await
            .unwrap();
        let hits = repo.list_meetings(Some("úkoly")).await.unwrap();
        let titles: Vec<_> = hits.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Úkoly týmu"]);
        let hits = repo.list_meetings(Some("řízení")).await.unwrap();
        let titles: Vec<_> = hits.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["ŘÍZENÍ projektu"]);
        assert_eq!(repo.list_meetings(Some("  ")).await.unwrap().len(), 4);

        let tagged = repo
            .insert_meeting(&NewMeeting {
                category: Some("Interní".into()),
                ..new_meeting("Budget", user.id, 24)
            })
            .await
            .unwrap();
        let loaded = repo.get_meeting(tagged.id).await.unwrap().unwrap();
        assert_eq!(loaded.category.as_deref(), Some("Interní"));

        repo.update_notes(retro.id, "Todo: fix CI").await.unwrap();
        let loaded = repo.get_meeting(retro.id).await.unwrap().unwrap();
        assert_eq!(loaded.notes.as_deref(), Some("Todo: fix CI"));
        assert_eq!(loaded.date, retro.date);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_reconnect_to_existing_database() {
        let (repo, dir) = temp_repo().await;
        let user = repo.upsert_user("ana@example.com", None).await.unwrap();
        drop(repo);

        let reopened = SqliteRepo::connect(&dir).await.unwrap();
        let found = reopened.find_by_email("ana@example.com").await.unwrap();
        assert_eq!(found, Some(user));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_duplicate_participant_rejected() {
        let (repo, dir) = temp_repo().await;
        let user = repo.upsert_user("ana@example.com", None).await.unwrap();
        let m = repo
            .insert_meeting(&new_meeting("Kickoff", user.id, 5))
            .await
            .unwrap();

        repo.add_participant(m.id, user.id).await.unwrap();
        let err = repo.add_participant(m.id, user.id).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateParticipant));
        assert_eq!(repo.list_participants(m.id).await.unwrap(), vec![user.clone()]);

        repo.set_avatar_url(user.id, "file:///avatars/a.png?t=1").await.unwrap();
        let participants = repo.list_participants(m.id).await.unwrap();
        assert_eq!(
            participants[0].avatar_url.as_deref(),
            Some("file:///avatars/a.png?t=1")
        );
        assert!(repo.set_avatar_url(Uuid::new_v4(), "x").await.is_err());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_action_items_batch_and_toggle() {
        let (repo, dir) = temp_repo().await;
        let user = repo.upsert_user("ana@example.com", None).await.unwrap();
        let m = repo
            .insert_meeting(&new_meeting("Planning", user.id, 7))
            .await
            .unwrap();
        let items: Vec<_> = ["call client", "send minutes"]
            .iter()
            .map(|d| NewActionItem {
                meeting_id: m.id,
                description: d.to_string(),
                assignee_id: None,
                deadline: None,
            })
            .collect();
        repo.insert_action_items(&items).await.unwrap();

        let stored = repo.list_for_meeting(m.id).await.unwrap();
        let descriptions: Vec<_> = stored.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["call client", "send minutes"]);

        repo.set_completed(stored[0].id, true).await.unwrap();
        let stored = repo.list_for_meeting(m.id).await.unwrap();
        assert!(stored[0].is_completed);
        assert!(!stored[1].is_completed);

        assert_eq!(repo.delete_meetings(&[m.id]).await.unwrap(), 1);
        assert!(repo.list_for_meeting(m.id).await.unwrap().is_empty());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_action_item_batch_is_all_or_nothing() {
        let (repo, dir) = temp_repo().await;
        let user = repo.upsert_user("ana@example.com", None).await.unwrap();
        let m = repo
            .insert_meeting(&new_meeting("Planning", user.id, 8))
            .await
            .unwrap();
        repo.conn()
            .unwrap()
            .execute(
                r#"
                CREATE TRIGGER reject_marked_items BEFORE INSERT ON action_items
                WHEN NEW.description = 'rejected row'
                BEGIN SELECT RAISE(ABORT, 'row rejected'); END
                "#,
                (),
            )
            .await
            .unwrap();
        let items: Vec<_> = ["first row", "rejected row", "third row"]
            .iter()
            .map(|d| NewActionItem {
                meeting_id: m.id,
                description: d.to_string(),
                assignee_id: None,
                deadline: None,
            })
            .collect();

        let err = repo.insert_action_items(&items).await.unwrap_err();

        assert!(matches!(err, DomainError::Persistence(_)));
        assert!(repo.list_for_meeting(m.id).await.unwrap().is_empty());
        repo.insert_action_items(&items[..1]).await.unwrap();
        assert_eq!(repo.list_for_meeting(m.id).await.unwrap().len(), 1);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_share_token_lookup_includes_organizer_name() {
        let (repo, dir) = temp_repo().await;
        let user = repo.upsert_user("ana@example.com", Some("Ana Novak")).await.unwrap();
        let m = repo
            .insert_meeting(&new_meeting("Board", user.id, 9))
            .await
            .unwrap();
        repo.set_share_token(m.id, "tok-1").await.unwrap();

        let shared = repo.find_by_share_token("tok-1").await.unwrap().unwrap();
        assert_eq!(shared.meeting.id, m.id);
        assert_eq!(shared.organizer_name.as_deref(), Some("Ana Novak"));
        assert!(repo.find_by_share_token("nope").await.unwrap().is_none());

        let _ = std::fs::remove_dir_all(dir);
    }
}

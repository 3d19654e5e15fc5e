//! The acting user's profile: show it, replace the avatar.

use crate::domain::{DomainError, User};
use crate::ports::{Clock, IdentityPort, ObjectStore, UserDirectory};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Object key of a user's avatar. Re-uploads overwrite the same key.
pub fn avatar_key(user: &User, extension: &str) -> String {
    format!("{}/avatar.{}", user.id, extension)
}

/// Lower-cased extension of an uploaded file name.
fn avatar_extension(file_name: &str) -> Result<String, DomainError> {
    Path::new(file_name.trim())
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| {
            DomainError::Validation(format!(
                "'{}' has no file extension (expected e.g. avatar.png)",
                file_name.trim()
            ))
        })
}

pub struct ProfileService {
    users: Arc<dyn UserDirectory>,
    identity: Arc<dyn IdentityPort>,
    avatars: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        identity: Arc<dyn IdentityPort>,
        avatars: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            identity,
            avatars,
            clock,
        }
    }

    /// Fresh copy of the current user's profile (identity caches the first read).
    pub async fn current_profile(&self) -> Result<User, DomainError> {
        let me = self.identity.current_user().await?;
        Ok(self.users.find_by_email(&me.email).await?.unwrap_or(me))
    }

    /// Store a new avatar and point the profile at it.
    ///
    /// The key is stable per user and extension, so the returned URL carries a
    /// `?t=<unix-millis>` suffix to defeat caches after a re-upload.
    pub async fn upload_avatar(&self, file_name: &str, bytes: &[u8]) -> Result<String, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::Validation("no image data provided".into()));
        }
        let extension = avatar_extension(file_name)?;
        let me = self.identity.current_user().await?;

        let key = avatar_key(&me, &extension);
        let stored = self.avatars.upload(&key, bytes).await?;
        let url = format!("{}?t={}", stored, self.clock.now().timestamp_millis());
        self.users.set_avatar_url(me.id, &url).await?;
        info!(user_id = %me.id, key = %key, "avatar updated");
        Ok(url)
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

    #[derive(Default)]
    struct RecordingStore {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl ObjectStore for RecordingStore {
        async fn upload(&self, key: &str, _bytes: &[u8]) -> Result<String, DomainError> {
            self.keys.lock().unwrap().push(key.to_string());
            Ok(format!("memory://avatars/{}", key))
        }
    }

    fn service(repo: &Arc<MemoryRepo>, store: Arc<RecordingStore>) -> ProfileService {
        let identity = Arc::new(ConfigIdentity::new(
            "ana@example.com".into(),
            Some("Ana".into()),
            repo.clone(),
        ));
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap());
        ProfileService::new(repo.clone(), identity, store, Arc::new(clock))
    }

    #[test]
    fn test_avatar_extension() {
        assert_eq!(avatar_extension("me.PNG").unwrap(), "png");
        assert_eq!(avatar_extension("/tmp/photo.final.jpeg").unwrap(), "jpeg");
        assert!(avatar_extension("no-extension").is_err());
        assert!(avatar_extension("").is_err());
    }

    #[tokio::test]
    async fn test_upload_avatar_sets_profile_url() {
        let repo = Arc::new(MemoryRepo::new());
        let store = Arc::new(RecordingStore::default());
        let svc = service(&repo, store.clone());

        let url = svc.upload_avatar("portrait.JPG", b"\xff\xd8").await.unwrap();

        let me = svc.current_profile().await.unwrap();
        let key = format!("{}/avatar.jpg", me.id);
        assert_eq!(store.keys.lock().unwrap().clone(), vec![key.clone()]);
        assert_eq!(url, format!("memory://avatars/{}?t=1792310400000", key));
        assert_eq!(me.avatar_url.as_deref(), Some(url.as_str()));
    }

    #[tokio::test]
    async fn test_upload_avatar_rejects_empty_or_nameless() {
        let repo = Arc::new(MemoryRepo::new());
        let store = Arc::new(RecordingStore::default());
        let svc = service(&repo, store.clone());

        assert!(matches!(
            svc.upload_avatar("a.png", b"").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.upload_avatar("avatar", b"img").await,
            Err(DomainError::Validation(_))
        ));
        assert!(store.keys.lock().unwrap().is_empty());
        assert_eq!(svc.current_profile().await.unwrap().avatar_url, None);
    }
}

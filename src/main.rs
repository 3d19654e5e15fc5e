//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use meeting_notes::adapters::clock::SystemClock;
use meeting_notes::adapters::identity::ConfigIdentity;
use meeting_notes::adapters::persistence::{FsObjectStore, SqliteRepo};
use meeting_notes::adapters::ui::tui::TuiInputPort;
use meeting_notes::ports::{
    ActionItemRepo, Clock, IdentityPort, InputPort, MeetingRepo, ObjectStore, ParticipantRepo,
    UserDirectory,
};
use meeting_notes::shared::config::AppConfig;
use meeting_notes::usecases::{ActionItemService, ImportService, MeetingService, ProfileService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    meeting_notes::adapters::ui::init_ui();

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("config: {}", e))?;
    let Some(user_email) = cfg.user_email() else {
        anyhow::bail!("Set MEETINGS_USER_EMAIL (env or .env) to the email you act as");
    };

    let data_path = cfg.data_dir_or_default();
    let data_dir_abs = data_path
        .canonicalize()
        .unwrap_or_else(|_| data_path.clone());
    info!(path = %data_dir_abs.display(), "data directory");

    // --- Storage ---
    let sqlite_repo = Arc::new(
        SqliteRepo::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );
    let meetings: Arc<dyn MeetingRepo> = Arc::clone(&sqlite_repo) as Arc<dyn MeetingRepo>;
    let participants: Arc<dyn ParticipantRepo> =
        Arc::clone(&sqlite_repo) as Arc<dyn ParticipantRepo>;
    let items: Arc<dyn ActionItemRepo> = Arc::clone(&sqlite_repo) as Arc<dyn ActionItemRepo>;
    let users: Arc<dyn UserDirectory> = Arc::clone(&sqlite_repo) as Arc<dyn UserDirectory>;

    let audio_dir = cfg.audio_dir_or_default();
    info!(path = %audio_dir.display(), "audio directory");
    let audio: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(&audio_dir));
    let avatar_dir = cfg.avatar_dir_or_default();
    info!(path = %avatar_dir.display(), "avatar directory");
    let avatars: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(&avatar_dir));

    // --- Identity & time ---
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let identity: Arc<dyn IdentityPort> = Arc::new(ConfigIdentity::new(
        user_email,
        cfg.user_name.clone(),
        Arc::clone(&users),
    ));
    let me = identity
        .current_user()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(user = %me.display_name(), "signed in from configuration");

    // --- Services ---
    let meeting_service = Arc::new(MeetingService::new(
        Arc::clone(&meetings),
        Arc::clone(&participants),
        Arc::clone(&items),
        Arc::clone(&users),
        Arc::clone(&identity),
        audio,
        Arc::clone(&clock),
        cfg.share_base_url_or_default(),
    ));
    let action_item_service = Arc::new(ActionItemService::new(
        Arc::clone(&meetings),
        Arc::clone(&items),
        Arc::clone(&users),
        Arc::clone(&identity),
    ));
    let profile_service = Arc::new(ProfileService::new(
        Arc::clone(&users),
        Arc::clone(&identity),
        avatars,
        Arc::clone(&clock),
    ));
    let import_service = Arc::new(ImportService::new(
        meetings,
        participants,
        identity,
        clock,
    ));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        meeting_service,
        action_item_service,
        import_service,
        profile_service,
    ));

    // --- Run (main menu -> dashboard / import / meeting actions) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("bye");
    Ok(())
}

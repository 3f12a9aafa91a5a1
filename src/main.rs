use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gpa_tracker::api::router;
use gpa_tracker::config::AppConfig;
use gpa_tracker::remote::{HttpRemoteStore, MemoryRemoteStore, RemoteStore};
use gpa_tracker::services::Tracker;
use gpa_tracker::state::AppState;
use gpa_tracker::storage::{self, LocalStore, SqliteStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "gpa_tracker=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = storage::sqlite::connect(&config.database_url).await?;
    let local = LocalStore::new(Arc::new(SqliteStore::new(pool)));

    let remote: Arc<dyn RemoteStore> = match &config.remote {
        Some(remote_config) => {
            info!("using remote document store at {}", remote_config.base_url);
            Arc::new(HttpRemoteStore::new(remote_config.clone())?)
        }
        None => {
            info!("REMOTE_BASE_URL not set, keeping user documents in memory");
            Arc::new(MemoryRemoteStore::new())
        }
    };

    let tracker = Tracker::new(local, remote, config.sync_interval, config.admin_uid.clone());
    let app = router(AppState::new(tracker));

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

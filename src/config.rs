use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::AppError;
use crate::remote::RemoteConfig;

pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// `None` keeps user documents in process memory.
    pub remote: Option<RemoteConfig>,
    pub sync_interval: Duration,
    pub admin_uid: Option<String>,
}

impl AppConfig {
    /// Reads the environment, after loading `.env` when present.
    pub fn new_from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://gpa_tracker.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let remote = env::var("REMOTE_BASE_URL").ok().map(|base_url| RemoteConfig {
            base_url,
            api_token: env::var("REMOTE_API_TOKEN").ok(),
        });

        let sync_interval_secs = match env::var("SYNC_INTERVAL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| AppError::Config(format!("SYNC_INTERVAL_SECS is invalid: {}", raw)))?,
            Err(_) => DEFAULT_SYNC_INTERVAL_SECS,
        };

        let admin_uid = env::var("ADMIN_UID").ok().filter(|uid| !uid.is_empty());

        Ok(Self {
            database_url,
            bind_addr,
            remote,
            sync_interval: Duration::from_secs(sync_interval_secs),
            admin_uid,
        })
    }
}

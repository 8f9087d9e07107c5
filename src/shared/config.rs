use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub guard: SaveGuardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub sync_interval: u64,
    pub max_retry: u32,
    pub synced_retention_secs: u64,
}

/// Debounce/single-flight tuning for the save guard. The window is
/// deliberately configuration, not a constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGuardConfig {
    pub debounce_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/gymbook.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            remote: RemoteConfig {
                base_url: "http://localhost:54321".to_string(),
                api_key: String::new(),
                request_timeout: 15,
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval: 30,
                max_retry: 5,
                synced_retention_secs: 3600, // 1 hour
            },
            guard: SaveGuardConfig { debounce_ms: 2000 },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("GYMBOOK_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("GYMBOOK_REMOTE_URL") {
            if !v.trim().is_empty() {
                cfg.remote.base_url = v;
            }
        }
        if let Ok(v) = std::env::var("GYMBOOK_REMOTE_API_KEY") {
            cfg.remote.api_key = v;
        }
        if let Ok(v) = std::env::var("GYMBOOK_REMOTE_TIMEOUT") {
            if let Some(value) = parse_u64(&v) {
                cfg.remote.request_timeout = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("GYMBOOK_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("GYMBOOK_SYNC_INTERVAL") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.sync_interval = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("GYMBOOK_SYNC_MAX_RETRY") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.max_retry = value.min(u64::from(u32::MAX)) as u32;
            }
        }
        if let Ok(v) = std::env::var("GYMBOOK_SYNCED_RETENTION_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.synced_retention_secs = value;
            }
        }
        if let Ok(v) = std::env::var("GYMBOOK_SAVE_DEBOUNCE_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.guard.debounce_ms = value;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.remote.base_url.trim().is_empty() {
            return Err("Remote base_url must not be empty".to_string());
        }
        if self.remote.request_timeout == 0 {
            return Err("Remote request_timeout must be greater than 0".to_string());
        }
        if self.sync.sync_interval == 0 {
            return Err("Sync sync_interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use ws_orchestrator::EnrichmentConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL of the remote provisioner.
    #[serde(default = "default_provisioner_url")]
    pub provisioner_url: String,

    /// Longest a verbose request waits for live workspace info.
    #[serde(default = "default_info_timeout_ms")]
    pub info_timeout_ms: u64,
}

fn default_bind_addr() -> String {
    std::env::var("WS_API_BIND").unwrap_or_else(|_| "0.0.0.0:3986".to_string())
}

fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("WS_API_DB_PATH") {
        return PathBuf::from(path);
    }

    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("ws").join("api").join("ws.db")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".ws").join("api").join("ws.db")
    }
}

fn default_provisioner_url() -> String {
    std::env::var("WS_API_PROVISIONER_URL").unwrap_or_else(|_| "http://127.0.0.1:3987".to_string())
}

fn default_info_timeout_ms() -> u64 {
    std::env::var("WS_API_INFO_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(ws_orchestrator::DEFAULT_INFO_TIMEOUT.as_millis() as u64)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
            provisioner_url: default_provisioner_url(),
            info_timeout_ms: default_info_timeout_ms(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn enrichment(&self) -> EnrichmentConfig {
        EnrichmentConfig {
            info_timeout: Duration::from_millis(self.info_timeout_ms),
        }
    }
}

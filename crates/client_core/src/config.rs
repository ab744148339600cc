use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "bookstore.toml";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1/books";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub redirect_delay_ms: u64,
    pub session_file: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            redirect_delay_ms: 1500,
            session_file: default_session_file(),
        }
    }
}

impl ClientSettings {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    redirect_delay_ms: Option<u64>,
    session_file: Option<PathBuf>,
}

fn default_session_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".bookstore")
        .join("session.json")
}

/// Defaults, then `bookstore.toml` in the working directory, then environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.api_base_url {
                    settings.api_base_url = v;
                }
                if let Some(v) = file_cfg.redirect_delay_ms {
                    settings.redirect_delay_ms = v;
                }
                if let Some(v) = file_cfg.session_file {
                    settings.session_file = v;
                }
            }
            Err(err) => warn!("ignoring malformed {}: {err}", path.display()),
        }
    }

    if let Some(v) = env("BOOKSTORE_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__REDIRECT_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.redirect_delay_ms = parsed;
        }
    }

    if let Some(v) = env("APP__SESSION_FILE") {
        settings.session_file = PathBuf::from(v);
    }

    settings
}

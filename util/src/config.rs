//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.
//!
//! Most callers use the free accessor functions at the bottom of this module
//! (`config::gemini_api_key()`, `config::rubric_path()`, ...) instead of holding
//! the read guard themselves.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Gemini endpoint used when `GEMINI_API_URL` is not set.
pub const DEFAULT_GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    /// Optional rubric definition file. The bundled rubrics are used when unset.
    pub rubric_path: Option<String>,
    /// How many times a grading job may call the model for one submission.
    pub grading_max_attempts: u32,
    /// Reject replies whose `total` differs from the sum of part scores.
    pub grading_strict_total: bool,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Missing or unparseable values fall back to their defaults; nothing here
    /// is required at startup. A missing API key only matters once a grading
    /// request actually reaches the model.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "essay-grader".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "grader=info,marker=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "grader.log".into()),
            log_to_stdout: env_flag("LOG_TO_STDOUT"),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_api_url: env::var("GEMINI_API_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.into()),
            rubric_path: env::var("RUBRIC_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            grading_max_attempts: env::var("GRADING_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &u32| *n > 0)
                .unwrap_or(2),
            grading_strict_total: env_flag("GRADING_STRICT_TOTAL"),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock
                .write()
                .expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_gemini_api_key(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.gemini_api_key = value.into());
    }

    pub fn set_gemini_api_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.gemini_api_url = value.into());
    }

    pub fn set_rubric_path(value: Option<String>) {
        AppConfig::set_field(|cfg| cfg.rubric_path = value);
    }

    pub fn set_grading_max_attempts(value: u32) {
        AppConfig::set_field(|cfg| cfg.grading_max_attempts = value.max(1));
    }

    pub fn set_grading_strict_total(value: bool) {
        AppConfig::set_field(|cfg| cfg.grading_strict_total = value);
    }
}

pub fn app_env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn gemini_api_key() -> String {
    AppConfig::global().gemini_api_key.clone()
}

pub fn gemini_api_url() -> String {
    AppConfig::global().gemini_api_url.clone()
}

pub fn rubric_path() -> Option<String> {
    AppConfig::global().rubric_path.clone()
}

pub fn grading_max_attempts() -> u32 {
    AppConfig::global().grading_max_attempts
}

pub fn grading_strict_total() -> bool {
    AppConfig::global().grading_strict_total
}

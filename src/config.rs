use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::category_fetch::SPRINGBOARD_API_BASE;
use crate::state::NUM_CATEGORIES;

const DEFAULT_CATEGORY_POOL: usize = 10;
const MAX_CATEGORY_POOL: usize = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_NOTICE_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base: String,
    pub category_pool: usize,
    pub request_timeout_secs: u64,
    pub notice_secs: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: SPRINGBOARD_API_BASE.to_string(),
            category_pool: DEFAULT_CATEGORY_POOL,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            notice_secs: DEFAULT_NOTICE_SECS,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Loads `.env.local` and `.env` (if present) and reads the environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key).and_then(|val| {
                let val = val.trim().to_string();
                if val.is_empty() { None } else { Some(val) }
            })
        };

        let api_base = get("JEOPARDY_API_BASE").unwrap_or_else(|| SPRINGBOARD_API_BASE.to_string());
        let category_pool = get("JEOPARDY_CATEGORY_POOL")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CATEGORY_POOL)
            .clamp(NUM_CATEGORIES, MAX_CATEGORY_POOL);
        let request_timeout_secs = get("JEOPARDY_REQUEST_TIMEOUT_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        let notice_secs = get("JEOPARDY_NOTICE_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_NOTICE_SECS)
            .max(1);
        let log_file = get("JEOPARDY_LOG_FILE").map(PathBuf::from);

        Self {
            api_base,
            category_pool,
            request_timeout_secs,
            notice_secs,
            log_file,
        }
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_secs)
    }
}

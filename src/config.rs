//! Configuration module for the dataset discovery client

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Backends
    pub data_api_url: String,
    pub ai_api_url: String,
    pub request_timeout_secs: u64,

    // Search session
    pub search_page_size: u32,

    // Local persistence
    pub storage_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_api_url: "http://localhost:5133".to_string(),
            ai_api_url: "http://localhost:8001".to_string(),
            request_timeout_secs: 120,
            search_page_size: 20,
            storage_dir: PathBuf::from(".dataset-discovery"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_api_url: env::var("DATA_API_URL").unwrap_or(defaults.data_api_url),
            ai_api_url: env::var("AI_API_URL").unwrap_or(defaults.ai_api_url),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap_or(defaults.request_timeout_secs),

            search_page_size: env::var("SEARCH_PAGE_SIZE")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .ok()
                .filter(|size: &u32| *size >= 1)
                .unwrap_or(defaults.search_page_size),

            storage_dir: env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

//! Dataset Discovery client
//!
//! Client-side state for a dataset discovery application: a search session
//! with pagination and recent-search history, a fetch-once dataset cache with
//! ETL triggers, and an assistant chat whose transcript persists across
//! restarts. Semantic search, metadata storage and the LLM agent live behind
//! two HTTP backends reached through [`clients`].

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod mapper;
pub mod models;
pub mod persistence;
pub mod stores;

pub use app::DiscoveryApp;
pub use config::Config;
pub use error::{DiscoveryError, DiscoveryResult};

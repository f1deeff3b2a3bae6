//! Backend clients
//!
//! Stores talk to the outside world only through [`SearchBackend`] and
//! [`ChatBackend`]; the HTTP implementations live alongside.

pub mod chat_backend;
pub mod http;
pub mod search_backend;

use async_trait::async_trait;

use crate::error::DiscoveryResult;
use crate::models::{
    AgentReply, AgentRequest, DatasetDetail, DiscoveryStats, ProcessResult, SearchPage,
    SearchQuery,
};

pub use chat_backend::HttpChatBackend;
pub use http::HttpTransport;
pub use search_backend::HttpSearchBackend;

/// Search, dataset detail, statistics and ETL operations
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one page of a search. The offset is `(page - 1) * page_size`.
    async fn search(&self, query: &SearchQuery) -> DiscoveryResult<SearchPage>;

    /// `Ok(None)` when the backend reports the dataset does not exist.
    async fn get_dataset_details(&self, identifier: &str) -> DiscoveryResult<Option<DatasetDetail>>;

    async fn get_stats(&self) -> DiscoveryResult<DiscoveryStats>;

    async fn process_all(&self) -> DiscoveryResult<ProcessResult>;

    async fn process_one(&self, identifier: &str) -> DiscoveryResult<ProcessResult>;
}

/// Conversational agent
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, request: &AgentRequest) -> DiscoveryResult<AgentReply>;
}

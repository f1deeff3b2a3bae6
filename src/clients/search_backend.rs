//! Search backend over the AI service (semantic search) and the Data API
//! (keyword search, dataset details, statistics, ETL triggers)

use async_trait::async_trait;

use super::http::HttpTransport;
use super::SearchBackend;
use crate::error::DiscoveryResult;
use crate::mapper::{
    map_dataset_details, map_keyword_results, map_semantic_results, semantic_search_request,
    WireSearchResponse,
};
use crate::models::{
    DatasetDetail, DatasetMetadata, DiscoveryStats, ProcessResult, SearchMode, SearchPage,
    SearchQuery,
};

pub struct HttpSearchBackend {
    data_api: HttpTransport,
    ai_service: HttpTransport,
}

impl HttpSearchBackend {
    pub fn new(data_api: HttpTransport, ai_service: HttpTransport) -> Self {
        Self {
            data_api,
            ai_service,
        }
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, query: &SearchQuery) -> DiscoveryResult<SearchPage> {
        match query.mode {
            SearchMode::Keyword => {
                let records: Vec<DatasetMetadata> = self
                    .data_api
                    .get_json("/api/Search", &[("q", query.text.as_str())])
                    .await?;
                Ok(map_keyword_results(records, query))
            }
            _ => {
                let body = semantic_search_request(query);
                let response: WireSearchResponse = self
                    .ai_service
                    .post_json("/search/semantic", Some(&body))
                    .await?;
                Ok(map_semantic_results(response, query))
            }
        }
    }

    async fn get_dataset_details(&self, identifier: &str) -> DiscoveryResult<Option<DatasetDetail>> {
        let path = format!("/api/Search/details/{}", urlencoding::encode(identifier));
        match self.data_api.get_optional_json(&path).await? {
            Some(value) => map_dataset_details(value),
            None => Ok(None),
        }
    }

    async fn get_stats(&self) -> DiscoveryResult<DiscoveryStats> {
        self.data_api.get_json("/api/Search/stats", &[]).await
    }

    async fn process_all(&self) -> DiscoveryResult<ProcessResult> {
        self.data_api
            .post_json::<(), _>("/api/Etl/process-all", None)
            .await
    }

    async fn process_one(&self, identifier: &str) -> DiscoveryResult<ProcessResult> {
        let path = format!("/api/Etl/process/{}", urlencoding::encode(identifier));
        self.data_api.post_json::<(), _>(&path, None).await
    }
}

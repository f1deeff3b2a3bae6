//! Dataset cache store
//!
//! Fully hydrated dataset records are fetched at most once per identifier and
//! handed out as shared read-only views. There is no eviction and no staleness
//! check; concurrent misses for the same identifier are not de-duplicated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::clients::SearchBackend;
use crate::models::{DatasetDetail, DiscoveryStats};

use super::lock;

pub const DATASET_NOT_FOUND: &str = "Dataset not found";
pub const IDENTIFIER_REQUIRED: &str = "Identifier is required.";

#[derive(Debug, Clone, Default)]
pub struct DatasetCacheState {
    pub datasets: HashMap<String, Arc<DatasetDetail>>,
    pub selected_dataset: Option<Arc<DatasetDetail>>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub stats: Option<DiscoveryStats>,
    pub is_processing_all: bool,
    pub is_processing_one: bool,
    pub process_message: Option<String>,
    pub validation_message: Option<String>,
}

#[derive(Debug, Clone)]
pub enum DatasetMutation {
    SetDataset {
        identifier: String,
        dataset: Arc<DatasetDetail>,
    },
    SetSelectedDataset(Option<Arc<DatasetDetail>>),
    SetLoading(bool),
    SetError(Option<String>),
    SetStats(DiscoveryStats),
    SetProcessingAll(bool),
    SetProcessingOne(bool),
    SetProcessMessage(Option<String>),
    SetValidationMessage(Option<String>),
}

impl DatasetMutation {
    fn apply(self, state: &mut DatasetCacheState) {
        match self {
            DatasetMutation::SetDataset { identifier, dataset } => {
                state.datasets.insert(identifier, dataset);
            }
            DatasetMutation::SetSelectedDataset(dataset) => state.selected_dataset = dataset,
            DatasetMutation::SetLoading(is_loading) => state.is_loading = is_loading,
            DatasetMutation::SetError(error) => state.error = error,
            DatasetMutation::SetStats(stats) => state.stats = Some(stats),
            DatasetMutation::SetProcessingAll(flag) => state.is_processing_all = flag,
            DatasetMutation::SetProcessingOne(flag) => state.is_processing_one = flag,
            DatasetMutation::SetProcessMessage(message) => state.process_message = message,
            DatasetMutation::SetValidationMessage(message) => state.validation_message = message,
        }
    }
}

pub struct DatasetStore {
    state: Mutex<DatasetCacheState>,
    backend: Arc<dyn SearchBackend>,
}

impl DatasetStore {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            state: Mutex::new(DatasetCacheState::default()),
            backend,
        }
    }

    pub fn commit(&self, mutation: DatasetMutation) {
        mutation.apply(&mut lock(&self.state));
    }

    pub fn snapshot(&self) -> DatasetCacheState {
        lock(&self.state).clone()
    }

    /// Cached record for `identifier`, without any I/O
    pub fn get_dataset_by_id(&self, identifier: &str) -> Option<Arc<DatasetDetail>> {
        lock(&self.state).datasets.get(identifier).cloned()
    }

    pub fn selected_dataset(&self) -> Option<Arc<DatasetDetail>> {
        lock(&self.state).selected_dataset.clone()
    }

    /// Return the record for `identifier`, fetching it only on a cache miss.
    pub async fn fetch_dataset(&self, identifier: &str) -> Option<Arc<DatasetDetail>> {
        if let Some(cached) = self.get_dataset_by_id(identifier) {
            tracing::debug!("dataset cache hit: {}", identifier);
            self.commit(DatasetMutation::SetSelectedDataset(Some(cached.clone())));
            return Some(cached);
        }

        self.commit(DatasetMutation::SetLoading(true));
        self.commit(DatasetMutation::SetError(None));

        let outcome = match self.backend.get_dataset_details(identifier).await {
            Ok(Some(detail)) => {
                let dataset = Arc::new(detail);
                self.commit(DatasetMutation::SetDataset {
                    identifier: identifier.to_string(),
                    dataset: dataset.clone(),
                });
                self.commit(DatasetMutation::SetSelectedDataset(Some(dataset.clone())));
                Some(dataset)
            }
            Ok(None) => {
                tracing::warn!("Dataset not found: {}", identifier);
                self.commit(DatasetMutation::SetError(Some(DATASET_NOT_FOUND.to_string())));
                None
            }
            Err(e) => {
                tracing::warn!("Failed to fetch dataset {}: {}", identifier, e);
                self.commit(DatasetMutation::SetError(Some(e.user_message())));
                None
            }
        };

        self.commit(DatasetMutation::SetLoading(false));
        outcome
    }

    /// Refresh catalog statistics. Failures are logged only.
    pub async fn fetch_stats(&self) {
        match self.backend.get_stats().await {
            Ok(stats) => self.commit(DatasetMutation::SetStats(stats)),
            Err(e) => tracing::error!("Failed to fetch stats: {}", e),
        }
    }

    /// Trigger ETL processing for the whole catalog.
    pub async fn process_all(&self) {
        self.commit(DatasetMutation::SetValidationMessage(None));
        self.commit(DatasetMutation::SetProcessMessage(None));
        self.commit(DatasetMutation::SetProcessingAll(true));

        let message = match self.backend.process_all().await {
            Ok(result) if !result.message.trim().is_empty() => result.message,
            Ok(_) => "Processing all datasets started.".to_string(),
            Err(e) => {
                tracing::warn!("Process-all failed: {}", e);
                e.user_message()
            }
        };
        self.commit(DatasetMutation::SetProcessMessage(Some(message)));

        self.commit(DatasetMutation::SetProcessingAll(false));
    }

    /// Trigger ETL processing for one dataset. A blank identifier is rejected
    /// locally and never reaches the backend.
    pub async fn process_identifier(&self, identifier: &str) {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            self.commit(DatasetMutation::SetValidationMessage(Some(
                IDENTIFIER_REQUIRED.to_string(),
            )));
            return;
        }

        self.commit(DatasetMutation::SetValidationMessage(None));
        self.commit(DatasetMutation::SetProcessMessage(None));
        self.commit(DatasetMutation::SetProcessingOne(true));

        let message = match self.backend.process_one(identifier).await {
            Ok(result) if !result.message.trim().is_empty() => result.message,
            Ok(_) => format!("Processing started for {}.", identifier),
            Err(e) => {
                tracing::warn!("Processing {} failed: {}", identifier, e);
                e.user_message()
            }
        };
        self.commit(DatasetMutation::SetProcessMessage(Some(message)));

        self.commit(DatasetMutation::SetProcessingOne(false));
    }
}

//! Application container
//!
//! One `DiscoveryApp` per application instance. Stores are siblings: they
//! share backends but never write each other's state.

use std::sync::Arc;

use crate::clients::{ChatBackend, HttpChatBackend, HttpSearchBackend, HttpTransport, SearchBackend};
use crate::config::Config;
use crate::error::DiscoveryResult;
use crate::persistence::{ChatHistoryRepository, ChatPersistence, FileStore, KeyValueStore};
use crate::stores::{ChatStore, DatasetStore, NotificationStore, SearchStore};

pub struct DiscoveryApp {
    pub config: Config,
    pub search: SearchStore,
    pub datasets: DatasetStore,
    pub chat: ChatStore,
    pub notifications: NotificationStore,
    pub chat_persistence: Arc<ChatPersistence>,
}

impl DiscoveryApp {
    /// Wire the stores over the given backends and storage, restoring any
    /// persisted chat transcript.
    pub fn new(
        config: Config,
        search_backend: Arc<dyn SearchBackend>,
        chat_backend: Arc<dyn ChatBackend>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let search = SearchStore::new(search_backend.clone(), config.search_page_size);
        let datasets = DatasetStore::new(search_backend);
        let chat = ChatStore::new(chat_backend);
        let chat_persistence = ChatPersistence::install(&chat, ChatHistoryRepository::new(storage));

        Self {
            config,
            search,
            datasets,
            chat,
            notifications: NotificationStore::new(),
            chat_persistence,
        }
    }

    /// Build HTTP backends and file storage from configuration.
    pub fn from_config(config: Config) -> DiscoveryResult<Self> {
        let timeout = config.request_timeout();
        let data_api = HttpTransport::new(&config.data_api_url, timeout)?;
        let ai_service = HttpTransport::new(&config.ai_api_url, timeout)?;

        tracing::info!("🔌 Data API at {}", data_api.base_url());
        tracing::info!("🧠 AI service at {}", ai_service.base_url());

        let search_backend = Arc::new(HttpSearchBackend::new(data_api, ai_service.clone()));
        let chat_backend = Arc::new(HttpChatBackend::new(ai_service));
        let storage = Arc::new(FileStore::new(config.storage_dir.clone()));
        tracing::info!("💾 Chat history under {}", storage.dir().display());

        Ok(Self::new(config, search_backend, chat_backend, storage))
    }
}

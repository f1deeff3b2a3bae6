//! Chat transcript persistence
//!
//! The transcript is stored as a JSON array of `{id, role, content, timestamp}`
//! under a single key. Storage problems are logged and swallowed: a failed
//! read yields an empty transcript, a failed write keeps the previous bytes.

use std::sync::Arc;

use super::KeyValueStore;
use crate::models::ChatMessage;
use crate::stores::{ChatMutation, ChatObserver, ChatSessionState, ChatStore};

pub const CHAT_HISTORY_KEY: &str = "dsh_chat_history";

#[derive(Clone)]
pub struct ChatHistoryRepository {
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl ChatHistoryRepository {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            key: CHAT_HISTORY_KEY.to_string(),
        }
    }

    pub fn load_history(&self) -> Vec<ChatMessage> {
        let bytes = match self.storage.get(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!("Failed to load chat history: {}", e);
                return Vec::new();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::error!("Discarding unreadable chat history: {}", e);
            Vec::new()
        })
    }

    pub fn save_history(&self, history: &[ChatMessage]) {
        let serialized = match serde_json::to_vec(history) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Failed to persist chat history: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &serialized) {
            tracing::error!("Failed to persist chat history: {}", e);
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::error!("Failed to clear chat history: {}", e);
        }
    }
}

/// Observer that rewrites the whole transcript after it gains a message or
/// is cleared.
pub struct ChatPersistence {
    repository: ChatHistoryRepository,
}

impl ChatPersistence {
    /// Restore any saved transcript into `store`, then keep storage in sync.
    ///
    /// Restoring a non-empty transcript makes a later `initialize_chat` a no-op.
    pub fn install(store: &ChatStore, repository: ChatHistoryRepository) -> Arc<Self> {
        let saved = repository.load_history();
        if !saved.is_empty() {
            tracing::info!("Restored {} chat messages", saved.len());
            store.set_history(saved);
        }

        let persistence = Arc::new(Self { repository });
        store.subscribe(persistence.clone());
        persistence
    }

    pub fn repository(&self) -> &ChatHistoryRepository {
        &self.repository
    }
}

impl ChatObserver for ChatPersistence {
    fn on_mutation(&self, mutation: &ChatMutation, state: &ChatSessionState) {
        if matches!(mutation, ChatMutation::AddMessage(_) | ChatMutation::ClearMessages) {
            self.repository.save_history(&state.messages);
        }
    }
}

//! Chat session store
//!
//! Each turn goes `Idle -> Sending -> Idle`. A failed turn still ends with an
//! assistant entry in the transcript, so the conversation records it. Observers
//! registered with [`ChatStore::subscribe`] see every committed mutation.

use std::sync::{Arc, Mutex};

use crate::clients::ChatBackend;
use crate::models::{AgentReply, AgentRequest, ChatMessage, HistoryEntry};

use super::lock;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSessionState {
    pub is_open: bool,
    pub messages: Vec<ChatMessage>,
    pub is_loading: bool,
    /// Hints from the most recent agent reply
    pub suggested_query: Option<String>,
    pub related_identifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatMutation {
    Toggle,
    AddMessage(ChatMessage),
    SetLoading(bool),
    ClearMessages,
    /// Wholesale transcript replacement, used when restoring persisted history
    SetHistory(Vec<ChatMessage>),
    SetAgentHints {
        suggested_query: Option<String>,
        related_identifiers: Vec<String>,
    },
}

impl ChatMutation {
    fn apply(&self, state: &mut ChatSessionState) {
        match self {
            ChatMutation::Toggle => state.is_open = !state.is_open,
            ChatMutation::AddMessage(message) => state.messages.push(message.clone()),
            ChatMutation::SetLoading(is_loading) => state.is_loading = *is_loading,
            ChatMutation::ClearMessages => {
                state.messages.clear();
                state.suggested_query = None;
                state.related_identifiers.clear();
            }
            ChatMutation::SetHistory(history) => state.messages = history.clone(),
            ChatMutation::SetAgentHints {
                suggested_query,
                related_identifiers,
            } => {
                state.suggested_query = suggested_query.clone();
                state.related_identifiers = related_identifiers.clone();
            }
        }
    }
}

/// Listener notified after each committed chat mutation.
///
/// Called while the store is locked: implementations must not call back
/// into the store.
pub trait ChatObserver: Send + Sync {
    fn on_mutation(&self, mutation: &ChatMutation, state: &ChatSessionState);
}

struct ChatInner {
    state: ChatSessionState,
    observers: Vec<Arc<dyn ChatObserver>>,
}

pub struct ChatStore {
    inner: Mutex<ChatInner>,
    backend: Arc<dyn ChatBackend>,
}

impl ChatStore {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            inner: Mutex::new(ChatInner {
                state: ChatSessionState::default(),
                observers: Vec::new(),
            }),
            backend,
        }
    }

    pub fn subscribe(&self, observer: Arc<dyn ChatObserver>) {
        lock(&self.inner).observers.push(observer);
    }

    pub fn commit(&self, mutation: ChatMutation) {
        let mut inner = lock(&self.inner);
        mutation.apply(&mut inner.state);
        for observer in &inner.observers {
            observer.on_mutation(&mutation, &inner.state);
        }
    }

    pub fn snapshot(&self) -> ChatSessionState {
        lock(&self.inner).state.clone()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.inner).state.messages.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.inner).state.is_loading
    }

    pub fn is_open(&self) -> bool {
        lock(&self.inner).state.is_open
    }

    /// Insert the welcome message into an empty transcript. No-op otherwise.
    pub fn initialize_chat(&self) {
        let mut inner = lock(&self.inner);
        if !inner.state.messages.is_empty() {
            return;
        }
        let mutation = ChatMutation::AddMessage(ChatMessage::welcome());
        mutation.apply(&mut inner.state);
        for observer in &inner.observers {
            observer.on_mutation(&mutation, &inner.state);
        }
    }

    /// Send one user turn and append the agent's answer, or the fallback
    /// message when the agent cannot be reached.
    ///
    /// Calls made while a turn is in flight are accepted; the UI gates on
    /// `is_loading`.
    pub async fn send_message(&self, text: &str) {
        self.commit(ChatMutation::AddMessage(ChatMessage::user(text)));
        self.commit(ChatMutation::SetLoading(true));

        let request = AgentRequest {
            message: text.to_string(),
            history: lock(&self.inner)
                .state
                .messages
                .iter()
                .map(HistoryEntry::from)
                .collect(),
        };

        match self.backend.chat(&request).await {
            Ok(AgentReply {
                answer,
                suggested_query,
                related_identifiers,
            }) => {
                self.commit(ChatMutation::AddMessage(ChatMessage::assistant(answer)));
                self.commit(ChatMutation::SetAgentHints {
                    suggested_query,
                    related_identifiers,
                });
            }
            Err(e) => {
                tracing::warn!("Agent request failed: {}", e);
                self.commit(ChatMutation::AddMessage(ChatMessage::assistant_unavailable()));
            }
        }

        self.commit(ChatMutation::SetLoading(false));
    }

    pub fn toggle(&self) {
        self.commit(ChatMutation::Toggle);
    }

    pub fn clear_messages(&self) {
        self.commit(ChatMutation::ClearMessages);
    }

    pub fn set_history(&self, history: Vec<ChatMessage>) {
        self.commit(ChatMutation::SetHistory(history));
    }
}

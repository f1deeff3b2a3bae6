//! Chat transcript models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const WELCOME_MESSAGE_ID: &str = "welcome";

pub const WELCOME_MESSAGE: &str =
    "Hello! I am your Dataset Discovery Assistant. How can I help you find environmental data today?";

pub const ASSISTANT_UNAVAILABLE_MESSAGE: &str =
    "I'm sorry, I encountered an error while processing your request. Please ensure the AI service is running.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One entry of the conversation transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            // v7 ids sort by creation time
            id: Uuid::now_v7().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    pub fn welcome() -> Self {
        Self {
            id: WELCOME_MESSAGE_ID.to_string(),
            ..Self::assistant(WELCOME_MESSAGE)
        }
    }

    pub fn assistant_unavailable() -> Self {
        Self::assistant(ASSISTANT_UNAVAILABLE_MESSAGE)
    }
}

/// `{role, content}` pair sent to the agent as conversation context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: ChatRole,
    pub content: String,
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Request body for the agent endpoint
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AgentRequest {
    pub message: String,
    pub history: Vec<HistoryEntry>,
}

/// Normalized agent reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentReply {
    pub answer: String,
    pub suggested_query: Option<String>,
    pub related_identifiers: Vec<String>,
}

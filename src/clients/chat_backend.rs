//! Agent client for the AI service's conversational endpoint

use async_trait::async_trait;

use super::http::HttpTransport;
use super::ChatBackend;
use crate::error::DiscoveryResult;
use crate::mapper::{map_agent_response, WireAgentResponse};
use crate::models::{AgentReply, AgentRequest};

pub struct HttpChatBackend {
    ai_service: HttpTransport,
}

impl HttpChatBackend {
    pub fn new(ai_service: HttpTransport) -> Self {
        Self { ai_service }
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn chat(&self, request: &AgentRequest) -> DiscoveryResult<AgentReply> {
        let response: WireAgentResponse = self
            .ai_service
            .post_json("/agent/chat", Some(request))
            .await?;
        Ok(map_agent_response(response))
    }
}

//! Ollama 兼容网关
//!
//! 通过 reqwest 调用 Ollama 的 /api/chat 端点（非流式）；整个请求包在调用方配置的
//! 截止时间内完成，超时转 GatewayTimeout，传输/协议错误转 GatewayUnavailable。

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::core::AgentError;
use crate::gateway::{ChatMessage, Gateway};

/// Ollama /api/chat 响应体（仅取 message.content）
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Ollama 网关：持有 Client、端点与模型名
pub struct OllamaGateway {
    client: Client,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl OllamaGateway {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            timeout_secs,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Gateway for OllamaGateway {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
        let payload = json!({
            "model": self.model,
            "messages": messages
                .iter()
                .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
                .collect::<Vec<_>>(),
            "stream": false,
        });

        let request = self.client.post(self.chat_url()).json(&payload).send();

        let response = tokio::time::timeout(
            std::time::Duration::from_secs(self.timeout_secs),
            request,
        )
        .await
        .map_err(|_| AgentError::GatewayTimeout(self.timeout_secs))?
        .map_err(|e| AgentError::GatewayUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AgentError::GatewayUnavailable(format!(
                "{} returned HTTP {}",
                self.chat_url(),
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::GatewayUnavailable(format!("malformed response: {}", e)))?;

        Ok(parsed.message.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_url_strips_trailing_slash() {
        let gw = OllamaGateway::new("http://localhost:11434/", "llama3.2:1b", 30);
        assert_eq!(gw.chat_url(), "http://localhost:11434/api/chat");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let gw = OllamaGateway::new("http://127.0.0.1:1", "llama3.2:1b", 5);
        let err = gw.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, AgentError::GatewayUnavailable(_)));
    }
}

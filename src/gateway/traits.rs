//! 网关抽象
//!
//! Gateway 是对 LLM 请求/响应通道的边界抽象：消息进、文本出、无状态；
//! 传输失败与超时以 AgentError 显式上浮，由 Agent 核心决定本轮如何收场。

use async_trait::async_trait;

use crate::core::AgentError;

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// 单条消息
#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// LLM 网关 trait：非流式完成
#[async_trait]
pub trait Gateway: Send + Sync {
    /// 发送消息序列，返回模型文本；失败为 GatewayUnavailable / GatewayTimeout
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AgentError>;
}

//! Mock 网关（测试用）
//!
//! 按脚本顺序弹出预设回复或预设错误，并记录收到的 prompt，便于在测试中断言
//! tool-selection / response-generation 两次调用的内容与次序。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::AgentError;
use crate::gateway::{ChatMessage, Gateway};

/// 一条脚本化回复
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Unavailable(String),
    Timeout(u64),
}

/// Mock 网关：脚本化回复队列 + 已收 prompt 记录
#[derive(Debug, Default)]
pub struct MockGateway {
    replies: Mutex<VecDeque<MockReply>>,
    received: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条文本回复
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Text(text.into()));
        self
    }

    /// 追加一条失败回复
    pub fn fail_with(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// 已收到的 prompt（每次 complete 调用记录最后一条 user 消息）
    pub fn received_prompts(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
        let prompt = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, crate::gateway::ChatRole::User))
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.received.lock().unwrap().push(prompt);

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(MockReply::Text(t)) => Ok(t),
            Some(MockReply::Unavailable(msg)) => Err(AgentError::GatewayUnavailable(msg)),
            Some(MockReply::Timeout(secs)) => Err(AgentError::GatewayTimeout(secs)),
            None => Err(AgentError::GatewayUnavailable(
                "mock gateway: no scripted reply left".to_string(),
            )),
        }
    }
}

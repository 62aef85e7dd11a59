//! Agent 核心：单轮 ReAct 状态机
//!
//! 每个用户轮走 Reasoning -> (Acting) -> Responding -> Persisted：
//! 先用 tool-selection prompt 问网关是否需要工具，解析决策后经注册表分发执行，
//! 再用 response-generation prompt 生成最终回复，最后把整轮原子地追加进记忆日志。
//! 网关错误与取消对本轮致命（不落任何记录）；决策解析失败与幻觉工具名回退 no_tool。

pub mod decision;

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::core::AgentError;
use crate::gateway::{ChatMessage, Gateway};
use crate::memory::{ConversationTurn, MemoryLog, MemoryStats, ToolResultRecord};
use crate::prompts::PromptLibrary;
use crate::tools::{ToolDescriptor, ToolExecutionResult, ToolRegistry};

pub use decision::{decision_schema_json, parse_decision, Decision};

/// 一轮处理的结果：最终回复与本轮用到的工具（若有）
#[derive(Debug)]
pub struct TurnOutcome {
    pub response: String,
    pub tool_used: Option<String>,
    pub tool_result: Option<ToolExecutionResult>,
}

/// 会话状态包：注册表、记忆日志、网关与模板，进程启动时构造一次，显式传引用，无全局单例
pub struct Agent {
    registry: ToolRegistry,
    memory: Box<dyn MemoryLog>,
    gateway: Arc<dyn Gateway>,
    prompts: PromptLibrary,
    /// 拼入 prompt 的最近轮数窗口
    recent_turns: usize,
}

impl Agent {
    pub fn new(
        registry: ToolRegistry,
        memory: Box<dyn MemoryLog>,
        gateway: Arc<dyn Gateway>,
        prompts: PromptLibrary,
        recent_turns: usize,
    ) -> Self {
        Self {
            registry,
            memory,
            gateway,
            prompts,
            recent_turns,
        }
    }

    pub fn tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry.descriptors()
    }

    pub fn memory_stats(&self) -> MemoryStats {
        self.memory.stats()
    }

    pub fn clear_memory(&mut self) -> Result<(), AgentError> {
        self.memory.clear()
    }

    /// 处理一条用户输入，返回最终回复；整轮要么完整持久化要么完全不持久化
    pub async fn process(
        &mut self,
        user_input: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, AgentError> {
        // Reasoning：询问网关是否需要工具
        let decision = self.reason(user_input, cancel).await?;

        // Acting：仅在选中了已注册工具时执行
        let acting = match decision {
            Decision::NoTool => None,
            Decision::ToolCall { name, arguments } => {
                Some(self.act(&name, arguments).await)
            }
        };

        // Responding：生成面向用户的最终文本
        let response = self.respond(user_input, &acting, cancel).await?;

        // Persisted：整轮一次性追加
        let turn = match &acting {
            Some((name, arguments, result)) => ConversationTurn::with_tool(
                user_input,
                response.clone(),
                name.clone(),
                arguments.clone(),
                ToolResultRecord {
                    success: result.success,
                    output: result.output.clone(),
                    error: result.error.clone(),
                },
            ),
            None => ConversationTurn::plain(user_input, response.clone()),
        };
        self.memory.append(turn)?;

        let (tool_used, tool_result) = match acting {
            Some((name, _, result)) => (Some(name), Some(result)),
            None => (None, None),
        };
        Ok(TurnOutcome {
            response,
            tool_used,
            tool_result,
        })
    }

    /// Reasoning 阶段：渲染 tool-selection prompt、调用网关并解析决策。
    /// 解析失败或模型点名了未注册的工具 -> 记日志并回退 NoTool，绝不中止本轮。
    async fn reason(
        &self,
        user_input: &str,
        cancel: &CancellationToken,
    ) -> Result<Decision, AgentError> {
        let tools_json = self.registry.schema_json();
        let schema = decision_schema_json();
        let history = self.history_section();
        let prompt = self
            .render(
                "tool_selection",
                &[
                    ("user_input", user_input),
                    ("available_tools", &tools_json),
                    ("decision_schema", &schema),
                    ("history", &history),
                ],
            )?;

        let output = self.complete(&prompt, cancel).await?;

        match parse_decision(&output) {
            Ok(Decision::ToolCall { name, arguments }) => {
                if self.registry.contains(&name) {
                    tracing::debug!(tool = %name, "tool selected");
                    Ok(Decision::ToolCall { name, arguments })
                } else {
                    tracing::warn!(tool = %name, "model selected unregistered tool, falling back to no_tool");
                    Ok(Decision::NoTool)
                }
            }
            Ok(Decision::NoTool) => Ok(Decision::NoTool),
            Err(e) => {
                tracing::warn!(error = %e, "decision parse failed, falling back to no_tool");
                Ok(Decision::NoTool)
            }
        }
    }

    /// Acting 阶段：经注册表分发；参数校验失败同样折叠为失败结果，让模型知道工具失败了
    async fn act(&self, name: &str, arguments: Value) -> (String, Value, ToolExecutionResult) {
        let result = match self.registry.execute(name, arguments.clone()).await {
            Ok(result) => result,
            // InvalidArguments 等前置错误也作为失败结果交给模型，而不是中止本轮
            Err(e) => ToolExecutionResult::failure(e.to_string()),
        };
        (name.to_string(), arguments, result)
    }

    /// Responding 阶段：带上工具结果与近期历史生成最终回复
    async fn respond(
        &self,
        user_input: &str,
        acting: &Option<(String, Value, ToolExecutionResult)>,
        cancel: &CancellationToken,
    ) -> Result<String, AgentError> {
        let tool_results = match acting {
            Some((name, _, result)) if result.success => {
                format!("{}: {}", name, result.output)
            }
            Some((name, _, result)) => format!(
                "{} FAILED: {}",
                name,
                result.error.as_deref().unwrap_or("unknown error")
            ),
            None => "(no tool was used this turn)".to_string(),
        };
        let history = self.history_section();
        let prompt = self.render(
            "response_generation",
            &[
                ("user_input", user_input),
                ("tool_results", &tool_results),
                ("history", &history),
            ],
        )?;
        self.complete(&prompt, cancel).await
    }

    /// 调网关并在调用后检查取消；取消的轮不会走到持久化
    async fn complete(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, AgentError> {
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }
        let system = self.prompts.get("system").unwrap_or_default().to_string();
        let messages = [ChatMessage::system(system), ChatMessage::user(prompt)];
        let output = self.gateway.complete(&messages).await?;
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }
        Ok(output)
    }

    /// 最近 N 轮历史的文本形态（User / Assistant 成对）
    fn history_section(&self) -> String {
        let turns = self.memory.recent(self.recent_turns);
        if turns.is_empty() {
            return "(no prior conversation)".to_string();
        }
        let mut out = String::new();
        for turn in &turns {
            out.push_str(&format!("User: {}\n", turn.user_input));
            out.push_str(&format!("Assistant: {}\n", turn.agent_response));
        }
        out
    }

    fn render(&self, name: &str, vars: &[(&str, &str)]) -> Result<String, AgentError> {
        self.prompts
            .render(name, vars)
            .ok_or_else(|| AgentError::Config(format!("missing prompt template '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use crate::memory::InMemoryLog;
    use crate::tools::EchoTool;

    fn agent_with(gateway: Arc<MockGateway>) -> Agent {
        let mut registry = ToolRegistry::new(5);
        registry.register(EchoTool).unwrap();
        Agent::new(
            registry,
            Box::new(InMemoryLog::new()),
            gateway,
            PromptLibrary::builtin(),
            5,
        )
    }

    #[tokio::test]
    async fn test_no_tool_turn() {
        let gateway = Arc::new(
            MockGateway::new()
                .reply(r#"{"tool": "", "args": {}}"#)
                .reply("Hello to you too!"),
        );
        let mut agent = agent_with(gateway);
        let outcome = agent
            .process("hello", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.response, "Hello to you too!");
        assert!(outcome.tool_used.is_none());
        assert_eq!(agent.memory_stats().turn_count, 1);
    }

    #[tokio::test]
    async fn test_tool_turn_folds_result_into_response_prompt() {
        let gateway = Arc::new(
            MockGateway::new()
                .reply(r#"{"tool": "echo", "args": {"text": "pong"}}"#)
                .reply("The echo said: pong"),
        );
        let mut agent = agent_with(Arc::clone(&gateway));
        let outcome = agent
            .process("ping", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.tool_used.as_deref(), Some("echo"));
        assert!(outcome.tool_result.as_ref().unwrap().success);
        // 第二次网关调用的 prompt 中包含工具输出
        let prompts = gateway.received_prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("echo: pong"));
    }

    #[tokio::test]
    async fn test_cancelled_turn_is_not_persisted() {
        let gateway = Arc::new(MockGateway::new().reply(r#"{"tool": "", "args": {}}"#));
        let mut agent = agent_with(gateway);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = agent.process("hello", &cancel).await.unwrap_err();
        assert!(matches!(err, AgentError::Cancelled));
        assert_eq!(agent.memory_stats().turn_count, 0);
    }
}

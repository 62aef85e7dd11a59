//! 对话轮记录
//!
//! 一条 ConversationTurn 对应一次完整的「用户输入 -> (可选工具调用) -> 最终回复」循环，
//! 追加后不可变；工具字段仅在本轮实际调用了工具时存在。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 工具执行结果的持久化形态（ToolExecutionResult 折叠进轮记录）
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolResultRecord {
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 单条对话轮：用户输入、最终回复与可选的工具调用三元组
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Local>,
    pub user_input: String,
    pub agent_response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_arguments: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolResultRecord>,
}

impl ConversationTurn {
    /// 无工具调用的轮
    pub fn plain(user_input: impl Into<String>, agent_response: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            user_input: user_input.into(),
            agent_response: agent_response.into(),
            tool_name: None,
            tool_arguments: None,
            tool_result: None,
        }
    }

    /// 携带工具调用与结果的轮
    pub fn with_tool(
        user_input: impl Into<String>,
        agent_response: impl Into<String>,
        tool_name: impl Into<String>,
        tool_arguments: Value,
        tool_result: ToolResultRecord,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            user_input: user_input.into(),
            agent_response: agent_response.into(),
            tool_name: Some(tool_name.into()),
            tool_arguments: Some(tool_arguments),
            tool_result: Some(tool_result),
        }
    }

    pub fn used_tool(&self) -> bool {
        self.tool_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_turn_has_no_tool_fields() {
        let turn = ConversationTurn::plain("hello", "hi there");
        assert!(!turn.used_tool());
        assert!(turn.tool_arguments.is_none());
        assert!(turn.tool_result.is_none());
    }

    #[test]
    fn test_tool_fields_skipped_in_json_when_absent() {
        let turn = ConversationTurn::plain("hello", "hi");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(!json.contains("tool_name"));
        assert!(!json.contains("tool_result"));
    }
}

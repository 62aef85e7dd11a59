//! Agent 错误类型
//!
//! 错误分层：Config / DuplicateTool 属启动期致命错误（进程退出）；
//! GatewayUnavailable / GatewayTimeout 对单轮致命但会话可恢复；
//! UnknownTool / InvalidArguments / DecisionParse 在轮内可恢复（回退 no_tool 或把失败文本交给模型）。

use thiserror::Error;

/// Agent 运行过程中可能出现的错误（配置、网关、工具、解析、持久化）
#[derive(Error, Debug)]
pub enum AgentError {
    /// 启动期配置错误：非法 URL、记忆文件损坏等，进程应以非零码退出
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// 网关调用超过调用方给定的截止时间（秒）
    #[error("Gateway timed out after {0}s")]
    GatewayTimeout(u64),

    /// 启动期注册了重名工具（程序员错误）
    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// 参数未通过 schema 校验；fields 列出违规字段
    #[error("Invalid arguments for tool '{tool}': {}", fields.join(", "))]
    InvalidArguments { tool: String, fields: Vec<String> },

    /// 模型返回的 tool-selection 决策无法解析为期望结构
    #[error("Decision parse error: {0}")]
    DecisionParse(String),

    #[error("Memory persistence error: {0}")]
    Memory(String),

    #[error("Cancelled by user")]
    Cancelled,
}

impl AgentError {
    /// 该错误是否对当前轮致命（中止本轮、不写记忆），但会话可继续
    pub fn is_turn_fatal(&self) -> bool {
        matches!(
            self,
            AgentError::GatewayUnavailable(_)
                | AgentError::GatewayTimeout(_)
                | AgentError::Memory(_)
                | AgentError::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_arguments_lists_fields() {
        let e = AgentError::InvalidArguments {
            tool: "get_current_time".to_string(),
            fields: vec!["format".to_string(), "timezone".to_string()],
        };
        let msg = e.to_string();
        assert!(msg.contains("get_current_time"));
        assert!(msg.contains("format, timezone"));
    }

    #[test]
    fn test_turn_fatal_classification() {
        assert!(AgentError::GatewayTimeout(30).is_turn_fatal());
        assert!(AgentError::GatewayUnavailable("connection refused".into()).is_turn_fatal());
        assert!(!AgentError::UnknownTool("nope".into()).is_turn_fatal());
        assert!(!AgentError::DecisionParse("bad json".into()).is_turn_fatal());
    }
}

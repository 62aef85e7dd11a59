//! 决策解析
//!
//! 模型的 tool-selection 输出是不可信载荷：严格解析为 Decision（NoTool / ToolCall），
//! 解析失败交由调用方回退 no_tool，绝不假设模型总是返回良构 JSON。
//! decision_schema_json 用 schemars 生成决策格式的 JSON Schema 注入 prompt，减少格式错误。

use std::collections::HashMap;

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

use crate::core::AgentError;

/// 推理阶段的解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// 本轮无需工具
    NoTool,
    /// 需要执行工具
    ToolCall { name: String, arguments: Value },
}

/// 模型应输出的决策 JSON：{"tool": "...", "args": {...}}；tool 为空串表示无需工具
#[derive(Debug, Deserialize)]
struct RawDecision {
    tool: String,
    #[serde(default)]
    args: Value,
}

/// 决策格式（仅用于 Schema 生成，拼入 tool-selection prompt）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct DecisionFormat {
    /// 工具名；空字符串表示不调用任何工具
    pub tool: String,
    /// 工具参数，依工具 schema 而定
    pub args: HashMap<String, Value>,
}

/// 返回决策格式的 JSON Schema 字符串
pub fn decision_schema_json() -> String {
    let schema = schema_for!(DecisionFormat);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| String::new())
}

/// 从模型输出中提取 JSON 块（```json 围栏或首尾大括号）并解析为 Decision
pub fn parse_decision(output: &str) -> Result<Decision, AgentError> {
    let trimmed = output.trim();

    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```")
            .map(|end| rest[..end].trim())
            .unwrap_or_else(|| rest.trim())
    } else if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            &trimmed[start..=end]
        } else {
            return Err(AgentError::DecisionParse(format!(
                "no JSON object in output: {}",
                preview(trimmed)
            )));
        }
    } else {
        return Err(AgentError::DecisionParse(format!(
            "no JSON object in output: {}",
            preview(trimmed)
        )));
    };

    let raw: RawDecision = serde_json::from_str(json_str)
        .map_err(|e| AgentError::DecisionParse(format!("{}: {}", e, preview(json_str))))?;

    if raw.tool.is_empty() || raw.tool.eq_ignore_ascii_case("none") {
        Ok(Decision::NoTool)
    } else {
        Ok(Decision::ToolCall {
            name: raw.tool,
            arguments: if raw.args.is_null() {
                Value::Object(serde_json::Map::new())
            } else {
                raw.args
            },
        })
    }
}

fn preview(s: &str) -> String {
    if s.chars().count() > 120 {
        format!("{}...", s.chars().take(120).collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tool_call() {
        let d = parse_decision(r#"{"tool": "get_current_time", "args": {"format": "iso"}}"#)
            .unwrap();
        assert_eq!(
            d,
            Decision::ToolCall {
                name: "get_current_time".to_string(),
                arguments: json!({"format": "iso"}),
            }
        );
    }

    #[test]
    fn test_parse_no_tool() {
        assert_eq!(parse_decision(r#"{"tool": "", "args": {}}"#).unwrap(), Decision::NoTool);
        assert_eq!(parse_decision(r#"{"tool": "none"}"#).unwrap(), Decision::NoTool);
    }

    #[test]
    fn test_parse_fenced_json() {
        let output = "Here is my decision:\n```json\n{\"tool\": \"echo\", \"args\": {\"text\": \"hi\"}}\n```";
        match parse_decision(output).unwrap() {
            Decision::ToolCall { name, .. } => assert_eq!(name, "echo"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_json_embedded_in_prose() {
        let output = r#"I think we need a tool. {"tool": "echo", "args": {}} That's it."#;
        assert!(matches!(
            parse_decision(output).unwrap(),
            Decision::ToolCall { .. }
        ));
    }

    #[test]
    fn test_plain_text_is_parse_error() {
        let err = parse_decision("I don't think any tool is needed here.").unwrap_err();
        assert!(matches!(err, AgentError::DecisionParse(_)));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_decision(r#"{"tool": "echo", "args": "#).unwrap_err();
        assert!(matches!(err, AgentError::DecisionParse(_)));
    }

    #[test]
    fn test_missing_args_defaults_to_empty_object() {
        match parse_decision(r#"{"tool": "get_current_time"}"#).unwrap() {
            Decision::ToolCall { arguments, .. } => {
                assert!(arguments.as_object().unwrap().is_empty())
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_decision_schema_mentions_fields() {
        let schema = decision_schema_json();
        assert!(schema.contains("tool"));
        assert!(schema.contains("args"));
    }
}

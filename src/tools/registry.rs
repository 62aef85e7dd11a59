//! 工具注册表与分发
//!
//! 所有工具实现 Tool trait（name / description / schema / execute），ToolRegistry 按注册顺序
//! 保存（顺序进入 prompt，影响模型行为的可复现性），execute 在调用前做 schema 校验并施加超时；
//! 工具内部失败一律折叠为 ToolExecutionResult{success:false}，绝不让循环崩溃。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::timeout;

use crate::core::AgentError;
use crate::tools::ToolSchema;

/// 工具 trait：名称、描述（供 LLM 理解何时使用）、参数 schema、异步执行（args 为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（决策 JSON 中的 "tool" 字段）
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能）
    fn description(&self) -> &str;

    /// 参数 schema；默认无参数
    fn schema(&self) -> ToolSchema {
        ToolSchema::empty()
    }

    /// 执行工具；Err 会被注册表折叠为失败结果而非向上传播
    async fn execute(&self, args: Value) -> Result<String, String>;
}

/// 工具的机读描述：名称、说明与参数 schema（注册后只读）
#[derive(Clone, Debug)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub schema: ToolSchema,
}

impl ToolDescriptor {
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.schema.to_json(),
        })
    }
}

/// 一次工具执行的结果；消费一次后折叠进 ConversationTurn
#[derive(Clone, Debug, PartialEq)]
pub struct ToolExecutionResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ToolExecutionResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }
}

/// 工具注册表：按注册顺序保存 Arc<dyn Tool>，名称唯一
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
    tool_timeout: Duration,
}

impl ToolRegistry {
    pub fn new(tool_timeout_secs: u64) -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            tool_timeout: Duration::from_secs(tool_timeout_secs),
        }
    }

    /// 注册工具；重名返回 DuplicateTool 且注册表不变
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), AgentError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(AgentError::DuplicateTool(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(Arc::new(tool));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// 按注册顺序返回描述符
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|t| ToolDescriptor {
                name: t.name().to_string(),
                description: t.description().to_string(),
                schema: t.schema(),
            })
            .collect()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// 全部工具的 schema JSON 数组，拼入 tool-selection prompt
    pub fn schema_json(&self) -> String {
        let tools: Vec<Value> = self.descriptors().iter().map(|d| d.to_json()).collect();
        serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string())
    }

    /// 分发执行：未注册 -> UnknownTool；校验失败 -> InvalidArguments（不调用执行器）；
    /// 执行器失败或超时 -> ToolExecutionResult{success:false}；每次调用输出 JSON 审计日志
    pub async fn execute(&self, name: &str, args: Value) -> Result<ToolExecutionResult, AgentError> {
        let tool = self
            .index
            .get(name)
            .map(|&i| self.tools[i].clone())
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;

        if let Err(fields) = tool.schema().validate(&args) {
            return Err(AgentError::InvalidArguments {
                tool: name.to_string(),
                fields,
            });
        }

        let start = Instant::now();
        let outcome = timeout(self.tool_timeout, tool.execute(args.clone())).await;

        let result = match outcome {
            Ok(Ok(output)) => ToolExecutionResult::ok(output),
            Ok(Err(e)) => ToolExecutionResult::failure(e),
            Err(_) => ToolExecutionResult::failure(format!(
                "tool '{}' timed out after {}s",
                name,
                self.tool_timeout.as_secs()
            )),
        };

        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": name,
            "ok": result.success,
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview(&args),
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        Ok(result)
    }
}

fn args_preview(args: &Value) -> String {
    let s = args.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

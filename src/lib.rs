//! Wasp - Rust 单智能体 ReAct 编排器
//!
//! 模块划分：
//! - **agent**: 单轮 ReAct 状态机（Reasoning -> Acting -> Responding -> Persisted）与决策解析
//! - **cli**: 行式交互循环（help / stats / tools / clear / quit）与单次查询模式
//! - **config**: 应用配置加载（TOML + 环境变量 + CLI 覆盖）
//! - **core**: 错误分级（启动期致命 / 轮内致命 / 轮内可恢复）
//! - **gateway**: LLM 网关抽象与实现（Ollama / Mock）
//! - **memory**: 对话轮记录与追加式记忆日志（JSON 文件 / 内存）
//! - **prompts**: 模板库（磁盘覆盖 + 内置默认，{{var}} 渲染）
//! - **tools**: 参数 schema、注册表分发与内置工具（time / face / echo）

pub mod agent;
pub mod cli;
pub mod config;
pub mod core;
pub mod gateway;
pub mod memory;
pub mod prompts;
pub mod tools;

pub use agent::{Agent, TurnOutcome};
pub use config::{load_config, AppConfig};
pub use core::AgentError;

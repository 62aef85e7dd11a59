//! Wasp - 单智能体 ReAct 编排器入口
//!
//! 初始化日志与配置（文件 < 环境变量 < CLI 标志），装配 Agent（网关、工具注册表、
//! 记忆日志、模板库），按 -q 与否进入单次查询或交互模式。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wasp::agent::Agent;
use wasp::cli;
use wasp::config::{load_config, AppConfig};
use wasp::core::AgentError;
use wasp::gateway::OllamaGateway;
use wasp::memory::FileMemory;
use wasp::prompts::PromptLibrary;
use wasp::tools::{GetCurrentTimeTool, RecognizeFaceTool, ToolRegistry};

#[derive(Parser)]
#[command(name = "wasp")]
#[command(author, version, about = "Wasp - AI assistant with tool support")]
struct Cli {
    /// Process a single query and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Gateway (Ollama-compatible) base URL
    #[arg(long)]
    gateway_url: Option<String>,

    /// Model name to use
    #[arg(long)]
    model: Option<String>,

    /// Memory file path
    #[arg(long)]
    memory_file: Option<PathBuf>,

    /// Extra config file (overrides config/default.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// CLI 标志覆盖配置（CLI 优先于环境变量与文件）
fn apply_cli_overrides(cfg: &mut AppConfig, args: &Cli) {
    if let Some(url) = &args.gateway_url {
        cfg.gateway.base_url = url.clone();
    }
    if let Some(model) = &args.model {
        cfg.gateway.model = model.clone();
    }
    if let Some(path) = &args.memory_file {
        cfg.memory.file = path.clone();
    }
}

/// 装配 Agent：注册工具（重名即启动失败）、加载记忆文件（损坏即启动失败）
fn build_agent(cfg: &AppConfig) -> Result<Agent, AgentError> {
    let mut registry = ToolRegistry::new(cfg.tools.tool_timeout_secs);
    registry.register(GetCurrentTimeTool)?;
    if !cfg.tools.face_api_url.is_empty() {
        registry.register(RecognizeFaceTool::new(
            cfg.tools.face_api_url.clone(),
            cfg.tools.face_timeout_secs,
        ))?;
    }

    let memory = FileMemory::load(&cfg.memory.file)?;

    let gateway = Arc::new(OllamaGateway::new(
        cfg.gateway.base_url.clone(),
        cfg.gateway.model.clone(),
        cfg.gateway.request_timeout_secs,
    ));

    let prompts = PromptLibrary::load("config/prompts");

    Ok(Agent::new(
        registry,
        Box::new(memory),
        gateway,
        prompts,
        cfg.memory.recent_turns,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with(fmt::layer())
        .init();

    let args = Cli::parse();

    let mut cfg = load_config(args.config.clone())
        .map_err(|e| AgentError::Config(e.to_string()))
        .context("Failed to load configuration")?;
    apply_cli_overrides(&mut cfg, &args);

    tracing::info!(
        gateway = %cfg.gateway.base_url,
        model = %cfg.gateway.model,
        memory = %cfg.memory.file.display(),
        "starting wasp"
    );

    let mut agent = build_agent(&cfg).context("Failed to initialize agent")?;

    match &args.query {
        Some(query) => cli::single_query(&mut agent, query)
            .await
            .context("Query failed")?,
        None => cli::interactive(&mut agent).await.context("App run failed")?,
    }

    Ok(())
}

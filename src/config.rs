//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `WASP__*` 覆盖（双下划线表示嵌套，
//! 如 `WASP__GATEWAY__MODEL=llama3.2:1b`）；CLI 标志最后在 main 中覆盖。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewaySection,
    pub memory: MemorySection,
    pub tools: ToolsSection,
}

/// [gateway] 段：端点、模型与请求超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewaySection {
    pub base_url: String,
    pub model: String,
    /// 单次网关调用的截止时间（秒）
    pub request_timeout_secs: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "llama3.2:1b".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// [memory] 段：记忆文件路径与拼入 prompt 的最近轮数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemorySection {
    pub file: PathBuf,
    pub recent_turns: usize,
}

impl Default for MemorySection {
    fn default() -> Self {
        Self {
            file: PathBuf::from("memory.json"),
            recent_turns: 10,
        }
    }
}

/// [tools] 段：工具超时与人脸识别端点
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    pub tool_timeout_secs: u64,
    /// 人脸识别服务端点；空串表示不注册该工具
    pub face_api_url: String,
    pub face_timeout_secs: u64,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: 30,
            face_api_url: std::env::var("FACE_API_URL").unwrap_or_default(),
            face_timeout_secs: 15,
        }
    }
}

/// 从 config 目录加载配置，环境变量 WASP__* 可覆盖
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("WASP")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

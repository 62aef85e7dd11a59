//! 记忆日志：追加 / 有界读取 / 清空
//!
//! MemoryLog 抽象出追加式对话日志，Agent 核心只依赖该 trait；
//! FileMemory 为单文件 JSON 实现（人类可读、整体重写），InMemoryLog 供测试使用。
//! 文件缺失或为空视为空历史；文件损坏是启动期致命错误，不做截断续用。

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::memory::ConversationTurn;

/// 记忆统计（stats 命令展示）
#[derive(Debug, Clone)]
pub struct MemoryStats {
    pub turn_count: usize,
    pub file: Option<PathBuf>,
    pub file_exists: bool,
    pub file_size_bytes: Option<u64>,
    pub created_at: DateTime<Local>,
    pub last_updated: DateTime<Local>,
}

/// 追加式对话日志
pub trait MemoryLog: Send {
    /// 追加一轮并落盘；已完成的 append 在进程崩溃后不得丢失
    fn append(&mut self, turn: ConversationTurn) -> Result<(), AgentError>;

    /// 按时间顺序返回最近 n 轮；n 超过总量时返回全部，不报错
    fn recent(&self, n: usize) -> Vec<ConversationTurn>;

    /// 清空全部历史
    fn clear(&mut self) -> Result<(), AgentError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stats(&self) -> MemoryStats;
}

/// 记忆文件元信息
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MemoryMetadata {
    created_at: DateTime<Local>,
    last_updated: DateTime<Local>,
}

impl Default for MemoryMetadata {
    fn default() -> Self {
        let now = Local::now();
        Self {
            created_at: now,
            last_updated: now,
        }
    }
}

/// 记忆文件顶层结构
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct MemoryFile {
    metadata: MemoryMetadata,
    conversations: Vec<ConversationTurn>,
}

/// 单文件 JSON 记忆：加载到内存，每次变更整体重写
#[derive(Debug)]
pub struct FileMemory {
    path: PathBuf,
    data: MemoryFile,
}

impl FileMemory {
    /// 加载记忆文件；不存在或为空文件时以空历史启动，损坏时返回 Config 错误
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(Self {
                path,
                data: MemoryFile::default(),
            });
        }
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| AgentError::Config(format!("cannot read memory file {}: {}", path.display(), e)))?;
        if raw.trim().is_empty() {
            return Ok(Self {
                path,
                data: MemoryFile::default(),
            });
        }
        let data: MemoryFile = serde_json::from_str(&raw).map_err(|e| {
            AgentError::Config(format!("malformed memory file {}: {}", path.display(), e))
        })?;
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 整体重写文件；父目录不存在时自动创建
    fn save(&mut self) -> Result<(), AgentError> {
        self.data.metadata.last_updated = Local::now();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AgentError::Memory(e.to_string()))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| AgentError::Memory(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| AgentError::Memory(e.to_string()))
    }
}

impl MemoryLog for FileMemory {
    fn append(&mut self, turn: ConversationTurn) -> Result<(), AgentError> {
        self.data.conversations.push(turn);
        if let Err(e) = self.save() {
            // 落盘失败时撤回，保持内存视图与磁盘一致
            self.data.conversations.pop();
            return Err(e);
        }
        Ok(())
    }

    fn recent(&self, n: usize) -> Vec<ConversationTurn> {
        let conversations = &self.data.conversations;
        let start = conversations.len().saturating_sub(n);
        conversations[start..].to_vec()
    }

    fn clear(&mut self) -> Result<(), AgentError> {
        self.data.conversations.clear();
        self.save()
    }

    fn len(&self) -> usize {
        self.data.conversations.len()
    }

    fn stats(&self) -> MemoryStats {
        let file_size_bytes = std::fs::metadata(&self.path).map(|m| m.len()).ok();
        MemoryStats {
            turn_count: self.data.conversations.len(),
            file: Some(self.path.clone()),
            file_exists: self.path.exists(),
            file_size_bytes,
            created_at: self.data.metadata.created_at,
            last_updated: self.data.metadata.last_updated,
        }
    }
}

/// 纯内存日志（测试与一次性会话）
#[derive(Debug, Default)]
pub struct InMemoryLog {
    metadata: MemoryMetadata,
    turns: Vec<ConversationTurn>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryLog for InMemoryLog {
    fn append(&mut self, turn: ConversationTurn) -> Result<(), AgentError> {
        self.turns.push(turn);
        self.metadata.last_updated = Local::now();
        Ok(())
    }

    fn recent(&self, n: usize) -> Vec<ConversationTurn> {
        let start = self.turns.len().saturating_sub(n);
        self.turns[start..].to_vec()
    }

    fn clear(&mut self) -> Result<(), AgentError> {
        self.turns.clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.turns.len()
    }

    fn stats(&self) -> MemoryStats {
        MemoryStats {
            turn_count: self.turns.len(),
            file: None,
            file_exists: false,
            file_size_bytes: None,
            created_at: self.metadata.created_at,
            last_updated: self.metadata.last_updated,
        }
    }
}

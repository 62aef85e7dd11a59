//! 记忆层：对话轮记录与追加式日志（文件 / 内存）

pub mod store;
pub mod turn;

pub use store::{FileMemory, InMemoryLog, MemoryLog, MemoryStats};
pub use turn::{ConversationTurn, ToolResultRecord};

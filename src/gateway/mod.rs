//! 网关层：LLM 请求/响应通道的抽象与实现（Ollama / Mock）

pub mod mock;
pub mod ollama;
pub mod traits;

pub use mock::{MockGateway, MockReply};
pub use ollama::OllamaGateway;
pub use traits::{ChatMessage, ChatRole, Gateway};

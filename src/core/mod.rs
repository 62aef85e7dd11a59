//! 核心层：错误分级

pub mod error;

pub use error::AgentError;

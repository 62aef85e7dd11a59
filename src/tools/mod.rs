//! 工具层：参数 schema、注册表分发与内置工具（time / face / echo）

pub mod echo;
pub mod face;
pub mod registry;
pub mod schema;
pub mod time;

pub use echo::EchoTool;
pub use face::RecognizeFaceTool;
pub use registry::{Tool, ToolDescriptor, ToolExecutionResult, ToolRegistry};
pub use schema::{ParamKind, ParamSpec, ToolSchema};
pub use time::GetCurrentTimeTool;

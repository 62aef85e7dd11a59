//! ReAct 循环端到端场景测试
//!
//! 用 MockGateway 脚本化两次网关调用（tool-selection / response-generation），
//! 覆盖：工具轮、无工具轮、幻觉工具回退、网关超时下的轮原子性、clear 语义。

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use wasp::agent::Agent;
use wasp::core::AgentError;
use wasp::gateway::{MockGateway, MockReply};
use wasp::memory::{FileMemory, InMemoryLog, MemoryLog};
use wasp::prompts::PromptLibrary;
use wasp::tools::{GetCurrentTimeTool, ToolRegistry};

fn registry() -> ToolRegistry {
    let mut reg = ToolRegistry::new(5);
    reg.register(GetCurrentTimeTool).unwrap();
    reg
}

fn agent(gateway: Arc<MockGateway>, memory: Box<dyn MemoryLog>) -> Agent {
    Agent::new(registry(), memory, gateway, PromptLibrary::builtin(), 10)
}

/// 场景 A：时间工具轮——选中 get_current_time、工具结果进入回复 prompt、记忆 +1
#[tokio::test]
async fn time_tool_turn_persists_one_record() {
    let gateway = Arc::new(
        MockGateway::new()
            .reply(r#"{"tool": "get_current_time", "args": {}}"#)
            .reply("The current time was included above."),
    );
    let mut agent = agent(Arc::clone(&gateway), Box::new(InMemoryLog::new()));

    let outcome = agent
        .process("what time is it", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.tool_used.as_deref(), Some("get_current_time"));
    let result = outcome.tool_result.unwrap();
    assert!(result.success);
    // 工具产出 readable 时间串 YYYY-MM-DD HH:MM:SS
    assert_eq!(result.output.len(), 19);

    // 第二次网关调用（response-generation）的 prompt 中含工具输出
    let prompts = gateway.received_prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains(&result.output));

    assert_eq!(agent.memory_stats().turn_count, 1);
}

/// 场景 B：无工具轮——决策为空 tool，仍产出回复，轮记录不含工具字段
#[tokio::test]
async fn plain_turn_records_no_tool_fields() {
    let gateway = Arc::new(
        MockGateway::new()
            .reply(r#"{"tool": "", "args": {}}"#)
            .reply("Hello! How can I help?"),
    );
    let memory = Box::new(InMemoryLog::new());
    let mut agent = agent(gateway, memory);

    let outcome = agent
        .process("hello", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.response, "Hello! How can I help?");
    assert!(outcome.tool_used.is_none());
    assert!(outcome.tool_result.is_none());
    assert_eq!(agent.memory_stats().turn_count, 1);
}

/// 场景 C：模型点名未注册工具——回退 no_tool，轮完成且不含工具字段
#[tokio::test]
async fn hallucinated_tool_falls_back_to_no_tool() {
    let gateway = Arc::new(
        MockGateway::new()
            .reply(r#"{"tool": "get_weather", "args": {"city": "Taipei"}}"#)
            .reply("I cannot check the weather, but I can chat!"),
    );
    let mut agent = agent(gateway, Box::new(InMemoryLog::new()));

    let outcome = agent
        .process("what's the weather", &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.tool_used.is_none());
    assert_eq!(agent.memory_stats().turn_count, 1);
}

/// 决策解析失败（纯文本输出）同样回退 no_tool，轮正常完成
#[tokio::test]
async fn unparseable_decision_falls_back_to_no_tool() {
    let gateway = Arc::new(
        MockGateway::new()
            .reply("I don't think any tool is needed for this one.")
            .reply("Sure, happy to help."),
    );
    let mut agent = agent(gateway, Box::new(InMemoryLog::new()));

    let outcome = agent
        .process("tell me a joke", &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.tool_used.is_none());
    assert_eq!(agent.memory_stats().turn_count, 1);
}

/// 场景 D：Responding 阶段网关超时——本轮不持久化，recent 无新条目
#[tokio::test]
async fn gateway_timeout_in_responding_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.json");
    let gateway = Arc::new(
        MockGateway::new()
            .reply(r#"{"tool": "get_current_time", "args": {}}"#)
            .fail_with(MockReply::Timeout(30)),
    );
    let memory = Box::new(FileMemory::load(&path).unwrap());
    let mut agent = agent(gateway, memory);

    let err = agent
        .process("what time is it", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::GatewayTimeout(30)));
    assert_eq!(agent.memory_stats().turn_count, 0);

    // 重新加载文件确认磁盘上同样没有新条目
    let reloaded = FileMemory::load(&path).unwrap();
    assert!(reloaded.recent(10).is_empty());
}

/// Reasoning 阶段网关不可用——同样对本轮致命且不落盘，会话层可继续下一轮
#[tokio::test]
async fn gateway_unavailable_in_reasoning_aborts_turn() {
    let gateway = Arc::new(
        MockGateway::new()
            .fail_with(MockReply::Unavailable("connection refused".into()))
            .reply(r#"{"tool": "", "args": {}}"#)
            .reply("Recovered on the next turn."),
    );
    let mut agent = agent(gateway, Box::new(InMemoryLog::new()));
    let cancel = CancellationToken::new();

    let err = agent.process("first", &cancel).await.unwrap_err();
    assert!(matches!(err, AgentError::GatewayUnavailable(_)));
    assert_eq!(agent.memory_stats().turn_count, 0);

    // 下一轮正常
    let outcome = agent.process("second", &cancel).await.unwrap();
    assert_eq!(outcome.response, "Recovered on the next turn.");
    assert_eq!(agent.memory_stats().turn_count, 1);
}

/// 场景 E：clear 之后 recent 为空，与先前历史量无关
#[tokio::test]
async fn clear_empties_history() {
    let gateway = Arc::new(
        MockGateway::new()
            .reply(r#"{"tool": "", "args": {}}"#)
            .reply("first answer")
            .reply(r#"{"tool": "", "args": {}}"#)
            .reply("second answer"),
    );
    let mut agent = agent(gateway, Box::new(InMemoryLog::new()));
    let cancel = CancellationToken::new();

    agent.process("one", &cancel).await.unwrap();
    agent.process("two", &cancel).await.unwrap();
    assert_eq!(agent.memory_stats().turn_count, 2);

    agent.clear_memory().unwrap();
    assert_eq!(agent.memory_stats().turn_count, 0);
}

/// 工具参数校验失败被折叠为失败文本交给 Responding，而非中止本轮
#[tokio::test]
async fn invalid_arguments_reported_as_tool_failure() {
    let gateway = Arc::new(
        MockGateway::new()
            // format 应为 string，这里给了数字
            .reply(r#"{"tool": "get_current_time", "args": {"format": 42}}"#)
            .reply("Sorry, the time lookup failed."),
    );
    let mut agent = agent(Arc::clone(&gateway), Box::new(InMemoryLog::new()));

    let outcome = agent
        .process("what time is it", &CancellationToken::new())
        .await
        .unwrap();

    let result = outcome.tool_result.unwrap();
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("format"));

    // 失败文本进入 response-generation prompt
    let prompts = gateway.received_prompts();
    assert!(prompts[1].contains("FAILED"));
    assert_eq!(agent.memory_stats().turn_count, 1);
}

/// 历史窗口：后一轮的 tool-selection prompt 含前一轮的问答
#[tokio::test]
async fn history_window_feeds_next_turn() {
    let gateway = Arc::new(
        MockGateway::new()
            .reply(r#"{"tool": "", "args": {}}"#)
            .reply("My name is Wasp.")
            .reply(r#"{"tool": "", "args": {}}"#)
            .reply("You just asked my name."),
    );
    let mut agent = agent(Arc::clone(&gateway), Box::new(InMemoryLog::new()));
    let cancel = CancellationToken::new();

    agent.process("what is your name", &cancel).await.unwrap();
    agent.process("what did I just ask", &cancel).await.unwrap();

    let prompts = gateway.received_prompts();
    // 第二轮的 tool-selection prompt（第 3 次调用）包含第一轮历史
    assert!(prompts[2].contains("what is your name"));
    assert!(prompts[2].contains("My name is Wasp."));
}

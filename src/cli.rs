//! 行式交互界面
//!
//! 读取 stdin 行：内建命令 help / stats / tools / clear / quit(exit, bye)，
//! 其余输入作为用户轮交给 Agent；轮执行期间 Ctrl-C 取消当前轮（不落盘）而非退出进程。
//! 单次查询模式跑一轮后返回，错误上浮给 main 决定退出码。

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::agent::Agent;
use crate::core::AgentError;

/// 启动横幅
pub fn print_banner() {
    println!("{}", "=".repeat(60));
    println!("Wasp - AI Assistant with Tool Support");
    println!("{}", "=".repeat(60));
    println!("Type 'quit', 'exit', or 'bye' to exit");
    println!("Type 'help' for available commands");
    println!("Type 'stats' to see memory statistics");
    println!("Type 'clear' to clear memory");
    println!("Type 'tools' to see available tools");
    println!("{}", "-".repeat(60));
}

fn print_help() {
    println!("\nAvailable Commands:");
    println!("  help    - Show this help message");
    println!("  stats   - Show memory statistics");
    println!("  clear   - Clear all conversation memory");
    println!("  tools   - Show available tools");
    println!("  quit / exit / bye - Exit");
    println!("\nTips:");
    println!("  - Ask about the current time to test the time tool");
    println!("  - The agent remembers your conversation history\n");
}

fn print_stats(agent: &Agent) {
    let stats = agent.memory_stats();
    println!("\nAgent Statistics:");
    println!("  Conversations: {}", stats.turn_count);
    if let Some(file) = &stats.file {
        println!("  Memory file: {}", file.display());
        println!("  File exists: {}", stats.file_exists);
        if let Some(size) = stats.file_size_bytes {
            println!("  File size: {} bytes", size);
        }
    }
    println!("  Created: {}", stats.created_at.to_rfc3339());
    println!("  Last updated: {}\n", stats.last_updated.to_rfc3339());
}

fn print_tools(agent: &Agent) {
    let descriptors = agent.tool_descriptors();
    println!("\nAvailable Tools ({}):", descriptors.len());
    for d in descriptors {
        println!("  - {}: {}", d.name, d.description);
    }
    println!();
}

/// 内建命令处理结果
enum CommandOutcome {
    Handled,
    Quit,
    NotACommand,
}

fn handle_command(line: &str, agent: &mut Agent) -> CommandOutcome {
    match line.to_lowercase().as_str() {
        "help" => {
            print_help();
            CommandOutcome::Handled
        }
        "stats" => {
            print_stats(agent);
            CommandOutcome::Handled
        }
        "tools" => {
            print_tools(agent);
            CommandOutcome::Handled
        }
        "clear" => {
            match agent.clear_memory() {
                Ok(()) => println!("Memory cleared successfully!\n"),
                Err(e) => println!("Failed to clear memory: {}\n", e),
            }
            CommandOutcome::Handled
        }
        "quit" | "exit" | "bye" => CommandOutcome::Quit,
        _ => CommandOutcome::NotACommand,
    }
}

/// 跑一个用户轮并打印结果；轮内致命错误只打印、不退出
async fn run_turn(agent: &mut Agent, input: &str) {
    let cancel = CancellationToken::new();
    println!("\nThinking...");
    tokio::select! {
        result = agent.process(input, &cancel) => match result {
            Ok(outcome) => {
                println!("\nAgent: {}", outcome.response);
                if let Some(tool) = &outcome.tool_used {
                    println!("\nTools used: {}", tool);
                }
            }
            Err(e) => println!("\nError: {}", e),
        },
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            println!("\nTurn cancelled.");
        }
    }
}

/// 交互模式主循环
pub async fn interactive(agent: &mut Agent) -> anyhow::Result<()> {
    print_banner();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break, // EOF
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match handle_command(input, agent) {
            CommandOutcome::Quit => {
                println!("\nGoodbye!");
                break;
            }
            CommandOutcome::Handled => continue,
            CommandOutcome::NotACommand => run_turn(agent, input).await,
        }
    }

    Ok(())
}

/// 单次查询模式：跑一轮并打印；错误上浮（main 以非零码退出）
pub async fn single_query(agent: &mut Agent, query: &str) -> Result<(), AgentError> {
    println!("Query: {}", query);
    println!("Processing...");

    let outcome = agent.process(query, &CancellationToken::new()).await?;

    println!("Response: {}", outcome.response);
    if let Some(tool) = &outcome.tool_used {
        println!("Tools used: {}", tool);
    }
    Ok(())
}

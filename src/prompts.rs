//! Prompt 模板库
//!
//! 每个模板可被 config/prompts/<name>.txt 覆盖，否则用内置默认文案；
//! render 做 {{var}} 占位替换。文案是调优参数，固定的是各模板的变量约定：
//! - tool_selection: user_input / available_tools / decision_schema / history
//! - response_generation: user_input / tool_results / history
//! - system: 无变量

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// system 模板默认文案
const DEFAULT_SYSTEM: &str = "You are a helpful AI assistant with access to external tools. \
Answer concisely and incorporate tool results when they are provided.";

/// tool_selection 模板默认文案：要求模型输出决策 JSON
const DEFAULT_TOOL_SELECTION: &str = r#"You decide whether a tool is needed to answer the user.

Available tools:
{{available_tools}}

Recent conversation:
{{history}}

User input: {{user_input}}

Respond with a single JSON object matching this schema:
{{decision_schema}}

If a tool is needed, set "tool" to its name and "args" to its arguments.
If no tool is needed, set "tool" to the empty string "". Output only the JSON object."#;

/// response_generation 模板默认文案
const DEFAULT_RESPONSE_GENERATION: &str = r#"Recent conversation:
{{history}}

Tool results for this turn:
{{tool_results}}

User input: {{user_input}}

Write the final answer for the user. If tool results are present, base the answer on them.
If a tool failed, acknowledge it briefly and answer as best you can."#;

/// 模板库：名称 -> 文案
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    templates: HashMap<String, String>,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        let mut templates = HashMap::new();
        templates.insert("system".to_string(), DEFAULT_SYSTEM.to_string());
        templates.insert(
            "tool_selection".to_string(),
            DEFAULT_TOOL_SELECTION.to_string(),
        );
        templates.insert(
            "response_generation".to_string(),
            DEFAULT_RESPONSE_GENERATION.to_string(),
        );
        Self { templates }
    }
}

impl PromptLibrary {
    /// 内置默认模板
    pub fn builtin() -> Self {
        Self::default()
    }

    /// 从目录加载覆盖文件（<name>.txt），缺失的模板保留内置默认
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let mut lib = Self::default();
        let dir = dir.as_ref();
        let names: Vec<String> = lib.templates.keys().cloned().collect();
        for name in names {
            let path: PathBuf = dir.join(format!("{}.txt", name));
            if let Ok(text) = std::fs::read_to_string(&path) {
                if !text.trim().is_empty() {
                    tracing::debug!(template = %name, path = %path.display(), "prompt override loaded");
                    lib.templates.insert(name, text);
                }
            }
        }
        lib
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// 渲染模板：以 {{var}} 形式替换绑定变量；未知模板名返回 None
    pub fn render(&self, name: &str, vars: &[(&str, &str)]) -> Option<String> {
        let template = self.templates.get(name)?;
        let mut out = template.clone();
        for (key, value) in vars {
            out = out.replace(&format!("{{{{{}}}}}", key), value);
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_vars() {
        let lib = PromptLibrary::builtin();
        let out = lib
            .render(
                "response_generation",
                &[
                    ("user_input", "hello"),
                    ("tool_results", "(none)"),
                    ("history", "(empty)"),
                ],
            )
            .unwrap();
        assert!(out.contains("User input: hello"));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn test_unknown_template_is_none() {
        assert!(PromptLibrary::builtin().render("nope", &[]).is_none());
    }

    #[test]
    fn test_disk_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("system.txt"), "custom persona").unwrap();
        let lib = PromptLibrary::load(dir.path());
        assert_eq!(lib.get("system"), Some("custom persona"));
        // 未覆盖的模板保留默认
        assert!(lib.get("tool_selection").unwrap().contains("{{user_input}}"));
    }
}

//! 当前时间工具
//!
//! 回答「现在几点」类问题：支持 iso / readable / timestamp / date_only / time_only 五种格式，
//! timezone 为 "UTC" 时用 UTC，否则用本地时区。

use async_trait::async_trait;
use chrono::{Local, Utc};
use serde_json::Value;

use crate::tools::{ParamKind, Tool, ToolSchema};

/// 获取当前日期时间的工具
#[derive(Debug, Default)]
pub struct GetCurrentTimeTool;

fn format_now(format: &str, utc: bool) -> String {
    macro_rules! fmt {
        ($now:expr) => {
            match format {
                "iso" => $now.to_rfc3339(),
                "timestamp" => $now.timestamp().to_string(),
                "date_only" => $now.format("%Y-%m-%d").to_string(),
                "time_only" => $now.format("%H:%M:%S").to_string(),
                // readable（默认）
                _ => $now.format("%Y-%m-%d %H:%M:%S").to_string(),
            }
        };
    }
    if utc {
        fmt!(Utc::now())
    } else {
        fmt!(Local::now())
    }
}

#[async_trait]
impl Tool for GetCurrentTimeTool {
    fn name(&self) -> &str {
        "get_current_time"
    }

    fn description(&self) -> &str {
        "Get the current date and time. Use this when the user asks about the current \
         time, date, or needs timestamp information."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::empty()
            .param(
                "format",
                ParamKind::String,
                "Output format: iso, readable, timestamp, date_only or time_only (default: readable)",
            )
            .param(
                "timezone",
                ParamKind::String,
                "Timezone for the output: 'UTC' or 'local' (default: local)",
            )
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let format = args
            .get("format")
            .and_then(|v| v.as_str())
            .unwrap_or("readable");
        let utc = args
            .get("timezone")
            .and_then(|v| v.as_str())
            .map(|tz| tz.eq_ignore_ascii_case("utc"))
            .unwrap_or(false);
        Ok(format_now(format, utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_default_format_is_readable() {
        let out = GetCurrentTimeTool.execute(json!({})).await.unwrap();
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(out.len(), 19);
        assert_eq!(&out[4..5], "-");
        assert_eq!(&out[10..11], " ");
    }

    #[tokio::test]
    async fn test_timestamp_format_is_numeric() {
        let out = GetCurrentTimeTool
            .execute(json!({"format": "timestamp"}))
            .await
            .unwrap();
        assert!(out.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn test_date_only() {
        let out = GetCurrentTimeTool
            .execute(json!({"format": "date_only", "timezone": "UTC"}))
            .await
            .unwrap();
        assert_eq!(out.len(), 10);
    }
}

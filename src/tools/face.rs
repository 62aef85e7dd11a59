//! 人脸识别工具
//!
//! 将本地图片以 multipart 上传到人脸识别服务，把 {num, names} 响应转为自然语言摘要。
//! 端点由配置或环境变量 FACE_API_URL 指定。

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::tools::{ParamKind, Tool, ToolSchema};

/// 人脸识别服务的响应体
#[derive(Debug, Deserialize)]
struct FaceResponse {
    num: usize,
    #[serde(default)]
    names: Vec<String>,
}

/// 人脸识别工具：上传图片，返回人数与姓名摘要
pub struct RecognizeFaceTool {
    client: Client,
    api_url: String,
}

impl RecognizeFaceTool {
    pub fn new(api_url: impl Into<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    fn summarize(response: &FaceResponse) -> String {
        match response.num {
            0 => "There is no person in the picture.".to_string(),
            1 => format!(
                "There is one person in the picture, his/her name is {}.",
                response.names.first().map(String::as_str).unwrap_or("unknown")
            ),
            n => format!(
                "There are {} people in the picture, their names are {}.",
                n,
                response.names.join(", ")
            ),
        }
    }
}

#[async_trait]
impl Tool for RecognizeFaceTool {
    fn name(&self) -> &str {
        "recognize_face"
    }

    fn description(&self) -> &str {
        "Upload an image to the face-recognition endpoint and report how many people \
         are present and their names if recognized."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::empty().required_param(
            "file_path",
            ParamKind::String,
            "Absolute or relative path to the image file to analyze",
        )
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let file_path = args
            .get("file_path")
            .and_then(|v| v.as_str())
            .ok_or("missing file_path")?;

        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|e| format!("cannot read image {}: {}", file_path, e))?;
        let file_name = std::path::Path::new(file_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(&self.api_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("face api request failed: {}", e))?;

        let parsed: FaceResponse = response
            .json()
            .await
            .map_err(|e| format!("face api returned malformed response: {}", e))?;

        Ok(Self::summarize(&parsed))
    }
}

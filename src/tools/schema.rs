//! 工具参数 Schema
//!
//! 以类型化结构描述工具参数（名称 / 类型 / 是否必填），注册时声明、调用前校验；
//! to_json 产出对象式 JSON Schema，直接拼入 tool-selection prompt 供 LLM 生成正确参数。

use serde_json::{json, Map, Value};

/// 参数类型（与 JSON Schema 的 type 对应）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParamKind {
    fn type_name(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Object => "object",
            ParamKind::Array => "array",
        }
    }

    /// JSON 值是否与该类型兼容（integer 也是合法的 number）
    fn matches(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Number => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::Object => value.is_object(),
            ParamKind::Array => value.is_array(),
        }
    }
}

/// 单个参数声明
#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
}

/// 工具参数 Schema：参数列表按声明顺序保留
#[derive(Clone, Debug, Default)]
pub struct ToolSchema {
    params: Vec<ParamSpec>,
}

impl ToolSchema {
    /// 无参数工具
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn param(
        mut self,
        name: impl Into<String>,
        kind: ParamKind,
        description: impl Into<String>,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
        });
        self
    }

    pub fn required_param(
        mut self,
        name: impl Into<String>,
        kind: ParamKind,
        description: impl Into<String>,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
        });
        self
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// 对象式 JSON Schema（type / properties / required），可直接嵌入 prompt
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.params {
            properties.insert(
                p.name.clone(),
                json!({
                    "type": p.kind.type_name(),
                    "description": p.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// 校验参数：检查必填项存在与类型兼容，返回违规字段列表
    ///
    /// args 为 null 且无必填项时视为合法（等价空对象）；未声明的多余字段不视为错误。
    pub fn validate(&self, args: &Value) -> Result<(), Vec<String>> {
        let empty = Map::new();
        let object = match args {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(vec!["(arguments must be a JSON object)".to_string()]),
        };

        let mut offending = Vec::new();
        for p in &self.params {
            match object.get(&p.name) {
                Some(value) => {
                    if !p.kind.matches(value) {
                        offending.push(format!(
                            "{} (expected {}, got {})",
                            p.name,
                            p.kind.type_name(),
                            json_type_name(value)
                        ));
                    }
                }
                None if p.required => offending.push(format!("{} (missing)", p.name)),
                None => {}
            }
        }

        if offending.is_empty() {
            Ok(())
        } else {
            Err(offending)
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

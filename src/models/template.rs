use super::id::deserialize_id;
use serde::{Deserialize, Serialize};

/// 检查类型（如"血常规"）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamType {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
}

/// 模板中的一个参数定义，目录数据只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub parameter_name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_reference_range: Option<String>,
}

impl ParameterDefinition {
    pub fn new(parameter_name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            parameter_name: parameter_name.into(),
            unit: unit.into(),
            default_value: None,
            default_reference_range: None,
        }
    }

    pub fn with_defaults(
        mut self,
        value: Option<&str>,
        reference_range: Option<&str>,
    ) -> Self {
        self.default_value = value.map(str::to_string);
        self.default_reference_range = reference_range.map(str::to_string);
        self
    }
}

/// 模板摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(deserialize_with = "deserialize_id")]
    pub template_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_id")]
    pub exam_type_id: String,
}

/// 模板详情：有序的参数定义列表（顺序只影响展示）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDetail {
    #[serde(deserialize_with = "deserialize_id")]
    pub template_id: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
}

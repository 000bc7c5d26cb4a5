use super::id::{deserialize_id, deserialize_optional_id};
use serde::{Deserialize, Serialize};

/// 一条检验结果记录
///
/// `result_id` 由存储端分配，持久化之前为 `None`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub result_id: Option<String>,
    #[serde(deserialize_with = "deserialize_id")]
    pub exam_id: String,
    pub parameter_name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub reference_range: String,
}

impl ResultRecord {
    /// 比较参数名时使用的键（忽略大小写，不去除空白）
    pub fn name_key(&self) -> String {
        name_key(&self.parameter_name)
    }
}

/// 写入存储端的结果内容（创建 / 更新共用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    pub parameter_name: String,
    pub value: String,
    pub unit: String,
    pub reference_range: String,
}

/// 参数名身份键：大小写不敏感、空白精确
pub fn name_key(parameter_name: &str) -> String {
    parameter_name.to_lowercase()
}

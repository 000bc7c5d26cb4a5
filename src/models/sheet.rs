use serde::{Deserialize, Serialize};

/// 结果单：一次对某个检查的批量录入请求（TOML 文件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSheet {
    pub exam_id: String,
    /// 直接指定模板
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// 未指定模板时，按检查类型名称取第一个模板
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<String>,
    #[serde(default)]
    pub values: Vec<SheetValue>,
    /// 需要删除的参数名
    #[serde(default)]
    pub delete: Vec<String>,
    /// 录入完成后是否标记检查完成
    #[serde(default)]
    pub complete: bool,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

/// 结果单中的一个参数值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetValue {
    pub parameter: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_range: Option<String>,
}

impl ResultSheet {
    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }

    /// 用于日志显示的名称
    pub fn display_name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(|p| std::path::Path::new(p).file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.exam_id.clone())
    }
}

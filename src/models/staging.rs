use serde::{Deserialize, Serialize};

/// 暂存会话模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StagingMode {
    /// 从模板新建结果
    Create,
    /// 批量编辑已有结果
    Edit,
}

impl std::fmt::Display for StagingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StagingMode::Create => write!(f, "新建"),
            StagingMode::Edit => write!(f, "编辑"),
        }
    }
}

/// 可编辑的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingField {
    Value,
    ReferenceRange,
}

/// 暂存中的一个参数
///
/// 编辑模式下总是带有 `result_id`，新建模式下总是没有。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingEntry {
    pub parameter_name: String,
    pub value: String,
    pub reference_range: String,
    /// 新建时取自参数定义，编辑时保持记录原值
    pub unit: String,
    pub result_id: Option<String>,
}

impl StagingEntry {
    pub fn mode(&self) -> StagingMode {
        match self.result_id {
            Some(_) => StagingMode::Edit,
            None => StagingMode::Create,
        }
    }
}

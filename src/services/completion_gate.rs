//! 完成检查门槛 - 业务能力层
//!
//! 检查只有在至少存在一条结果时才能从"进行中"变为"已完成"，且不可逆。

use crate::clients::ParameterStore;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 标记完成的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// 存储端已确认完成
    Completed,
    /// 没有任何结果，未发出请求
    NoResults,
    /// 存储端调用失败，检查仍为进行中
    Failed,
}

impl CompletionOutcome {
    pub fn is_ok(&self) -> bool {
        *self == CompletionOutcome::Completed
    }
}

/// 是否允许完成检查
pub fn can_complete(result_count: usize) -> bool {
    result_count > 0
}

/// 完成检查门槛
#[derive(Clone)]
pub struct CompletionGate {
    store: Arc<dyn ParameterStore>,
}

impl CompletionGate {
    pub fn new(store: Arc<dyn ParameterStore>) -> Self {
        Self { store }
    }

    /// 标记检查完成
    ///
    /// # 参数
    /// - `exam_id`: 检查ID
    /// - `result_count`: 当前已加载的结果数量
    pub async fn mark_completed(&self, exam_id: &str, result_count: usize) -> CompletionOutcome {
        if !can_complete(result_count) {
            warn!("[检查 {}] ⚠️ 没有任何结果，不能标记完成", exam_id);
            return CompletionOutcome::NoResults;
        }

        match self.store.mark_exam_completed(exam_id).await {
            Ok(()) => {
                info!("[检查 {}] ✅ 已标记完成 ({} 条结果)", exam_id, result_count);
                CompletionOutcome::Completed
            }
            Err(e) => {
                error!("[检查 {}] ❌ 标记完成失败: {}", exam_id, e);
                CompletionOutcome::Failed
            }
        }
    }
}

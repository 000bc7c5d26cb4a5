//! 批量提交协调 - 业务能力层
//!
//! 两种调度策略并存：
//! - 删除：先全部发出，再统一等待（并发，失败不会取消其他请求）
//! - 暂存提交：按暂存顺序逐个发出并等待，遇到失败立即停止
//!
//! 两者都不做补偿回滚，只返回汇总结果；存储端错误在这里被吞掉并记录日志。

use crate::clients::ParameterStore;
use crate::models::{ResultPayload, StagingEntry, StagingMode};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 批量操作结果
///
/// 对应 `{ ok, failedCount }`：`is_ok()` 与 `failed_count()`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// 全部成功
    Succeeded { count: usize },
    /// 部分或全部失败，不区分具体是哪些条目
    Failed { failed_count: usize },
    /// 没有任何条目，未发出请求
    EmptyInput,
    /// 条目与提交模式不一致，未发出请求
    ModeMismatch,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, BatchOutcome::Succeeded { .. })
    }

    pub fn failed_count(&self) -> Option<usize> {
        match self {
            BatchOutcome::Failed { failed_count } => Some(*failed_count),
            _ => None,
        }
    }

    /// 是否已向存储端发出过请求（调用方据此决定是否需要重新加载）
    pub fn dispatched(&self) -> bool {
        matches!(
            self,
            BatchOutcome::Succeeded { .. } | BatchOutcome::Failed { .. }
        )
    }
}

/// 批量提交协调器
#[derive(Clone)]
pub struct BatchCoordinator {
    store: Arc<dyn ParameterStore>,
}

impl BatchCoordinator {
    pub fn new(store: Arc<dyn ParameterStore>) -> Self {
        Self { store }
    }

    /// 并发删除选中的结果
    ///
    /// # 参数
    /// - `result_ids`: 选中的结果 ID
    ///
    /// # 返回
    /// 全部删除成功才返回 `Succeeded`；失败时只报告失败数量
    pub async fn delete_selected(&self, result_ids: &[String]) -> BatchOutcome {
        if result_ids.is_empty() {
            warn!("⚠️ 没有选中任何结果，跳过删除");
            return BatchOutcome::EmptyInput;
        }

        info!("🗑️ 并发删除 {} 条结果...", result_ids.len());

        let calls = result_ids
            .iter()
            .map(|result_id| async move { (result_id, self.store.delete_result(result_id).await) });

        let mut failed_count = 0;
        for (result_id, result) in join_all(calls).await {
            if let Err(e) = result {
                error!("删除结果 {} 失败: {}", result_id, e);
                failed_count += 1;
            }
        }

        if failed_count == 0 {
            info!("✓ 删除完成: {} 条", result_ids.len());
            BatchOutcome::Succeeded {
                count: result_ids.len(),
            }
        } else {
            warn!("❌ 删除失败: {}/{}", failed_count, result_ids.len());
            BatchOutcome::Failed { failed_count }
        }
    }

    /// 按暂存顺序逐个提交
    ///
    /// # 参数
    /// - `exam_id`: 检查ID（新建模式使用）
    /// - `entries`: 暂存条目
    /// - `mode`: 新建或编辑
    ///
    /// # 返回
    /// 第一个失败后不再发出后续请求，已提交的条目保持已提交
    pub async fn commit_staged_entries(
        &self,
        exam_id: &str,
        entries: &[StagingEntry],
        mode: StagingMode,
    ) -> BatchOutcome {
        if entries.is_empty() {
            warn!("[检查 {}] ⚠️ 暂存区为空，跳过提交", exam_id);
            return BatchOutcome::EmptyInput;
        }

        if let Some(entry) = entries.iter().find(|entry| entry.mode() != mode) {
            error!(
                "[检查 {}] 条目 {} 与提交模式 ({}) 不一致，拒绝提交",
                exam_id, entry.parameter_name, mode
            );
            return BatchOutcome::ModeMismatch;
        }

        info!(
            "[检查 {}] 📝 按顺序提交 {} 条结果 (模式: {})",
            exam_id,
            entries.len(),
            mode
        );

        for (index, entry) in entries.iter().enumerate() {
            let payload = ResultPayload {
                parameter_name: entry.parameter_name.clone(),
                value: entry.value.clone(),
                unit: entry.unit.clone(),
                reference_range: entry.reference_range.clone(),
            };

            let result = match (&entry.result_id, mode) {
                (Some(result_id), StagingMode::Edit) => {
                    self.store.update_result(result_id, &payload).await.map(|_| ())
                }
                _ => self.store.create_result(exam_id, &payload).await.map(|_| ()),
            };

            match result {
                Ok(()) => debug!(
                    "[检查 {}] ✓ {}/{} {}",
                    exam_id,
                    index + 1,
                    entries.len(),
                    entry.parameter_name
                ),
                Err(e) => {
                    let failed_count = entries.len() - index;
                    error!(
                        "[检查 {}] ❌ 提交 {} 失败: {} (剩余 {} 条未提交)",
                        exam_id, entry.parameter_name, e, failed_count
                    );
                    return BatchOutcome::Failed { failed_count };
                }
            }
        }

        info!("[检查 {}] ✓ 提交完成: {} 条", exam_id, entries.len());
        BatchOutcome::Succeeded {
            count: entries.len(),
        }
    }
}

//! 单个结果单处理器 - 编排层
//!
//! ## 职责
//!
//! 把一张结果单应用到一个检查上，是检查级别的编排器。
//!
//! ## 处理顺序
//!
//! 1. **删除**：按参数名选中并并发删除
//! 2. **新建**：应用模板（对账跳过已有参数），填入结果单中的值后提交
//! 3. **编辑**：结果单中剩余的、已存在的参数进入编辑会话后提交
//! 4. **完成**：按需标记检查完成
//! 5. **文件清理**：按配置删除已处理的 TOML 文件

use crate::clients::{ParameterStore, TemplateCatalog};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{name_key, ResultSheet, SheetValue, StagingField};
use crate::services::BatchOutcome;
use crate::utils::logging::truncate_text;
use crate::workflow::{BatchReport, ExamSession, TemplateApplication};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 结果单处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SheetStats {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// 模板中因已存在而跳过的参数
    pub skipped: usize,
    /// 结果单中既不在模板也不在已有结果里的参数
    pub unmatched: usize,
    /// 失败的批量操作数
    pub failed_batches: usize,
    pub completed: bool,
}

impl SheetStats {
    /// 本结果单是否完全处理成功
    pub fn is_success(&self, sheet: &ResultSheet) -> bool {
        self.failed_batches == 0 && (!sheet.complete || self.completed)
    }
}

/// 处理单个结果单
///
/// # 参数
/// - `store`: 结果存储客户端
/// - `catalog`: 模板目录客户端
/// - `sheet`: 结果单
/// - `sheet_index`: 结果单序号（用于日志）
/// - `config`: 配置
///
/// # 返回
/// 返回统计信息；任一批量操作失败或要求完成但未完成时，`failed_batches > 0` 或 `completed == false`
pub async fn process_sheet(
    store: Arc<dyn ParameterStore>,
    catalog: Arc<dyn TemplateCatalog>,
    sheet: &ResultSheet,
    sheet_index: usize,
    config: &Config,
) -> Result<SheetStats> {
    log_sheet_start(sheet_index, sheet);

    let mut session = ExamSession::open(store, catalog, sheet.exam_id.clone())
        .await
        .with_context(|| format!("无法加载检查 {} 的结果", sheet.exam_id))?;

    let mut stats = SheetStats::default();

    // ========== 删除 ==========
    if !sheet.delete.is_empty() {
        let selected = session.select_by_names(sheet.delete.as_slice());
        if selected < sheet.delete.len() {
            warn!(
                "[结果单 {}] ⚠️ 要删除的 {} 个参数中只找到 {} 个",
                sheet_index,
                sheet.delete.len(),
                selected
            );
        }
        let report = session.delete_selected().await?;
        match report.outcome {
            BatchOutcome::Succeeded { count } => stats.deleted += count,
            BatchOutcome::EmptyInput => {}
            other => {
                error!("[结果单 {}] 删除失败: {:?}", sheet_index, other);
                stats.failed_batches += 1;
            }
        }
        recover_after_batch(&mut session, &report, sheet_index).await?;
    }

    // ========== 从模板新建 ==========
    let mut applied: HashSet<String> = HashSet::new();

    let application = match (&sheet.template_id, &sheet.exam_type) {
        (Some(template_id), _) => Some(session.apply_template(template_id).await?),
        (None, Some(exam_type)) => Some(session.apply_template_for_exam_type(exam_type).await?),
        (None, None) => None,
    };

    match application {
        Some(TemplateApplication::Staged { staged, skipped }) => {
            stats.skipped += skipped;
            info!(
                "[结果单 {}] 📋 模板暂存 {} 个参数，跳过 {} 个",
                sheet_index, staged, skipped
            );

            for value in &sheet.values {
                if session.ledger().get(&value.parameter).is_some() {
                    fill_entry(&mut session, value)?;
                    applied.insert(name_key(&value.parameter));
                }
            }

            let report = session.commit().await?;
            match report.outcome {
                BatchOutcome::Succeeded { count } => stats.created += count,
                other => {
                    error!("[结果单 {}] 新建提交失败: {:?}", sheet_index, other);
                    stats.failed_batches += 1;
                    // 部分条目可能已提交，重新加载以获得真实状态
                    session
                        .reload()
                        .await
                        .with_context(|| format!("无法重新加载检查 {} 的结果", sheet.exam_id))?;
                }
            }
            recover_after_batch(&mut session, &report, sheet_index).await?;
        }
        Some(TemplateApplication::FullyRedundant { skipped }) => {
            stats.skipped += skipped;
            info!(
                "[结果单 {}] 模板参数全部已存在，只更新结果单中的值",
                sheet_index
            );
        }
        Some(TemplateApplication::EmptyTemplate) => {
            warn!("[结果单 {}] ⚠️ 模板没有任何参数", sheet_index);
        }
        None => {}
    }

    // ========== 编辑已有结果 ==========
    let remaining: Vec<&SheetValue> = sheet
        .values
        .iter()
        .filter(|value| !applied.contains(&name_key(&value.parameter)))
        .collect();

    if !remaining.is_empty() {
        let existing: HashSet<String> = session
            .results()
            .iter()
            .map(|record| record.name_key())
            .collect();
        stats.unmatched += remaining
            .iter()
            .filter(|value| !existing.contains(&name_key(&value.parameter)))
            .count();

        session.clear_selection();
        let names: Vec<&str> = remaining.iter().map(|v| v.parameter.as_str()).collect();
        let selected = session.select_by_names(names.as_slice());

        if selected > 0 {
            session.edit_selection()?;
            for value in &remaining {
                fill_entry(&mut session, value)?;
            }

            let report = session.commit().await?;
            match report.outcome {
                BatchOutcome::Succeeded { count } => stats.updated += count,
                other => {
                    error!("[结果单 {}] 编辑提交失败: {:?}", sheet_index, other);
                    stats.failed_batches += 1;
                }
            }
            recover_after_batch(&mut session, &report, sheet_index).await?;
        }

        if stats.unmatched > 0 {
            warn!(
                "[结果单 {}] ⚠️ 有 {} 个参数既不在模板中也不在已有结果中",
                sheet_index, stats.unmatched
            );
        }
    }

    // ========== 完成检查 ==========
    if sheet.complete {
        if stats.failed_batches > 0 {
            warn!("[结果单 {}] ⚠️ 存在失败的提交，不标记完成", sheet_index);
        } else {
            stats.completed = session.complete().await?.is_ok();
        }
    }

    let success = stats.is_success(sheet);
    if success && config.remove_processed_sheets {
        cleanup_file(sheet.file_path.as_deref(), sheet_index)?;
    }

    log_sheet_complete(sheet_index, &stats, success);

    Ok(stats)
}

/// 批量操作后的重新加载失败时再试一次，仍失败则放弃本结果单
async fn recover_after_batch(
    session: &mut ExamSession,
    report: &BatchReport,
    sheet_index: usize,
) -> Result<()> {
    if let Some(reason) = &report.reload_error {
        warn!(
            "[结果单 {}] ⚠️ 批量操作后重新加载失败 ({})，重试一次",
            sheet_index, reason
        );
        session
            .reload()
            .await
            .with_context(|| format!("无法重新加载检查 {} 的结果", session.exam_id()))?;
    }
    Ok(())
}

/// 把结果单中的值写入暂存区
fn fill_entry(session: &mut ExamSession, value: &SheetValue) -> Result<()> {
    session.set_field(&value.parameter, StagingField::Value, value.value.clone())?;
    if let Some(reference_range) = &value.reference_range {
        session.set_field(
            &value.parameter,
            StagingField::ReferenceRange,
            reference_range.clone(),
        )?;
    }
    Ok(())
}

/// 清理已处理的文件
fn cleanup_file(file_path: Option<&str>, sheet_index: usize) -> Result<()> {
    let Some(file_path) = file_path else {
        warn!("[结果单 {}] ⚠️ 文件路径未设置", sheet_index);
        return Ok(());
    };

    if Path::new(file_path).exists() {
        fs::remove_file(file_path).map_err(|e| AppError::file_delete_failed(file_path, e))?;
        info!("[结果单 {}] 🗑️ 文件已删除: {}", sheet_index, file_path);
    } else {
        warn!("[结果单 {}] ⚠️ 文件不存在: {}", sheet_index, file_path);
    }

    Ok(())
}

// ========== 日志辅助函数 ==========

fn log_sheet_start(sheet_index: usize, sheet: &ResultSheet) {
    info!(
        "[结果单 {}] 开始处理: {}",
        sheet_index,
        truncate_text(&sheet.display_name(), 60)
    );
    info!("[结果单 {}] 检查ID: {}", sheet_index, sheet.exam_id);
    info!(
        "[结果单 {}] 参数值: {}, 删除: {}",
        sheet_index,
        sheet.values.len(),
        sheet.delete.len()
    );
}

fn log_sheet_complete(sheet_index: usize, stats: &SheetStats, success: bool) {
    info!(
        "[结果单 {}] 统计: 新建 {}, 更新 {}, 删除 {}, 跳过 {}, 未匹配 {}",
        sheet_index, stats.created, stats.updated, stats.deleted, stats.skipped, stats.unmatched
    );
    if success {
        info!("[结果单 {}] ✅ 处理完成", sheet_index);
    } else {
        warn!("[结果单 {}] ❌ 处理未完全成功", sheet_index);
    }
}

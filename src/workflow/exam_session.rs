//! 检查录入会话 - 流程层
//!
//! 一个检查的完整工作会话：加载结果 → 应用模板 / 编辑选中 → 提交 → 删除 → 完成。
//! 会话独占暂存区和选中集合；每次重新加载结果列表都会让两者失效。
//! 重新加载失败时本地结果列表整体作废，直到下一次成功的 `reload` 之前拒绝任何修改。

use crate::clients::{ParameterStore, TemplateCatalog};
use crate::error::{AppError, AppResult, BusinessError};
use crate::models::{name_key, ExamStatus, ResultRecord, StagingField, StagingMode};
use crate::services::{
    reconcile, BatchCoordinator, BatchOutcome, CompletionGate, CompletionOutcome, LedgerCommit,
    ReconcileStatus, SelectionSet, StagingLedger, TemplateResolver,
};
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 应用模板的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateApplication {
    /// 已开始新建会话
    Staged { staged: usize, skipped: usize },
    /// 模板参数全部已存在，未开始会话
    FullyRedundant { skipped: usize },
    /// 模板没有参数，未开始会话
    EmptyTemplate,
}

/// 提交或删除之后的会话级结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub outcome: BatchOutcome,
    /// 批量操作改变了存储端，结果列表需要重新加载
    pub reload_required: bool,
    /// 随后的重新加载失败的原因；此时会话已失效，需调用 `reload` 恢复
    pub reload_error: Option<String>,
}

impl BatchReport {
    fn new(outcome: BatchOutcome, reload_required: bool) -> Self {
        Self {
            outcome,
            reload_required,
            reload_error: None,
        }
    }
}

/// 检查录入会话
pub struct ExamSession {
    exam_id: String,
    status: ExamStatus,
    /// 上一次重新加载失败，`results` 不可信
    stale: bool,
    results: Vec<ResultRecord>,
    selection: SelectionSet,
    ledger: StagingLedger,
    store: Arc<dyn ParameterStore>,
    resolver: TemplateResolver,
    coordinator: BatchCoordinator,
    gate: CompletionGate,
}

impl ExamSession {
    /// 打开会话并加载检查的结果
    pub async fn open(
        store: Arc<dyn ParameterStore>,
        catalog: Arc<dyn TemplateCatalog>,
        exam_id: impl Into<String>,
    ) -> AppResult<Self> {
        let exam_id = exam_id.into();
        if exam_id.trim().is_empty() {
            return Err(BusinessError::EmptyExamId.into());
        }

        let mut session = Self {
            ledger: StagingLedger::new(exam_id.clone()),
            exam_id,
            status: ExamStatus::InProgress,
            stale: false,
            results: Vec::new(),
            selection: SelectionSet::new(),
            coordinator: BatchCoordinator::new(Arc::clone(&store)),
            gate: CompletionGate::new(Arc::clone(&store)),
            resolver: TemplateResolver::new(catalog),
            store,
        };
        session.reload().await?;
        Ok(session)
    }

    /// 重新加载结果列表，清空选中集合并放弃暂存会话
    ///
    /// 加载失败时清空本地结果和可选范围，会话进入失效状态。
    pub async fn reload(&mut self) -> AppResult<()> {
        self.selection.clear();
        self.ledger.cancel();

        match self.store.list_results(&self.exam_id).await {
            Ok(results) => {
                debug!("{} 加载了 {} 条结果", self, results.len());
                self.selection.reload(&results);
                self.results = results;
                self.stale = false;
                Ok(())
            }
            Err(e) => {
                self.selection.reload(&[]);
                self.results.clear();
                self.stale = true;
                Err(e)
            }
        }
    }

    /// 批量操作之后重新加载；失败只记录在报告里，不覆盖批量结果
    async fn reload_after_batch(&mut self, report: &mut BatchReport) {
        if let Err(e) = self.reload().await {
            error!("{} ❌ 批量操作后重新加载失败: {}", self, e);
            report.reload_error = Some(e.to_string());
        }
    }

    /// 应用模板：与已有结果对账后开始新建会话
    pub async fn apply_template(&mut self, template_id: &str) -> AppResult<TemplateApplication> {
        self.ensure_accepts_edits()?;

        let parameters = self.resolver.template_parameters(template_id).await?;
        let reconciliation = reconcile(&self.results, &parameters);

        if reconciliation.skipped > 0 {
            info!(
                "{} 模板 {} 中有 {} 个参数已存在，已跳过",
                self, template_id, reconciliation.skipped
            );
        }

        match reconciliation.status() {
            ReconcileStatus::Ready => {
                let staged = self.ledger.begin_from_template(&reconciliation.to_create).len();
                Ok(TemplateApplication::Staged {
                    staged,
                    skipped: reconciliation.skipped,
                })
            }
            ReconcileStatus::FullyRedundant => {
                warn!("{} ⚠️ 模板 {} 的参数全部已存在", self, template_id);
                Ok(TemplateApplication::FullyRedundant {
                    skipped: reconciliation.skipped,
                })
            }
            ReconcileStatus::EmptyTemplate => {
                warn!("{} ⚠️ 模板 {} 没有参数", self, template_id);
                Ok(TemplateApplication::EmptyTemplate)
            }
        }
    }

    /// 按检查类型名称取第一个模板并应用
    pub async fn apply_template_for_exam_type(
        &mut self,
        exam_type_name: &str,
    ) -> AppResult<TemplateApplication> {
        let templates = self.resolver.templates_for_exam_type(exam_type_name).await?;
        let template = templates.first().ok_or_else(|| BusinessError::TemplateNotFound {
            template: exam_type_name.to_string(),
        })?;
        let template_id = template.template_id.clone();
        self.apply_template(&template_id).await
    }

    /// 用选中的结果开始编辑会话，返回暂存的条目数
    pub fn edit_selection(&mut self) -> AppResult<usize> {
        self.ensure_accepts_edits()?;

        let selected: HashSet<String> = self.selection.selected_ids().into_iter().collect();
        if selected.is_empty() {
            return Err(BusinessError::EmptySelection {
                operation: "编辑".to_string(),
            }
            .into());
        }

        let records: Vec<ResultRecord> = self
            .results
            .iter()
            .filter(|record| {
                record
                    .result_id
                    .as_ref()
                    .is_some_and(|id| selected.contains(id))
            })
            .cloned()
            .collect();

        Ok(self.ledger.begin_from_existing(&records).len())
    }

    /// 修改暂存参数
    pub fn set_field(
        &mut self,
        parameter_name: &str,
        field: StagingField,
        new_value: impl Into<String>,
    ) -> AppResult<()> {
        self.ensure_accepts_edits()?;
        self.ledger.set_field(parameter_name, field, new_value);
        Ok(())
    }

    /// 提交暂存区，全部成功后重新加载结果列表
    ///
    /// 失败时暂存区保留以便重试。
    pub async fn commit(&mut self) -> AppResult<BatchReport> {
        self.ensure_accepts_edits()?;

        let mode = self.ledger.mode().unwrap_or(StagingMode::Create);
        let LedgerCommit {
            outcome,
            reload_required,
        } = self.ledger.commit(&self.coordinator, mode).await;

        let mut report = BatchReport::new(outcome, reload_required);
        if reload_required {
            self.reload_after_batch(&mut report).await;
        }
        Ok(report)
    }

    /// 并发删除选中的结果
    ///
    /// 只要发出过请求就重新加载，部分失败时已删除的记录不会恢复。
    pub async fn delete_selected(&mut self) -> AppResult<BatchReport> {
        self.ensure_accepts_edits()?;

        let selected = self.selection.selected_ids();
        let outcome = self.coordinator.delete_selected(&selected).await;

        let mut report = BatchReport::new(outcome, outcome.dispatched());
        if report.reload_required {
            self.reload_after_batch(&mut report).await;
        }
        Ok(report)
    }

    /// 标记检查完成
    pub async fn complete(&mut self) -> AppResult<CompletionOutcome> {
        self.ensure_accepts_edits()?;

        let outcome = self
            .gate
            .mark_completed(&self.exam_id, self.results.len())
            .await;

        if outcome.is_ok() {
            self.status = ExamStatus::Completed;
            self.ledger.cancel();
            self.selection.clear();
        }
        Ok(outcome)
    }

    // ========== 选中集合 ==========

    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selection.select(ids);
    }

    /// 按参数名选中结果（忽略大小写），返回选中的数量
    pub fn select_by_names<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let keys: HashSet<String> = names.iter().map(|name| name_key(name.as_ref())).collect();
        let ids: Vec<String> = self
            .results
            .iter()
            .filter(|record| keys.contains(&record.name_key()))
            .filter_map(|record| record.result_id.clone())
            .collect();

        let count = ids.len();
        self.selection.select(ids);
        count
    }

    pub fn toggle_select_all(&mut self) {
        let all_ids = self.selection.loaded_ids().to_vec();
        self.selection.toggle_select_all(&all_ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// 放弃当前暂存会话
    pub fn cancel_staging(&mut self) {
        self.ledger.cancel();
    }

    // ========== 只读访问 ==========

    pub fn exam_id(&self) -> &str {
        &self.exam_id
    }

    pub fn status(&self) -> ExamStatus {
        self.status
    }

    /// 上一次重新加载是否失败
    pub fn needs_reload(&self) -> bool {
        self.stale
    }

    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn ledger(&self) -> &StagingLedger {
        &self.ledger
    }

    fn ensure_accepts_edits(&self) -> AppResult<()> {
        if !self.status.accepts_edits() {
            return Err(AppError::exam_completed(&self.exam_id));
        }
        if self.stale {
            return Err(BusinessError::StaleResults {
                exam_id: self.exam_id.clone(),
            }
            .into());
        }
        Ok(())
    }
}

impl Display for ExamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[检查 {}]", self.exam_id)
    }
}

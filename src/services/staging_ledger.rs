//! 暂存区 - 业务能力层
//!
//! 持有一次录入会话中尚未持久化的参数值，支持"从模板新建"和"批量编辑选中结果"两种模式。

use crate::models::{
    name_key, ParameterDefinition, ResultRecord, StagingEntry, StagingField, StagingMode,
};
use crate::services::batch_coordinator::{BatchCoordinator, BatchOutcome};
use std::collections::HashSet;
use tracing::{debug, warn};

/// 提交暂存区的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerCommit {
    pub outcome: BatchOutcome,
    /// 全部成功后为 true，调用方应重新加载结果列表
    pub reload_required: bool,
}

/// 暂存区
#[derive(Debug, Clone)]
pub struct StagingLedger {
    exam_id: String,
    mode: Option<StagingMode>,
    entries: Vec<StagingEntry>,
}

impl StagingLedger {
    pub fn new(exam_id: impl Into<String>) -> Self {
        Self {
            exam_id: exam_id.into(),
            mode: None,
            entries: Vec::new(),
        }
    }

    /// 从模板参数开始新建会话
    ///
    /// 有默认值时使用默认值，否则为空字符串；条目不带 `result_id`。
    pub fn begin_from_template(&mut self, definitions: &[ParameterDefinition]) -> &[StagingEntry] {
        let entries = definitions
            .iter()
            .map(|def| StagingEntry {
                parameter_name: def.parameter_name.clone(),
                value: def.default_value.clone().unwrap_or_default(),
                reference_range: def.default_reference_range.clone().unwrap_or_default(),
                unit: def.unit.clone(),
                result_id: None,
            })
            .collect();

        self.begin(StagingMode::Create, entries)
    }

    /// 从已有结果开始编辑会话
    ///
    /// 条目带上 `result_id`；尚未持久化（没有 ID）的记录无法编辑，直接跳过。
    pub fn begin_from_existing(&mut self, records: &[ResultRecord]) -> &[StagingEntry] {
        let entries = records
            .iter()
            .filter_map(|record| match &record.result_id {
                Some(result_id) => Some(StagingEntry {
                    parameter_name: record.parameter_name.clone(),
                    value: record.value.clone(),
                    reference_range: record.reference_range.clone(),
                    unit: record.unit.clone(),
                    result_id: Some(result_id.clone()),
                }),
                None => {
                    warn!(
                        "[检查 {}] 结果 {} 尚未持久化，无法编辑",
                        self.exam_id, record.parameter_name
                    );
                    None
                }
            })
            .collect();

        self.begin(StagingMode::Edit, entries)
    }

    fn begin(&mut self, mode: StagingMode, entries: Vec<StagingEntry>) -> &[StagingEntry] {
        let mut seen = HashSet::new();
        self.entries = entries
            .into_iter()
            .filter(|entry| {
                let unique = seen.insert(name_key(&entry.parameter_name));
                if !unique {
                    warn!(
                        "[检查 {}] 参数 {} 重复，只保留第一个",
                        self.exam_id, entry.parameter_name
                    );
                }
                unique
            })
            .collect();
        self.mode = Some(mode);

        debug!(
            "[检查 {}] 暂存会话开始 (模式: {}, {} 个参数)",
            self.exam_id,
            mode,
            self.entries.len()
        );
        &self.entries
    }

    /// 修改一个暂存参数的字段
    ///
    /// 参数未暂存时什么也不做。
    pub fn set_field(&mut self, parameter_name: &str, field: StagingField, new_value: impl Into<String>) {
        let key = name_key(parameter_name);
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| name_key(&entry.parameter_name) == key)
        else {
            return;
        };

        match field {
            StagingField::Value => entry.value = new_value.into(),
            StagingField::ReferenceRange => entry.reference_range = new_value.into(),
        }
    }

    /// 提交暂存区
    ///
    /// 全部成功时清空暂存区并要求重新加载；否则保留暂存区以便重试。
    pub async fn commit(&mut self, coordinator: &BatchCoordinator, mode: StagingMode) -> LedgerCommit {
        let outcome = match self.mode {
            None => BatchOutcome::EmptyInput,
            Some(current) if current != mode => {
                warn!(
                    "[检查 {}] 暂存模式为 {}，不能按 {} 提交",
                    self.exam_id, current, mode
                );
                BatchOutcome::ModeMismatch
            }
            Some(_) => {
                coordinator
                    .commit_staged_entries(&self.exam_id, &self.entries, mode)
                    .await
            }
        };

        let reload_required = outcome.is_ok();
        if reload_required {
            self.cancel();
        }

        LedgerCommit {
            outcome,
            reload_required,
        }
    }

    /// 放弃暂存会话
    pub fn cancel(&mut self) {
        self.entries.clear();
        self.mode = None;
    }

    pub fn exam_id(&self) -> &str {
        &self.exam_id
    }

    pub fn mode(&self) -> Option<StagingMode> {
        self.mode
    }

    pub fn entries(&self) -> &[StagingEntry] {
        &self.entries
    }

    pub fn get(&self, parameter_name: &str) -> Option<&StagingEntry> {
        let key = name_key(parameter_name);
        self.entries
            .iter()
            .find(|entry| name_key(&entry.parameter_name) == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, value: &str) -> ResultRecord {
        ResultRecord {
            result_id: Some(id.to_string()),
            exam_id: "EX-1".to_string(),
            parameter_name: name.to_string(),
            value: value.to_string(),
            unit: "mg/dL".to_string(),
            reference_range: "70-110".to_string(),
        }
    }

    #[test]
    fn test_begin_from_template_uses_defaults() {
        let mut ledger = StagingLedger::new("EX-1");
        let definitions = vec![
            ParameterDefinition::new("Glucosa", "mg/dL").with_defaults(Some("90"), Some("70-110")),
            ParameterDefinition::new("Urea", "mg/dL"),
        ];

        let entries = ledger.begin_from_template(&definitions);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, "90");
        assert_eq!(entries[0].reference_range, "70-110");
        assert_eq!(entries[1].value, "");
        assert_eq!(entries[1].reference_range, "");
        assert_eq!(entries[1].unit, "mg/dL");
        assert!(entries.iter().all(|entry| entry.result_id.is_none()));
        assert_eq!(ledger.mode(), Some(StagingMode::Create));
    }

    #[test]
    fn test_begin_from_existing_carries_result_id() {
        let mut ledger = StagingLedger::new("EX-1");
        let mut unsaved = record("x", "Colesterol", "180");
        unsaved.result_id = None;
        let records = vec![record("r1", "Glucosa", "95"), unsaved, record("r2", "Urea", "30")];

        let entries = ledger.begin_from_existing(&records);

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| entry.result_id.is_some()));
        assert_eq!(entries[0].result_id.as_deref(), Some("r1"));
        assert_eq!(entries[0].value, "95");
        assert_eq!(ledger.mode(), Some(StagingMode::Edit));
    }

    #[test]
    fn test_set_field_updates_single_entry() {
        let mut ledger = StagingLedger::new("EX-1");
        ledger.begin_from_existing(&[record("r1", "Glucosa", "95"), record("r2", "Urea", "30")]);

        ledger.set_field("glucosa", StagingField::Value, "101");
        ledger.set_field("Urea", StagingField::ReferenceRange, "15-40");

        assert_eq!(ledger.get("Glucosa").unwrap().value, "101");
        assert_eq!(ledger.get("Glucosa").unwrap().reference_range, "70-110");
        assert_eq!(ledger.get("Urea").unwrap().value, "30");
        assert_eq!(ledger.get("Urea").unwrap().reference_range, "15-40");
    }

    #[test]
    fn test_set_field_on_unstaged_name_is_noop() {
        let mut ledger = StagingLedger::new("EX-1");
        ledger.begin_from_template(&[ParameterDefinition::new("Glucosa", "mg/dL")]);
        let before = ledger.entries().to_vec();

        ledger.set_field("Hematocrito", StagingField::Value, "42");
        ledger.set_field("Hematocrito", StagingField::Value, "42");

        assert_eq!(ledger.entries(), before.as_slice());
    }

    #[test]
    fn test_duplicate_template_names_keep_first() {
        let mut ledger = StagingLedger::new("EX-1");
        let definitions = vec![
            ParameterDefinition::new("Sodio", "mmol/L").with_defaults(Some("140"), None),
            ParameterDefinition::new("SODIO", "mmol/L").with_defaults(Some("0"), None),
        ];

        let entries = ledger.begin_from_template(&definitions);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, "140");
    }

    #[test]
    fn test_cancel_clears_session() {
        let mut ledger = StagingLedger::new("EX-1");
        ledger.begin_from_template(&[ParameterDefinition::new("Glucosa", "mg/dL")]);

        ledger.cancel();

        assert!(ledger.is_empty());
        assert_eq!(ledger.mode(), None);
    }
}

//! 模板与已有结果的对账 - 业务能力层
//!
//! 纯函数：把模板参数划分为"需要新建"和"已存在被跳过"两部分，不访问网络。

use crate::models::{name_key, ParameterDefinition, ResultRecord};
use std::collections::HashSet;

/// 对账结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// 需要新建的参数，保持模板中的顺序
    pub to_create: Vec<ParameterDefinition>,
    /// 因同名结果已存在而跳过的参数数量
    pub skipped: usize,
}

/// 对账状态，供调用方决定提示内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStatus {
    /// 有需要新建的参数
    Ready,
    /// 模板参数全部已存在
    FullyRedundant,
    /// 模板本身没有参数
    EmptyTemplate,
}

impl Reconciliation {
    pub fn status(&self) -> ReconcileStatus {
        match (self.to_create.is_empty(), self.skipped) {
            (false, _) => ReconcileStatus::Ready,
            (true, 0) => ReconcileStatus::EmptyTemplate,
            (true, _) => ReconcileStatus::FullyRedundant,
        }
    }

    /// 模板参数总数
    pub fn total(&self) -> usize {
        self.to_create.len() + self.skipped
    }
}

/// 对账
///
/// # 参数
/// - `existing_results`: 检查当前已记录的结果
/// - `template_parameters`: 所选模板的参数定义
///
/// # 返回
/// 返回需要新建的参数（模板顺序）与跳过数量
pub fn reconcile(
    existing_results: &[ResultRecord],
    template_parameters: &[ParameterDefinition],
) -> Reconciliation {
    let existing: HashSet<String> = existing_results.iter().map(ResultRecord::name_key).collect();

    let (to_create, skipped): (Vec<_>, Vec<_>) = template_parameters
        .iter()
        .cloned()
        .partition(|param| !existing.contains(&name_key(&param.parameter_name)));

    Reconciliation {
        to_create,
        skipped: skipped.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ResultRecord {
        ResultRecord {
            result_id: Some(format!("r-{}", name)),
            exam_id: "EX-1".to_string(),
            parameter_name: name.to_string(),
            value: String::new(),
            unit: String::new(),
            reference_range: String::new(),
        }
    }

    fn param(name: &str) -> ParameterDefinition {
        ParameterDefinition::new(name, "g/dL")
    }

    #[test]
    fn test_hemoglobina_already_recorded() {
        let existing = vec![record("Hemoglobina")];
        let template = vec![param("Hemoglobina"), param("Hematocrito")];

        let result = reconcile(&existing, &template);

        assert_eq!(result.to_create, vec![param("Hematocrito")]);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.status(), ReconcileStatus::Ready);
    }

    #[test]
    fn test_name_comparison_ignores_case() {
        let result = reconcile(&[record("Glucosa")], &[param("glucosa")]);

        assert!(result.to_create.is_empty());
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_name_comparison_does_not_trim() {
        let result = reconcile(&[record("Glucosa")], &[param("Glucosa ")]);

        assert_eq!(result.to_create.len(), 1);
        assert_eq!(result.skipped, 0);
    }

    #[test]
    fn test_partition_is_exhaustive_and_ordered() {
        let existing = vec![record("b"), record("D")];
        let template = vec![param("a"), param("B"), param("c"), param("d"), param("e")];

        let result = reconcile(&existing, &template);

        assert_eq!(result.total(), template.len());
        let names: Vec<_> = result
            .to_create
            .iter()
            .map(|p| p.parameter_name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "c", "e"]);
        assert_eq!(result.skipped, 2);
    }

    #[test]
    fn test_fully_redundant_differs_from_empty_template() {
        let existing = vec![record("Urea"), record("Creatinina")];

        let redundant = reconcile(&existing, &[param("UREA"), param("creatinina")]);
        assert_eq!(redundant.status(), ReconcileStatus::FullyRedundant);

        let empty = reconcile(&existing, &[]);
        assert_eq!(empty.status(), ReconcileStatus::EmptyTemplate);
        assert_eq!(empty.skipped, 0);
    }

    #[test]
    fn test_no_existing_results_creates_everything() {
        let template = vec![param("Sodio"), param("Potasio")];
        let result = reconcile(&[], &template);

        assert_eq!(result.to_create, template);
        assert_eq!(result.skipped, 0);
    }
}

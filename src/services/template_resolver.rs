//! 模板解析服务 - 业务能力层
//!
//! 检查类型名称 → 模板列表 → 模板参数

use crate::clients::TemplateCatalog;
use crate::error::AppResult;
use crate::models::{name_key, ParameterDefinition, Template};
use std::sync::Arc;
use tracing::{debug, info};

/// 模板解析服务
#[derive(Clone)]
pub struct TemplateResolver {
    catalog: Arc<dyn TemplateCatalog>,
}

impl TemplateResolver {
    pub fn new(catalog: Arc<dyn TemplateCatalog>) -> Self {
        Self { catalog }
    }

    /// 按检查类型名称查找模板
    ///
    /// 名称比较忽略大小写；找不到检查类型时返回空列表。
    pub async fn templates_for_exam_type(&self, exam_type_name: &str) -> AppResult<Vec<Template>> {
        let key = name_key(exam_type_name);
        let exam_types = self.catalog.list_exam_types().await?;

        let Some(exam_type) = exam_types.iter().find(|t| name_key(&t.name) == key) else {
            info!("未找到检查类型: {}", exam_type_name);
            return Ok(Vec::new());
        };

        let templates = self
            .catalog
            .list_templates_for_exam_type(&exam_type.id)
            .await?;
        debug!(
            "检查类型 {} (ID {}) 有 {} 个模板",
            exam_type.name,
            exam_type.id,
            templates.len()
        );
        Ok(templates)
    }

    /// 获取模板的有序参数定义
    pub async fn template_parameters(&self, template_id: &str) -> AppResult<Vec<ParameterDefinition>> {
        let detail = self.catalog.get_template_detail(template_id).await?;
        debug!("模板 {} 有 {} 个参数", template_id, detail.parameters.len());
        Ok(detail.parameters)
    }
}

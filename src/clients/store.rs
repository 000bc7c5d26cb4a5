//! 外部协作方接口
//!
//! 核心逻辑只依赖这两个 trait，HTTP 实现见 `lab_client`，测试中使用内存实现。

use crate::error::AppResult;
use crate::models::{ExamType, ResultPayload, ResultRecord, Template, TemplateDetail};
use async_trait::async_trait;

/// 检验结果存储客户端
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// 读取某个检查的全部结果
    async fn list_results(&self, exam_id: &str) -> AppResult<Vec<ResultRecord>>;

    /// 为检查新建一条结果，返回存储端分配了 ID 的记录
    async fn create_result(&self, exam_id: &str, payload: &ResultPayload) -> AppResult<ResultRecord>;

    /// 更新已有结果
    async fn update_result(&self, result_id: &str, payload: &ResultPayload) -> AppResult<ResultRecord>;

    /// 删除一条结果
    async fn delete_result(&self, result_id: &str) -> AppResult<()>;

    /// 将检查标记为已完成
    async fn mark_exam_completed(&self, exam_id: &str) -> AppResult<()>;
}

/// 模板目录客户端（只读）
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    async fn list_exam_types(&self) -> AppResult<Vec<ExamType>>;

    /// 返回模板摘要，不含参数
    async fn list_templates_for_exam_type(&self, exam_type_id: &str) -> AppResult<Vec<Template>>;

    async fn get_template_detail(&self, template_id: &str) -> AppResult<TemplateDetail>;
}

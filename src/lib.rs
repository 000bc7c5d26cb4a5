//! # Lab Result Entry
//!
//! 检验结果录入核心：模板对账、批量暂存编辑、批量提交与完成门槛
//!
//! ## 架构设计
//!
//! ### ① 外部协作方（Clients）
//! - `clients/` - 结果存储与模板目录的接口（trait）及 HTTP 实现
//! - `ParameterStore` / `TemplateCatalog` - 核心只依赖这两个接口
//! - `LabClient` - 基于 reqwest 的 REST 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 每个组件只做一件事，可单独测试
//! - `reconcile` - 模板参数与已有结果对账（纯函数）
//! - `StagingLedger` - 暂存区（新建 / 编辑）
//! - `SelectionSet` - 选中集合
//! - `BatchCoordinator` - 批量提交（删除并发，暂存提交顺序执行）
//! - `CompletionGate` - 完成门槛
//!
//! ### ③ 流程层（Workflow）
//! - `ExamSession` - 一个检查的完整会话，重新加载时让暂存区和选中集合失效
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量结果单处理器，管理并发
//! - `orchestrator/sheet_processor` - 单个结果单处理器
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{LabClient, ParameterStore, TemplateCatalog};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ParameterDefinition, ResultRecord, StagingEntry, StagingField, StagingMode};
pub use orchestrator::{process_sheet, App};
pub use services::{
    can_complete, reconcile, BatchCoordinator, BatchOutcome, CompletionGate, CompletionOutcome,
    SelectionSet, StagingLedger,
};
pub use workflow::{BatchReport, ExamSession, TemplateApplication};

//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量结果单处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载结果单（Vec<ResultSheet>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `sheet_processor` - 单个结果单处理器
//! - 打开一个检查的 ExamSession
//! - 删除 → 模板新建 → 编辑 → 完成
//! - 输出单个结果单的统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ResultSheet>)
//!     ↓
//! sheet_processor (处理单个 ResultSheet)
//!     ↓
//! workflow::ExamSession (一个检查的会话)
//!     ↓
//! services (能力层：对账 / 暂存 / 选中 / 批量提交 / 完成门槛)
//!     ↓
//! clients (外部协作方：结果存储 / 模板目录)
//! ```

pub mod batch_processor;
pub mod sheet_processor;

pub use batch_processor::{App, ProcessingStats};
pub use sheet_processor::{process_sheet, SheetStats};

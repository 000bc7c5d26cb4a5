//! 批量结果单处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量结果单的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建 API 客户端
//! 2. **批量加载**：扫描并加载所有待处理的结果单（`Vec<ResultSheet>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量，不同检查互不影响
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **全局统计**：汇总所有结果单的处理结果

use crate::clients::{LabClient, ParameterStore, TemplateCatalog};
use crate::config::Config;
use crate::models::ResultSheet;
use crate::orchestrator::sheet_processor;
use crate::utils::logging::{
    log_batch_complete, log_batch_start, log_sheets_loaded, log_startup, print_final_stats,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    store: Arc<dyn ParameterStore>,
    catalog: Arc<dyn TemplateCatalog>,
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

impl App {
    /// 初始化应用，使用 HTTP 客户端
    pub async fn initialize(config: Config) -> Result<Self> {
        let client = Arc::new(LabClient::new(&config)?);
        Ok(Self::with_clients(config, client.clone(), client))
    }

    /// 使用指定的客户端初始化（测试时传入内存实现）
    pub fn with_clients(
        config: Config,
        store: Arc<dyn ParameterStore>,
        catalog: Arc<dyn TemplateCatalog>,
    ) -> Self {
        log_startup(config.max_concurrent_exams, &config.lab_api_base_url);

        Self {
            config,
            store,
            catalog,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        info!("\n📁 正在扫描待处理的结果单...");
        let all_sheets = crate::models::load_all_sheets(&self.config.sheet_folder).await?;

        if all_sheets.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_sheets_loaded(all_sheets.len(), self.config.max_concurrent_exams);

        let stats = self.process_all_sheets(all_sheets).await?;

        print_final_stats(stats.success, stats.failed, stats.total);

        Ok(stats)
    }

    /// 处理所有结果单
    async fn process_all_sheets(&self, all_sheets: Vec<ResultSheet>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_exams;
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total_sheets = all_sheets.len();
        let total_batches = total_sheets.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total: total_sheets,
            ..Default::default()
        };

        for (batch_index, batch_sheets) in all_sheets.chunks(batch_size).enumerate() {
            let batch_start = batch_index * batch_size;
            log_batch_start(
                (batch_index + 1, total_batches),
                batch_start + 1..=batch_start + batch_sheets.len(),
                total_sheets,
            );

            let batch_result = self
                .process_batch(batch_sheets, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(
                batch_index + 1,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_sheets: &[ResultSheet],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        // 为本批创建并发任务
        for (idx, sheet) in batch_sheets.iter().enumerate() {
            let sheet_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let store = Arc::clone(&self.store);
            let catalog = Arc::clone(&self.catalog);
            let sheet = sheet.clone();
            let config = self.config.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                match sheet_processor::process_sheet(store, catalog, &sheet, sheet_index, &config)
                    .await
                {
                    Ok(stats) => stats.is_success(&sheet),
                    Err(e) => {
                        error!("[结果单 {}] ❌ 处理过程中发生错误: {:#}", sheet_index, e);
                        false
                    }
                }
            });
            batch_handles.push((sheet_index, handle));
        }

        // 等待本批所有任务完成
        let mut result = BatchResult::default();

        for (sheet_index, handle) in batch_handles {
            match handle.await {
                Ok(true) => result.success += 1,
                Ok(false) => result.failed += 1,
                Err(e) => {
                    error!("[结果单 {}] 任务执行失败: {}", sheet_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

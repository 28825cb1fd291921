// ==========================================
// 地点风险评分引擎 - 文件批量评分导入器
// ==========================================
// 流程: 解析 → 表结构校验 → 行映射 → 批处理执行器 → (可选) 写出结果表
// 整批失败: 文件问题 / 表结构问题 / 批处理参数问题
// 行级问题: 由批处理执行器内联为 Failure
// ==========================================

use crate::config::EngineConfig;
use crate::config::ConfigError;
use crate::domain::batch::BatchSummary;
use crate::engine::batch_executor::{BatchExecutor, BatchOptions};
use crate::engine::scorer::RiskScorer;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{FileParser, RiskBatchImporter};
use crate::importer::record_mapper::RecordMapper;
use crate::importer::result_writer::ResultWriter;
use async_trait::async_trait;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct RiskImporter {
    parser: Box<dyn FileParser>,
    executor: BatchExecutor,
    options: BatchOptions,
}

impl RiskImporter {
    pub fn new(scorer: Arc<RiskScorer>, options: BatchOptions) -> Self {
        Self {
            parser: Box::new(UniversalFileParser),
            executor: BatchExecutor::new(scorer),
            options,
        }
    }

    /// 由配置构造（批处理参数取自 config.batch）
    pub fn from_config(config: EngineConfig) -> Result<Self, ConfigError> {
        let options = BatchOptions::from(&config.batch);
        let scorer = RiskScorer::new(config)?;
        Ok(Self::new(Arc::new(scorer), options))
    }

    pub fn with_parser(mut self, parser: Box<dyn FileParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// 导入并写出结果表
    pub async fn import_and_write(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> ImportResult<BatchSummary> {
        let summary = self.import_file(input_path).await?;
        ResultWriter.write_to_path(&summary, output_path)?;
        Ok(summary)
    }
}

#[async_trait]
impl RiskBatchImporter for RiskImporter {
    async fn import_file(&self, file_path: &Path) -> ImportResult<BatchSummary> {
        info!(file = %file_path.display(), "开始导入评分文件");

        // === 步骤 1: 文件解析 ===
        let table = self.parser.parse_table(file_path)?;
        if table.skipped_blank_rows > 0 {
            warn!(
                file = %file_path.display(),
                skipped = table.skipped_blank_rows,
                "已跳过空白行"
            );
        }

        // === 步骤 2-3: 表结构校验 + 行映射 ===
        let records = RecordMapper.map_table(&table)?;

        // === 步骤 4: 批量评分 ===
        let summary = self.executor.process_batch(records, &self.options).await?;

        info!(
            file = %file_path.display(),
            batch_id = %summary.batch_id,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "评分文件导入完成"
        );
        Ok(summary)
    }

    async fn import_many(
        &self,
        file_paths: Vec<PathBuf>,
    ) -> Vec<(PathBuf, ImportResult<BatchSummary>)> {
        info!(count = file_paths.len(), "开始批量导入文件");

        let tasks = file_paths.into_iter().map(|path| async move {
            let result = self.import_file(&path).await;
            if let Err(e) = &result {
                error!(file = %path.display(), error = %e, "文件导入失败");
            }
            (path, result)
        });

        let results = join_all(tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|(_, r)| r.is_ok()).count(),
            failed = results.iter().filter(|(_, r)| r.is_err()).count(),
            "批量导入完成"
        );
        results
    }
}

// ==========================================
// 地点风险评分引擎 - 导入 Trait
// ==========================================
// 职责: 定义表格解析与批量导入接口（不包含实现）
// ==========================================

use crate::domain::batch::BatchSummary;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 解析后的表格
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    /// 表头（已 trim,保持原列顺序）
    pub headers: Vec<String>,
    /// 数据行（列名 → 单元格文本）
    pub rows: Vec<HashMap<String, String>>,
    /// 跳过的全空白行数
    pub skipped_blank_rows: usize,
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表格
    ///
    /// # 返回
    /// - Ok(ParsedTable)
    /// - Err: 文件不存在/格式不支持/解析失败/列名重复
    fn parse_table(&self, file_path: &Path) -> ImportResult<ParsedTable>;
}

// ==========================================
// RiskBatchImporter Trait
// ==========================================
// 用途: 表格文件 → 批量评分
// 实现者: RiskImporter
#[async_trait]
pub trait RiskBatchImporter: Send + Sync {
    /// 导入单个文件并批量评分
    ///
    /// # 流程
    /// 1. 文件解析
    /// 2. 表结构校验（必填列）
    /// 3. 行映射为 RawIndicators
    /// 4. 批处理执行器评分
    async fn import_file(&self, file_path: &Path) -> ImportResult<BatchSummary>;

    /// 并发导入多个文件
    ///
    /// # 说明
    /// - 每个文件独立处理,单个文件失败不影响其他文件
    /// - 返回顺序与输入顺序一致
    async fn import_many(&self, file_paths: Vec<PathBuf>) -> Vec<(PathBuf, ImportResult<BatchSummary>)>;
}

// ==========================================
// 地点风险评分引擎 - 导入模块错误类型
// ==========================================
// 仅覆盖整批失败的结构性问题; 行级问题由批处理执行器内联为 Failure
// ==========================================

use crate::engine::error::BatchError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表结构错误 =====
    #[error("文件无数据行")]
    EmptyFile,

    #[error("缺少必填列: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("列名重复: {}", .0.join(", "))]
    DuplicateColumns(Vec<String>),

    // ===== 批处理 / 输出 =====
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("结果写出失败: {0}")]
    WriteError(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

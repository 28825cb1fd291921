// ==========================================
// 地点风险评分引擎 - API层错误类型
// ==========================================
// 职责: 汇总各层错误,转换为调用方可直接展示的错误消息
// ==========================================

use crate::config::ConfigError;
use crate::engine::error::{BatchError, ScoringError, ValidationError};
use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 单字段校验失败（可归因到字段）
    #[error(transparent)]
    Validation(ValidationError),

    // ==========================================
    // 处理错误
    // ==========================================
    #[error("评分失败: {0}")]
    ScoringFailed(String),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("文件导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("批处理失败: {0}")]
    Batch(#[from] BatchError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

// ==========================================
// 从 ScoringError 转换
// ==========================================
impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::Validation(e) => ApiError::Validation(e),
            ScoringError::Unexpected(msg) => ApiError::ScoringFailed(msg),
        }
    }
}

impl ApiError {
    /// 校验错误详情（字段级）
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ApiError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 地点风险评分引擎 - 引擎错误类型
// ==========================================
// ValidationError: 单字段输入问题,可在单行边界恢复
// ScoringError::Unexpected: 其他异常,对外只暴露通用信息
// ==========================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 字段校验错误（总能归因到单个字段）
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("字段校验失败 (字段 {field}, 值 {value}): {message}")]
pub struct ValidationError {
    pub field: String,
    pub value: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

/// 评分错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("记录处理异常: {0}")]
    Unexpected(String),
}

impl ScoringError {
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            ScoringError::Validation(e) => Some(e),
            ScoringError::Unexpected(_) => None,
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, ScoringError>;

/// 批处理整体错误（仅限派发前可检测的结构性问题）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    #[error("批处理输入为空")]
    EmptyInput,

    #[error("批处理参数非法 ({key}): {message}")]
    InvalidOptions { key: String, message: String },
}

/// Result 类型别名
pub type BatchResult<T> = Result<T, BatchError>;

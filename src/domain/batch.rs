// ==========================================
// 地点风险评分引擎 - 批处理结果
// ==========================================
// 不变量: succeeded + failed == total
// 不变量: outcomes 顺序与输入顺序一致（与 worker 完成顺序无关）
// ==========================================

use crate::domain::indicators::RawIndicators;
use crate::domain::result::RiskResult;
use crate::domain::types::ProcessingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// RowOutcome - 单行处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowOutcome {
    Success {
        input: RawIndicators,
        result: RiskResult,
    },
    Failure {
        input: RawIndicators,
        error: String,
    },
}

impl RowOutcome {
    pub fn status(&self) -> ProcessingStatus {
        match self {
            RowOutcome::Success { .. } => ProcessingStatus::Success,
            RowOutcome::Failure { .. } => ProcessingStatus::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Success { .. })
    }

    /// 原始输入（成功/失败均保留）
    pub fn input(&self) -> &RawIndicators {
        match self {
            RowOutcome::Success { input, .. } | RowOutcome::Failure { input, .. } => input,
        }
    }

    pub fn result(&self) -> Option<&RiskResult> {
        match self {
            RowOutcome::Success { result, .. } => Some(result),
            RowOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RowOutcome::Success { .. } => None,
            RowOutcome::Failure { error, .. } => Some(error.as_str()),
        }
    }
}

// ==========================================
// BatchSummary - 批处理汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 超时后未派发的记录以失败结果计入
    pub timed_out: bool,
    pub outcomes: Vec<RowOutcome>,
}

impl BatchSummary {
    /// 失败行（1-based 行号, 错误信息）
    pub fn failures(&self) -> Vec<(usize, &str)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(idx, o)| o.error().map(|e| (idx + 1, e)))
            .collect()
    }

    /// 审计日志行
    pub fn audit_line(&self) -> String {
        format!("{} errors out of {} rows processed", self.failed, self.total)
    }
}

// ==========================================
// 地点风险评分引擎 - 领域模型层
// ==========================================
// 职责: 定义输入指标、评分结果、批处理结果
// 红线: 不含评分逻辑,不含 IO
// ==========================================

pub mod batch;
pub mod indicators;
pub mod result;
pub mod types;

// 重导出核心类型
pub use batch::{BatchSummary, RowOutcome};
pub use indicators::{RawIndicators, RawValue, ValidatedIndicators};
pub use result::{AppliedRule, ComponentScores, RiskResult};
pub use types::{Comparator, IndicatorField, ProcessingStatus};

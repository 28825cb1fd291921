// ==========================================
// 地点风险评分引擎 - 引擎层
// ==========================================
// 依赖顺序: normalizer → rule_engine → scorer → batch_executor
// 红线: 评分是输入 + 只读配置的纯函数（噪声除外）, 不含 IO
// ==========================================

pub mod batch_executor;
pub mod error;
pub mod normalizer;
pub mod rule_engine;
pub mod scorer;

// 重导出核心引擎
pub use batch_executor::{BatchExecutor, BatchOptions, RecordScorer};
pub use error::{BatchError, BatchResult, EngineResult, ScoringError, ValidationError};
pub use normalizer::{IndicatorNormalizer, UnitComponents};
pub use rule_engine::{AmplificationRule, RuleEngine, RuleEvaluation};
pub use scorer::{ProcessorInfo, RiskScorer};

// ==========================================
// 地点风险评分引擎 - 核心库
// ==========================================
// 流程: 原始指标 → 校验/归一化 → 加权聚合 → 规则放大 → 噪声 → 截断/缩放
// 批处理: 有界并发 + 逐行失败隔离 + 输入顺序输出
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据模型
pub mod domain;

// 配置层 - 评分配置与加载
pub mod config;

// 引擎层 - 评分与批处理
pub mod engine;

// 导入层 - 表格文件
pub mod importer;

// API 层 - 调用门面
pub mod api;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AppliedRule, BatchSummary, ComponentScores, IndicatorField, ProcessingStatus, RawIndicators,
    RawValue, RiskResult, RowOutcome, ValidatedIndicators,
};

// 配置
pub use config::{ConfigError, ConfigManager, EngineConfig, RuleSpec};

// 引擎
pub use engine::{
    BatchExecutor, BatchOptions, IndicatorNormalizer, RiskScorer, RuleEngine, ScoringError,
    ValidationError,
};

// 导入
pub use importer::{ImportError, RiskImporter};

// API
pub use api::{ApiError, RiskApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "地点风险评分引擎";

// ==========================================
// 地点风险评分引擎 - 配置层
// ==========================================
// 职责: 引擎配置定义、加载、校验
// 存储: JSON 文件（可选）+ 环境变量覆写
// ==========================================

pub mod config_manager;
pub mod engine_config;
pub mod error;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager, ConfigSource};
pub use engine_config::{BatchConfig, ConditionSpec, EngineConfig, RuleSpec};
pub use error::{ConfigError, ConfigResult};

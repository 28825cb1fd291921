// ==========================================
// 地点风险评分引擎 - 配置错误类型
// ==========================================
// 配置错误只在启动/构造阶段出现,不会出现在单条记录处理中
// ==========================================

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    // ===== 权重 =====
    #[error("权重非法 (指标 {indicator}): {weight}，权重必须为非负有限数")]
    InvalidWeight { indicator: String, weight: f64 },

    // ===== 天气类别表 =====
    #[error("天气类别表为空")]
    EmptyWeatherTable,

    #[error("天气类别分值非法 (类别 {category}): {severity}，必须位于 [0, 1]")]
    InvalidWeatherSeverity { category: String, severity: f64 },

    // ===== 放大规则 =====
    #[error("放大规则非法 (规则 #{index} \"{description}\"): {message}")]
    InvalidRule {
        index: usize,
        description: String,
        message: String,
    },

    // ===== 标量参数 =====
    #[error("配置值非法 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    // ===== 配置文件 =====
    #[error("配置文件读取失败 ({path}): {message}")]
    FileReadError { path: String, message: String },

    #[error("配置文件格式错误: {0}")]
    ParseError(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

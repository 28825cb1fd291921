// ==========================================
// 地点风险评分引擎 - 引擎配置
// ==========================================
// 职责: 权重 / 天气类别表 / 放大规则 / 噪声 / 输出量程 / 批处理参数
// 约束: 构造评分器前必须通过 validate()，之后只读共享
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::types::IndicatorField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// 权重和允许偏离 1.0 的幅度（超出仅告警）
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

// ==========================================
// 放大规则（声明式）
// ==========================================

/// 单个字段条件
///
/// - `">7"` / `"<=3"`: 数值比较
/// - `5`: 数值相等
/// - `["Stormy", "Snowy"]`: 类别集合成员
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionSpec {
    Expr(String),
    Equals(f64),
    OneOf(Vec<String>),
}

/// 放大规则声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    #[serde(default = "default_rule_description")]
    pub description: String,
    pub multiplier: f64,
    /// 字段名 → 条件（全部满足才命中）
    pub conditions: BTreeMap<String, ConditionSpec>,
}

fn default_rule_description() -> String {
    "Unnamed rule".to_string()
}

impl RuleSpec {
    pub fn new(description: impl Into<String>, multiplier: f64) -> Self {
        Self {
            description: description.into(),
            multiplier,
            conditions: BTreeMap::new(),
        }
    }

    /// 追加条件（构造辅助）
    pub fn when(mut self, field: IndicatorField, condition: ConditionSpec) -> Self {
        self.conditions.insert(field.as_str().to_string(), condition);
        self
    }
}

// ==========================================
// 批处理参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub max_workers: usize,
    pub chunk_size: usize,
    /// 批级超时（毫秒），None 表示不限
    pub timeout_ms: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: 8,
            chunk_size: 20_000,
            timeout_ms: None,
        }
    }
}

impl BatchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

// ==========================================
// EngineConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: BTreeMap<IndicatorField, f64>,
    pub weather_categories: BTreeMap<String, f64>,
    pub rules: Vec<RuleSpec>,
    /// 噪声幅度（0 = 确定性模式）
    pub noise_level: f64,
    pub output_scale: f64,
    pub reject_unknown_weather: bool,
    /// 非严格模式下未知天气的分值
    pub unknown_weather_severity: f64,
    pub weather_case_insensitive: bool,
    pub batch: BatchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            weather_categories: default_weather_categories(),
            rules: default_rules(),
            noise_level: 0.05,
            output_scale: 100.0,
            reject_unknown_weather: true,
            unknown_weather_severity: 0.5,
            weather_case_insensitive: false,
            batch: BatchConfig::default(),
        }
    }
}

pub fn default_weights() -> BTreeMap<IndicatorField, f64> {
    BTreeMap::from([
        (IndicatorField::CrimeIndex, 0.30),
        (IndicatorField::AccidentRate, 0.25),
        (IndicatorField::SocioeconomicLevel, 0.25),
        (IndicatorField::Weather, 0.20),
    ])
}

pub fn default_weather_categories() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("Clear".to_string(), 0.10),
        ("Rainy".to_string(), 0.50),
        ("Snowy".to_string(), 0.70),
        ("Stormy".to_string(), 0.90),
        ("Extreme".to_string(), 0.95),
    ])
}

pub fn default_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new("High crime + severe weather amplification", 1.15)
            .when(IndicatorField::CrimeIndex, ConditionSpec::Expr(">7".to_string()))
            .when(
                IndicatorField::Weather,
                ConditionSpec::OneOf(vec![
                    "Stormy".to_string(),
                    "Snowy".to_string(),
                    "Extreme".to_string(),
                ]),
            ),
        RuleSpec::new("Low crime + clear weather bonus (risk reduction)", 0.9)
            .when(IndicatorField::CrimeIndex, ConditionSpec::Expr("<4".to_string()))
            .when(
                IndicatorField::Weather,
                ConditionSpec::OneOf(vec!["Clear".to_string()]),
            ),
    ]
}

impl EngineConfig {
    /// 确定性配置（noise_level = 0）
    pub fn deterministic() -> Self {
        Self {
            noise_level: 0.0,
            ..Self::default()
        }
    }

    pub fn with_weights(mut self, weights: BTreeMap<IndicatorField, f64>) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_rules(mut self, rules: Vec<RuleSpec>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_noise_level(mut self, noise_level: f64) -> Self {
        self.noise_level = noise_level;
        self
    }

    pub fn weight_of(&self, field: IndicatorField) -> f64 {
        self.weights.get(&field).copied().unwrap_or(0.0)
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights.values().sum()
    }

    /// 标量/权重/类别表校验（规则条件的校验在规则编译时完成）
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    indicator: field.to_string(),
                    weight: *weight,
                });
            }
        }

        let sum = self.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!(weight_sum = sum, "指标权重之和不为 1.0");
        }

        if self.weather_categories.is_empty() {
            return Err(ConfigError::EmptyWeatherTable);
        }
        for (category, severity) in &self.weather_categories {
            if !(0.0..=1.0).contains(severity) {
                return Err(ConfigError::InvalidWeatherSeverity {
                    category: category.clone(),
                    severity: *severity,
                });
            }
        }

        if !self.noise_level.is_finite() || !(0.0..=1.0).contains(&self.noise_level) {
            return Err(invalid_value("noise_level", self.noise_level, "必须位于 [0, 1]"));
        }
        if !self.output_scale.is_finite() || self.output_scale <= 0.0 {
            return Err(invalid_value("output_scale", self.output_scale, "必须为正数"));
        }
        if !(0.0..=1.0).contains(&self.unknown_weather_severity) {
            return Err(invalid_value(
                "unknown_weather_severity",
                self.unknown_weather_severity,
                "必须位于 [0, 1]",
            ));
        }
        if self.batch.max_workers == 0 {
            return Err(invalid_value("batch.max_workers", 0, "至少为 1"));
        }
        if self.batch.chunk_size == 0 {
            return Err(invalid_value("batch.chunk_size", 0, "至少为 1"));
        }

        Ok(())
    }
}

fn invalid_value(key: &str, value: impl ToString, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

// ==========================================
// 地点风险评分引擎 - 领域类型定义
// ==========================================
// 指标字段 / 比较运算符 / 处理状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 指标字段 (Indicator Field)
// ==========================================
// 顺序即校验顺序: crime_index → accident_rate → socioeconomic_level → weather
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorField {
    CrimeIndex,
    AccidentRate,
    SocioeconomicLevel,
    Weather,
}

impl IndicatorField {
    /// 全部指标（按校验顺序）
    pub const ALL: [IndicatorField; 4] = [
        IndicatorField::CrimeIndex,
        IndicatorField::AccidentRate,
        IndicatorField::SocioeconomicLevel,
        IndicatorField::Weather,
    ];

    /// 字段名（与输入列名一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorField::CrimeIndex => "crime_index",
            IndicatorField::AccidentRate => "accident_rate",
            IndicatorField::SocioeconomicLevel => "socioeconomic_level",
            IndicatorField::Weather => "weather",
        }
    }

    /// 是否为数值型指标
    pub fn is_numeric(&self) -> bool {
        !matches!(self, IndicatorField::Weather)
    }

    /// 数值型指标的合法区间（闭区间）
    pub fn valid_range(&self) -> Option<(f64, f64)> {
        match self {
            IndicatorField::CrimeIndex => Some((0.0, 10.0)),
            IndicatorField::AccidentRate => Some((0.0, 10.0)),
            IndicatorField::SocioeconomicLevel => Some((1.0, 10.0)),
            IndicatorField::Weather => None,
        }
    }
}

impl fmt::Display for IndicatorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "crime_index" => Ok(IndicatorField::CrimeIndex),
            "accident_rate" => Ok(IndicatorField::AccidentRate),
            "socioeconomic_level" => Ok(IndicatorField::SocioeconomicLevel),
            "weather" => Ok(IndicatorField::Weather),
            other => Err(format!("未知指标字段: {}", other)),
        }
    }
}

// ==========================================
// 比较运算符 (Comparator)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
}

impl Comparator {
    pub fn evaluate(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::Gt => value > threshold,
            Comparator::Ge => value >= threshold,
            Comparator::Lt => value < threshold,
            Comparator::Le => value <= threshold,
            Comparator::Eq => value == threshold,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Eq => "=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ==========================================
// 行处理状态 (Processing Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与结果表 processing_status 列一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    Success,
    Error,
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingStatus::Success => write!(f, "SUCCESS"),
            ProcessingStatus::Error => write!(f, "ERROR"),
        }
    }
}

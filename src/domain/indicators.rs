// ==========================================
// 地点风险评分引擎 - 原始指标与校验后指标
// ==========================================
// RawIndicators: 调用方提供的原始输入（宽松类型，可能缺失/类型错误）
// ValidatedIndicators: 归一化器校验通过后的强类型指标
// ==========================================

use crate::domain::types::IndicatorField;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// RawValue - 原始字段值
// ==========================================
// JSON 单条请求: 数值/字符串/其他
// 表格批量输入: 一律为文本，由归一化器解析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawValue {
    /// 类型名（用于错误信息）
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Number(_) => "number",
            RawValue::Text(_) => "string",
            RawValue::Other(serde_json::Value::Bool(_)) => "bool",
            RawValue::Other(serde_json::Value::Array(_)) => "array",
            RawValue::Other(serde_json::Value::Object(_)) => "object",
            RawValue::Other(serde_json::Value::Null) => "null",
            RawValue::Other(_) => "unknown",
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

// ==========================================
// RawIndicators - 原始指标（不可变输入）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIndicators {
    /// 地点标识（可选，原样回传）
    #[serde(default, alias = "city", skip_serializing_if = "Option::is_none")]
    pub location_label: Option<String>,

    #[serde(default)]
    pub crime_index: Option<RawValue>,

    #[serde(default)]
    pub accident_rate: Option<RawValue>,

    #[serde(default)]
    pub socioeconomic_level: Option<RawValue>,

    #[serde(default)]
    pub weather: Option<RawValue>,

    /// 非指标列（列名, 单元格）,按表头顺序原样回写到结果表
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<(String, String)>,
}

impl RawIndicators {
    /// 以强类型值构造（单条调用路径）
    pub fn new(
        crime_index: f64,
        accident_rate: f64,
        socioeconomic_level: f64,
        weather: impl Into<String>,
    ) -> Self {
        Self {
            location_label: None,
            crime_index: Some(RawValue::Number(crime_index)),
            accident_rate: Some(RawValue::Number(accident_rate)),
            socioeconomic_level: Some(RawValue::Number(socioeconomic_level)),
            weather: Some(RawValue::Text(weather.into())),
            extra: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.location_label = Some(label.into());
        self
    }

    /// 从表格行构造（列名 → 文本值）
    ///
    /// 空单元格视为缺失；`city` 与 `location_label` 两种列名均可作为地点标识；
    /// 其余列按 `headers` 顺序保存在 `extra`
    pub fn from_row(headers: &[String], row: &HashMap<String, String>) -> Self {
        let cell = |name: &str| -> Option<RawValue> {
            row.get(name)
                .filter(|v| !v.trim().is_empty())
                .map(|v| RawValue::Text(v.clone()))
        };

        let location_label = row
            .get("city")
            .or_else(|| row.get("location_label"))
            .filter(|v| !v.is_empty())
            .cloned();

        let extra = headers
            .iter()
            .filter(|h| !is_known_column(h))
            .map(|h| (h.clone(), row.get(h).cloned().unwrap_or_default()))
            .collect();

        Self {
            location_label,
            crime_index: cell("crime_index"),
            accident_rate: cell("accident_rate"),
            socioeconomic_level: cell("socioeconomic_level"),
            weather: cell("weather"),
            extra,
        }
    }

    /// 按字段取原始值
    pub fn get(&self, field: IndicatorField) -> Option<&RawValue> {
        match field {
            IndicatorField::CrimeIndex => self.crime_index.as_ref(),
            IndicatorField::AccidentRate => self.accident_rate.as_ref(),
            IndicatorField::SocioeconomicLevel => self.socioeconomic_level.as_ref(),
            IndicatorField::Weather => self.weather.as_ref(),
        }
    }

    /// 原始字段的展示文本（缺失为空串），失败行回写时使用
    pub fn display_value(&self, field: IndicatorField) -> String {
        self.get(field).map(|v| v.to_string()).unwrap_or_default()
    }
}

/// 指标列与地点标识列
fn is_known_column(header: &str) -> bool {
    header == "city"
        || header == "location_label"
        || header.parse::<IndicatorField>().is_ok()
}

// ==========================================
// ValidatedIndicators - 校验通过的指标
// ==========================================
// 规则引擎基于此结构评估（归一化前的原始量纲）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedIndicators {
    pub location_label: Option<String>,
    pub crime_index: f64,
    pub accident_rate: f64,
    pub socioeconomic_level: f64,
    /// 天气类别（已解析为类别表中的规范名称）
    pub weather: String,
}

impl ValidatedIndicators {
    pub fn numeric(&self, field: IndicatorField) -> Option<f64> {
        match field {
            IndicatorField::CrimeIndex => Some(self.crime_index),
            IndicatorField::AccidentRate => Some(self.accident_rate),
            IndicatorField::SocioeconomicLevel => Some(self.socioeconomic_level),
            IndicatorField::Weather => None,
        }
    }

    pub fn categorical(&self, field: IndicatorField) -> Option<&str> {
        match field {
            IndicatorField::Weather => Some(self.weather.as_str()),
            _ => None,
        }
    }
}

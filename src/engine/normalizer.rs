// ==========================================
// 地点风险评分引擎 - 指标归一化器
// ==========================================
// 职责: 原始指标校验 + 映射到 [0, 1] 分量
// 校验顺序: crime_index → accident_rate → socioeconomic_level → weather
// 只报告第一个违规字段
// ==========================================

use crate::config::EngineConfig;
use crate::domain::indicators::{RawIndicators, RawValue, ValidatedIndicators};
use crate::domain::types::IndicatorField;
use crate::engine::error::ValidationError;
use std::collections::{BTreeMap, HashMap};

/// 地点标识最大长度（字符）
pub const MAX_LABEL_CHARS: usize = 100;

/// 各指标的单位区间分量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitComponents {
    pub crime_index: f64,
    pub accident_rate: f64,
    pub socioeconomic_level: f64,
    pub weather: f64,
}

impl UnitComponents {
    pub fn get(&self, field: IndicatorField) -> f64 {
        match field {
            IndicatorField::CrimeIndex => self.crime_index,
            IndicatorField::AccidentRate => self.accident_rate,
            IndicatorField::SocioeconomicLevel => self.socioeconomic_level,
            IndicatorField::Weather => self.weather,
        }
    }
}

// ==========================================
// IndicatorNormalizer
// ==========================================
#[derive(Debug, Clone)]
pub struct IndicatorNormalizer {
    weather_categories: BTreeMap<String, f64>,
    /// 小写 → 规范类别名（仅大小写不敏感模式使用）
    folded_categories: HashMap<String, String>,
    case_insensitive: bool,
    reject_unknown_weather: bool,
    unknown_weather_severity: f64,
}

impl IndicatorNormalizer {
    pub fn new(config: &EngineConfig) -> Self {
        let folded_categories = config
            .weather_categories
            .keys()
            .map(|k| (k.to_lowercase(), k.clone()))
            .collect();

        Self {
            weather_categories: config.weather_categories.clone(),
            folded_categories,
            case_insensitive: config.weather_case_insensitive,
            reject_unknown_weather: config.reject_unknown_weather,
            unknown_weather_severity: config.unknown_weather_severity,
        }
    }

    /// 已识别的天气类别
    pub fn weather_categories(&self) -> Vec<String> {
        self.weather_categories.keys().cloned().collect()
    }

    // ==========================================
    // 校验
    // ==========================================

    /// 校验原始指标
    ///
    /// # 返回
    /// - Ok(ValidatedIndicators): 全部字段合法
    /// - Err(ValidationError): 按字段顺序遇到的第一个违规
    pub fn validate(&self, raw: &RawIndicators) -> Result<ValidatedIndicators, ValidationError> {
        let crime_index = self.validate_numeric(IndicatorField::CrimeIndex, raw)?;
        let accident_rate = self.validate_numeric(IndicatorField::AccidentRate, raw)?;
        let socioeconomic_level = self.validate_numeric(IndicatorField::SocioeconomicLevel, raw)?;
        let weather = self.validate_weather(raw)?;
        let location_label = validate_label(raw.location_label.as_deref())?;

        Ok(ValidatedIndicators {
            location_label,
            crime_index,
            accident_rate,
            socioeconomic_level,
            weather,
        })
    }

    fn validate_numeric(
        &self,
        field: IndicatorField,
        raw: &RawIndicators,
    ) -> Result<f64, ValidationError> {
        let name = field.as_str();
        let value = match raw.get(field) {
            None => return Err(ValidationError::new(name, "", "缺少必填字段")),
            Some(RawValue::Number(n)) => *n,
            Some(RawValue::Text(s)) => s.trim().parse::<f64>().map_err(|_| {
                ValidationError::new(name, s.as_str(), "必须为数值，实际为非数值文本")
            })?,
            Some(other) => {
                return Err(ValidationError::new(
                    name,
                    other.to_string(),
                    format!("必须为数值，实际为 {}", other.type_name()),
                ))
            }
        };

        if !value.is_finite() {
            return Err(ValidationError::new(name, value.to_string(), "必须为有限数值"));
        }

        if let Some((min, max)) = field.valid_range() {
            if value < min || value > max {
                return Err(ValidationError::new(
                    name,
                    value.to_string(),
                    format!("必须位于 [{}, {}]", min, max),
                ));
            }
        }

        Ok(value)
    }

    fn validate_weather(&self, raw: &RawIndicators) -> Result<String, ValidationError> {
        let name = IndicatorField::Weather.as_str();
        let label = match raw.weather.as_ref() {
            None => return Err(ValidationError::new(name, "", "缺少必填字段")),
            Some(RawValue::Text(s)) => s.trim(),
            Some(other) => {
                return Err(ValidationError::new(
                    name,
                    other.to_string(),
                    format!("必须为字符串，实际为 {}", other.type_name()),
                ))
            }
        };

        if label.is_empty() {
            return Err(ValidationError::new(name, "", "不能为空"));
        }

        match self.resolve_category(label) {
            Some(canonical) => Ok(canonical),
            None if self.reject_unknown_weather => Err(ValidationError::new(
                name,
                label,
                format!("未知天气类别，允许值: {}", self.weather_categories().join(", ")),
            )),
            None => Ok(label.to_string()),
        }
    }

    /// 将输入标签解析为类别表中的规范名称
    fn resolve_category(&self, label: &str) -> Option<String> {
        if self.weather_categories.contains_key(label) {
            return Some(label.to_string());
        }
        if self.case_insensitive {
            return self.folded_categories.get(&label.to_lowercase()).cloned();
        }
        None
    }

    // ==========================================
    // 归一化
    // ==========================================

    /// 映射到单位区间
    ///
    /// - crime_index / accident_rate: value / 10
    /// - socioeconomic_level: (10 - value) / 9（反向: 1 → 1.0, 10 → 0.0）
    /// - weather: 类别表查值
    pub fn normalize(&self, indicators: &ValidatedIndicators) -> UnitComponents {
        UnitComponents {
            crime_index: indicators.crime_index / 10.0,
            accident_rate: indicators.accident_rate / 10.0,
            socioeconomic_level: (10.0 - indicators.socioeconomic_level) / 9.0,
            weather: self.weather_severity(&indicators.weather),
        }
    }

    fn weather_severity(&self, weather: &str) -> f64 {
        self.weather_categories
            .get(weather)
            .copied()
            .unwrap_or(self.unknown_weather_severity)
    }
}

fn validate_label(label: Option<&str>) -> Result<Option<String>, ValidationError> {
    let label = match label {
        Some(l) if !l.is_empty() => l,
        _ => return Ok(None),
    };

    if label.trim().is_empty() {
        return Err(ValidationError::new(
            "location_label",
            label,
            "不能为空白字符串",
        ));
    }

    if label.trim().chars().count() > MAX_LABEL_CHARS {
        return Err(ValidationError::new(
            "location_label",
            label,
            format!("长度不能超过 {} 个字符", MAX_LABEL_CHARS),
        ));
    }

    Ok(Some(label.to_string()))
}

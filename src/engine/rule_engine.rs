// ==========================================
// 地点风险评分引擎 - 放大规则引擎
// ==========================================
// 规则: 按声明顺序评估全部规则,所有命中规则的乘数累乘（不是首个命中即止）
// 条件: 同一规则内的条件为 AND 关系
// 规则以数据声明,由本解释器统一评估
// ==========================================

use crate::config::{ConditionSpec, ConfigError, RuleSpec};
use crate::domain::indicators::ValidatedIndicators;
use crate::domain::result::AppliedRule;
use crate::domain::types::{Comparator, IndicatorField};
use std::collections::BTreeSet;

/// 条件判定
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTest {
    Compare { op: Comparator, threshold: f64 },
    OneOf(BTreeSet<String>),
}

/// 字段条件
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCondition {
    pub field: IndicatorField,
    pub test: ConditionTest,
}

impl FieldCondition {
    pub fn matches(&self, indicators: &ValidatedIndicators) -> bool {
        match &self.test {
            ConditionTest::Compare { op, threshold } => indicators
                .numeric(self.field)
                .map(|v| op.evaluate(v, *threshold))
                .unwrap_or(false),
            ConditionTest::OneOf(set) => indicators
                .categorical(self.field)
                .map(|v| set.contains(v))
                .unwrap_or(false),
        }
    }
}

/// 编译后的放大规则
#[derive(Debug, Clone, PartialEq)]
pub struct AmplificationRule {
    pub description: String,
    pub multiplier: f64,
    pub conditions: Vec<FieldCondition>,
}

impl AmplificationRule {
    /// 编译规则声明
    ///
    /// # 参数
    /// - index: 规则在配置中的位置（用于错误信息）
    pub fn compile(index: usize, spec: &RuleSpec) -> Result<Self, ConfigError> {
        let fail = |message: String| ConfigError::InvalidRule {
            index,
            description: spec.description.clone(),
            message,
        };

        if !spec.multiplier.is_finite() || spec.multiplier <= 0.0 {
            return Err(fail(format!("乘数必须为正数，实际为 {}", spec.multiplier)));
        }
        if spec.conditions.is_empty() {
            return Err(fail("至少需要一个条件".to_string()));
        }

        let mut conditions = Vec::with_capacity(spec.conditions.len());
        for (field_name, condition) in &spec.conditions {
            let field: IndicatorField = field_name.parse().map_err(fail)?;
            let test = compile_condition(field, condition).map_err(fail)?;
            conditions.push(FieldCondition { field, test });
        }

        Ok(Self {
            description: spec.description.clone(),
            multiplier: spec.multiplier,
            conditions,
        })
    }

    pub fn matches(&self, indicators: &ValidatedIndicators) -> bool {
        self.conditions.iter().all(|c| c.matches(indicators))
    }
}

fn compile_condition(field: IndicatorField, spec: &ConditionSpec) -> Result<ConditionTest, String> {
    match spec {
        ConditionSpec::Expr(expr) => {
            if !field.is_numeric() {
                return Err(format!("字段 {} 为类别字段，不支持比较表达式 \"{}\"", field, expr));
            }
            let (op, threshold) = parse_comparison(expr)?;
            Ok(ConditionTest::Compare { op, threshold })
        }
        ConditionSpec::Equals(value) => {
            if !field.is_numeric() {
                return Err(format!("字段 {} 为类别字段，不支持数值相等条件", field));
            }
            Ok(ConditionTest::Compare {
                op: Comparator::Eq,
                threshold: *value,
            })
        }
        ConditionSpec::OneOf(values) => {
            if field.is_numeric() {
                return Err(format!("字段 {} 为数值字段，不支持集合条件", field));
            }
            if values.is_empty() {
                return Err(format!("字段 {} 的集合条件为空", field));
            }
            Ok(ConditionTest::OneOf(values.iter().cloned().collect()))
        }
    }
}

/// 解析比较表达式（">7" / ">= 2.5" / "<3" / "<=4" / "=5"）
pub fn parse_comparison(expr: &str) -> Result<(Comparator, f64), String> {
    let expr = expr.trim();
    let (op, rest) = if let Some(rest) = expr.strip_prefix(">=") {
        (Comparator::Ge, rest)
    } else if let Some(rest) = expr.strip_prefix("<=") {
        (Comparator::Le, rest)
    } else if let Some(rest) = expr.strip_prefix('>') {
        (Comparator::Gt, rest)
    } else if let Some(rest) = expr.strip_prefix('<') {
        (Comparator::Lt, rest)
    } else if let Some(rest) = expr.strip_prefix('=') {
        (Comparator::Eq, rest)
    } else {
        return Err(format!("无法识别的比较运算符: \"{}\"", expr));
    };

    let threshold = rest
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| format!("无法解析阈值: \"{}\"", expr))?;

    Ok((op, threshold))
}

/// 规则评估结果
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluation {
    pub multiplier: f64,
    /// 命中规则（声明顺序）
    pub applied: Vec<AppliedRule>,
}

// ==========================================
// RuleEngine
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<AmplificationRule>,
}

impl RuleEngine {
    /// 编译全部规则,任一规则非法即失败
    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self, ConfigError> {
        let rules = specs
            .iter()
            .enumerate()
            .map(|(idx, spec)| AmplificationRule::compile(idx, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[AmplificationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 计算累计乘数
    pub fn evaluate(&self, indicators: &ValidatedIndicators) -> RuleEvaluation {
        let mut multiplier = 1.0;
        let mut applied = Vec::new();

        for rule in &self.rules {
            if rule.matches(indicators) {
                multiplier *= rule.multiplier;
                applied.push(AppliedRule {
                    description: rule.description.clone(),
                    multiplier: rule.multiplier,
                });
            }
        }

        RuleEvaluation {
            multiplier,
            applied,
        }
    }
}

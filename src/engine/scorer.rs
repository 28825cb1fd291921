// ==========================================
// 地点风险评分引擎 - 风险评分器
// ==========================================
// 流水线（固定顺序）:
// 1. 校验 + 归一化
// 2. 加权聚合 base = Σ(component × weight)
// 3. 规则放大 amplified = base × multiplier
// 4. 噪声注入（noise_level == 0 时完全跳过）
// 5. 截断到 [0, 1]
// 6. 按输出量程缩放并保留 2 位小数
// ==========================================
// 构造后配置只读,可跨线程共享（Arc<RiskScorer>）
// ==========================================

use crate::config::{ConfigError, EngineConfig};
use crate::domain::indicators::RawIndicators;
use crate::domain::result::{ComponentScores, RiskResult};
use crate::domain::types::IndicatorField;
use crate::engine::error::EngineResult;
use crate::engine::normalizer::{IndicatorNormalizer, UnitComponents};
use crate::engine::rule_engine::RuleEngine;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// 输出保留的小数位
pub const SCORE_DECIMALS: i32 = 2;

/// 评分器配置概览
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorInfo {
    pub weights: BTreeMap<IndicatorField, f64>,
    pub rules_count: usize,
    pub noise_level: f64,
    pub weather_categories: Vec<String>,
    pub output_scale: f64,
}

// ==========================================
// RiskScorer
// ==========================================
#[derive(Debug, Clone)]
pub struct RiskScorer {
    config: EngineConfig,
    normalizer: IndicatorNormalizer,
    rule_engine: RuleEngine,
}

impl RiskScorer {
    /// 构造评分器（配置错误在此处暴露）
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rule_engine = RuleEngine::from_specs(&config.rules)?;
        let normalizer = IndicatorNormalizer::new(&config);

        Ok(Self {
            config,
            normalizer,
            rule_engine,
        })
    }

    /// 关闭噪声的副本
    pub fn deterministic(&self) -> Self {
        let mut scorer = self.clone();
        scorer.config.noise_level = 0.0;
        scorer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn info(&self) -> ProcessorInfo {
        ProcessorInfo {
            weights: self.config.weights.clone(),
            rules_count: self.rule_engine.len(),
            noise_level: self.config.noise_level,
            weather_categories: self.normalizer.weather_categories(),
            output_scale: self.config.output_scale,
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 对单条记录评分
    ///
    /// # 返回
    /// - Ok(RiskResult)
    /// - Err(ScoringError::Validation): 校验失败,原样抛给调用方
    pub fn score(&self, raw: &RawIndicators) -> EngineResult<RiskResult> {
        // 1. 校验 + 归一化
        let indicators = self.normalizer.validate(raw)?;
        let components = self.normalizer.normalize(&indicators);

        // 2. 加权聚合
        let base = self.weighted_base(&components);

        // 3. 规则放大
        let evaluation = self.rule_engine.evaluate(&indicators);
        let amplified = base * evaluation.multiplier;

        // 4. 噪声注入
        let noisy = if self.config.noise_level > 0.0 {
            let noise_level = self.config.noise_level;
            amplified + rand::thread_rng().gen_range(-noise_level..=noise_level)
        } else {
            amplified
        };

        // 5-6. 截断 + 缩放
        let final_score = self.scale(noisy.clamp(0.0, 1.0));

        debug!(
            label = ?indicators.location_label,
            base,
            multiplier = evaluation.multiplier,
            final_score,
            "记录评分完成"
        );

        Ok(RiskResult {
            identifier: indicators.location_label,
            final_score,
            components: self.component_scores(&components),
            applied_rules: evaluation.applied,
        })
    }

    fn weighted_base(&self, components: &UnitComponents) -> f64 {
        IndicatorField::ALL
            .iter()
            .map(|field| components.get(*field) * self.config.weight_of(*field))
            .sum()
    }

    fn component_scores(&self, components: &UnitComponents) -> ComponentScores {
        ComponentScores {
            crime_index: self.scale(components.crime_index),
            accident_rate: self.scale(components.accident_rate),
            socioeconomic_level: self.scale(components.socioeconomic_level),
            weather: self.scale(components.weather),
        }
    }

    /// [0, 1] → [0, output_scale]，保留 2 位小数
    fn scale(&self, unit: f64) -> f64 {
        let scaled = (unit * self.config.output_scale).clamp(0.0, self.config.output_scale);
        round_to(scaled, SCORE_DECIMALS)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ==========================================
// 地点风险评分引擎 - 评分结果
// ==========================================
// 注意: components 是加权/放大/噪声之前的归一化分量（按输出量程缩放），
// 仅用于解释，与 final_score 之间不存在可还原的代数关系
// ==========================================

use serde::{Deserialize, Serialize};

/// 各指标分量得分（0 ~ output_scale）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub crime_index: f64,
    pub accident_rate: f64,
    pub socioeconomic_level: f64,
    pub weather: f64,
}

/// 命中的放大规则（按声明顺序记录）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedRule {
    pub description: String,
    pub multiplier: f64,
}

/// 单条记录的评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// 地点标识（原样回传）
    pub identifier: Option<String>,
    /// 最终风险分（0 ~ output_scale，保留 2 位小数）
    pub final_score: f64,
    pub components: ComponentScores,
    pub applied_rules: Vec<AppliedRule>,
}

impl RiskResult {
    /// 命中规则的累计乘数
    pub fn cumulative_multiplier(&self) -> f64 {
        self.applied_rules.iter().map(|r| r.multiplier).product()
    }

    /// 命中规则的描述列表
    pub fn rule_descriptions(&self) -> Vec<&str> {
        self.applied_rules
            .iter()
            .map(|r| r.description.as_str())
            .collect()
    }
}

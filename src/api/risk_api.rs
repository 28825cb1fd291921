// ==========================================
// 地点风险评分引擎 - 评分 API
// ==========================================
// 职责: 单条评分 / 文件批量评分 / 配置概览 / 健康检查
// 上游: 命令行入口（或任意传输层）
// ==========================================

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, EngineConfig};
use crate::domain::batch::BatchSummary;
use crate::domain::indicators::RawIndicators;
use crate::domain::result::RiskResult;
use crate::engine::batch_executor::BatchOptions;
use crate::engine::scorer::{ProcessorInfo, RiskScorer};
use crate::importer::risk_importer::RiskImporter;

// ==========================================
// HealthStatus - 健康检查结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub rules_count: usize,
    pub weather_categories: usize,
}

// ==========================================
// RiskApi - 评分 API
// ==========================================

/// 评分API
///
/// 职责：
/// 1. 单条记录评分（强类型 / JSON 文本）
/// 2. 表格文件批量评分并写出结果表
/// 3. 配置概览与健康检查
pub struct RiskApi {
    scorer: Arc<RiskScorer>,
    importer: RiskImporter,
}

impl RiskApi {
    /// 由配置创建（配置非法时返回 ApiError::Config）
    pub fn new(config: EngineConfig) -> ApiResult<Self> {
        let options = BatchOptions::from(&config.batch);
        let scorer = Arc::new(RiskScorer::new(config)?);
        let importer = RiskImporter::new(Arc::clone(&scorer), options);

        info!(
            rules = scorer.info().rules_count,
            noise_level = scorer.config().noise_level,
            "评分API初始化完成"
        );
        Ok(Self { scorer, importer })
    }

    pub fn from_manager(manager: ConfigManager) -> ApiResult<Self> {
        debug!(source = ?manager.source(), "使用配置来源");
        Self::new(manager.into_config())
    }

    pub fn scorer(&self) -> &Arc<RiskScorer> {
        &self.scorer
    }

    // ==========================================
    // 单条评分
    // ==========================================

    pub fn score_record(&self, raw: &RawIndicators) -> ApiResult<RiskResult> {
        Ok(self.scorer.score(raw)?)
    }

    /// JSON 文本 → 评分结果
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): JSON 无法解析为记录对象
    /// - Err(ApiError::Validation): 字段校验失败
    pub fn score_json(&self, json: &str) -> ApiResult<RiskResult> {
        let raw: RawIndicators = serde_json::from_str(json)
            .map_err(|e| ApiError::InvalidInput(format!("JSON 解析失败: {}", e)))?;
        self.score_record(&raw)
    }

    // ==========================================
    // 批量评分
    // ==========================================

    /// 读取表格文件,批量评分并写出结果 CSV
    pub async fn process_file(&self, input: &Path, output: &Path) -> ApiResult<BatchSummary> {
        Ok(self.importer.import_and_write(input, output).await?)
    }

    // ==========================================
    // 概览接口
    // ==========================================

    pub fn processor_info(&self) -> ProcessorInfo {
        self.scorer.info()
    }

    pub fn health(&self) -> HealthStatus {
        let info = self.scorer.info();
        HealthStatus {
            status: "healthy".to_string(),
            version: crate::VERSION.to_string(),
            rules_count: info.rules_count,
            weather_categories: info.weather_categories.len(),
        }
    }
}

// ==========================================
// 地点风险评分引擎 - 批处理执行器
// ==========================================
// 职责: 有界并发执行单条评分,逐行隔离失败,汇总结果
// 规则:
// - 单行失败（校验错误/异常/panic）转为 RowOutcome::Failure,不影响其他行
// - 输出顺序严格等于输入顺序（按原始下标回排,与完成顺序无关）
// - 分块只用于限制内存与调度开销,不改变语义
// - 无重试
// ==========================================

use crate::config::BatchConfig;
use crate::domain::batch::{BatchSummary, RowOutcome};
use crate::domain::indicators::RawIndicators;
use crate::domain::result::RiskResult;
use crate::engine::error::{BatchError, BatchResult, EngineResult, ScoringError};
use crate::engine::scorer::RiskScorer;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

/// 超时后未派发记录的错误信息
pub const TIMEOUT_MESSAGE: &str = "批处理超时，记录未处理";

/// panic 等非预期错误对外暴露的通用信息
pub const UNEXPECTED_MESSAGE: &str = "内部错误，记录未完成评分";

// ==========================================
// RecordScorer Trait
// ==========================================
// 用途: 批处理执行器的评分接口
// 实现者: RiskScorer
pub trait RecordScorer: Send + Sync + 'static {
    fn score_record(&self, raw: &RawIndicators) -> EngineResult<RiskResult>;
}

impl RecordScorer for RiskScorer {
    fn score_record(&self, raw: &RawIndicators) -> EngineResult<RiskResult> {
        self.score(raw)
    }
}

// ==========================================
// 批处理参数
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub max_workers: usize,
    pub chunk_size: usize,
    pub timeout: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from(&BatchConfig::default())
    }
}

impl From<&BatchConfig> for BatchOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            max_workers: config.max_workers,
            chunk_size: config.chunk_size,
            timeout: config.timeout(),
        }
    }
}

impl BatchOptions {
    pub fn new(max_workers: usize, chunk_size: usize) -> Self {
        Self {
            max_workers,
            chunk_size,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn validate(&self) -> BatchResult<()> {
        if self.max_workers == 0 {
            return Err(BatchError::InvalidOptions {
                key: "max_workers".to_string(),
                message: "至少为 1".to_string(),
            });
        }
        if self.chunk_size == 0 {
            return Err(BatchError::InvalidOptions {
                key: "chunk_size".to_string(),
                message: "至少为 1".to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// BatchExecutor
// ==========================================
pub struct BatchExecutor<S: RecordScorer = RiskScorer> {
    scorer: Arc<S>,
}

impl<S: RecordScorer> Clone for BatchExecutor<S> {
    fn clone(&self) -> Self {
        Self {
            scorer: Arc::clone(&self.scorer),
        }
    }
}

impl<S: RecordScorer> BatchExecutor<S> {
    pub fn new(scorer: Arc<S>) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &Arc<S> {
        &self.scorer
    }

    /// 批量评分
    ///
    /// # 参数
    /// - records: 有序输入记录
    /// - options: 并发度 / 分块大小 / 超时
    ///
    /// # 返回
    /// - Ok(BatchSummary): 行级错误一律内联为 Failure
    /// - Err(BatchError): 仅限空输入/参数非法（派发前检测）
    pub async fn process_batch(
        &self,
        records: Vec<RawIndicators>,
        options: &BatchOptions,
    ) -> BatchResult<BatchSummary> {
        if records.is_empty() {
            return Err(BatchError::EmptyInput);
        }
        options.validate()?;

        let batch_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = options.timeout.map(|t| start + t);
        let total = records.len();

        info!(
            batch_id = %batch_id,
            total,
            max_workers = options.max_workers,
            chunk_size = options.chunk_size,
            "开始批量评分"
        );

        let mut outcomes: Vec<RowOutcome> = Vec::with_capacity(total);
        let mut timed_out = false;
        let mut records = records.into_iter().enumerate().peekable();

        while records.peek().is_some() {
            let chunk: Vec<(usize, RawIndicators)> =
                records.by_ref().take(options.chunk_size).collect();

            let (chunk_outcomes, chunk_timed_out) =
                self.run_chunk(chunk, options.max_workers, deadline).await;

            timed_out |= chunk_timed_out;
            outcomes.extend(chunk_outcomes);
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let summary = BatchSummary {
            batch_id,
            started_at,
            elapsed_ms: start.elapsed().as_millis() as u64,
            total,
            succeeded,
            failed: total - succeeded,
            timed_out,
            outcomes,
        };

        info!(
            batch_id = %summary.batch_id,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            timed_out = summary.timed_out,
            elapsed_ms = summary.elapsed_ms,
            "{}",
            summary.audit_line()
        );

        Ok(summary)
    }

    /// 执行一个分块,返回按原始下标排序的结果
    async fn run_chunk(
        &self,
        chunk: Vec<(usize, RawIndicators)>,
        max_workers: usize,
        deadline: Option<Instant>,
    ) -> (Vec<RowOutcome>, bool) {
        let mut indexed: Vec<(usize, RowOutcome, bool)> = stream::iter(chunk)
            .map(|(idx, raw)| {
                let scorer = Arc::clone(&self.scorer);
                async move {
                    // 派发时检查截止时间: 已过期则不再派发
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        let outcome = RowOutcome::Failure {
                            input: raw,
                            error: TIMEOUT_MESSAGE.to_string(),
                        };
                        return (idx, outcome, true);
                    }
                    (idx, score_isolated(scorer, idx, raw).await, false)
                }
            })
            .buffer_unordered(max_workers)
            .collect()
            .await;

        indexed.sort_unstable_by_key(|(idx, _, _)| *idx);

        let timed_out = indexed.iter().any(|(_, _, skipped)| *skipped);
        let outcomes = indexed.into_iter().map(|(_, outcome, _)| outcome).collect();
        (outcomes, timed_out)
    }
}

/// 单行评分（错误边界）
async fn score_isolated<S: RecordScorer>(scorer: Arc<S>, idx: usize, raw: RawIndicators) -> RowOutcome {
    let input = raw.clone();
    let handle = tokio::task::spawn_blocking(move || scorer.score_record(&raw));

    match handle.await {
        Ok(Ok(result)) => RowOutcome::Success { input, result },
        Ok(Err(err)) => {
            warn!(row = idx + 1, error = %err, "记录评分失败");
            RowOutcome::Failure {
                input,
                error: err.to_string(),
            }
        }
        Err(join_err) => {
            // panic/取消: 细节只进日志,不进结果
            error!(row = idx + 1, error = %join_err, "记录评分任务异常终止");
            RowOutcome::Failure {
                input,
                error: ScoringError::Unexpected(UNEXPECTED_MESSAGE.to_string()).to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn executor() -> BatchExecutor {
        let scorer = RiskScorer::new(EngineConfig::deterministic()).unwrap();
        BatchExecutor::new(Arc::new(scorer))
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let err = executor()
            .process_batch(Vec::new(), &BatchOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, BatchError::EmptyInput);
    }

    #[tokio::test]
    async fn test_zero_workers_rejected() {
        let records = vec![RawIndicators::new(1.0, 1.0, 1.0, "Clear")];
        let err = executor()
            .process_batch(records, &BatchOptions::new(0, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, BatchError::InvalidOptions { .. }));
    }

    #[tokio::test]
    async fn test_chunking_preserves_order() {
        let records: Vec<_> = (0..25)
            .map(|i| RawIndicators::new((i % 11) as f64, 5.0, 5.0, "Rainy").with_label(format!("L{}", i)))
            .collect();

        let summary = executor()
            .process_batch(records, &BatchOptions::new(4, 7))
            .await
            .unwrap();

        assert_eq!(summary.total, 25);
        assert_eq!(summary.succeeded, 25);
        for (i, outcome) in summary.outcomes.iter().enumerate() {
            assert_eq!(outcome.input().location_label, Some(format!("L{}", i)));
        }
    }

    #[tokio::test]
    async fn test_expired_deadline_marks_rows_unprocessed() {
        let records = vec![
            RawIndicators::new(1.0, 1.0, 1.0, "Clear"),
            RawIndicators::new(2.0, 2.0, 2.0, "Rainy"),
        ];
        let options = BatchOptions::new(2, 10).with_timeout(Duration::ZERO);

        let summary = executor().process_batch(records, &options).await.unwrap();

        assert!(summary.timed_out);
        assert_eq!(summary.failed, 2);
        assert!(summary
            .outcomes
            .iter()
            .all(|o| o.error() == Some(TIMEOUT_MESSAGE)));
    }
}

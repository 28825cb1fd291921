// ==========================================
// BatchExecutor 集成测试
// ==========================================
// 测试目标: 逐行失败隔离 / 输入顺序输出 / 计数一致性 / 异常隔离
// ==========================================


use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use location_risk_engine::domain::result::{ComponentScores, RiskResult};
use location_risk_engine::engine::batch_executor::{TIMEOUT_MESSAGE, UNEXPECTED_MESSAGE};
use location_risk_engine::engine::{EngineResult, RecordScorer, ScoringError};
use location_risk_engine::logging;
use location_risk_engine::{BatchExecutor, BatchOptions, RawIndicators, RowOutcome};
use test_helpers::{deterministic_scorer, valid_records};

fn executor() -> BatchExecutor {
    BatchExecutor::new(Arc::new(deterministic_scorer()))
}

// ==========================================
// 测试用评分器
// ==========================================

/// 标签以 "panic" 开头时 panic,否则返回固定结果
struct PanickingScorer;

impl RecordScorer for PanickingScorer {
    fn score_record(&self, raw: &RawIndicators) -> EngineResult<RiskResult> {
        let label = raw.location_label.clone().unwrap_or_default();
        if label.starts_with("panic") {
            panic!("boom at {}", label);
        }
        Ok(fixed_result(label))
    }
}

/// 按标签序号倒序休眠,使完成顺序与输入顺序相反
struct SlowFirstScorer {
    calls: AtomicUsize,
}

impl RecordScorer for SlowFirstScorer {
    fn score_record(&self, raw: &RawIndicators) -> EngineResult<RiskResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let label = raw.location_label.clone().unwrap_or_default();
        let idx: u64 = label.trim_start_matches('L').parse().unwrap_or(0);
        thread::sleep(Duration::from_millis(40u64.saturating_sub(idx * 5)));
        Ok(fixed_result(label))
    }
}

/// 每条记录固定耗时
struct SleepyScorer {
    delay: Duration,
}

impl RecordScorer for SleepyScorer {
    fn score_record(&self, raw: &RawIndicators) -> EngineResult<RiskResult> {
        thread::sleep(self.delay);
        Ok(fixed_result(raw.location_label.clone().unwrap_or_default()))
    }
}

/// 恒定返回非预期错误
struct FailingScorer;

impl RecordScorer for FailingScorer {
    fn score_record(&self, _raw: &RawIndicators) -> EngineResult<RiskResult> {
        Err(ScoringError::Unexpected("下游不可用".to_string()))
    }
}

fn fixed_result(label: String) -> RiskResult {
    RiskResult {
        identifier: Some(label),
        final_score: 50.0,
        components: ComponentScores {
            crime_index: 50.0,
            accident_rate: 50.0,
            socioeconomic_level: 50.0,
            weather: 50.0,
        },
        applied_rules: Vec::new(),
    }
}

fn labels(outcomes: &[RowOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .map(|o| o.input().location_label.clone().unwrap_or_default())
        .collect()
}

// ==========================================
// 失败隔离
// ==========================================

#[tokio::test]
async fn test_invalid_weather_rows_isolated() {
    logging::init_test();

    // N = 30, 每第 4 行天气非法 → K = 8
    let mut records = valid_records(30);
    let mut expected_failures = Vec::new();
    for (i, record) in records.iter_mut().enumerate() {
        if i % 4 == 0 {
            record.weather = Some("Foggy".into());
            expected_failures.push(i + 1);
        }
    }
    let expected_labels: Vec<String> = (0..30).map(|i| format!("L{}", i)).collect();

    let summary = executor()
        .process_batch(records, &BatchOptions::new(4, 8))
        .await
        .unwrap();

    assert_eq!(summary.total, 30);
    assert_eq!(summary.failed, 8);
    assert_eq!(summary.succeeded, 22);
    assert_eq!(summary.succeeded + summary.failed, summary.total);
    assert_eq!(labels(&summary.outcomes), expected_labels);

    let failed_rows: Vec<usize> = summary.failures().iter().map(|(row, _)| *row).collect();
    assert_eq!(failed_rows, expected_failures);
    for (_, message) in summary.failures() {
        assert!(message.contains("weather"));
        assert!(message.contains("Foggy"));
    }
}

#[tokio::test]
async fn test_failure_keeps_original_input() {
    let bad = RawIndicators::new(11.0, 1.0, 1.0, "Clear").with_label("Out of range");
    let good = RawIndicators::new(1.0, 1.0, 1.0, "Clear").with_label("Fine");

    let summary = executor()
        .process_batch(vec![bad.clone(), good], &BatchOptions::default())
        .await
        .unwrap();

    match &summary.outcomes[0] {
        RowOutcome::Failure { input, error } => {
            assert_eq!(input, &bad);
            assert!(error.contains("crime_index"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    let success = summary.outcomes[1].result().unwrap();
    assert_eq!(success.identifier.as_deref(), Some("Fine"));
}

#[tokio::test]
async fn test_panicking_record_becomes_generic_failure() {
    let records = vec![
        RawIndicators::new(1.0, 1.0, 1.0, "Clear").with_label("ok-1"),
        RawIndicators::new(1.0, 1.0, 1.0, "Clear").with_label("panic-2"),
        RawIndicators::new(1.0, 1.0, 1.0, "Clear").with_label("ok-3"),
    ];

    let summary = BatchExecutor::new(Arc::new(PanickingScorer))
        .process_batch(records, &BatchOptions::new(2, 10))
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);

    let error = summary.outcomes[1].error().unwrap();
    assert!(error.contains(UNEXPECTED_MESSAGE));
    assert!(!error.contains("boom"));
}

#[tokio::test]
async fn test_unexpected_errors_never_abort_batch() {
    let summary = BatchExecutor::new(Arc::new(FailingScorer))
        .process_batch(valid_records(5), &BatchOptions::new(3, 2))
        .await
        .unwrap();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.failed, 5);
    assert_eq!(summary.audit_line(), "5 errors out of 5 rows processed");
}

// ==========================================
// 顺序
// ==========================================

#[tokio::test]
async fn test_output_order_independent_of_completion_order() {
    let scorer = Arc::new(SlowFirstScorer {
        calls: AtomicUsize::new(0),
    });
    let records: Vec<RawIndicators> = (0..8)
        .map(|i| RawIndicators::new(1.0, 1.0, 1.0, "Clear").with_label(format!("L{}", i)))
        .collect();

    let summary = BatchExecutor::new(Arc::clone(&scorer))
        .process_batch(records, &BatchOptions::new(8, 100))
        .await
        .unwrap();

    assert_eq!(scorer.calls.load(Ordering::SeqCst), 8);
    let expected: Vec<String> = (0..8).map(|i| format!("L{}", i)).collect();
    assert_eq!(labels(&summary.outcomes), expected);
}

#[tokio::test]
async fn test_chunk_size_does_not_change_results() {
    let records = valid_records(23);

    let whole = executor()
        .process_batch(records.clone(), &BatchOptions::new(8, 1000))
        .await
        .unwrap();
    let chunked = executor()
        .process_batch(records, &BatchOptions::new(3, 4))
        .await
        .unwrap();

    assert_eq!(whole.outcomes, chunked.outcomes);
    assert_eq!(whole.succeeded, chunked.succeeded);
}

// ==========================================
// 超时
// ==========================================

#[tokio::test]
async fn test_timeout_fails_undispatched_rows_in_order() {
    let scorer = Arc::new(SleepyScorer {
        delay: Duration::from_millis(300),
    });
    let records: Vec<RawIndicators> = (0..6)
        .map(|i| RawIndicators::new(1.0, 1.0, 1.0, "Clear").with_label(format!("L{}", i)))
        .collect();

    // 两个并发槽: L0/L1 于 0ms 分派, L2/L3 于约 300ms 分派, L4/L5 于约 600ms 时已过期
    let options = BatchOptions::new(2, 100).with_timeout(Duration::from_millis(450));
    let summary = BatchExecutor::new(scorer)
        .process_batch(records, &options)
        .await
        .unwrap();

    assert!(summary.timed_out);
    assert_eq!(summary.total, 6);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 2);

    let expected: Vec<String> = (0..6).map(|i| format!("L{}", i)).collect();
    assert_eq!(labels(&summary.outcomes), expected);

    for outcome in &summary.outcomes[..4] {
        assert!(outcome.result().is_some());
    }
    for outcome in &summary.outcomes[4..] {
        assert_eq!(outcome.error(), Some(TIMEOUT_MESSAGE));
    }
}

// ==========================================
// 汇总元数据
// ==========================================

#[tokio::test]
async fn test_summary_metadata() {
    let summary = executor()
        .process_batch(valid_records(3), &BatchOptions::default())
        .await
        .unwrap();

    assert!(!summary.batch_id.is_empty());
    assert!(!summary.timed_out);
    assert_eq!(summary.audit_line(), "0 errors out of 3 rows processed");

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["outcomes"][0]["status"], "SUCCESS");
}

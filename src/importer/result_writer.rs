// ==========================================
// 地点风险评分引擎 - 结果写出
// ==========================================
// 输出列: 输入列 + 分量 + 处理状态 + 错误信息 + 风险分 + 其余输入列
// 失败行: 分量与风险分留空
// ==========================================

use crate::domain::batch::{BatchSummary, RowOutcome};
use crate::domain::types::IndicatorField;
use crate::importer::error::{ImportError, ImportResult};
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// 输出列顺序
pub const OUTPUT_COLUMNS: [&str; 12] = [
    "city",
    "crime_index",
    "accident_rate",
    "socioeconomic_level",
    "weather",
    "crime_index_component",
    "accident_rate_component",
    "socioeconomic_level_component",
    "weather_component",
    "processing_status",
    "error_message",
    "risk_score",
];

fn format_score(value: f64) -> String {
    format!("{:.2}", value)
}

/// 非指标输入列,按首次出现顺序去重
fn extra_columns(summary: &BatchSummary) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for outcome in &summary.outcomes {
        for (name, _) in &outcome.input().extra {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }
    columns
}

fn outcome_row(outcome: &RowOutcome, extra_columns: &[String]) -> Vec<String> {
    let input = outcome.input();
    let mut row = Vec::with_capacity(OUTPUT_COLUMNS.len() + extra_columns.len());

    row.push(input.location_label.clone().unwrap_or_default());
    for field in IndicatorField::ALL {
        row.push(input.display_value(field));
    }

    match outcome.result() {
        Some(result) => {
            let c = &result.components;
            row.extend(
                [c.crime_index, c.accident_rate, c.socioeconomic_level, c.weather]
                    .into_iter()
                    .map(format_score),
            );
        }
        None => row.extend(std::iter::repeat(String::new()).take(4)),
    }

    row.push(outcome.status().to_string());
    row.push(outcome.error().unwrap_or_default().to_string());
    row.push(
        outcome
            .result()
            .map(|r| format_score(r.final_score))
            .unwrap_or_default(),
    );

    for column in extra_columns {
        let value = input
            .extra
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        row.push(value);
    }
    row
}

pub struct ResultWriter;

impl ResultWriter {
    /// 写出到任意 Writer
    pub fn write<W: Write>(&self, summary: &BatchSummary, out: W) -> ImportResult<()> {
        let extra = extra_columns(summary);
        let mut writer = Writer::from_writer(out);
        writer.write_record(
            OUTPUT_COLUMNS
                .iter()
                .copied()
                .chain(extra.iter().map(String::as_str)),
        )?;
        for outcome in &summary.outcomes {
            writer.write_record(outcome_row(outcome, &extra))?;
        }
        writer
            .flush()
            .map_err(|e| ImportError::WriteError(e.to_string()))
    }

    pub fn write_to_path(&self, summary: &BatchSummary, path: &Path) -> ImportResult<()> {
        let file = File::create(path).map_err(|e| {
            ImportError::WriteError(format!("{}: {}", path.display(), e))
        })?;
        self.write(summary, file)?;

        info!(
            batch_id = %summary.batch_id,
            output = %path.display(),
            rows = summary.outcomes.len(),
            "评分结果已写出"
        );
        Ok(())
    }

    pub fn to_csv_string(&self, summary: &BatchSummary) -> ImportResult<String> {
        let mut buf = Vec::new();
        self.write(summary, &mut buf)?;
        String::from_utf8(buf).map_err(|e| ImportError::WriteError(e.to_string()))
    }
}

// ==========================================
// 地点风险评分引擎 - 行映射器
// ==========================================
// 职责: 表结构校验（整批） + 行 → RawIndicators
// 行内数据问题不在此处判定,交由评分器逐行校验
// ==========================================

use crate::domain::indicators::RawIndicators;
use crate::domain::types::IndicatorField;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::ParsedTable;

/// 必填列（与指标字段同名）
pub fn required_columns() -> Vec<&'static str> {
    IndicatorField::ALL.iter().map(|f| f.as_str()).collect()
}

pub struct RecordMapper;

impl RecordMapper {
    /// 表结构校验
    pub fn validate_structure(&self, table: &ParsedTable) -> ImportResult<()> {
        if table.rows.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        let missing: Vec<String> = required_columns()
            .into_iter()
            .filter(|col| !table.headers.iter().any(|h| h == col))
            .map(str::to_string)
            .collect();

        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }
        Ok(())
    }

    /// 校验并映射全部行（保持原顺序）
    pub fn map_table(&self, table: &ParsedTable) -> ImportResult<Vec<RawIndicators>> {
        self.validate_structure(table)?;
        Ok(table
            .rows
            .iter()
            .map(|row| RawIndicators::from_row(&table.headers, row))
            .collect())
    }
}

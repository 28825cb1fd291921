// ==========================================
// 地点风险评分引擎 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 表头重复直接拒绝; 全空白行跳过并计数
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, ParsedTable};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// 检查文件存在 + 扩展名
fn check_file(path: &Path, allowed: &[&str]) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let ext = file_extension(path);
    if !allowed.contains(&ext.as_str()) {
        return Err(ImportError::UnsupportedFormat(ext));
    }
    Ok(())
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 表头校验: 重复列名
fn check_headers(headers: &[String]) -> ImportResult<()> {
    let mut seen = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for header in headers {
        if !seen.insert(header.as_str()) && !duplicates.contains(header) {
            duplicates.push(header.clone());
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ImportError::DuplicateColumns(duplicates))
    }
}

/// 按表头组装行; 全空白行返回 None
fn build_row(
    headers: &[String],
    cells: impl Iterator<Item = String>,
) -> Option<HashMap<String, String>> {
    let mut row_map = HashMap::new();
    for (col_idx, value) in cells.enumerate() {
        if let Some(header) = headers.get(col_idx) {
            row_map.insert(header.clone(), value.trim().to_string());
        }
    }

    if row_map.values().all(|v| v.is_empty()) {
        None
    } else {
        Some(row_map)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 从任意 Reader 解析（文件 / 内存文本）
    pub fn parse_reader<R: std::io::Read>(&self, reader: R) -> ImportResult<ParsedTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        check_headers(&headers)?;

        // 读取所有行
        let mut table = ParsedTable {
            headers,
            ..ParsedTable::default()
        };
        for result in reader.records() {
            let record = result?;
            match build_row(&table.headers, record.iter().map(str::to_string)) {
                Some(row) => table.rows.push(row),
                None => table.skipped_blank_rows += 1,
            }
        }

        Ok(table)
    }

    pub fn parse_str(&self, content: &str) -> ImportResult<ParsedTable> {
        self.parse_reader(content.as_bytes())
    }
}

impl FileParser for CsvParser {
    fn parse_table(&self, file_path: &Path) -> ImportResult<ParsedTable> {
        check_file(file_path, &["csv"])?;
        let file = File::open(file_path)?;
        let table = self.parse_reader(file)?;

        debug!(
            file = %file_path.display(),
            rows = table.rows.len(),
            skipped = table.skipped_blank_rows,
            "CSV 解析完成"
        );
        Ok(table)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_table(&self, file_path: &Path) -> ImportResult<ParsedTable> {
        check_file(file_path, &["xlsx", "xls"])?;

        // 打开 Excel 文件
        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = rows.next().ok_or(ImportError::EmptyFile)?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        check_headers(&headers)?;

        // 读取数据行
        let mut table = ParsedTable {
            headers,
            ..ParsedTable::default()
        };
        for data_row in rows {
            match build_row(&table.headers, data_row.iter().map(|c| c.to_string())) {
                Some(row) => table.rows.push(row),
                None => table.skipped_blank_rows += 1,
            }
        }

        debug!(
            file = %file_path.display(),
            sheet = %sheet_name,
            rows = table.rows.len(),
            "Excel 解析完成"
        );
        Ok(table)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_table(&self, file_path: &Path) -> ImportResult<ParsedTable> {
        match file_extension(file_path).as_str() {
            "csv" => CsvParser.parse_table(file_path),
            "xlsx" | "xls" => ExcelParser.parse_table(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

// ==========================================
// 地点风险评分引擎 - 导入层
// ==========================================
// 职责: 表格文件 → 批量评分 → 结果表
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod importer_trait;
pub mod record_mapper;
pub mod result_writer;
pub mod risk_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use record_mapper::RecordMapper;
pub use result_writer::{ResultWriter, OUTPUT_COLUMNS};
pub use risk_importer::RiskImporter;

// 重导出 Trait 接口
pub use importer_trait::{FileParser, ParsedTable, RiskBatchImporter};

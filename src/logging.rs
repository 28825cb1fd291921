// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别
// ==========================================

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 常规日志文件名（INFO 及以上）
pub const GENERAL_LOG_FILE: &str = "general.log";

/// 错误日志文件名（仅 ERROR, JSON 格式）
pub const ERROR_LOG_FILE: &str = "error.log";

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=location_risk_engine=trace
///
/// # 示例
/// ```no_run
/// use location_risk_engine::logging;
/// logging::init();
/// ```
pub fn init() {
    // 从环境变量读取日志级别，默认为 info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // 配置日志格式
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// 初始化双文件日志
///
/// - `general.log`: INFO 及以上,文本格式
/// - `error.log`: 仅 ERROR,JSON 格式
/// - 控制台: 沿用 RUST_LOG（默认 info）
///
/// 目录不存在时自动创建; 已存在全局 subscriber 时返回错误
pub fn init_with_log_dir(log_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(log_dir)?;

    let general = open_append(&log_dir.join(GENERAL_LOG_FILE))?;
    let errors = open_append(&log_dir.join(ERROR_LOG_FILE))?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let general_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(general))
        .with_filter(LevelFilter::INFO);

    let error_layer = fmt::layer()
        .json()
        .with_current_span(false)
        .with_writer(Mutex::new(errors))
        .with_filter(LevelFilter::ERROR);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(general_layer)
        .with(error_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

// ==========================================
// 地点风险评分引擎 - 命令行入口
// ==========================================
// 用法:
//   location-risk-engine score '<json>' [config.json]
//   location-risk-engine batch <input.csv|xlsx> <output.csv> [config.json]
//   location-risk-engine info [config.json]
// 日志目录: 环境变量 RISK_ENGINE_LOG_DIR（未设置时仅输出到控制台）
// ==========================================

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use location_risk_engine::api::{ApiError, RiskApi};
use location_risk_engine::config::ConfigManager;
use location_risk_engine::{logging, APP_NAME, VERSION};

const LOG_DIR_ENV: &str = "RISK_ENGINE_LOG_DIR";

fn usage() -> String {
    format!(
        "{} v{}\n\n用法:\n  score '<json>' [config.json]\n  batch <input> <output.csv> [config.json]\n  info [config.json]",
        APP_NAME, VERSION
    )
}

fn build_api(config_path: Option<&String>) -> Result<RiskApi> {
    let manager = ConfigManager::load(config_path.map(Path::new)).context("配置加载失败")?;
    Ok(RiskApi::from_manager(manager)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    match std::env::var_os(LOG_DIR_ENV) {
        Some(dir) => logging::init_with_log_dir(&PathBuf::from(dir)).context("日志初始化失败")?,
        None => logging::init(),
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!(usage());
    };

    match command.as_str() {
        "score" => {
            let json = args.get(1).context("缺少记录 JSON 参数")?;
            let api = build_api(args.get(2))?;
            match api.score_json(json) {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                Err(ApiError::Validation(e)) => {
                    println!("{}", serde_json::to_string_pretty(&e)?);
                    std::process::exit(2);
                }
                Err(e) => return Err(e.into()),
            }
        }
        "batch" => {
            let (Some(input), Some(output)) = (args.get(1), args.get(2)) else {
                bail!(usage());
            };
            let api = build_api(args.get(3))?;
            let summary = api
                .process_file(Path::new(input), Path::new(output))
                .await?;
            println!("{}", summary.audit_line());
        }
        "info" => {
            let api = build_api(args.get(1))?;
            let report = serde_json::json!({
                "health": api.health(),
                "processor": api.processor_info(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        other => bail!("未知命令: {}\n\n{}", other, usage()),
    }

    Ok(())
}

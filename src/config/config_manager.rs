// ==========================================
// 地点风险评分引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、环境变量覆写、快照导出
// 来源优先级: 显式路径 > RISK_ENGINE_CONFIG > 用户配置目录 > 内置默认值
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::config::error::{ConfigError, ConfigResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 配置键（环境变量名 / 文件名）
pub mod config_keys {
    pub const ENV_CONFIG_PATH: &str = "RISK_ENGINE_CONFIG";
    pub const ENV_NOISE_LEVEL: &str = "RISK_ENGINE_NOISE_LEVEL";
    pub const ENV_MAX_WORKERS: &str = "RISK_ENGINE_MAX_WORKERS";
    pub const ENV_CHUNK_SIZE: &str = "RISK_ENGINE_CHUNK_SIZE";

    pub const APP_DIR_NAME: &str = "location-risk-engine";
    pub const CONFIG_FILE_NAME: &str = "config.json";
}

/// 配置来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
    Inline,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: EngineConfig,
    source: ConfigSource,
}

impl ConfigManager {
    /// 内置默认配置
    pub fn with_defaults() -> Self {
        Self {
            config: EngineConfig::default(),
            source: ConfigSource::Defaults,
        }
    }

    /// 按优先级解析配置并应用环境变量覆写
    ///
    /// # 参数
    /// - explicit_path: 命令行显式指定的配置文件
    pub fn load(explicit_path: Option<&Path>) -> ConfigResult<Self> {
        let env_path = std::env::var(config_keys::ENV_CONFIG_PATH)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let candidate = explicit_path
            .map(Path::to_path_buf)
            .or(env_path)
            .or_else(|| Self::default_config_path().filter(|p| p.exists()));

        let mut manager = match candidate {
            Some(path) => Self::from_file(&path)?,
            None => Self::with_defaults(),
        };

        manager.apply_env_overrides()?;
        manager.config.validate()?;

        info!(
            source = ?manager.source,
            noise_level = manager.config.noise_level,
            rules = manager.config.rules.len(),
            "引擎配置加载完成"
        );

        Ok(manager)
    }

    /// 从 JSON 文件读取
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config: EngineConfig = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "读取配置文件");

        Ok(Self {
            config,
            source: ConfigSource::File(path.to_path_buf()),
        })
    }

    /// 从 JSON 字符串读取
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        Ok(Self {
            config,
            source: ConfigSource::Inline,
        })
    }

    /// 用户配置目录下的默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(config_keys::APP_DIR_NAME)
                .join(config_keys::CONFIG_FILE_NAME)
        })
    }

    /// 应用环境变量覆写
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        if let Some(v) = read_env(config_keys::ENV_NOISE_LEVEL) {
            self.config.noise_level = parse_env(config_keys::ENV_NOISE_LEVEL, &v)?;
        }
        if let Some(v) = read_env(config_keys::ENV_MAX_WORKERS) {
            self.config.batch.max_workers = parse_env(config_keys::ENV_MAX_WORKERS, &v)?;
        }
        if let Some(v) = read_env(config_keys::ENV_CHUNK_SIZE) {
            self.config.batch.chunk_size = parse_env(config_keys::ENV_CHUNK_SIZE, &v)?;
        }
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    pub fn into_config(self) -> EngineConfig {
        self.config
    }

    /// 当前配置快照（JSON）
    pub fn snapshot_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(&self.config)?)
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            message: e.to_string(),
        })
}

// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证配置文件读取、声明式规则与配置校验
// ==========================================

use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use location_risk_engine::config::{
    config_keys, ConfigError, ConfigManager, ConfigSource, EngineConfig,
};
use location_risk_engine::domain::types::IndicatorField;
use location_risk_engine::{RawIndicators, RiskScorer};

const CUSTOM_CONFIG: &str = r#"{
    "weights": {
        "crime_index": 0.5,
        "accident_rate": 0.2,
        "socioeconomic_level": 0.2,
        "weather": 0.1
    },
    "noise_level": 0.0,
    "rules": [
        {
            "description": "Extreme crime in extreme weather",
            "multiplier": 1.5,
            "conditions": { "crime_index": ">=9", "weather": ["Extreme"] }
        },
        {
            "description": "Exact mid accident rate",
            "multiplier": 0.5,
            "conditions": { "accident_rate": 5 }
        }
    ],
    "batch": { "max_workers": 2 }
}"#;

fn config_file(content: &str) -> tempfile::NamedTempFile {
    let mut temp_file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file
}

/// 环境变量为进程级状态,读写环境的测试串行执行
static ENV_LOCK: Mutex<()> = Mutex::new(());

const ENV_KEYS: [&str; 4] = [
    config_keys::ENV_CONFIG_PATH,
    config_keys::ENV_NOISE_LEVEL,
    config_keys::ENV_MAX_WORKERS,
    config_keys::ENV_CHUNK_SIZE,
];

/// 持有环境锁,创建与释放时清空相关环境变量
struct EnvGuard {
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    fn acquire() -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
        Self { _lock: lock }
    }

    fn set(&self, key: &str, value: impl AsRef<std::ffi::OsStr>) {
        std::env::set_var(key, value);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_load_explicit_file() {
    let _env = EnvGuard::acquire();
    let temp_file = config_file(CUSTOM_CONFIG);

    let manager = ConfigManager::load(Some(temp_file.path())).unwrap();

    assert_eq!(
        manager.source(),
        &ConfigSource::File(temp_file.path().to_path_buf())
    );
    let config = manager.config();
    assert_eq!(config.weight_of(IndicatorField::CrimeIndex), 0.5);
    assert_eq!(config.rules.len(), 2);
    // 未给出的字段取默认值
    assert_eq!(config.batch.max_workers, 2);
    assert_eq!(config.batch.chunk_size, 20_000);
    assert_eq!(config.output_scale, 100.0);
    assert_eq!(config.weather_categories.len(), 5);
}

#[test]
fn test_load_uses_config_path_from_env() {
    let env = EnvGuard::acquire();
    let temp_file = config_file(CUSTOM_CONFIG);
    env.set(config_keys::ENV_CONFIG_PATH, temp_file.path());

    let manager = ConfigManager::load(None).unwrap();

    assert_eq!(
        manager.source(),
        &ConfigSource::File(temp_file.path().to_path_buf())
    );
    assert_eq!(manager.config().weight_of(IndicatorField::CrimeIndex), 0.5);
}

#[test]
fn test_explicit_path_wins_over_env_path() {
    let env = EnvGuard::acquire();
    let explicit = config_file(CUSTOM_CONFIG);
    let from_env = config_file(r#"{"noise_level": 0.2}"#);
    env.set(config_keys::ENV_CONFIG_PATH, from_env.path());

    let manager = ConfigManager::load(Some(explicit.path())).unwrap();

    assert_eq!(
        manager.source(),
        &ConfigSource::File(explicit.path().to_path_buf())
    );
    assert_eq!(manager.config().noise_level, 0.0);
}

#[test]
fn test_env_overrides_apply_on_top_of_file() {
    let env = EnvGuard::acquire();
    let temp_file = config_file(CUSTOM_CONFIG);
    env.set(config_keys::ENV_MAX_WORKERS, "3");
    env.set(config_keys::ENV_CHUNK_SIZE, "50");
    env.set(config_keys::ENV_NOISE_LEVEL, "0.1");

    let config = ConfigManager::load(Some(temp_file.path()))
        .unwrap()
        .into_config();

    // 文件中 max_workers = 2, 环境变量优先
    assert_eq!(config.batch.max_workers, 3);
    assert_eq!(config.batch.chunk_size, 50);
    assert_eq!(config.noise_level, 0.1);
    assert_eq!(config.rules.len(), 2);
}

#[test]
fn test_unparseable_env_override_is_invalid_value() {
    let env = EnvGuard::acquire();
    let temp_file = config_file(CUSTOM_CONFIG);
    env.set(config_keys::ENV_NOISE_LEVEL, "abc");

    match ConfigManager::load(Some(temp_file.path())).unwrap_err() {
        ConfigError::InvalidValue { key, value, .. } => {
            assert_eq!(key, config_keys::ENV_NOISE_LEVEL);
            assert_eq!(value, "abc");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_declarative_rules_drive_scoring() {
    let manager = ConfigManager::from_json_str(CUSTOM_CONFIG).unwrap();
    let scorer = RiskScorer::new(manager.into_config()).unwrap();

    // 0.5×0.9 + 0.2×0.9 + 0.2×(9/9) + 0.1×0.95 = 0.925 → ×1.5 → 截断为 1.0
    let amplified = scorer
        .score(&RawIndicators::new(9.0, 9.0, 1.0, "Extreme"))
        .unwrap();
    assert_eq!(amplified.final_score, 100.0);
    assert_eq!(
        amplified.rule_descriptions(),
        vec!["Extreme crime in extreme weather"]
    );

    // 0.5×0.2 + 0.2×0.5 + 0.2×0.5 + 0.1×0.1 = 0.31 → ×0.5 = 0.155
    let reduced = scorer
        .score(&RawIndicators::new(2.0, 5.0, 5.5, "Clear"))
        .unwrap();
    assert_eq!(reduced.final_score, 15.5);
    assert_eq!(reduced.rule_descriptions(), vec!["Exact mid accident rate"]);
}

#[test]
fn test_defaults_match_builtin_constants() {
    let config = ConfigManager::from_json_str("{}").unwrap().into_config();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.noise_level, 0.05);
    assert_eq!(config.weight_of(IndicatorField::Weather), 0.20);
    assert_eq!(config.weather_categories.get("Extreme"), Some(&0.95));
    assert!(config.reject_unknown_weather);
}

#[test]
fn test_snapshot_reloads_to_same_config() {
    let manager = ConfigManager::from_json_str(CUSTOM_CONFIG).unwrap();
    let snapshot = manager.snapshot_json().unwrap();

    let reloaded = ConfigManager::from_json_str(&snapshot).unwrap();
    assert_eq!(reloaded.config(), manager.config());
}

#[test]
fn test_malformed_file_is_parse_error() {
    let temp_file = config_file("{ \"weights\": ");
    let err = ConfigManager::from_file(temp_file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_missing_file_is_read_error() {
    let err = ConfigManager::from_file(std::path::Path::new("/nonexistent/risk.json")).unwrap_err();
    assert!(matches!(err, ConfigError::FileReadError { .. }));
}

#[test]
fn test_negative_weight_rejected_at_construction() {
    let config = ConfigManager::from_json_str(r#"{"weights": {"crime_index": -0.1}}"#)
        .unwrap()
        .into_config();

    match RiskScorer::new(config).unwrap_err() {
        ConfigError::InvalidWeight { indicator, weight } => {
            assert_eq!(indicator, "crime_index");
            assert_eq!(weight, -0.1);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_unparseable_condition_rejected_at_construction() {
    let config = ConfigManager::from_json_str(
        r#"{"rules": [{"description": "Broken", "multiplier": 1.2, "conditions": {"crime_index": "about 7"}}]}"#,
    )
    .unwrap()
    .into_config();

    match RiskScorer::new(config).unwrap_err() {
        ConfigError::InvalidRule { index, description, .. } => {
            assert_eq!(index, 0);
            assert_eq!(description, "Broken");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_noise_level_out_of_range_rejected() {
    let config = EngineConfig::default().with_noise_level(1.5);
    assert!(matches!(
        RiskScorer::new(config),
        Err(ConfigError::InvalidValue { .. })
    ));
}

//! 설정 관리 — logwarden.toml 파싱 및 런타임 설정
//!
//! [`LogwardenConfig`]는 데몬 프로세스의 정적 설정을 담는 최상위 구조체입니다.
//! 핫 리로드되는 감시 대상 목록(모니터 YAML)과는 별개로, 프로세스 재시작
//! 없이는 변경되지 않습니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGWARDEN_GENERAL_LOG_LEVEL=debug` 형식)
//! 3. 설정 파일 (`logwarden.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logwarden_core::error::LogwardenError> {
//! use logwarden_core::config::LogwardenConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogwardenConfig::load("logwarden.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogwardenConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogwardenError};

/// logwarden 통합 설정
///
/// `logwarden.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogwardenConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 테일링 엔진 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LogwardenConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogwardenError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogwardenError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogwardenError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogwardenError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogwardenError> {
        toml::from_str(toml_str).map_err(|e| {
            LogwardenError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGWARDEN_{SECTION}_{FIELD}`
    /// 예: `LOGWARDEN_MONITOR_CONFIG_PATH=/etc/logwarden/monitor.yaml`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGWARDEN_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGWARDEN_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.pid_file, "LOGWARDEN_GENERAL_PID_FILE");

        // Monitor
        override_string(&mut self.monitor.config_path, "LOGWARDEN_MONITOR_CONFIG_PATH");
        override_usize(
            &mut self.monitor.channel_capacity,
            "LOGWARDEN_MONITOR_CHANNEL_CAPACITY",
        );
        override_usize(
            &mut self.monitor.max_line_bytes,
            "LOGWARDEN_MONITOR_MAX_LINE_BYTES",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "LOGWARDEN_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "LOGWARDEN_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "LOGWARDEN_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogwardenError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 모니터 설정 검증
        if self.monitor.config_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "monitor.config_path".to_owned(),
                reason: "monitor config path must not be empty".to_owned(),
            }
            .into());
        }

        const MAX_CHANNEL_CAPACITY: usize = 1_000_000;
        if self.monitor.channel_capacity == 0
            || self.monitor.channel_capacity > MAX_CHANNEL_CAPACITY
        {
            return Err(ConfigError::InvalidValue {
                field: "monitor.channel_capacity".to_owned(),
                reason: format!("must be 1-{MAX_CHANNEL_CAPACITY}"),
            }
            .into());
        }

        const MAX_LINE_BYTES: usize = 16 * 1024 * 1024;
        if self.monitor.max_line_bytes == 0 || self.monitor.max_line_bytes > MAX_LINE_BYTES {
            return Err(ConfigError::InvalidValue {
                field: "monitor.max_line_bytes".to_owned(),
                reason: format!("must be 1-{MAX_LINE_BYTES}"),
            }
            .into());
        }

        // 메트릭 설정 검증
        if self.metrics.enabled && self.metrics.listen_addr.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "metrics.listen_addr".to_owned(),
                reason: "listen_addr must not be empty when metrics are enabled".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// PID 파일 경로 (빈 문자열이면 비활성화)
    pub pid_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            pid_file: "/var/run/logwarden.pid".to_owned(),
        }
    }
}

/// 테일링 엔진 설정
///
/// 감시 대상 파일/키워드 목록 자체는 여기가 아니라
/// `config_path`가 가리키는 모니터 YAML에 있으며, 런타임에 핫 리로드됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 모니터 YAML 파일 경로 (핫 리로드 대상)
    pub config_path: String,
    /// 파일시스템 이벤트 채널 용량
    pub channel_capacity: usize,
    /// 한 라인의 최대 길이 (바이트, 초과분은 잘림)
    pub max_line_bytes: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            config_path: "/etc/logwarden/monitor.yaml".to_owned(),
            channel_capacity: 1024,
            max_line_bytes: 64 * 1024, // 64KB
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// Prometheus 수신 주소
    pub listen_addr: String,
    /// Prometheus 수신 포트
    pub port: u16,
    /// 스크레이프 엔드포인트 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9184,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = LogwardenConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.monitor.config_path, "/etc/logwarden/monitor.yaml");
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = LogwardenConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = LogwardenConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.monitor.channel_capacity, 1024);
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[monitor]
config_path = "/opt/logwarden/monitor.yaml"
"#;
        let config = LogwardenConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.monitor.config_path, "/opt/logwarden/monitor.yaml");
        assert_eq!(config.monitor.max_line_bytes, 64 * 1024);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[general]
log_level = "warn"
log_format = "pretty"
pid_file = "/opt/logwarden/logwarden.pid"

[monitor]
config_path = "/opt/logwarden/monitor.yaml"
channel_capacity = 4096
max_line_bytes = 131072

[metrics]
enabled = true
listen_addr = "0.0.0.0"
port = 9999
"#;
        let config = LogwardenConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.monitor.channel_capacity, 4096);
        assert_eq!(config.monitor.max_line_bytes, 131_072);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9999);
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let result = LogwardenConfig::parse("invalid = [[[toml");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            LogwardenError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = LogwardenConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = LogwardenConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_empty_monitor_path() {
        let mut config = LogwardenConfig::default();
        config.monitor.config_path = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("config_path"));
    }

    #[test]
    fn validate_rejects_zero_channel_capacity() {
        let mut config = LogwardenConfig::default();
        config.monitor.channel_capacity = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("channel_capacity"));
    }

    #[test]
    fn validate_rejects_oversized_line_limit() {
        let mut config = LogwardenConfig::default();
        config.monitor.max_line_bytes = 1024 * 1024 * 1024;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_line_bytes"));
    }

    #[test]
    fn validate_rejects_empty_listen_addr_when_metrics_enabled() {
        let mut config = LogwardenConfig::default();
        config.metrics.enabled = true;
        config.metrics.listen_addr = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("listen_addr"));
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut config = LogwardenConfig::default();
        // SAFETY: 테스트는 serial로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("LOGWARDEN_MONITOR_CONFIG_PATH", "/tmp/m.yaml") };
        config.apply_env_overrides();
        assert_eq!(config.monitor.config_path, "/tmp/m.yaml");
        unsafe { std::env::remove_var("LOGWARDEN_MONITOR_CONFIG_PATH") };
    }

    #[test]
    #[serial]
    fn env_override_invalid_number_keeps_original() {
        let mut config = LogwardenConfig::default();
        // SAFETY: 테스트는 serial로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("LOGWARDEN_MONITOR_CHANNEL_CAPACITY", "not-a-number") };
        config.apply_env_overrides();
        // 원래 값 유지
        assert_eq!(config.monitor.channel_capacity, 1024);
        unsafe { std::env::remove_var("LOGWARDEN_MONITOR_CHANNEL_CAPACITY") };
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = LogwardenConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = LogwardenConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(config.monitor.config_path, parsed.monitor.config_path);
        assert_eq!(config.metrics.port, parsed.metrics.port);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = LogwardenConfig::from_file("/nonexistent/path/logwarden.toml").await;
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            LogwardenError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}

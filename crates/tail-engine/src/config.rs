//! 엔진 설정
//!
//! 데몬의 정적 설정([`logwarden_core::config::MonitorConfig`])에서 엔진이
//! 필요로 하는 값만 추린 형태입니다. 라이브러리 사용자는 데몬 설정 없이
//! 직접 구성할 수도 있습니다.

use std::path::PathBuf;

use logwarden_core::config::MonitorConfig;
use logwarden_core::error::ConfigError;

/// 테일링 엔진 설정
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 모니터 YAML 경로
    pub monitor_path: PathBuf,
    /// 파일시스템 이벤트 채널 용량
    pub channel_capacity: usize,
    /// 한 라인의 최대 길이 (바이트)
    pub max_line_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            monitor_path: PathBuf::from("/etc/logwarden/monitor.yaml"),
            channel_capacity: 1024,
            max_line_bytes: 64 * 1024,
        }
    }
}

impl EngineConfig {
    /// 데몬 정적 설정에서 엔진 설정을 만듭니다.
    pub fn from_core(config: &MonitorConfig) -> Self {
        Self {
            monitor_path: PathBuf::from(&config.config_path),
            channel_capacity: config.channel_capacity,
            max_line_bytes: config.max_line_bytes,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// 데몬 경로로 오면 이미 검증된 값이지만, 라이브러리로 직접 구성한
    /// 경우를 위해 같은 규칙을 다시 적용합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "monitor_path".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "channel_capacity".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.max_line_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_line_bytes".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

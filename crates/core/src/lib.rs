//! logwarden 공통 타입, trait, 에러, 설정
//!
//! 이 크레이트는 모든 logwarden 크레이트가 공유하는 기반을 제공합니다:
//!
//! - [`error`]: 도메인별 에러 타입
//! - [`config`]: 데몬 정적 설정 (`logwarden.toml`)
//! - [`monitor`]: 핫 리로드되는 감시 대상 모델 (모니터 YAML)
//! - [`record`]: 추출된 라인의 전달 단위
//! - [`handler`]: 라인 소비자 trait
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod monitor;
pub mod record;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, EngineError, LogwardenError};

// 설정
pub use config::LogwardenConfig;

// 감시 대상 모델
pub use monitor::{MonitorFile, MonitorSnapshot};

// 라인 레코드 / 핸들러
pub use handler::LineHandler;
pub use record::LineRecord;

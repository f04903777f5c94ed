//! 테일링 엔진 에러 타입
//!
//! [`TailError`]는 엔진 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<TailError> for LogwardenError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use logwarden_core::error::{ConfigError, EngineError, LogwardenError};

/// 테일링 엔진 도메인 에러
///
/// 커서 관리, 디렉토리 감시 등록, 모니터 설정 리로드, 채널 통신 등
/// 엔진 내부의 모든 에러 상황을 포괄합니다.
#[derive(Debug, thiserror::Error)]
pub enum TailError {
    /// 대상 파일 커서 열기 실패 (권한, 부재 등)
    ///
    /// 복구 가능: 해당 파일만 활성 집합에서 제외되고, 다음 재조정 때
    /// 다시 시도됩니다.
    #[error("cursor open error: {path}: {reason}")]
    CursorOpen {
        /// 대상 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 커서 읽기 실패
    #[error("cursor read error: {path}: {reason}")]
    CursorRead {
        /// 대상 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 대상 디렉토리 감시 등록 실패
    ///
    /// 복구 가능: 해당 디렉토리만 건너뜁니다.
    #[error("watch register error: {dir}: {reason}")]
    WatchRegister {
        /// 디렉토리 경로
        dir: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 파일 디렉토리 감시 실패
    ///
    /// 복구 불가: 설정 디렉토리를 감시할 수 없으면 핫 리로드라는
    /// 핵심 보장을 제공할 수 없으므로 시작이 중단됩니다.
    #[error("cannot watch config directory {dir}: {reason}")]
    ConfigDirWatch {
        /// 설정 파일이 있는 디렉토리
        dir: String,
        /// 실패 사유
        reason: String,
    },

    /// 모니터 설정 파싱/검증 실패 (리로드 거부, 기존 스냅샷 유지)
    #[error("monitor config error: {0}")]
    Config(#[from] ConfigError),

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// notify 감시자 에러
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TailError> for LogwardenError {
    fn from(err: TailError) -> Self {
        match err {
            TailError::Channel(msg) => LogwardenError::Engine(EngineError::ChannelSend(msg)),
            TailError::Config(e) => LogwardenError::Config(e),
            other => LogwardenError::Engine(EngineError::InitFailed(other.to_string())),
        }
    }
}

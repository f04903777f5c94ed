//! 에러 타입 — 도메인별 에러 정의

/// logwarden 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogwardenError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 엔진 처리 에러
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// 핸들러 실행 에러
    #[error("handler error: {handler}: {reason}")]
    Handler {
        /// 핸들러 이름
        handler: String,
        /// 실패 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
///
/// 데몬 설정(`logwarden.toml`)과 감시 대상 설정(모니터 YAML) 양쪽에서
/// 사용됩니다. 모니터 설정의 검증 실패는 리로드를 중단시키고
/// 마지막 정상 스냅샷을 유지하는 근거가 됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패 (TOML/YAML)
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 감시 대상 파일 목록이 비어 있음
    #[error("monitor config lists no target files")]
    EmptyFileList,

    /// 감시 대상 파일이 존재하지 않음
    #[error("target file not found: {path}")]
    MissingTargetFile { path: String },

    /// 감시 대상이 일반 파일이 아님 (디렉토리, 소켓 등)
    #[error("target is not a regular file: {path}")]
    NotRegularFile { path: String },
}

/// 엔진 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 채널 수신 실패
    #[error("channel receive failed: {0}")]
    ChannelRecv(String),

    /// 엔진 초기화/실행 실패
    #[error("engine init failed: {0}")]
    InitFailed(String),
}

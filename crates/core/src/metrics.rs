//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logwarden_`
//! - 영역: `tail_`, `dispatch_`, `keyword_`, `config_`, `engine_`
//! - 접미어: `_total` (counter), `_seconds` (시간 gauge), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 핸들러 레이블 키
pub const LABEL_HANDLER: &str = "handler";

/// 키워드 레이블 키
pub const LABEL_KEYWORD: &str = "keyword";

// ─── Tail 메트릭 ────────────────────────────────────────────────────

/// Tail: 디스패치된 전체 라인 수 (counter)
pub const TAIL_LINES_DELIVERED_TOTAL: &str = "logwarden_tail_lines_delivered_total";

/// Tail: 커서가 소비한 바이트 수 (counter)
pub const TAIL_BYTES_READ_TOTAL: &str = "logwarden_tail_bytes_read_total";

/// Tail: 현재 열려 있는 커서 수 (gauge)
pub const TAIL_CURSORS_OPEN: &str = "logwarden_tail_cursors_open";

/// Tail: 현재 감시 중인 대상 디렉토리 수 (gauge, 설정 디렉토리 제외)
pub const TAIL_WATCHED_DIRS: &str = "logwarden_tail_watched_dirs";

// ─── Dispatch 메트릭 ────────────────────────────────────────────────

/// Dispatch: 핸들러 실행 실패 수 (counter, label: handler)
pub const DISPATCH_HANDLER_ERRORS_TOTAL: &str = "logwarden_dispatch_handler_errors_total";

// ─── Keyword 메트릭 ─────────────────────────────────────────────────

/// Keyword: 키워드 매칭 수 (counter, label: keyword)
pub const KEYWORD_MATCHES_TOTAL: &str = "logwarden_keyword_matches_total";

/// Keyword: 매칭 없이 통과한 라인 수 (counter)
pub const KEYWORD_NO_MATCH_TOTAL: &str = "logwarden_keyword_no_match_total";

// ─── Config 메트릭 ──────────────────────────────────────────────────

/// Config: 성공한 리로드 수 (counter)
pub const CONFIG_RELOAD_SUCCESS_TOTAL: &str = "logwarden_config_reload_success_total";

/// Config: 실패한 리로드 수 (counter)
pub const CONFIG_RELOAD_FAILURE_TOTAL: &str = "logwarden_config_reload_failure_total";

// ─── Engine 메트릭 ──────────────────────────────────────────────────

/// Engine: 가동 시간 (gauge, 초)
pub const ENGINE_UPTIME_SECONDS: &str = "logwarden_engine_uptime_seconds";

/// Engine: 빌드 정보 (gauge, 항상 1, labels: version)
pub const ENGINE_BUILD_INFO: &str = "logwarden_engine_build_info";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `logwarden-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        TAIL_LINES_DELIVERED_TOTAL,
        "Total number of complete lines delivered to the dispatch pipeline"
    );
    describe_counter!(
        TAIL_BYTES_READ_TOTAL,
        "Total number of bytes consumed from tailed files"
    );
    describe_gauge!(TAIL_CURSORS_OPEN, "Number of currently open file cursors");
    describe_gauge!(
        TAIL_WATCHED_DIRS,
        "Number of currently watched target directories (excluding the config directory)"
    );
    describe_counter!(
        DISPATCH_HANDLER_ERRORS_TOTAL,
        "Total number of line handler failures (isolated per handler)"
    );
    describe_counter!(
        KEYWORD_MATCHES_TOTAL,
        "Total number of lines matching a configured keyword"
    );
    describe_counter!(
        KEYWORD_NO_MATCH_TOTAL,
        "Total number of lines matching no configured keyword"
    );
    describe_counter!(
        CONFIG_RELOAD_SUCCESS_TOTAL,
        "Total number of successful monitor config reloads"
    );
    describe_counter!(
        CONFIG_RELOAD_FAILURE_TOTAL,
        "Total number of rejected monitor config reloads (last known good retained)"
    );
    describe_gauge!(ENGINE_UPTIME_SECONDS, "Tail engine uptime in seconds");
    describe_gauge!(
        ENGINE_BUILD_INFO,
        "Build information (always 1, with version label)"
    );
}

//! 디스패치 파이프라인 — 추출된 라인을 핸들러 체인에 전달
//!
//! 핸들러는 등록 순서대로, 각 라인에 대해 순차 호출됩니다. 한 핸들러의
//! 실패는 기록되고 격리되며, 나머지 핸들러와 다음 라인 처리에는 영향을
//! 주지 않습니다.

use logwarden_core::metrics::{DISPATCH_HANDLER_ERRORS_TOTAL, LABEL_HANDLER};
use logwarden_core::{LineHandler, LineRecord, LogwardenError};

/// 라인 핸들러 체인
///
/// 핸들러 목록은 시작 시점에 고정되며 실행 중에는 변경되지 않습니다.
pub struct DispatchPipeline {
    handlers: Vec<Box<dyn LineHandler>>,
}

impl DispatchPipeline {
    /// 빈 파이프라인을 생성합니다.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// 핸들러를 체인 끝에 등록합니다.
    pub fn register(&mut self, handler: Box<dyn LineHandler>) {
        tracing::debug!(handler = handler.name(), "line handler registered");
        self.handlers.push(handler);
    }

    /// 등록된 핸들러 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// 핸들러가 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// 레코드 한 건을 모든 핸들러에 순서대로 전달합니다.
    ///
    /// 핸들러 에러는 여기서 소비됩니다: 에러 로그와 메트릭을 남기고
    /// 다음 핸들러로 진행합니다. 이 메서드 자체는 실패하지 않습니다.
    pub fn dispatch(&self, record: &LineRecord) {
        for handler in &self.handlers {
            if let Err(e) = handler.on_line(record) {
                metrics::counter!(
                    DISPATCH_HANDLER_ERRORS_TOTAL,
                    LABEL_HANDLER => handler.name().to_owned()
                )
                .increment(1);
                tracing::error!(
                    handler = handler.name(),
                    record_id = %record.id,
                    source = %record.source.display(),
                    error = %e,
                    "line handler failed, continuing with remaining handlers"
                );
            }
        }
    }
}

impl Default for DispatchPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// 모든 라인을 구조화 로그로 출력하는 핸들러
///
/// 키워드 매칭과 무관하게 추출된 전체 스트림을 관측할 수 있게 합니다.
pub struct EchoHandler;

impl LineHandler for EchoHandler {
    fn name(&self) -> &str {
        "echo"
    }

    fn on_line(&self, record: &LineRecord) -> Result<(), LogwardenError> {
        tracing::info!(
            source = %record.source.display(),
            content = %record.content,
            "line observed"
        );
        Ok(())
    }
}

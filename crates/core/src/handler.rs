//! 라인 핸들러 trait — 디스패치 파이프라인의 확장 포인트
//!
//! 추출된 라인을 소비하는 쪽은 이 trait을 구현하고, 시작 시점에
//! 디스패치 파이프라인에 명시적으로 등록합니다. 암묵적 발견(데코레이터,
//! 전역 레지스트리)은 사용하지 않습니다.

use crate::error::LogwardenError;
use crate::record::LineRecord;

/// 추출된 라인을 처리하는 trait
///
/// 새로운 소비자(알림, 메트릭 방출 등)를 추가하려면 이 trait을 구현합니다.
///
/// # 계약
/// - 핸들러는 레코드의 스냅샷을 읽기만 해야 합니다.
/// - 이벤트 루프를 장시간 블로킹해서는 안 됩니다.
/// - 에러는 호출측(디스패치 파이프라인)이 격리하므로, 한 핸들러의 실패가
///   다른 핸들러나 다음 라인에 영향을 주지 않습니다.
pub trait LineHandler: Send + Sync {
    /// 핸들러 이름 (로깅 및 메트릭 레이블에 사용)
    fn name(&self) -> &str;

    /// 라인 한 건을 처리합니다.
    fn on_line(&self, record: &LineRecord) -> Result<(), LogwardenError>;
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::monitor::MonitorSnapshot;

    use super::*;

    struct CountingHandler {
        seen: AtomicUsize,
    }

    impl LineHandler for CountingHandler {
        fn name(&self) -> &str {
            "counting"
        }

        fn on_line(&self, _record: &LineRecord) -> Result<(), LogwardenError> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn handler_trait_is_object_safe() {
        let handler: Box<dyn LineHandler> = Box::new(CountingHandler {
            seen: AtomicUsize::new(0),
        });
        let snapshot = Arc::new(MonitorSnapshot {
            keywords: BTreeSet::new(),
            target_files: BTreeSet::new(),
            watch_dirs: BTreeSet::new(),
        });
        let record = LineRecord::new("line", "/a.log", snapshot);
        handler.on_line(&record).unwrap();
        assert_eq!(handler.name(), "counting");
    }
}

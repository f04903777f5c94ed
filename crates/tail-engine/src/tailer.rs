//! 테일러 — 변경 이벤트를 라인 레코드 스트림으로 변환
//!
//! 파일 변경이 통지되면 해당 커서에서 새로 완결된 라인을 모두 읽어
//! 디스패치 파이프라인에 전달합니다. 이벤트는 "읽을 것이 있을 수 있다"는
//! 신호일 뿐이며, 실제 전달량은 커서 오프셋과 파일 길이의 차이로
//! 결정됩니다. 이벤트가 병합되거나 중복되어도 결과는 동일합니다.

use std::path::Path;
use std::sync::Arc;

use logwarden_core::metrics::TAIL_LINES_DELIVERED_TOTAL;
use logwarden_core::monitor::MonitorSnapshot;
use logwarden_core::record::LineRecord;

use crate::cursor::CursorTable;
use crate::dispatch::DispatchPipeline;
use crate::error::TailError;

/// 변경 이벤트 처리기
pub struct Tailer {
    pipeline: DispatchPipeline,
}

impl Tailer {
    /// 핸들러 체인이 구성된 테일러를 생성합니다.
    pub fn new(pipeline: DispatchPipeline) -> Self {
        Self { pipeline }
    }

    /// 파일 변경 통지를 처리합니다.
    ///
    /// 커서가 빈 결과를 돌려줄 때까지 반복해서 읽습니다 (drain). 읽는
    /// 도중 추가된 내용도 같은 호출에서 따라잡으므로, 이벤트 하나로
    /// 여러 번의 쓰기를 커버할 수 있습니다.
    ///
    /// 감시 중이 아닌 파일(커서 없음)의 이벤트는 조용히 무시됩니다.
    /// 감시 디렉토리에는 대상이 아닌 파일도 섞여 있기 때문입니다.
    pub async fn on_file_changed(
        &self,
        cursors: &mut CursorTable,
        path: &Path,
        snapshot: &Arc<MonitorSnapshot>,
    ) -> Result<usize, TailError> {
        if !cursors.contains(path) {
            tracing::trace!(path = %path.display(), "event for untracked file, ignoring");
            return Ok(0);
        }

        let mut delivered = 0;
        loop {
            let lines = cursors.read_new_lines(path).await?;
            if lines.is_empty() {
                break;
            }
            for content in lines {
                let record = LineRecord::new(content, path, Arc::clone(snapshot));
                self.pipeline.dispatch(&record);
                delivered += 1;
            }
        }

        if delivered > 0 {
            metrics::counter!(TAIL_LINES_DELIVERED_TOTAL).increment(delivered as u64);
            tracing::trace!(path = %path.display(), delivered, "lines dispatched");
        }
        Ok(delivered)
    }
}

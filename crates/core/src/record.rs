//! 라인 레코드 — 추출된 로그 라인 한 건의 전달 단위
//!
//! [`LineRecord`]는 테일러가 생성하고 디스패치 파이프라인의 핸들러들이
//! 소비하는 일시적 데이터입니다. 디스패치 이후에는 보관되지 않습니다.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use crate::monitor::MonitorSnapshot;

/// 추출된 로그 라인 한 건
///
/// `snapshot`은 이 라인을 읽은 시점에 활성화되어 있던 설정 스냅샷입니다.
/// 핸들러는 스냅샷을 읽기만 해야 하며 변경할 수 없습니다 (`Arc` 공유 불변).
#[derive(Debug, Clone)]
pub struct LineRecord {
    /// 레코드 고유 ID (UUID v4)
    pub id: String,
    /// 라인 내용 (줄바꿈 문자 제거됨)
    pub content: String,
    /// 라인이 추출된 파일의 정규화된 경로
    pub source: PathBuf,
    /// 라인을 읽은 시점의 설정 스냅샷
    pub snapshot: Arc<MonitorSnapshot>,
    /// 추출 시각
    pub observed_at: SystemTime,
}

impl LineRecord {
    /// 새 라인 레코드를 생성합니다.
    pub fn new(
        content: impl Into<String>,
        source: impl Into<PathBuf>,
        snapshot: Arc<MonitorSnapshot>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            source: source.into(),
            snapshot,
            observed_at: SystemTime::now(),
        }
    }
}

impl fmt::Display for LineRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LineRecord[{}] {}: {}",
            &self.id[..8.min(self.id.len())],
            self.source.display(),
            self.content,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn snapshot() -> Arc<MonitorSnapshot> {
        Arc::new(MonitorSnapshot {
            keywords: BTreeSet::from(["ERROR".to_owned()]),
            target_files: BTreeSet::new(),
            watch_dirs: BTreeSet::new(),
        })
    }

    #[test]
    fn record_carries_snapshot() {
        let snap = snapshot();
        let record = LineRecord::new("ERROR disk full", "/var/log/a.log", Arc::clone(&snap));
        assert_eq!(record.content, "ERROR disk full");
        assert_eq!(record.source, PathBuf::from("/var/log/a.log"));
        assert!(record.snapshot.keywords.contains("ERROR"));
    }

    #[test]
    fn record_ids_are_unique() {
        let snap = snapshot();
        let a = LineRecord::new("x", "/a", Arc::clone(&snap));
        let b = LineRecord::new("x", "/a", snap);
        assert_ne!(a.id, b.id);
    }
}

//! 디렉토리 감시자 — notify 이벤트를 tokio 채널로 중계
//!
//! notify는 자체 스레드에서 콜백을 호출하므로, 콜백에서 bounded mpsc
//! 채널로 이벤트를 밀어 넣어 tokio 이벤트 루프와 연결합니다. 채널이
//! 가득 차면 `blocking_send`가 notify 스레드를 잠시 멈추는데, 이는
//! 이벤트 유실 대신 배압을 선택한 것입니다.

use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::TailError;

/// 엔진 루프가 소비하는 파일시스템 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    /// 이벤트가 발생한 경로
    pub path: PathBuf,
    /// 이벤트 종류
    pub kind: FsEventKind,
}

/// 파일시스템 이벤트 종류
///
/// notify의 세분화된 이벤트를 엔진이 구분하는 수준으로 축약합니다.
/// 엔진은 `Modified`만 처리하고 나머지는 무시합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEventKind {
    /// 파일 내용 변경
    Modified,
    /// 파일 생성
    Created,
    /// 파일 삭제
    Removed,
    /// 이름 변경 (rename/move)
    Renamed,
    /// 그 외
    Other,
}

impl From<&EventKind> for FsEventKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Modify(ModifyKind::Name(_)) => FsEventKind::Renamed,
            EventKind::Modify(_) => FsEventKind::Modified,
            EventKind::Create(_) => FsEventKind::Created,
            EventKind::Remove(_) => FsEventKind::Removed,
            _ => FsEventKind::Other,
        }
    }
}

/// notify 기반 디렉토리 감시자
///
/// 감시 등록/해제는 엔진 루프(재조정기)만 수행합니다. 같은 디렉토리를
/// 중복 등록하지 않는 책임은 호출측에 있습니다.
pub struct DirectoryWatcher {
    watcher: RecommendedWatcher,
}

impl DirectoryWatcher {
    /// 감시자와 이벤트 수신 채널을 생성합니다.
    pub fn new(capacity: usize) -> Result<(Self, mpsc::Receiver<FsEvent>), TailError> {
        let (tx, rx) = mpsc::channel(capacity);

        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    let kind = FsEventKind::from(&event.kind);
                    for path in event.paths {
                        // 수신측이 닫혔으면 종료 중이므로 조용히 버림
                        if tx.blocking_send(FsEvent { path, kind }).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "filesystem watch error");
                }
            }
        })?;

        Ok((Self { watcher }, rx))
    }

    /// 디렉토리를 비재귀로 감시 목록에 추가합니다.
    pub fn watch_dir(&mut self, dir: &Path) -> Result<(), TailError> {
        self.watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| TailError::WatchRegister {
                dir: dir.display().to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!(dir = %dir.display(), "directory watch added");
        Ok(())
    }

    /// 디렉토리를 감시 목록에서 제거합니다.
    pub fn unwatch_dir(&mut self, dir: &Path) -> Result<(), TailError> {
        self.watcher
            .unwatch(dir)
            .map_err(|e| TailError::WatchRegister {
                dir: dir.display().to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!(dir = %dir.display(), "directory watch removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};

    use super::*;

    #[test]
    fn event_kind_mapping() {
        assert_eq!(
            FsEventKind::from(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            FsEventKind::Modified
        );
        assert_eq!(
            FsEventKind::from(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any))),
            FsEventKind::Modified
        );
        assert_eq!(
            FsEventKind::from(&EventKind::Modify(ModifyKind::Name(RenameMode::Any))),
            FsEventKind::Renamed
        );
        assert_eq!(
            FsEventKind::from(&EventKind::Create(CreateKind::File)),
            FsEventKind::Created
        );
        assert_eq!(
            FsEventKind::from(&EventKind::Remove(RemoveKind::File)),
            FsEventKind::Removed
        );
        assert_eq!(FsEventKind::from(&EventKind::Any), FsEventKind::Other);
    }

    #[test]
    fn watch_nonexistent_dir_is_recoverable_error() {
        let (mut watcher, _rx) = DirectoryWatcher::new(16).unwrap();
        let err = watcher
            .watch_dir(Path::new("/nonexistent/dir"))
            .unwrap_err();
        assert!(matches!(err, TailError::WatchRegister { .. }));
    }

    #[tokio::test]
    async fn delivers_events_for_watched_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let (mut watcher, mut rx) = DirectoryWatcher::new(64).unwrap();
        watcher.watch_dir(dir.path()).unwrap();

        let file = dir.path().join("a.log");
        std::fs::write(&file, "hello\n").unwrap();

        // OS 감시 백엔드가 이벤트를 전달할 때까지 넉넉히 대기
        let event = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("no filesystem event within timeout")
            .expect("event channel closed");
        assert!(event.path.starts_with(dir.path()));
    }
}

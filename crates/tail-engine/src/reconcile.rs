//! 감시 재조정기 — 실제 감시 상태를 스냅샷에 수렴
//!
//! 재조정은 "목표 상태(스냅샷)와 현재 상태(열린 커서, 등록된 감시)의
//! 집합 차이"로 계산됩니다. 현재 상태를 기준으로 비교하므로 같은
//! 스냅샷으로 여러 번 호출해도 결과가 같습니다 (멱등).
//!
//! 설정 파일의 디렉토리는 재조정 대상에서 제외됩니다: 엔진 시작 시
//! 한 번 등록되어 종료까지 유지되며, 대상 파일 목록이 어떻게 바뀌어도
//! 해제되지 않습니다. 핫 리로드 능력 자체를 잃지 않기 위한 규칙입니다.

use std::collections::BTreeSet;
use std::path::PathBuf;

use logwarden_core::metrics::TAIL_WATCHED_DIRS;
use logwarden_core::monitor::MonitorSnapshot;

use crate::cursor::CursorTable;
use crate::watch::DirectoryWatcher;

/// 재조정 한 번의 결과 요약 (로깅/테스트용)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// 새로 커서를 연 파일 수
    pub files_added: usize,
    /// 커서를 닫은 파일 수
    pub files_removed: usize,
    /// 커서 열기에 실패해 건너뛴 파일 수
    pub files_failed: usize,
    /// 새로 감시를 등록한 디렉토리 수
    pub dirs_added: usize,
    /// 감시를 해제한 디렉토리 수
    pub dirs_removed: usize,
}

impl ReconcileReport {
    /// 아무 변화도 없었는지 확인합니다.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// 감시 재조정기
///
/// 대상 디렉토리 감시 집합을 소유하고, 스냅샷이 바뀔 때마다 커서
/// 테이블과 디렉토리 감시자를 목표 상태로 수렴시킵니다.
pub struct WatchReconciler {
    /// 설정 파일이 있는 디렉토리 (재조정 면제)
    config_dir: PathBuf,
    /// 현재 감시 중인 대상 디렉토리 집합 (설정 디렉토리 제외)
    watched: BTreeSet<PathBuf>,
}

impl WatchReconciler {
    /// 재조정기를 생성합니다.
    ///
    /// `config_dir`은 정규화된 설정 파일 디렉토리여야 합니다.
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_dir,
            watched: BTreeSet::new(),
        }
    }

    /// 현재 감시 중인 대상 디렉토리 집합을 반환합니다.
    pub fn watched_dirs(&self) -> &BTreeSet<PathBuf> {
        &self.watched
    }

    /// 커서와 디렉토리 감시를 스냅샷에 수렴시킵니다.
    ///
    /// 개별 파일의 커서 열기 실패는 경고 후 건너뜁니다: 해당 파일은
    /// 활성 집합에서 빠진 채로 남고, 다음 재조정 때 다시 시도됩니다.
    /// 디렉토리 감시 등록 실패도 마찬가지로 해당 디렉토리만 건너뜁니다.
    pub async fn reconcile(
        &mut self,
        watcher: &mut DirectoryWatcher,
        cursors: &mut CursorTable,
        snapshot: &MonitorSnapshot,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        // 1. 대상에서 빠진 파일의 커서를 닫음 (핸들 해제)
        for path in cursors.paths() {
            if !snapshot.target_files.contains(&path) {
                cursors.close(&path);
                report.files_removed += 1;
                tracing::info!(path = %path.display(), "target removed, cursor closed");
            }
        }

        // 2. 새 대상 파일의 커서를 엶 (EOF에서 시작)
        for path in &snapshot.target_files {
            if cursors.contains(path) {
                continue;
            }
            match cursors.open(path).await {
                Ok(()) => {
                    report.files_added += 1;
                    tracing::info!(path = %path.display(), "target added, cursor opened at end");
                }
                Err(e) => {
                    report.files_failed += 1;
                    tracing::warn!(path = %path.display(), error = %e, "cannot open target, skipping");
                }
            }
        }

        // 목표 디렉토리 집합: 설정 디렉토리는 별도 관리이므로 제외
        let desired: BTreeSet<PathBuf> = snapshot
            .watch_dirs
            .iter()
            .filter(|d| **d != self.config_dir)
            .cloned()
            .collect();

        // 3. 더 이상 필요 없는 디렉토리 감시 해제
        for dir in self.watched.difference(&desired).cloned().collect::<Vec<_>>() {
            if let Err(e) = watcher.unwatch_dir(&dir) {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to unwatch directory");
            }
            self.watched.remove(&dir);
            report.dirs_removed += 1;
        }

        // 4. 새로 필요한 디렉토리 감시 등록 (중복 등록 없음)
        for dir in desired.difference(&self.watched).cloned().collect::<Vec<_>>() {
            match watcher.watch_dir(&dir) {
                Ok(()) => {
                    self.watched.insert(dir);
                    report.dirs_added += 1;
                }
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "cannot watch directory, skipping");
                }
            }
        }

        metrics::gauge!(TAIL_WATCHED_DIRS).set(self.watched.len() as f64);
        if !report.is_noop() {
            tracing::info!(
                files_added = report.files_added,
                files_removed = report.files_removed,
                files_failed = report.files_failed,
                dirs_added = report.dirs_added,
                dirs_removed = report.dirs_removed,
                "watch state reconciled"
            );
        }
        report
    }
}

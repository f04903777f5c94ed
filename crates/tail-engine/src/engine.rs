//! 테일링 엔진 — 단일 이벤트 루프와 수명 주기
//!
//! 엔진의 모든 상태(커서, 감시 집합, 활성 스냅샷)는 이벤트 루프 태스크
//! 하나가 소유합니다. 파일시스템 이벤트, 설정 리로드, 종료 신호가 모두
//! 같은 `select!`에서 직렬화되므로 내부 락이 필요 없습니다.
//!
//! # 시작 순서
//! 1. 모니터 YAML 최초 로드 (실패 시 시작 중단)
//! 2. 설정 디렉토리 감시 등록 (실패 시 시작 중단)
//! 3. 초기 재조정: 커서 열기 + 대상 디렉토리 감시 등록
//! 4. 이벤트 루프 진입
//!
//! # 종료
//! `CancellationToken`이 취소되면 루프를 빠져나와 모든 커서를 닫습니다.

use std::time::Instant;

use tokio_util::sync::CancellationToken;

use logwarden_core::LineHandler;
use logwarden_core::metrics::{
    CONFIG_RELOAD_FAILURE_TOTAL, CONFIG_RELOAD_SUCCESS_TOTAL, ENGINE_UPTIME_SECONDS,
};

use crate::config::EngineConfig;
use crate::cursor::CursorTable;
use crate::dispatch::DispatchPipeline;
use crate::error::TailError;
use crate::reconcile::WatchReconciler;
use crate::reload::ConfigWatcher;
use crate::tailer::Tailer;
use crate::watch::{DirectoryWatcher, FsEvent, FsEventKind};

/// 테일링 엔진 빌더
///
/// ```no_run
/// # use logwarden_tail::{TailEngineBuilder, EngineConfig, KeywordHandler};
/// # use tokio_util::sync::CancellationToken;
/// # async fn run() -> Result<(), logwarden_tail::TailError> {
/// let engine = TailEngineBuilder::new()
///     .config(EngineConfig::default())
///     .handler(Box::new(KeywordHandler::new()))
///     .build();
/// engine.run(CancellationToken::new()).await
/// # }
/// ```
pub struct TailEngineBuilder {
    config: EngineConfig,
    pipeline: DispatchPipeline,
}

impl TailEngineBuilder {
    /// 기본 설정의 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            pipeline: DispatchPipeline::new(),
        }
    }

    /// 엔진 설정을 지정합니다.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// 라인 핸들러를 체인 끝에 등록합니다.
    pub fn handler(mut self, handler: Box<dyn LineHandler>) -> Self {
        self.pipeline.register(handler);
        self
    }

    /// 엔진을 생성합니다.
    pub fn build(self) -> TailEngine {
        TailEngine {
            config: self.config,
            pipeline: self.pipeline,
        }
    }
}

impl Default for TailEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 테일링 엔진
pub struct TailEngine {
    config: EngineConfig,
    pipeline: DispatchPipeline,
}

impl TailEngine {
    /// 엔진을 시작하고 취소될 때까지 실행합니다.
    ///
    /// 부트스트랩(최초 설정 로드, 설정 디렉토리 감시)이 실패하면 즉시
    /// 에러를 반환합니다. 루프 진입 이후에는 개별 파일/디렉토리 단위
    /// 실패가 모두 내부에서 격리되므로, 정상 반환은 취소에 의한
    /// 종료뿐입니다.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), TailError> {
        self.config.validate()?;

        let (config_watcher, _snapshot_rx) =
            ConfigWatcher::bootstrap(&self.config.monitor_path).await?;
        let (mut watcher, mut event_rx) = DirectoryWatcher::new(self.config.channel_capacity)?;

        // 설정 디렉토리 감시는 핫 리로드의 전제이므로 실패가 치명적
        let config_dir = config_watcher.config_dir().to_path_buf();
        watcher
            .watch_dir(&config_dir)
            .map_err(|e| TailError::ConfigDirWatch {
                dir: config_dir.display().to_string(),
                reason: e.to_string(),
            })?;
        tracing::info!(dir = %config_dir.display(), "config directory watch established");

        let mut state = EngineLoop {
            watcher,
            reconciler: WatchReconciler::new(config_dir),
            cursors: CursorTable::new(self.config.max_line_bytes),
            tailer: Tailer::new(self.pipeline),
            config_watcher,
        };

        // 초기 재조정: 초기 스냅샷의 대상 전부를 활성화
        let initial = state.config_watcher.current();
        state
            .reconciler
            .reconcile(&mut state.watcher, &mut state.cursors, &initial)
            .await;
        tracing::info!(
            targets = state.cursors.len(),
            dirs = state.reconciler.watched_dirs().len(),
            "tail engine started"
        );

        let started = Instant::now();
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                event = event_rx.recv() => {
                    match event {
                        Some(event) => state.handle_event(event).await,
                        None => {
                            // 감시 스레드가 죽은 경우: 더 이상 진행 불가
                            state.cursors.close_all();
                            return Err(TailError::Channel(
                                "filesystem event channel closed unexpectedly".to_owned(),
                            ));
                        }
                    }
                }
                _ = tick.tick() => {
                    metrics::gauge!(ENGINE_UPTIME_SECONDS)
                        .set(started.elapsed().as_secs_f64());
                }
            }
        }

        state.cursors.close_all();
        tracing::info!("tail engine stopped");
        Ok(())
    }
}

/// 이벤트 루프 상태 (루프 태스크 단독 소유)
struct EngineLoop {
    watcher: DirectoryWatcher,
    reconciler: WatchReconciler,
    cursors: CursorTable,
    tailer: Tailer,
    config_watcher: ConfigWatcher,
}

impl EngineLoop {
    /// 파일시스템 이벤트 하나를 처리합니다.
    async fn handle_event(&mut self, event: FsEvent) {
        // 내용 변경만 의미가 있음: 생성/삭제/이름변경은 리로드를 통해서만
        // 대상 집합에 반영됨
        if event.kind != FsEventKind::Modified {
            tracing::trace!(path = %event.path.display(), kind = ?event.kind, "ignoring non-modify event");
            return;
        }

        if self.config_watcher.matches(&event.path) {
            self.handle_config_change().await;
            return;
        }

        let snapshot = self.config_watcher.current();
        if let Err(e) = self
            .tailer
            .on_file_changed(&mut self.cursors, &event.path, &snapshot)
            .await
        {
            tracing::warn!(path = %event.path.display(), error = %e, "read failed, file skipped");
        }
    }

    /// 설정 파일 변경을 처리합니다 (리로드 + 재조정).
    async fn handle_config_change(&mut self) {
        match self.config_watcher.reload().await {
            Ok((old, new)) => {
                metrics::counter!(CONFIG_RELOAD_SUCCESS_TOTAL).increment(1);
                tracing::info!(
                    old_targets = old.target_files.len(),
                    new_targets = new.target_files.len(),
                    old_keywords = old.keywords.len(),
                    new_keywords = new.keywords.len(),
                    "monitor config reloaded"
                );
                self.reconciler
                    .reconcile(&mut self.watcher, &mut self.cursors, &new)
                    .await;
            }
            Err(e) => {
                metrics::counter!(CONFIG_RELOAD_FAILURE_TOTAL).increment(1);
                tracing::warn!(
                    error = %e,
                    "monitor config reload rejected, keeping previous configuration"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;

    use logwarden_core::record::LineRecord;
    use logwarden_core::{LineHandler, LogwardenError};

    use super::*;

    struct RecordingHandler {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl LineHandler for RecordingHandler {
        fn name(&self) -> &str {
            "recording"
        }

        fn on_line(&self, record: &LineRecord) -> Result<(), LogwardenError> {
            self.lines.lock().unwrap().push(record.content.clone());
            Ok(())
        }
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "").unwrap();
        path.canonicalize().unwrap()
    }

    fn write_monitor(dir: &Path, targets: &[&Path], keywords: &[&str]) -> PathBuf {
        let mut yaml = String::from("Filenames:\n");
        for t in targets {
            yaml.push_str(&format!("  - {}\n", t.display()));
        }
        if !keywords.is_empty() {
            yaml.push_str("Keywords:\n");
            for k in keywords {
                yaml.push_str(&format!("  - {k}\n"));
            }
        }
        let path = dir.join("monitor.yaml");
        std::fs::write(&path, yaml).unwrap();
        path.canonicalize().unwrap()
    }

    fn append(path: &Path, content: &str) {
        use std::io::Write;
        let mut f = std::fs::OpenOptions::new().append(true).open(path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    /// 합성 이벤트로 루프 상태를 구동하는 테스트 하네스
    async fn build_loop(config_path: &Path) -> (EngineLoop, Arc<Mutex<Vec<String>>>) {
        let (config_watcher, _snapshot_rx) = ConfigWatcher::bootstrap(config_path).await.unwrap();
        let (mut watcher, _rx) = DirectoryWatcher::new(64).unwrap();
        let config_dir = config_watcher.config_dir().to_path_buf();
        watcher.watch_dir(&config_dir).unwrap();

        let lines = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = DispatchPipeline::new();
        pipeline.register(Box::new(RecordingHandler {
            lines: Arc::clone(&lines),
        }));

        let mut state = EngineLoop {
            watcher,
            reconciler: WatchReconciler::new(config_dir),
            cursors: CursorTable::new(64 * 1024),
            tailer: Tailer::new(pipeline),
            config_watcher,
        };
        let initial = state.config_watcher.current();
        state
            .reconciler
            .reconcile(&mut state.watcher, &mut state.cursors, &initial)
            .await;
        (state, lines)
    }

    fn modified(path: &Path) -> FsEvent {
        FsEvent {
            path: path.to_path_buf(),
            kind: FsEventKind::Modified,
        }
    }

    #[tokio::test]
    async fn modify_event_delivers_new_lines() {
        let dir = TempDir::new().unwrap();
        let target = touch(dir.path(), "a.log");
        let config = write_monitor(dir.path(), &[&target], &["ERROR"]);

        let (mut state, lines) = build_loop(&config).await;

        append(&target, "hello\nworld\n");
        state.handle_event(modified(&target)).await;

        assert_eq!(*lines.lock().unwrap(), vec!["hello", "world"]);
    }

    #[tokio::test]
    async fn non_modify_events_are_ignored() {
        let dir = TempDir::new().unwrap();
        let target = touch(dir.path(), "a.log");
        let config = write_monitor(dir.path(), &[&target], &[]);

        let (mut state, lines) = build_loop(&config).await;

        append(&target, "pending\n");
        for kind in [FsEventKind::Created, FsEventKind::Removed, FsEventKind::Renamed] {
            state
                .handle_event(FsEvent {
                    path: target.clone(),
                    kind,
                })
                .await;
        }
        assert!(lines.lock().unwrap().is_empty());

        // Modified 이벤트에서 밀린 내용이 전달됨
        state.handle_event(modified(&target)).await;
        assert_eq!(*lines.lock().unwrap(), vec!["pending"]);
    }

    #[tokio::test]
    async fn config_change_adds_new_target_live() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.log");
        let config = write_monitor(dir.path(), &[&a], &[]);

        let (mut state, lines) = build_loop(&config).await;
        assert_eq!(state.cursors.len(), 1);

        // 새 대상 추가 후 설정 파일 변경 이벤트
        let b = touch(dir.path(), "b.log");
        let config = write_monitor(dir.path(), &[&a, &b], &[]);
        state.handle_event(modified(&config)).await;
        assert_eq!(state.cursors.len(), 2);

        // 새 대상에 쓰인 내용이 전달됨
        append(&b, "from b\n");
        state.handle_event(modified(&b)).await;
        assert_eq!(*lines.lock().unwrap(), vec!["from b"]);
    }

    #[tokio::test]
    async fn config_change_removes_target_live() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.log");
        let b = touch(dir.path(), "b.log");
        let config = write_monitor(dir.path(), &[&a, &b], &[]);

        let (mut state, lines) = build_loop(&config).await;
        assert_eq!(state.cursors.len(), 2);

        let config = write_monitor(dir.path(), &[&a], &[]);
        state.handle_event(modified(&config)).await;
        assert_eq!(state.cursors.len(), 1);

        // 제거된 파일의 이벤트는 무시됨
        append(&b, "should not appear\n");
        state.handle_event(modified(&b)).await;
        assert!(lines.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn broken_config_keeps_previous_targets() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.log");
        let config = write_monitor(dir.path(), &[&a], &[]);

        let (mut state, lines) = build_loop(&config).await;

        // 깨진 설정으로 덮어쓰기: 리로드 거부, 기존 대상 유지
        std::fs::write(&config, "Filenames: [unclosed\n").unwrap();
        state.handle_event(modified(&config)).await;
        assert_eq!(state.cursors.len(), 1);

        append(&a, "still tailing\n");
        state.handle_event(modified(&a)).await;
        assert_eq!(*lines.lock().unwrap(), vec!["still tailing"]);
    }

    #[tokio::test]
    async fn reload_continuity_no_loss_no_duplicate() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.log");
        let config = write_monitor(dir.path(), &[&a], &["ERROR"]);

        let (mut state, lines) = build_loop(&config).await;

        append(&a, "before reload\n");
        state.handle_event(modified(&a)).await;

        // 키워드만 바뀐 리로드: 커서는 유지되어야 함
        let config = write_monitor(dir.path(), &[&a], &["panic"]);
        state.handle_event(modified(&config)).await;

        append(&a, "after reload\n");
        state.handle_event(modified(&a)).await;

        assert_eq!(*lines.lock().unwrap(), vec!["before reload", "after reload"]);
    }

    #[tokio::test]
    async fn engine_builder_run_fails_fast_on_missing_config() {
        let engine = TailEngineBuilder::new()
            .config(EngineConfig {
                monitor_path: PathBuf::from("/nonexistent/monitor.yaml"),
                ..Default::default()
            })
            .build();
        let err = engine.run(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, TailError::Config(_)));
    }
}

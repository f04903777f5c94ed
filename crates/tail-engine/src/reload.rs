//! 설정 감시자 — 모니터 YAML의 핫 리로드
//!
//! 현재 활성 스냅샷을 `tokio::sync::watch` 채널로 게재합니다. 리로드가
//! 성공하면 스냅샷이 통째로 교체되고, 실패하면 기존 스냅샷이 그대로
//! 유지됩니다 (last known good). 시작 시점의 최초 로드 실패만 치명적이며,
//! 그 이후의 모든 리로드 실패는 경고로 끝납니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;

use logwarden_core::LogwardenError;
use logwarden_core::monitor::MonitorSnapshot;

use crate::error::TailError;

/// 모니터 설정 감시자
///
/// 단일 작성자: 스냅샷 교체는 엔진 루프가 이 타입을 통해서만 수행합니다.
#[derive(Debug)]
pub struct ConfigWatcher {
    /// 모니터 YAML의 정규화된 경로
    path: PathBuf,
    /// 설정 파일이 있는 디렉토리 (정규화됨)
    config_dir: PathBuf,
    tx: watch::Sender<Arc<MonitorSnapshot>>,
}

impl ConfigWatcher {
    /// 설정 파일을 최초 로드하고 감시자를 생성합니다.
    ///
    /// 여기서의 실패는 치명적입니다: 유효한 초기 설정 없이는 엔진을
    /// 시작할 수 없습니다.
    pub async fn bootstrap(
        path: &Path,
    ) -> Result<(Self, watch::Receiver<Arc<MonitorSnapshot>>), TailError> {
        let canonical = path.canonicalize().map_err(|_| {
            TailError::Config(logwarden_core::ConfigError::FileNotFound {
                path: path.display().to_string(),
            })
        })?;
        let config_dir = canonical
            .parent()
            .ok_or_else(|| TailError::ConfigDirWatch {
                dir: canonical.display().to_string(),
                reason: "monitor config path has no parent directory".to_owned(),
            })?
            .to_path_buf();

        let initial = Self::load_snapshot(&canonical).await?;
        tracing::info!(
            path = %canonical.display(),
            targets = initial.target_files.len(),
            keywords = initial.keywords.len(),
            "monitor config loaded"
        );

        let (tx, rx) = watch::channel(Arc::new(initial));
        Ok((
            Self {
                path: canonical,
                config_dir,
                tx,
            },
            rx,
        ))
    }

    /// 설정 파일이 있는 디렉토리를 반환합니다.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// 현재 활성 스냅샷을 반환합니다.
    pub fn current(&self) -> Arc<MonitorSnapshot> {
        self.tx.borrow().clone()
    }

    /// 이벤트 경로가 감시 중인 설정 파일을 가리키는지 확인합니다.
    ///
    /// 에디터에 따라 이벤트 경로가 정규화 전 형태로 올 수 있으므로
    /// 파일명과 부모 디렉토리를 각각 비교합니다.
    pub fn matches(&self, event_path: &Path) -> bool {
        let same_name = event_path.file_name() == self.path.file_name();
        let same_dir = event_path
            .parent()
            .map(|p| p == self.config_dir)
            .unwrap_or(false);
        same_name && same_dir
    }

    /// 설정 파일을 다시 로드합니다.
    ///
    /// 성공하면 `(이전, 새)` 스냅샷 쌍을 반환하고 게재 채널을 교체합니다.
    /// 파싱/검증 실패 시 채널은 건드리지 않으므로 기존 스냅샷이 계속
    /// 유효합니다.
    pub async fn reload(&self) -> Result<(Arc<MonitorSnapshot>, Arc<MonitorSnapshot>), TailError> {
        let snapshot = Self::load_snapshot(&self.path).await?;
        let new = Arc::new(snapshot);
        let old = self.tx.send_replace(Arc::clone(&new));
        Ok((old, new))
    }

    async fn load_snapshot(path: &Path) -> Result<MonitorSnapshot, TailError> {
        match MonitorSnapshot::load(path).await {
            Ok(snapshot) => Ok(snapshot),
            Err(LogwardenError::Config(e)) => Err(TailError::Config(e)),
            Err(LogwardenError::Io(e)) => Err(TailError::Io(e)),
            Err(other) => Err(TailError::Channel(other.to_string())),
        }
    }
}

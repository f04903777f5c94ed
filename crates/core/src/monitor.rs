//! 감시 대상 모델 — 핫 리로드되는 모니터 YAML의 파싱과 스냅샷
//!
//! [`MonitorFile`]은 디스크의 YAML을 그대로 반영한 원시 구조체이고,
//! [`MonitorSnapshot`]은 그로부터 파생된 불변 스냅샷입니다.
//! 스냅샷은 생성 후 절대 변경되지 않으며, 리로드 성공 시 통째로 교체됩니다.
//! 파싱이나 검증이 실패하면 기존 스냅샷이 그대로 유지됩니다 (last known good).
//!
//! # 모니터 YAML 형식
//! ```yaml
//! Filenames:
//!   - /var/log/app/a.log
//!   - /var/log/app/b.log
//! Keywords:
//!   - ERROR
//!   - panic
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, LogwardenError};

/// 모니터 YAML의 원시 구조
///
/// 필드명은 기존 운영 환경의 설정 파일과 호환되도록 대문자로 시작합니다.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorFile {
    /// 감시 대상 로그 파일 경로 목록
    #[serde(rename = "Filenames")]
    pub filenames: Vec<PathBuf>,
    /// 알림 키워드 목록 (비어 있어도 유효)
    #[serde(rename = "Keywords", default)]
    pub keywords: Vec<String>,
}

impl MonitorFile {
    /// YAML 문자열을 파싱합니다.
    pub fn parse(yaml_str: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml_str).map_err(|e| ConfigError::ParseFailed {
            reason: format!("YAML parse error: {e}"),
        })
    }
}

/// 감시 대상 스냅샷 — 검증과 경로 정규화를 마친 불변 모델
///
/// 모든 컴포넌트는 이 스냅샷을 `Arc`로 공유하며 읽기만 합니다.
/// 갱신은 단일 작성자(엔진 루프)가 새 스냅샷으로 교체하는 방식으로만
/// 이루어집니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSnapshot {
    /// 알림 키워드 집합
    pub keywords: BTreeSet<String>,
    /// 감시 대상 파일의 정규화된 절대 경로 집합
    pub target_files: BTreeSet<PathBuf>,
    /// 감시할 디렉토리 집합 (target_files의 부모 디렉토리들)
    pub watch_dirs: BTreeSet<PathBuf>,
}

impl MonitorSnapshot {
    /// 원시 모니터 설정에서 스냅샷을 생성합니다.
    ///
    /// 모든 검증은 여기서 즉시 수행됩니다:
    /// - 파일 목록이 비어 있으면 거부
    /// - 각 대상이 존재하는 일반 파일이 아니면 거부
    ///
    /// 하나라도 실패하면 스냅샷은 생성되지 않고, 호출측은 기존 스냅샷을
    /// 유지해야 합니다.
    pub fn resolve(file: &MonitorFile) -> Result<Self, ConfigError> {
        if file.filenames.is_empty() {
            return Err(ConfigError::EmptyFileList);
        }

        let mut target_files = BTreeSet::new();
        let mut watch_dirs = BTreeSet::new();

        for raw in &file.filenames {
            let meta = std::fs::metadata(raw).map_err(|_| ConfigError::MissingTargetFile {
                path: raw.display().to_string(),
            })?;
            if !meta.is_file() {
                return Err(ConfigError::NotRegularFile {
                    path: raw.display().to_string(),
                });
            }
            // 심볼릭 링크 해소 포함 정규화
            let canonical = raw
                .canonicalize()
                .map_err(|_| ConfigError::MissingTargetFile {
                    path: raw.display().to_string(),
                })?;
            if let Some(parent) = canonical.parent() {
                watch_dirs.insert(parent.to_path_buf());
            }
            target_files.insert(canonical);
        }

        let keywords = file.keywords.iter().cloned().collect();

        Ok(Self {
            keywords,
            target_files,
            watch_dirs,
        })
    }

    /// 모니터 YAML 파일을 읽고 파싱/검증하여 스냅샷을 생성합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogwardenError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogwardenError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogwardenError::Io(e)
            }
        })?;
        let file = MonitorFile::parse(&content)?;
        Ok(Self::resolve(&file)?)
    }

    /// 해당 경로가 현재 감시 대상인지 확인합니다.
    pub fn is_target(&self, path: &Path) -> bool {
        self.target_files.contains(path)
    }
}

//! 커서 테이블 -- 파일별 읽기 핸들과 오프셋 관리
//!
//! [`CursorTable`]은 감시 대상 파일의 열린 핸들과 마지막 읽기 위치를
//! 소유합니다. 핸들은 다른 컴포넌트와 공유되지 않으며, 경로가 대상
//! 집합에서 빠지거나 프로세스가 종료될 때 명시적으로 닫힙니다.
//!
//! # 핵심 불변식
//! - `position`은 핸들 수명 동안 단조 증가하며, 항상 "완결된 라인까지
//!   디스패치한 오프셋"과 일치합니다. 같은 바이트가 두 번 전달되거나
//!   완결된 라인이 누락되는 일은 없습니다.
//! - 커서는 항상 파일의 *현재 끝*에서 시작합니다. 과거 내용은 읽지 않습니다.
//! - 종결자 없는 꼬리 부분 라인은 소비하지 않고 남겨 두었다가,
//!   종결된 뒤 다음 호출에서 다시 읽습니다.
//!
//! # 지원하지 않는 경우
//! 로그 로테이션/절단은 지원하지 않습니다. 파일이 줄어든 것이 관측되면
//! 경고를 남기고 아무것도 전달하지 않습니다 (엄격한 append-only 가정).

use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use logwarden_core::metrics::{TAIL_BYTES_READ_TOTAL, TAIL_CURSORS_OPEN};

use crate::error::TailError;

/// 파일 하나의 읽기 상태
#[derive(Debug)]
struct Cursor {
    /// 열린 파일 핸들 (이 테이블이 단독 소유)
    file: File,
    /// 마지막으로 소비한 바이트 오프셋
    position: u64,
    /// 파일 축소를 이미 경고했는지 (반복 경고 방지)
    shrink_warned: bool,
}

/// 커서 테이블 -- 정규화된 경로를 키로 하는 커서 맵
#[derive(Debug)]
pub struct CursorTable {
    cursors: HashMap<PathBuf, Cursor>,
    /// 한 라인의 최대 길이 (바이트, 초과분은 잘림)
    max_line_bytes: usize,
}

impl CursorTable {
    /// 새 커서 테이블을 생성합니다.
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            cursors: HashMap::new(),
            max_line_bytes,
        }
    }

    /// 파일을 열고 현재 끝으로 이동한 커서를 등록합니다.
    ///
    /// 이미 열린 경로면 기존 커서를 유지합니다 (오프셋 보존).
    /// 열기 실패는 복구 가능한 에러입니다: 호출측이 로그를 남기고
    /// 해당 파일만 건너뜁니다.
    pub async fn open(&mut self, path: &Path) -> Result<(), TailError> {
        if self.cursors.contains_key(path) {
            return Ok(());
        }

        let mut file = File::open(path).await.map_err(|e| TailError::CursorOpen {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        // 항상 현재 EOF에서 시작 -- 과거 내용은 전달하지 않음
        let position = file
            .seek(SeekFrom::End(0))
            .await
            .map_err(|e| TailError::CursorOpen {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(path = %path.display(), position, "cursor opened at end of file");
        self.cursors.insert(
            path.to_path_buf(),
            Cursor {
                file,
                position,
                shrink_warned: false,
            },
        );
        metrics::gauge!(TAIL_CURSORS_OPEN).set(self.cursors.len() as f64);
        Ok(())
    }

    /// 해당 경로의 커서가 열려 있는지 확인합니다.
    pub fn contains(&self, path: &Path) -> bool {
        self.cursors.contains_key(path)
    }

    /// 커서를 닫고 테이블에서 제거합니다.
    ///
    /// 핸들은 여기서 결정적으로 해제됩니다. 이미 닫힌 경로에 대해서는
    /// 아무 일도 하지 않습니다 (멱등).
    pub fn close(&mut self, path: &Path) -> bool {
        let removed = self.cursors.remove(path).is_some();
        if removed {
            tracing::debug!(path = %path.display(), "cursor closed");
            metrics::gauge!(TAIL_CURSORS_OPEN).set(self.cursors.len() as f64);
        }
        removed
    }

    /// 모든 커서를 닫습니다 (종료 시점).
    pub fn close_all(&mut self) {
        let count = self.cursors.len();
        self.cursors.clear();
        metrics::gauge!(TAIL_CURSORS_OPEN).set(0.0);
        if count > 0 {
            tracing::info!(count, "all cursors closed");
        }
    }

    /// 열린 커서 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    /// 커서가 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// 열린 커서의 경로 목록을 반환합니다.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.cursors.keys().cloned().collect()
    }

    /// 커서 위치 조회 (테스트/진단용)
    pub fn position(&self, path: &Path) -> Option<u64> {
        self.cursors.get(path).map(|c| c.position)
    }

    /// 커서 위치부터 파일의 현재 길이까지 읽어, 완결된 라인만 반환합니다.
    ///
    /// 종결자가 없는 꼬리 부분은 소비하지 않습니다: `position`은 마지막
    /// 종결자 뒤까지만 전진하고, 부분 라인은 종결된 뒤 다음 호출에서
    /// 다시 읽힙니다. 등록되지 않은 경로는 빈 결과를 반환합니다.
    ///
    /// 파일 길이가 `position`보다 작아진 경우(로테이션/절단)는 지원하지
    /// 않는 상황이므로, 경고 한 번을 남기고 빈 결과를 반환합니다.
    pub async fn read_new_lines(&mut self, path: &Path) -> Result<Vec<String>, TailError> {
        let Some(cursor) = self.cursors.get_mut(path) else {
            return Ok(Vec::new());
        };

        let len = cursor
            .file
            .metadata()
            .await
            .map_err(|e| TailError::CursorRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
            .len();

        if len < cursor.position {
            if !cursor.shrink_warned {
                cursor.shrink_warned = true;
                tracing::warn!(
                    path = %path.display(),
                    position = cursor.position,
                    len,
                    "file shrank below cursor position; rotation/truncation is unsupported, \
                     no further lines will be delivered until the file grows past the cursor"
                );
            }
            return Ok(Vec::new());
        }
        cursor.shrink_warned = false;

        if len == cursor.position {
            return Ok(Vec::new());
        }

        cursor
            .file
            .seek(SeekFrom::Start(cursor.position))
            .await
            .map_err(|e| TailError::CursorRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut buf = Vec::with_capacity((len - cursor.position) as usize);
        (&mut cursor.file)
            .take(len - cursor.position)
            .read_to_end(&mut buf)
            .await
            .map_err(|e| TailError::CursorRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let (lines, consumed) = split_complete_lines(&buf, self.max_line_bytes);
        cursor.position += consumed as u64;
        metrics::counter!(TAIL_BYTES_READ_TOTAL).increment(consumed as u64);

        Ok(lines)
    }
}

/// 버퍼에서 완결된 라인만 추출합니다.
///
/// 반환값은 `(라인 목록, 소비한 바이트 수)`입니다. 소비한 바이트 수는
/// 마지막 `\n` 직후까지이며, 그 뒤의 부분 라인은 버퍼에 남은 것으로
/// 간주합니다. `\r\n` 종결자의 `\r`은 제거되고, UTF-8이 아닌 바이트는
/// 손실 변환됩니다. `max_line_bytes`를 넘는 라인은 잘립니다.
pub fn split_complete_lines(buf: &[u8], max_line_bytes: usize) -> (Vec<String>, usize) {
    let mut lines = Vec::new();
    let mut start = 0;

    for (i, byte) in buf.iter().enumerate() {
        if *byte != b'\n' {
            continue;
        }
        let mut line = &buf[start..i];
        if line.last() == Some(&b'\r') {
            line = &line[..line.len() - 1];
        }
        if line.len() > max_line_bytes {
            tracing::warn!(
                length = line.len(),
                max = max_line_bytes,
                "line exceeds maximum length, truncating"
            );
            line = &line[..max_line_bytes];
        }
        lines.push(String::from_utf8_lossy(line).into_owned());
        start = i + 1;
    }

    (lines, start)
}

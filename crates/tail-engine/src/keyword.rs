//! 키워드 매칭 핸들러
//!
//! 라인 내용에 설정된 키워드가 부분 문자열로 포함되어 있는지 검사하고,
//! 매칭 시 경고 레벨 알림 로그를 남깁니다. 키워드는 레코드에 실린
//! 스냅샷에서 읽으므로, 리로드 이전에 추출된 라인은 이전 키워드로,
//! 이후에 추출된 라인은 새 키워드로 평가됩니다.

use logwarden_core::metrics::{KEYWORD_MATCHES_TOTAL, KEYWORD_NO_MATCH_TOTAL, LABEL_KEYWORD};
use logwarden_core::{LineHandler, LineRecord, LogwardenError};

/// 키워드 부분 문자열 매칭 핸들러
///
/// 매칭은 대소문자를 구분하며, 라인당 첫 번째 매칭 키워드 하나만
/// 보고합니다 (키워드는 정렬된 집합이므로 결과는 결정적입니다).
pub struct KeywordHandler;

impl KeywordHandler {
    /// 새 키워드 핸들러를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl Default for KeywordHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineHandler for KeywordHandler {
    fn name(&self) -> &str {
        "keyword"
    }

    fn on_line(&self, record: &LineRecord) -> Result<(), LogwardenError> {
        let matched = record
            .snapshot
            .keywords
            .iter()
            .find(|kw| record.content.contains(kw.as_str()));

        match matched {
            Some(keyword) => {
                metrics::counter!(
                    KEYWORD_MATCHES_TOTAL,
                    LABEL_KEYWORD => keyword.clone()
                )
                .increment(1);
                tracing::warn!(
                    keyword = %keyword,
                    source = %record.source.display(),
                    content = %record.content,
                    "keyword matched"
                );
            }
            None => {
                metrics::counter!(KEYWORD_NO_MATCH_TOTAL).increment(1);
                tracing::debug!(
                    source = %record.source.display(),
                    "no keyword matched"
                );
            }
        }
        Ok(())
    }
}

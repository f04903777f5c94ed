//! logwarden 증분 테일링/감시 재조정 엔진
//!
//! 이 크레이트는 로그 파일을 끝에서부터 증분으로 추적하고, 추출된
//! 라인을 핸들러 체인에 전달하며, 모니터 설정의 핫 리로드에 따라
//! 감시 상태를 재조정하는 엔진을 제공합니다.
//!
//! # 아키텍처
//!
//! ```text
//! notify 스레드 ──mpsc──▶ 이벤트 루프 (단일 태스크)
//!                          ├─ ConfigWatcher  : 모니터 YAML 리로드
//!                          ├─ WatchReconciler: 감시 집합 수렴
//!                          ├─ CursorTable    : 파일 핸들 + 오프셋
//!                          └─ Tailer ──▶ DispatchPipeline ──▶ LineHandler들
//! ```
//!
//! 엔진 상태 전체를 이벤트 루프 태스크 하나가 소유하므로 락이 없습니다.
//!
//! # 사용 예
//!
//! ```no_run
//! use logwarden_tail::{EngineConfig, KeywordHandler, TailEngineBuilder};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), logwarden_tail::TailError> {
//! let engine = TailEngineBuilder::new()
//!     .config(EngineConfig::default())
//!     .handler(Box::new(KeywordHandler::new()))
//!     .build();
//! engine.run(CancellationToken::new()).await
//! # }
//! ```

pub mod config;
pub mod cursor;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod keyword;
pub mod reconcile;
pub mod reload;
pub mod tailer;
pub mod watch;

pub use config::EngineConfig;
pub use cursor::CursorTable;
pub use dispatch::{DispatchPipeline, EchoHandler};
pub use engine::{TailEngine, TailEngineBuilder};
pub use error::TailError;
pub use keyword::KeywordHandler;
pub use reconcile::{ReconcileReport, WatchReconciler};
pub use reload::ConfigWatcher;
pub use tailer::Tailer;
pub use watch::{DirectoryWatcher, FsEvent, FsEventKind};

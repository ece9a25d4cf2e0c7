//! be-echo Verification API Library
//!
//! # Overview
//!
//! 이 라이브러리는 be-echo(텀블러 인증 습관 앱)의 백엔드 API를 제공합니다.
//!
//! 핵심은 인증-진행도 엔진입니다: 하나의 "인증 시도" 이벤트를
//! 하루 1회 제한 검사(원장), 스트릭/포인트 갱신(진행도 엔진),
//! 등급/업적/인사이트 파생 뷰, 그룹 보너스 규칙으로 연결합니다.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          API                              │
//! │                                                           │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐      │
//! │  │ Routes  │  │Services │  │   DB    │  │  Types  │      │
//! │  └────┬────┘  └────┬────┘  └────┬────┘  └────┬────┘      │
//! │       │            │            │            │           │
//! │       └────────────┴────────────┴────────────┘           │
//! │                         │                                 │
//! └─────────────────────────┼─────────────────────────────────┘
//!                           │
//!                           ▼
//!               ┌───────────────────────┐
//!               │ YOLO 분류 서버 (외부)  │
//!               └───────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 처리
//! - `dates`: 로컬 달력일 기준 날짜 유틸리티
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `services`: 비즈니스 로직 (원장, 스트릭, 등급, 업적, 인사이트, 그룹 보너스)
//! - `db`: 데이터베이스 연동
//! - `types`: 공통 타입 정의
//!
//! ## Usage
//!
//! ```rust,ignore
//! use be_echo_api::{config::Config, db::Database, services::CupClassifier};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let db = Database::connect(&config.database_url).await?;
//!     let classifier = CupClassifier::new(&config.classifier_url, config.classifier_timeout_ms);
//!
//!     // ... 서버 시작
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod config;
pub mod dates;
pub mod error;
pub mod routes;
pub mod services;
pub mod db;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::ApiError;
pub use db::Database;
pub use services::CupClassifier;

/// 애플리케이션 전역 상태
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub classifier: Arc<CupClassifier>,
    pub config: Arc<Config>,
}

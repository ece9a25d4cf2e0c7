//! Services Module
//!
//! 비즈니스 로직을 담당하는 서비스 레이어
//!
//! # Services
//! - `ledger`: 인증 시도 판정 (하루 1회 제한, 엔트리 구성)
//! - `streak`: 스트릭/포인트 갱신 상태 기계
//! - `grade`: LP → 등급 파생
//! - `achievements`: 업적 카탈로그 평가
//! - `insights`: 요약/주간 추이 집계
//! - `group_bonus`: 전원 인증 보너스 규칙
//! - `classifier`: 외부 YOLO 분류 서버 클라이언트

pub mod achievements;
pub mod classifier;
pub mod grade;
pub mod group_bonus;
pub mod insights;
pub mod ledger;
pub mod streak;

pub use classifier::{Classification, CupClassifier};
pub use grade::GradeInfo;
pub use group_bonus::BonusOutcome;
pub use ledger::{AttemptDecision, AttemptOutcome, AttemptPayload};
pub use streak::ProgressUpdate;

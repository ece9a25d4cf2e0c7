//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//! - `/health` - 헬스 체크
//! - `/users` - 사용자 생성(최초 인증)/조회/프로필, 홈·업적·인사이트 읽기 모델
//! - `/users/:id/verifications` - 인증 시도 제출 및 히스토리
//! - `/rankings/*` - 개인/그룹 랭킹
//! - `/grades/guide` - 등급 가이드

pub mod health;
pub mod rankings;
pub mod users;
pub mod verification;

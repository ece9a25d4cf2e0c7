//! Repository Pattern
//!
//! # Interview Q&A
//!
//! Q: 그룹 보너스만 trait 뒤에 둔 이유는?
//! A: 유일하게 여러 사용자가 공유 상태를 동시에 건드리는 경로라서
//!
//!    - 비즈니스 규칙(전원 인증 → 1일 1회 지급)은 순수하게 유지하고
//!      원자적 check-and-set만 스토어에 위임
//!    - 테스트에서 Mock 스토어로 멱등성/레이스 시나리오 재현 가능
//!    - 나머지 쿼리는 단일 세션 경로라 Database에 직접 구현 (MVP에서
//!      전면 추상화는 오버엔지니어링)

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

/// 그룹 보너스 규칙이 필요로 하는 저장소 인터페이스
///
/// `grant_bonus_if_unclaimed`는 반드시 원자적이어야 함:
/// 같은 날짜로 두 번 호출되면 정확히 한 번만 true를 반환.
#[async_trait]
pub trait GroupBonusStore: Send + Sync {
    /// 그룹의 전체 멤버 ID
    async fn member_ids(&self, group_id: &str) -> Result<Vec<String>>;

    /// 해당 달력일에 수락된 성공 기록이 있는 멤버 ID 집합
    async fn verified_member_ids(&self, group_id: &str, date_key: &str) -> Result<HashSet<String>>;

    /// 오늘 미지급 상태일 때만 전 멤버에게 bonus_lp 지급하고 true 반환
    /// (check-and-set과 지급이 하나의 트랜잭션)
    async fn grant_bonus_if_unclaimed(
        &self,
        group_id: &str,
        date_key: &str,
        bonus_lp: i64,
    ) -> Result<bool>;
}

// PostgreSQL 구현은 db/mod.rs의 Database 구조체에 있음
// 테스트용 Mock 구현:

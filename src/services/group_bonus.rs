//! 그룹 보너스 규칙
//!
//! # Interview Q&A
//!
//! Q: 왜 "하루 1회" 가드가 last_bonus_date 하나뿐인가?
//! A: 멱등성 장치를 한 곳에 모으기 위해
//!
//!    - 트리거는 "수락된 성공 이후"마다 기회주의적으로 실행됨
//!      (마지막 멤버가 누군지 미리 알 수 없음)
//!    - 거의 동시에 두 멤버가 인증하면 둘 다 allVerified=true를
//!      관측할 수 있음 → 지급 여부는 저장소의 원자적 조건부
//!      UPDATE(check-and-set)가 단독으로 결정
//!    - 재시도 로직 없음: 레이스는 구조적으로 막고, 실패는 로그만 남김
//!      (보너스는 부가 기능이라 인증 흐름을 막으면 안 됨)

use anyhow::Result;

use crate::db::GroupBonusStore;

/// 전원 인증 보너스 LP (멤버 1인당)
pub const GROUP_BONUS_LP: i64 = 30;

/// 보너스 검사 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusOutcome {
    /// 전원 인증 확인, 오늘 첫 지급 완료
    Granted,
    /// 아직 인증하지 않은 멤버가 있음
    NotAllVerified,
    /// 오늘 이미 지급됨 (멱등 가드)
    AlreadyGranted,
    /// 멤버 없는 그룹 - 아무것도 하지 않음
    EmptyGroup,
}

/// 전원 인증 보너스 검사 및 지급
///
/// 수락된 성공 이후, 그룹 소속 사용자에 대해 호출됨.
/// 같은 날 몇 번을 호출해도 지급은 정확히 한 번.
pub async fn maybe_grant_bonus<S: GroupBonusStore + ?Sized>(
    store: &S,
    group_id: &str,
    today_key: &str,
) -> Result<BonusOutcome> {
    let member_ids = store.member_ids(group_id).await?;
    if member_ids.is_empty() {
        return Ok(BonusOutcome::EmptyGroup);
    }

    let verified = store.verified_member_ids(group_id, today_key).await?;
    let all_verified = member_ids.iter().all(|id| verified.contains(id));

    if !all_verified {
        return Ok(BonusOutcome::NotAllVerified);
    }

    if store
        .grant_bonus_if_unclaimed(group_id, today_key, GROUP_BONUS_LP)
        .await?
    {
        tracing::info!(group_id, date = today_key, "그룹 전원 인증 보너스 지급");
        Ok(BonusOutcome::Granted)
    } else {
        Ok(BonusOutcome::AlreadyGranted)
    }
}

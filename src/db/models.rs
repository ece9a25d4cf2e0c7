//! Database Models
//!
//! 인증 원장과 진행도 스냅샷의 저장 모델.
//! 사용자 통계는 누적 카운터로 저장하고, 원장(verifications)은
//! 최신순 append-only 히스토리로 유지함.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// 사용자 진행도 스냅샷
///
/// 불변식: best_streak >= streak_days,
/// total_success_count는 단조 증가 (보관 한도 때문에 원장 개수보다 클 수 있음)
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// 인증 제공자가 발급한 안정적인 사용자 ID
    pub id: String,

    /// 표시 이름
    pub name: String,

    pub email: Option<String>,
    pub photo_url: Option<String>,

    /// 누적 포인트 (LP) - 등급 산정의 유일한 입력
    pub lp: i64,

    /// 현재 연속 인증 일수
    pub streak_days: i32,

    /// 역대 최고 연속 일수 (단조 비감소)
    pub best_streak: i32,

    /// 누적 인증 성공 횟수 (단조 비감소)
    pub total_success_count: i64,

    /// 마지막 인증 성공 시각 (성공 이력 없으면 NULL)
    pub last_success_date: Option<DateTime<Utc>>,

    /// 소속 그룹 (없으면 NULL)
    pub group_id: Option<String>,
    pub is_group_leader: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 인증 시도 기록 (원장 엔트리)
///
/// 생성 후 불변. 사용자별 최신 365건만 보관.
/// 불변식: 한 사용자의 같은 달력일에 success = true 엔트리는 최대 1개.
#[derive(Debug, Clone, FromRow)]
pub struct VerificationEntry {
    pub id: Uuid,
    pub user_id: String,

    /// 표시용 비정규화 이름 (프로필 변경 시 일괄 갱신됨)
    pub user_name: String,

    /// 인증 시점의 소속 그룹 (그룹 보너스 조회용 인덱스 키)
    pub group_id: Option<String>,

    /// 수락된 성공 여부 - 분류 성공 AND 당일 한도 미소진
    pub success: bool,

    /// 사용자에게 보여줄 결과 메시지
    pub message: String,

    /// 분류기 신뢰도 (0..1, 없을 수 있음)
    pub confidence: Option<f64>,

    /// 외부 오브젝트 스토리지의 이미지 참조 (선택)
    pub image_url: Option<String>,

    /// 로컬 달력일 키 (YYYY-MM-DD) - 하루 1회 제한과 그룹 보너스 조회가 사용
    pub date: String,

    pub verified_at: DateTime<Utc>,
}

/// 개인 랭킹 행
#[derive(Debug, Clone, FromRow)]
pub struct PersonalRankingRow {
    pub id: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub lp: i64,
    pub streak_days: i32,
    pub group_id: Option<String>,
}

/// 그룹 랭킹 행 (멤버 LP 합산)
#[derive(Debug, Clone, FromRow)]
pub struct GroupRankingRow {
    pub id: String,
    pub name: String,
    pub code: String,
    pub total_lp: i64,
    pub member_count: i32,
    pub leader_id: String,
}

//! 스트릭 & 포인트 엔진
//!
//! 원장이 "수락된 성공"으로 판정한 시도 하나를 사용자 누적 통계에
//! 반영하는 순수 함수. 거절/중복 시도는 여기까지 오지 않음.
//!
//! 스트릭 상태 기계 (마지막 성공일과 오늘의 달력일 간격 기준):
//! - 성공 이력 없음         → 1
//! - 간격 0 (같은 날)       → max(streak, 1)  (원장이 막아주지만 방어적으로)
//! - 간격 1 (연속)          → streak + 1
//! - 간격 2 이상 (끊김)     → 1

use chrono::{DateTime, Local, Utc};

use crate::dates::day_gap;
use crate::db::User;

/// 인증 성공 1회당 지급 LP
pub const VERIFICATION_LP: i64 = 10;

/// 수락된 성공 이후의 진행도 스냅샷
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub lp: i64,
    pub streak_days: i32,
    pub best_streak: i32,
    pub total_success_count: i64,
    pub last_success_date: Option<DateTime<Utc>>,
}

impl ProgressUpdate {
    /// 변경 없는 현재 상태 (거절된 시도의 응답 조립용)
    pub fn unchanged(user: &User) -> Self {
        Self {
            lp: user.lp,
            streak_days: user.streak_days,
            best_streak: user.best_streak,
            total_success_count: user.total_success_count,
            last_success_date: user.last_success_date,
        }
    }
}

/// 수락된 성공을 진행도에 반영
///
/// 실패 조건 없음 - last_success_date가 없으면 "첫 성공"으로 취급
pub fn apply_success(user: &User, now: DateTime<Local>) -> ProgressUpdate {
    let next_streak = next_streak(user, now);

    ProgressUpdate {
        lp: user.lp + VERIFICATION_LP,
        streak_days: next_streak,
        best_streak: user.best_streak.max(next_streak),
        total_success_count: user.total_success_count + 1,
        last_success_date: Some(now.with_timezone(&Utc)),
    }
}

fn next_streak(user: &User, now: DateTime<Local>) -> i32 {
    let last = match user.last_success_date {
        Some(ts) => ts.with_timezone(&Local).date_naive(),
        None => return 1,
    };

    match day_gap(last, now.date_naive()) {
        0 => user.streak_days.max(1),
        1 => user.streak_days + 1,
        _ => 1,
    }
}

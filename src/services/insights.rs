//! 인사이트 집계 서비스
//!
//! 원장과 현재 통계에서 요약 수치와 주간 추이를 파생하는 순수 함수.

use chrono::{DateTime, Duration, Local};
use serde::Serialize;

use crate::dates::start_of_week;
use crate::db::{User, VerificationEntry};

/// 주간 추이 조회 기간 (주 단위)
pub const INSIGHT_WEEKS: usize = 4;

/// 요약 통계
#[derive(Debug, Clone, Serialize)]
pub struct InsightsSummary {
    pub total_success: i64,
    pub total_fail: i64,
    pub best_streak: i32,
    pub lp: i64,
}

/// 주간 버킷 (월요일 시작 7일 구간)
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyTrendBucket {
    /// "이번 주" 또는 "N주 전"
    pub label: String,
    /// 구간 내 수락된 성공 건수
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub summary: InsightsSummary,
    /// 과거 → 현재 순
    pub weekly_trend: Vec<WeeklyTrendBucket>,
}

/// 인사이트 빌드
///
/// `entries`는 보관 한도(365건) 내의 원장 - total_fail은 그 범위에서 계산.
/// total_success는 저장 카운터와 원장 중 큰 값 (업적 평가와 같은 보정).
pub fn build_insights(user: &User, entries: &[VerificationEntry], now: DateTime<Local>) -> Insights {
    let ledger_success = entries.iter().filter(|e| e.success).count() as i64;
    let total_success = user.total_success_count.max(ledger_success);
    let total_fail = entries.len() as i64 - ledger_success;

    let this_week_start = start_of_week(now.date_naive());

    let mut weekly_trend: Vec<WeeklyTrendBucket> = (0..INSIGHT_WEEKS)
        .map(|i| {
            let week_start = this_week_start - Duration::weeks(i as i64);
            let week_end = week_start + Duration::days(7);

            let count = entries
                .iter()
                .filter(|e| {
                    if !e.success {
                        return false;
                    }
                    let day = e.verified_at.with_timezone(&Local).date_naive();
                    day >= week_start && day < week_end
                })
                .count() as i64;

            let label = if i == 0 {
                "이번 주".to_string()
            } else {
                format!("{}주 전", i)
            };

            WeeklyTrendBucket { label, count }
        })
        .collect();

    weekly_trend.reverse();

    Insights {
        summary: InsightsSummary {
            total_success,
            total_fail,
            best_streak: user.best_streak,
            lp: user.lp,
        },
        weekly_trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn user(lp: i64, best_streak: i32, total: i64) -> User {
        User {
            id: "user-1".to_string(),
            name: "사용자".to_string(),
            email: None,
            photo_url: None,
            lp,
            streak_days: 0,
            best_streak,
            total_success_count: total,
            last_success_date: None,
            group_id: None,
            is_group_leader: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry(y: i32, m: u32, d: u32, success: bool) -> VerificationEntry {
        let at = Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        VerificationEntry {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            user_name: "사용자".to_string(),
            group_id: None,
            success,
            message: String::new(),
            confidence: None,
            image_url: None,
            date: at.format("%Y-%m-%d").to_string(),
            verified_at: at.with_timezone(&Utc),
        }
    }

    // 기준일: 2024-06-19 (수요일) → 이번 주는 6/17(월)부터
    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 19, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_summary_counts() {
        let entries = vec![
            entry(2024, 6, 19, true),
            entry(2024, 6, 18, false),
            entry(2024, 6, 17, true),
        ];
        let insights = build_insights(&user(20, 2, 2), &entries, now());

        assert_eq!(insights.summary.total_success, 2);
        assert_eq!(insights.summary.total_fail, 1);
        assert_eq!(insights.summary.best_streak, 2);
        assert_eq!(insights.summary.lp, 20);
    }

    #[test]
    fn test_summary_uses_max_of_counter_and_ledger() {
        // 원장이 잘려 성공 1건만 남아도 카운터(40)를 믿음
        let entries = vec![entry(2024, 6, 19, true)];
        let insights = build_insights(&user(400, 10, 40), &entries, now());
        assert_eq!(insights.summary.total_success, 40);
    }

    #[test]
    fn test_weekly_trend_buckets_and_order() {
        let entries = vec![
            // 이번 주 (6/17 월요일 시작)
            entry(2024, 6, 17, true),
            entry(2024, 6, 19, true),
            // 1주 전 (6/10..6/17)
            entry(2024, 6, 12, true),
            // 1주 전이지만 실패 → 집계 제외
            entry(2024, 6, 13, false),
            // 3주 전 (5/27..6/3)
            entry(2024, 5, 28, true),
            // 조회 기간 밖 (4주 초과)
            entry(2024, 5, 1, true),
        ];

        let insights = build_insights(&user(0, 0, 0), &entries, now());
        let trend = &insights.weekly_trend;

        assert_eq!(trend.len(), 4);
        // 과거 → 현재 순
        assert_eq!(trend[0].label, "3주 전");
        assert_eq!(trend[0].count, 1);
        assert_eq!(trend[1].label, "2주 전");
        assert_eq!(trend[1].count, 0);
        assert_eq!(trend[2].label, "1주 전");
        assert_eq!(trend[2].count, 1);
        assert_eq!(trend[3].label, "이번 주");
        assert_eq!(trend[3].count, 2);
    }

    #[test]
    fn test_week_boundary_is_monday_aligned() {
        // 일요일(6/16)은 "1주 전", 월요일(6/17)은 "이번 주"
        let entries = vec![entry(2024, 6, 16, true), entry(2024, 6, 17, true)];
        let insights = build_insights(&user(0, 0, 0), &entries, now());

        let this_week = insights.weekly_trend.last().unwrap();
        assert_eq!(this_week.label, "이번 주");
        assert_eq!(this_week.count, 1);
        assert_eq!(insights.weekly_trend[2].count, 1); // 1주 전
    }
}

//! 인증 원장 (Verification Ledger)
//!
//! 새 시도가 "카운트되는지"를 판정하고 원장에 추가할 엔트리를 만드는
//! 순수 판정 함수. 저장(실패 엔트리 정리, 365건 보관 한도)은 db 레이어가
//! 같은 규칙으로 수행함.
//!
//! 핵심 규칙: 한 사용자의 같은 로컬 달력일에 수락된 성공은 최대 1건.
//! 같은 날 두 번째 성공 시도는 success = false + "이미 완료" 메시지로
//! 기록만 남고 통계를 건드리지 않음 → 이중 제출에 멱등.

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

use crate::dates::local_date_key;
use crate::db::User;

/// 사용자별 원장 보관 한도 (최신순)
pub const MAX_HISTORY_ENTRIES: i64 = 365;

/// 분류 결과로부터 만들어지는 시도 페이로드
#[derive(Debug, Clone)]
pub struct AttemptPayload {
    /// 분류기가 텀블러로 판정했는지
    pub success: bool,
    /// 분류기 메시지 (없으면 기본 문구)
    pub message: Option<String>,
    /// 신뢰도 (0..1)
    pub confidence: Option<f64>,
    /// 외부 스토리지의 이미지 참조
    pub image_url: Option<String>,
}

/// 시도 판정 결과 (태그된 타입 - 느슨한 meta 객체 대체)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 수락된 성공 - 통계가 갱신됨
    Accepted,
    /// 분류 실패 - 기록만 남음
    Rejected,
    /// 오늘 이미 완료 - 정책상 거절, 기록만 남음
    AlreadyCompleted,
}

/// 원장에 추가할 엔트리 (생성 후 불변)
#[derive(Debug, Clone)]
pub struct NewVerification {
    pub id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub group_id: Option<String>,
    pub success: bool,
    pub message: String,
    pub confidence: Option<f64>,
    pub image_url: Option<String>,
    /// 로컬 달력일 키 (YYYY-MM-DD)
    pub date: String,
    pub verified_at: DateTime<Utc>,
}

/// 한 번의 시도에 대한 판정
#[derive(Debug, Clone)]
pub struct AttemptDecision {
    pub entry: NewVerification,
    pub outcome: AttemptOutcome,
}

impl AttemptDecision {
    /// 통계를 갱신해야 하는 시도인지
    pub fn accepted(&self) -> bool {
        self.outcome == AttemptOutcome::Accepted
    }

    pub fn already_completed(&self) -> bool {
        self.outcome == AttemptOutcome::AlreadyCompleted
    }
}

/// 시도 하나를 판정하고 엔트리를 구성
///
/// - `alreadyAcceptedToday` = 성공 시도 AND 오늘 키 == 마지막 성공일 키
/// - 엔트리의 success = payload.success AND NOT alreadyAcceptedToday
/// - 이미 완료면 메시지를 "내일 다시" 안내로 강제 교체
///
/// 수락된 성공(`Accepted`)일 때 호출자는 당일의 실패 엔트리를 지운 뒤
/// 이 엔트리를 추가해야 함 (하루에 의미 있는 기록 1건 유지).
pub fn record_attempt(user: &User, payload: AttemptPayload, now: DateTime<Local>) -> AttemptDecision {
    let today_key = local_date_key(now);
    let last_success_key = user
        .last_success_date
        .map(|ts| local_date_key(ts.with_timezone(&Local)));

    let already_accepted_today =
        payload.success && last_success_key.as_deref() == Some(today_key.as_str());

    let success = payload.success && !already_accepted_today;

    let message = if already_accepted_today {
        "오늘 인증은 이미 완료되었어요. 내일 다시 시도해주세요.".to_string()
    } else {
        payload.message.unwrap_or_else(|| {
            if payload.success {
                "텀블러 인증을 완료했어요!".to_string()
            } else {
                "텀블러 인증이 실패했어요.".to_string()
            }
        })
    };

    let outcome = if already_accepted_today {
        AttemptOutcome::AlreadyCompleted
    } else if success {
        AttemptOutcome::Accepted
    } else {
        AttemptOutcome::Rejected
    };

    AttemptDecision {
        entry: NewVerification {
            id: Uuid::new_v4(),
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            group_id: user.group_id.clone(),
            success,
            message,
            confidence: payload.confidence,
            image_url: payload.image_url,
            date: today_key,
            verified_at: now.with_timezone(&Utc),
        },
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::streak::{apply_success, ProgressUpdate};
    use chrono::{TimeZone, Utc};

    fn fresh_user() -> User {
        User {
            id: "user-1".to_string(),
            name: "사용자".to_string(),
            email: None,
            photo_url: None,
            lp: 0,
            streak_days: 0,
            best_streak: 0,
            total_success_count: 0,
            last_success_date: None,
            group_id: None,
            is_group_leader: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn success_payload() -> AttemptPayload {
        AttemptPayload {
            success: true,
            message: None,
            confidence: Some(0.92),
            image_url: None,
        }
    }

    /// 라우트 + db 레이어가 수행하는 원장 반영을 인메모리로 재현
    fn apply_to_history(history: &mut Vec<NewVerification>, decision: &AttemptDecision) {
        if decision.accepted() {
            // 당일의 실패 엔트리만 제거, 다른 날의 성공 기록은 보존
            history.retain(|e| e.success || e.date != decision.entry.date);
        }
        history.insert(0, decision.entry.clone());
        history.truncate(MAX_HISTORY_ENTRIES as usize);
    }

    fn commit(user: &mut User, update: &ProgressUpdate) {
        user.lp = update.lp;
        user.streak_days = update.streak_days;
        user.best_streak = update.best_streak;
        user.total_success_count = update.total_success_count;
        user.last_success_date = update.last_success_date;
    }

    #[test]
    fn test_first_success_is_accepted() {
        let user = fresh_user();
        let decision = record_attempt(&user, success_payload(), at(2024, 1, 1, 10));

        assert_eq!(decision.outcome, AttemptOutcome::Accepted);
        assert!(decision.entry.success);
        assert_eq!(decision.entry.date, "2024-01-01");
        assert_eq!(decision.entry.message, "텀블러 인증을 완료했어요!");
    }

    #[test]
    fn test_failed_classification_is_rejected() {
        let user = fresh_user();
        let payload = AttemptPayload {
            success: false,
            message: Some("텀블러 인증 실패! 일회용 컵이 감지되었습니다.".to_string()),
            confidence: Some(0.88),
            image_url: None,
        };
        let decision = record_attempt(&user, payload, at(2024, 1, 1, 10));

        assert_eq!(decision.outcome, AttemptOutcome::Rejected);
        assert!(!decision.entry.success);
        // 분류기 메시지는 보존
        assert_eq!(decision.entry.message, "텀블러 인증 실패! 일회용 컵이 감지되었습니다.");
    }

    #[test]
    fn test_second_success_same_day_is_already_completed() {
        let mut user = fresh_user();

        let first = record_attempt(&user, success_payload(), at(2024, 1, 1, 9));
        assert!(first.accepted());
        let update = apply_success(&user, at(2024, 1, 1, 9));
        commit(&mut user, &update);

        let second = record_attempt(&user, success_payload(), at(2024, 1, 1, 21));
        assert_eq!(second.outcome, AttemptOutcome::AlreadyCompleted);
        assert!(!second.entry.success);
        assert_eq!(
            second.entry.message,
            "오늘 인증은 이미 완료되었어요. 내일 다시 시도해주세요."
        );
    }

    #[test]
    fn test_at_most_one_accepted_success_per_day() {
        // 같은 날의 어떤 시도 시퀀스든 success=true 엔트리는 최대 1건
        let mut user = fresh_user();
        let mut history: Vec<NewVerification> = Vec::new();

        let attempts = [
            (8, false),
            (9, true),
            (12, true),
            (18, false),
            (22, true),
        ];

        for (hour, classified_ok) in attempts {
            let payload = AttemptPayload {
                success: classified_ok,
                message: None,
                confidence: None,
                image_url: None,
            };
            let decision = record_attempt(&user, payload, at(2024, 5, 5, hour));
            if decision.accepted() {
                let update = apply_success(&user, at(2024, 5, 5, hour));
                commit(&mut user, &update);
            }
            apply_to_history(&mut history, &decision);
        }

        let accepted = history.iter().filter(|e| e.success).count();
        assert_eq!(accepted, 1);
        // 수락 시점에 그날의 앞선 실패 기록이 지워졌는지
        assert!(history
            .iter()
            .filter(|e| e.date == "2024-05-05" && !e.success)
            .all(|e| e.verified_at > history.iter().find(|s| s.success).unwrap().verified_at));
    }

    #[test]
    fn test_idempotent_double_submit() {
        // 같은 날 성공 2회 제출 == 1회 제출과 동일한 통계 변화
        let mut once = fresh_user();
        let first = record_attempt(&once, success_payload(), at(2024, 2, 1, 9));
        assert!(first.accepted());
        let update = apply_success(&once, at(2024, 2, 1, 9));
        commit(&mut once, &update);

        let mut twice = fresh_user();
        let a = record_attempt(&twice, success_payload(), at(2024, 2, 1, 9));
        assert!(a.accepted());
        let update = apply_success(&twice, at(2024, 2, 1, 9));
        commit(&mut twice, &update);
        let b = record_attempt(&twice, success_payload(), at(2024, 2, 1, 15));
        assert!(!b.accepted()); // 통계 미반영

        assert_eq!(once.lp, twice.lp);
        assert_eq!(once.streak_days, twice.streak_days);
        assert_eq!(once.total_success_count, twice.total_success_count);
    }

    #[test]
    fn test_history_truncated_to_retention_cap() {
        let user = fresh_user();
        let mut history: Vec<NewVerification> = Vec::new();

        // 보관 한도를 넘는 실패 기록 (날짜가 달라 정리 규칙에 안 걸리게 시간만 다름)
        for i in 0..(MAX_HISTORY_ENTRIES as usize + 10) {
            let mut decision = record_attempt(
                &user,
                AttemptPayload {
                    success: false,
                    message: None,
                    confidence: None,
                    image_url: None,
                },
                at(2024, 1, 1, 0),
            );
            decision.entry.date = format!("day-{}", i);
            apply_to_history(&mut history, &decision);
        }

        assert_eq!(history.len(), MAX_HISTORY_ENTRIES as usize);
    }

    #[test]
    fn test_full_progression_scenario() {
        // 신규 사용자: 1/1 성공 → 같은 날 중복 → 1/2 성공 → 1/4 성공(이틀 공백)
        let mut user = fresh_user();

        let d1 = record_attempt(&user, success_payload(), at(2024, 1, 1, 10));
        assert!(d1.accepted());
        let update = apply_success(&user, at(2024, 1, 1, 10));
        commit(&mut user, &update);
        assert_eq!((user.lp, user.streak_days, user.best_streak, user.total_success_count), (10, 1, 1, 1));

        let dup = record_attempt(&user, success_payload(), at(2024, 1, 1, 20));
        assert!(dup.already_completed());
        assert!(!dup.entry.success);
        assert_eq!((user.lp, user.streak_days, user.best_streak, user.total_success_count), (10, 1, 1, 1));

        let d2 = record_attempt(&user, success_payload(), at(2024, 1, 2, 10));
        assert!(d2.accepted());
        let update = apply_success(&user, at(2024, 1, 2, 10));
        commit(&mut user, &update);
        assert_eq!((user.lp, user.streak_days, user.best_streak, user.total_success_count), (20, 2, 2, 2));

        let d4 = record_attempt(&user, success_payload(), at(2024, 1, 4, 10));
        assert!(d4.accepted());
        let update = apply_success(&user, at(2024, 1, 4, 10));
        commit(&mut user, &update);
        assert_eq!((user.lp, user.streak_days, user.best_streak, user.total_success_count), (30, 1, 2, 3));
    }
}

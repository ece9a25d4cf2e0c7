//! 날짜 유틸리티 모듈
//!
//! # Design Decision
//!
//! 인증/스트릭 로직이 닿는 모든 날짜 비교는 이 모듈의
//! 로컬 달력일 키 하나만 사용함. UTC 기준 키(`to_rfc3339` 절단 등)와
//! 로컬 키가 섞이면 자정 근처 인증이 다른 날로 집계되는 버그가 생김 -
//! 그래서 UTC 파생 키는 이 코드베이스에 존재하지 않음.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};

/// 로컬 달력일 키 (YYYY-MM-DD)
///
/// 하루 1회 제한, 스트릭 계산, 그룹 보너스 멱등성 검사가 모두 이 키를 공유함
pub fn local_date_key(dt: DateTime<Local>) -> String {
    date_key(dt.date_naive())
}

/// NaiveDate → YYYY-MM-DD
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 두 날짜의 자정 기준 일수 차이
///
/// a가 b보다 과거면 양수 (예: day_gap(1월 1일, 1월 3일) == 2)
pub fn day_gap(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// 해당 날짜가 속한 주의 월요일
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// 상대 시간 포맷팅 (예: "방금 전", "5분 전", "2시간 전")
pub fn format_time_ago(timestamp: DateTime<Local>, now: DateTime<Local>) -> String {
    let diff = now.signed_duration_since(timestamp);
    let mins = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if mins < 1 {
        "방금 전".to_string()
    } else if mins < 60 {
        format!("{}분 전", mins)
    } else if hours < 24 {
        format!("{}시간 전", hours)
    } else if days < 7 {
        format!("{}일 전", days)
    } else {
        format!("{}월 {}일", timestamp.month(), timestamp.day())
    }
}

/// 홈 화면용 날짜 라벨 (예: "2024년 1월 1일 월요일")
pub fn format_date_label(date: NaiveDate) -> String {
    const WEEKDAYS: [&str; 7] = [
        "월요일", "화요일", "수요일", "목요일", "금요일", "토요일", "일요일",
    ];
    format!(
        "{}년 {}월 {}일 {}",
        date.year(),
        date.month(),
        date.day(),
        WEEKDAYS[date.weekday().num_days_from_monday() as usize]
    )
}

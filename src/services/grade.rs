//! 등급 계산 서비스
//!
//! 누적 LP 하나만으로 등급을 파생하는 순수 함수 모음.
//! 임계값은 포함 하한 (예: 30 LP면 실버).

use serde::Serialize;

/// 등급 코드 (낮은 순)
pub const GRADE_ORDER: [&str; 6] = ["bronze", "silver", "gold", "platinum", "diamond", "master"];

/// 등급별 포함 하한 임계값
pub const GRADE_THRESHOLDS: [i64; 6] = [0, 30, 60, 120, 200, 300];

const GRADE_NAMES: [&str; 6] = [
    "브론즈 등급",
    "실버 등급",
    "골드 등급",
    "플래티넘 등급",
    "다이아몬드 등급",
    "에코 마스터",
];

/// 등급 정보
#[derive(Debug, Clone, Serialize)]
pub struct GradeInfo {
    pub code: String,
    pub name: String,
    pub lp: i64,
    /// 다음 등급 임계값 (최고 등급이면 None)
    pub next_lp: Option<i64>,
    /// 현재 등급 구간 내 진행률 (0..100)
    pub progress: f64,
    /// 다음 등급까지 남은 LP (최고 등급이면 0)
    pub remaining_lp: i64,
}

/// 등급 가이드 한 줄 (높은 등급부터)
#[derive(Debug, Clone, Serialize)]
pub struct GradeGuideRow {
    pub label: String,
    pub range: String,
    pub accent: String,
}

fn grade_index(lp: i64) -> usize {
    let score = lp.max(0);
    GRADE_THRESHOLDS
        .iter()
        .rposition(|&threshold| score >= threshold)
        .unwrap_or(0)
}

/// LP → 등급 코드
pub fn derive_grade_code(lp: i64) -> &'static str {
    GRADE_ORDER[grade_index(lp)]
}

/// LP → 등급 표시 이름
pub fn derive_grade_name(lp: i64) -> &'static str {
    GRADE_NAMES[grade_index(lp)]
}

/// 현재 등급 구간 내 진행률 (0..100, 최고 등급은 100)
pub fn grade_progress(lp: i64) -> f64 {
    let idx = grade_index(lp);
    if idx == GRADE_ORDER.len() - 1 {
        return 100.0;
    }

    let current = GRADE_THRESHOLDS[idx];
    let next = GRADE_THRESHOLDS[idx + 1];
    let progress = (lp.max(0) - current) as f64 / (next - current) as f64 * 100.0;
    progress.clamp(0.0, 100.0)
}

/// 다음 등급 임계값 (최고 등급이면 None)
pub fn next_grade_lp(lp: i64) -> Option<i64> {
    let idx = grade_index(lp);
    if idx == GRADE_ORDER.len() - 1 {
        None
    } else {
        Some(GRADE_THRESHOLDS[idx + 1])
    }
}

/// 등급 정보 전체
pub fn grade_info(lp: i64) -> GradeInfo {
    let lp = lp.max(0);
    let idx = grade_index(lp);
    let next_lp = next_grade_lp(lp);

    GradeInfo {
        code: GRADE_ORDER[idx].to_string(),
        name: GRADE_NAMES[idx].to_string(),
        lp,
        next_lp,
        progress: grade_progress(lp),
        remaining_lp: next_lp.map(|next| next - lp).unwrap_or(0),
    }
}

/// 등급 가이드 (최고 등급부터)
pub fn grade_guide() -> Vec<GradeGuideRow> {
    GRADE_ORDER
        .iter()
        .enumerate()
        .map(|(idx, code)| {
            let threshold = GRADE_THRESHOLDS[idx];
            let range = if threshold == 0 {
                "0 LP부터".to_string()
            } else if idx == GRADE_ORDER.len() - 1 {
                format!("{} LP 이상", threshold)
            } else {
                format!("{} LP", threshold)
            };
            GradeGuideRow {
                label: GRADE_NAMES[idx].to_string(),
                range,
                accent: code.to_string(),
            }
        })
        .rev()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_code_table() {
        assert_eq!(derive_grade_code(0), "bronze");
        assert_eq!(derive_grade_code(29), "bronze");
        assert_eq!(derive_grade_code(30), "silver");
        assert_eq!(derive_grade_code(59), "silver");
        assert_eq!(derive_grade_code(60), "gold");
        assert_eq!(derive_grade_code(120), "platinum");
        assert_eq!(derive_grade_code(200), "diamond");
        assert_eq!(derive_grade_code(300), "master");
        assert_eq!(derive_grade_code(1000), "master");
    }

    #[test]
    fn test_negative_lp_treated_as_zero() {
        assert_eq!(derive_grade_code(-5), "bronze");
        let info = grade_info(-5);
        assert_eq!(info.lp, 0);
        assert_eq!(info.progress, 0.0);
    }

    #[test]
    fn test_grade_monotonic_in_lp() {
        // lp1 <= lp2 이면 등급 인덱스도 비감소
        let tier = |lp: i64| GRADE_ORDER.iter().position(|&c| c == derive_grade_code(lp)).unwrap();
        let mut prev = tier(0);
        for lp in 0..=400 {
            let current = tier(lp);
            assert!(current >= prev, "grade dropped at lp={}", lp);
            prev = current;
        }
    }

    #[test]
    fn test_progress_and_remaining() {
        // 실버 구간(30..60)의 중간
        let info = grade_info(45);
        assert_eq!(info.code, "silver");
        assert_eq!(info.next_lp, Some(60));
        assert_eq!(info.remaining_lp, 15);
        assert!((info.progress - 50.0).abs() < f64::EPSILON);

        // 최고 등급은 진행률 100, 다음 등급 없음
        let master = grade_info(500);
        assert_eq!(master.code, "master");
        assert_eq!(master.next_lp, None);
        assert_eq!(master.remaining_lp, 0);
        assert_eq!(master.progress, 100.0);
    }

    #[test]
    fn test_grade_guide_order() {
        let guide = grade_guide();
        assert_eq!(guide.len(), 6);
        assert_eq!(guide[0].label, "에코 마스터");
        assert_eq!(guide[0].range, "300 LP 이상");
        assert_eq!(guide[5].label, "브론즈 등급");
        assert_eq!(guide[5].range, "0 LP부터");
    }
}

//! 사용자 엔드포인트
//!
//! 세션 수립(upsert), 진행도 스냅샷, 프로필 갱신과
//! 홈/업적/인사이트 읽기 모델을 제공함.
//!
//! # Design Decision
//!
//! 회원가입 절차가 따로 없음 - 외부 인증 제공자의 ID로 POST /users를
//! 호출하면 없던 사용자는 0값 통계로 생성되고, 있던 사용자는 프로필
//! 필드만 병합됨. 진행도 필드는 세션 수립이 절대 되돌리지 않음.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::{format_date_label, local_date_key};
use crate::db::User;
use crate::error::ApiError;
use crate::services::achievements::{self, AchievementReport};
use crate::services::grade::{self, GradeGuideRow, GradeInfo};
use crate::services::insights::{self, Insights};
use crate::services::ledger::MAX_HISTORY_ENTRIES;
use crate::types::{ApiResponse, UserId};
use crate::AppState;

// ============ Request/Response Types ============

/// 세션 수립 요청
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

/// 프로필 갱신 요청
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

/// 사용자 진행도 스냅샷 응답
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub lp: i64,
    pub streak_days: i32,
    pub best_streak: i32,
    pub total_success_count: i64,
    pub last_success_date: Option<DateTime<Utc>>,
    pub group_id: Option<String>,
    pub is_group_leader: bool,
    pub grade: GradeInfo,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let grade = grade::grade_info(user.lp);
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            photo_url: user.photo_url,
            lp: user.lp,
            streak_days: user.streak_days,
            best_streak: user.best_streak,
            total_success_count: user.total_success_count,
            last_success_date: user.last_success_date,
            group_id: user.group_id,
            is_group_leader: user.is_group_leader,
            grade,
        }
    }
}

/// 홈 화면 스탯 카드
#[derive(Debug, Serialize)]
pub struct StatItem {
    pub id: &'static str,
    pub label: &'static str,
    pub value: String,
    pub accent: &'static str,
}

/// 홈 화면 응답
#[derive(Debug, Serialize)]
pub struct HomeResponse {
    /// 예: "2024년 1월 1일 월요일"
    pub date_label: String,
    pub certification_message: String,
    /// 오늘 아직 인증을 수락받지 않았는지
    pub can_verify: bool,
    pub stats: Vec<StatItem>,
    pub grade: GradeInfo,
}

// ============ Handlers ============

/// POST /users
///
/// 세션 수립 (없으면 생성, 있으면 프로필 병합)
pub async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user_id = UserId::new(&req.id).map_err(ApiError::ValidationError)?;

    let user = state
        .db
        .ensure_user(
            user_id.as_str(),
            req.name.as_deref().map(str::trim).filter(|n| !n.is_empty()),
            req.email.as_deref(),
            req.photo_url.as_deref(),
        )
        .await?;

    tracing::debug!(user_id = user_id.as_str(), "세션 수립");
    Ok(Json(ApiResponse::success(user.into())))
}

/// GET /users/:id
///
/// 진행도 스냅샷 + 파생 등급
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = load_user(&state, &id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// PATCH /users/:id/profile
///
/// 프로필 갱신 - users 원본과 비정규화 복제본(그룹 멤버, 인증 기록)에 전파됨
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user_id = UserId::new(&id).map_err(ApiError::ValidationError)?;

    let name = req.name.as_deref().map(str::trim);
    if let Some(n) = name {
        if n.is_empty() {
            return Err(ApiError::ValidationError(
                "이름은 비어 있을 수 없습니다.".to_string(),
            ));
        }
    }
    if name.is_none() && req.photo_url.is_none() {
        return Err(ApiError::ValidationError(
            "변경할 필드가 없습니다.".to_string(),
        ));
    }

    // 존재 확인 후 전파
    load_user(&state, user_id.as_str()).await?;
    state
        .db
        .update_profile(user_id.as_str(), name, req.photo_url.as_deref())
        .await?;

    let updated = load_user(&state, user_id.as_str()).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

/// GET /users/:id/home
///
/// 홈 화면 읽기 모델: 날짜 라벨, 오늘 인증 가능 여부, 스탯 카드
pub async fn get_home(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<HomeResponse>>, ApiError> {
    let user = load_user(&state, &id).await?;
    let ledger_success = state.db.count_success(&user.id).await?;
    let total_success = user.total_success_count.max(ledger_success);

    let now = Local::now();
    let today_key = local_date_key(now);
    let completed_today = user
        .last_success_date
        .map(|ts| local_date_key(ts.with_timezone(&Local)))
        .as_deref()
        == Some(today_key.as_str());

    let certification_message = if completed_today {
        "오늘 인증은 이미 완료되었어요. 내일 봐요!".to_string()
    } else {
        "오늘의 텀블러 인증을 시작해보세요!".to_string()
    };

    let response = HomeResponse {
        date_label: format_date_label(now.date_naive()),
        certification_message,
        can_verify: !completed_today,
        stats: vec![
            StatItem {
                id: "streak",
                label: "연속",
                value: format!("{}일", user.streak_days),
                accent: "streak",
            },
            StatItem {
                id: "total",
                label: "총 인증",
                value: format!("{}회", total_success),
                accent: "total",
            },
            StatItem {
                id: "lp",
                label: "LP",
                value: format!("{}점", user.lp),
                accent: "rank",
            },
        ],
        grade: grade::grade_info(user.lp),
    };

    Ok(Json(ApiResponse::success(response)))
}

/// GET /users/:id/achievements
///
/// 전체 업적 카탈로그 + 해금 여부 (해금 항목 우선 정렬)
pub async fn get_achievements(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AchievementReport>>, ApiError> {
    let user = load_user(&state, &id).await?;
    let ledger_success = state.db.count_success(&user.id).await?;

    let report = achievements::evaluate(&user, ledger_success);
    Ok(Json(ApiResponse::success(report)))
}

/// GET /users/:id/insights
///
/// 요약 수치 + 최근 4주 주간 추이
pub async fn get_insights(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Insights>>, ApiError> {
    let user = load_user(&state, &id).await?;
    let entries = state
        .db
        .list_verifications(&user.id, MAX_HISTORY_ENTRIES)
        .await?;

    let insights = insights::build_insights(&user, &entries, Local::now());
    Ok(Json(ApiResponse::success(insights)))
}

/// GET /grades/guide
///
/// 등급 가이드 (최고 등급부터)
pub async fn get_grade_guide() -> Json<ApiResponse<Vec<GradeGuideRow>>> {
    Json(ApiResponse::success(grade::grade_guide()))
}

/// 경로 파라미터 검증 + 사용자 로드
pub(crate) async fn load_user(state: &AppState, raw_id: &str) -> Result<User, ApiError> {
    let user_id = UserId::new(raw_id).map_err(ApiError::ValidationError)?;
    state
        .db
        .get_user(user_id.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))
}

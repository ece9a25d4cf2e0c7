//! 인증 엔드포인트
//!
//! 인증 시도 제출(멀티파트 이미지)과 히스토리 조회.
//!
//! # 제출 처리 순서
//!
//! 1. 이미지 파트 검증
//! 2. 분류 서버 호출 (타임아웃 시 목업 결과로 대체)
//! 3. 사용자 로드 (최초 시도면 0값 통계로 생성)
//! 4. 원장 판정: 수락 / 분류 실패 / 오늘 이미 완료
//! 5. 수락 시: 당일 실패 기록 정리 → 엔트리 추가 → 진행도 갱신
//!    → 그룹 미러 동기화 → 전원 인증 보너스 검사
//! 6. 보관 한도(365건) 초과분 정리
//!
//! 그룹 관련 단계는 실패해도 인증 자체를 막지 않음 (로그만 남김).

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::format_time_ago;
use crate::error::ApiError;
use crate::services::grade::{self, GradeInfo};
use crate::services::group_bonus::{self, BonusOutcome, GROUP_BONUS_LP};
use crate::services::ledger::{self, AttemptPayload, MAX_HISTORY_ENTRIES};
use crate::services::streak::{self, ProgressUpdate};
use crate::types::{ApiResponse, UserId};
use crate::AppState;

// ============ Request/Response Types ============

/// 히스토리 조회 쿼리
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// 제출 응답의 원장 엔트리 뷰
#[derive(Debug, Serialize)]
pub struct EntryView {
    pub id: Uuid,
    pub success: bool,
    pub message: String,
    pub confidence: Option<f64>,
    pub date: String,
}

/// 제출 응답의 갱신된 진행도
#[derive(Debug, Serialize)]
pub struct ProgressView {
    pub lp: i64,
    pub streak_days: i32,
    pub best_streak: i32,
    pub total_success_count: i64,
}

/// 인증 제출 응답
#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    /// 통계에 반영된 수락 성공인지
    pub accepted: bool,
    /// 오늘 이미 완료되어 거절됐는지
    pub already_completed: bool,
    /// 분류 서버 불가로 목업 결과가 쓰였는지
    pub mocked: bool,
    /// 이번 제출로 전원 인증 보너스가 지급됐는지
    pub bonus_granted: bool,
    pub entry: EntryView,
    pub progress: ProgressView,
    pub grade: GradeInfo,
}

/// 히스토리 항목
#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: Uuid,
    pub success: bool,
    pub message: String,
    pub confidence: Option<f64>,
    pub image_url: Option<String>,
    pub date: String,
    /// 예: "방금 전", "3시간 전"
    pub time_ago: String,
}

// ============ Handlers ============

/// POST /users/:id/verifications
///
/// 인증 시도 제출. 멀티파트 필드:
/// - `file` (필수): 인증 이미지
/// - `image_url` (선택): 업로드 완료된 외부 스토리지 참조
pub async fn submit_verification(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<VerificationResponse>>, ApiError> {
    let user_id = UserId::new(&id).map_err(ApiError::ValidationError)?;

    // 멀티파트 파싱
    let mut image: Option<(Vec<u8>, String)> = None;
    let mut image_url: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("capture.jpg").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                image = Some((data.to_vec(), filename));
            }
            Some("image_url") => {
                image_url = field.text().await.ok().filter(|url| !url.is_empty());
            }
            _ => {}
        }
    }

    let (bytes, filename) =
        image.ok_or_else(|| ApiError::ValidationError("인증 이미지가 없습니다.".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::ValidationError(
            "이미지 파일이 비어 있습니다.".to_string(),
        ));
    }

    // 분류 (절대 실패하지 않음 - 불가 시 mocked 결과)
    let classification = state.classifier.classify(bytes, &filename).await;

    let user = state
        .db
        .ensure_user(user_id.as_str(), None, None, None)
        .await?;

    let now = Local::now();
    let decision = ledger::record_attempt(
        &user,
        AttemptPayload {
            success: classification.success,
            message: Some(classification.message.clone()),
            confidence: classification.confidence,
            image_url,
        },
        now,
    );

    let mut progress = ProgressUpdate::unchanged(&user);
    let mut bonus_granted = false;

    if decision.accepted() {
        // 수락되는 순간 같은 날의 실패 기록은 의미가 없어짐
        state
            .db
            .delete_failed_entries_for_day(user_id.as_str(), &decision.entry.date)
            .await?;
    }
    state.db.insert_verification(&decision.entry).await?;
    state
        .db
        .prune_history(user_id.as_str(), MAX_HISTORY_ENTRIES)
        .await?;

    if decision.accepted() {
        progress = streak::apply_success(&user, now);
        state
            .db
            .update_user_progress(user_id.as_str(), &progress)
            .await?;

        if let Some(group_id) = &user.group_id {
            if let Err(err) = state
                .db
                .update_member_progress(group_id, user_id.as_str(), progress.lp, progress.streak_days)
                .await
            {
                tracing::warn!(group_id = group_id.as_str(), "그룹 멤버 미러 갱신 실패: {:?}", err);
            }

            match group_bonus::maybe_grant_bonus(
                state.db.as_ref(),
                group_id,
                &decision.entry.date,
            )
            .await
            {
                Ok(BonusOutcome::Granted) => {
                    bonus_granted = true;
                    progress.lp += GROUP_BONUS_LP;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(group_id = group_id.as_str(), "그룹 보너스 검사 실패: {:?}", err);
                }
            }
        }

        tracing::info!(
            user_id = user_id.as_str(),
            lp = progress.lp,
            streak = progress.streak_days,
            "인증 성공 수락"
        );
    }

    let response = VerificationResponse {
        accepted: decision.accepted(),
        already_completed: decision.already_completed(),
        mocked: classification.mocked,
        bonus_granted,
        entry: EntryView {
            id: decision.entry.id,
            success: decision.entry.success,
            message: decision.entry.message,
            confidence: decision.entry.confidence,
            date: decision.entry.date,
        },
        progress: ProgressView {
            lp: progress.lp,
            streak_days: progress.streak_days,
            best_streak: progress.best_streak,
            total_success_count: progress.total_success_count,
        },
        grade: grade::grade_info(progress.lp),
    };

    Ok(Json(ApiResponse::success(response)))
}

/// GET /users/:id/verifications
///
/// 인증 히스토리 (최신순, 기본 30건, 최대 365건)
pub async fn list_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<HistoryItem>>>, ApiError> {
    let user = super::users::load_user(&state, &id).await?;
    let limit = query.limit.unwrap_or(30).clamp(1, MAX_HISTORY_ENTRIES);

    let now = Local::now();
    let items = state
        .db
        .list_verifications(&user.id, limit)
        .await?
        .into_iter()
        .map(|entry| HistoryItem {
            id: entry.id,
            success: entry.success,
            message: entry.message,
            confidence: entry.confidence,
            image_url: entry.image_url,
            date: entry.date,
            time_ago: format_time_ago(entry.verified_at.with_timezone(&Local), now),
        })
        .collect();

    Ok(Json(ApiResponse::success(items)))
}

//! 랭킹 엔드포인트
//!
//! 개인(LP 내림차순)과 그룹(멤버 LP 합산) 랭킹.
//! 순위는 competition ranking: 동점이면 같은 순위를 공유하고
//! 다음 순위는 동점자 수만큼 건너뜀 (1, 1, 3, ...).

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::services::grade;
use crate::types::ApiResponse;
use crate::AppState;

/// 조회 건수 기본값
const DEFAULT_LIMIT: i64 = 100;
/// 조회 건수 상한
const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    pub limit: Option<i64>,
}

/// 개인 랭킹 항목
#[derive(Debug, Serialize)]
pub struct PersonalRankingItem {
    pub rank: u32,
    pub id: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub lp: i64,
    pub streak_days: i32,
    pub group_id: Option<String>,
    pub grade: &'static str,
}

/// 그룹 랭킹 항목
#[derive(Debug, Serialize)]
pub struct GroupRankingItem {
    pub rank: u32,
    pub id: String,
    pub name: String,
    pub code: String,
    pub total_lp: i64,
    pub member_count: i32,
    pub leader_id: String,
}

/// GET /rankings/personal
pub async fn personal_rankings(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<PersonalRankingItem>>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let rows = state.db.personal_rankings(limit).await?;

    let ranks = competition_ranks(&rows.iter().map(|r| r.lp).collect::<Vec<_>>());
    let items = rows
        .into_iter()
        .zip(ranks)
        .map(|(row, rank)| PersonalRankingItem {
            rank,
            grade: grade::derive_grade_code(row.lp),
            id: row.id,
            name: row.name,
            photo_url: row.photo_url,
            lp: row.lp,
            streak_days: row.streak_days,
            group_id: row.group_id,
        })
        .collect();

    Ok(Json(ApiResponse::success(items)))
}

/// GET /rankings/groups
pub async fn group_rankings(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<GroupRankingItem>>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let rows = state.db.group_rankings(limit).await?;

    let ranks = competition_ranks(&rows.iter().map(|r| r.total_lp).collect::<Vec<_>>());
    let items = rows
        .into_iter()
        .zip(ranks)
        .map(|(row, rank)| GroupRankingItem {
            rank,
            id: row.id,
            name: row.name,
            code: row.code,
            total_lp: row.total_lp,
            member_count: row.member_count,
            leader_id: row.leader_id,
        })
        .collect();

    Ok(Json(ApiResponse::success(items)))
}

/// 점수 내림차순으로 정렬된 리스트에 competition ranking 부여
fn competition_ranks(scores: &[i64]) -> Vec<u32> {
    let mut ranks = Vec::with_capacity(scores.len());
    for (idx, &score) in scores.iter().enumerate() {
        if idx > 0 && score == scores[idx - 1] {
            let prev = *ranks.last().unwrap_or(&1);
            ranks.push(prev);
        } else {
            ranks.push(idx as u32 + 1);
        }
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_scores_get_sequential_ranks() {
        assert_eq!(competition_ranks(&[50, 40, 30]), vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_share_rank_and_skip_next() {
        // 50, 50, 30 → 1, 1, 3
        assert_eq!(competition_ranks(&[50, 50, 30]), vec![1, 1, 3]);
        // 3자 동점
        assert_eq!(competition_ranks(&[10, 10, 10, 5]), vec![1, 1, 1, 4]);
    }

    #[test]
    fn test_empty_list() {
        assert!(competition_ranks(&[]).is_empty());
    }
}

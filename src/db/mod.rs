//! Database Module
//!
//! # Interview Q&A
//!
//! Q: 원본 설계(문서 DB)에서 PostgreSQL로 바꾼 이유는?
//! A: 진행도 데이터에 적합한 이유
//!
//!    1. ACID 트랜잭션: 그룹 보너스의 원자적 check-and-set에 필수
//!    2. 부분 인덱스: (user_id, date, success) / (group_id, date) 조회 최적화
//!    3. 집계 쿼리: 랭킹(SUM, ORDER BY)을 DB에서 바로 계산
//!    4. 생태계: SQLx의 컴파일 타임 검증, 마이그레이션 내장
//!
//! Q: 커넥션 풀은 어떻게 관리하는가?
//! A: SQLx의 PgPool 사용
//!    - 최소/최대 커넥션 수 설정
//!    - 커넥션 재사용 (오버헤드 감소)
//!    - 자동 health check
//!    - 타임아웃 처리

mod models;
pub mod repository;

pub use models::*;
pub use repository::GroupBonusStore;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::services::ledger::NewVerification;
use crate::services::streak::ProgressUpdate;

/// 데이터베이스 연결 및 쿼리 담당
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 데이터베이스 연결
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 10 (트래픽에 따라 조정)
    /// - min_connections: 1 (idle 시 최소 유지)
    /// - acquire_timeout: 3초 (커넥션 획득 대기)
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// 마이그레이션 실행
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ============ Users ============

    /// 최초 인증 시 0값 통계로 생성, 이후에는 프로필 필드만 병합
    ///
    /// 진행도 필드(lp, streak 등)는 여기서 절대 건드리지 않음 -
    /// 세션 수립이 통계를 되돌리면 안 되기 때문
    pub async fn ensure_user(
        &self,
        id: &str,
        name: Option<&str>,
        email: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, photo_url)
            VALUES ($1, COALESCE($2, '사용자'), $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                name = COALESCE($2, users.name),
                email = COALESCE($3, users.email),
                photo_url = COALESCE($4, users.photo_url),
                updated_at = NOW()
            RETURNING *
            "#
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(photo_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// 사용자 조회
    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// 수락된 인증 성공 후 진행도 스냅샷 반영
    pub async fn update_user_progress(&self, id: &str, update: &ProgressUpdate) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                lp = $2,
                streak_days = $3,
                best_streak = $4,
                total_success_count = $5,
                last_success_date = $6,
                updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(id)
        .bind(update.lp)
        .bind(update.streak_days)
        .bind(update.best_streak)
        .bind(update.total_success_count)
        .bind(update.last_success_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 그룹 멤버 미러 레코드의 진행도 필드 동기화
    pub async fn update_member_progress(
        &self,
        group_id: &str,
        user_id: &str,
        lp: i64,
        streak_days: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE group_members SET lp = $3, streak_days = $4
            WHERE group_id = $1 AND user_id = $2
            "#
        )
        .bind(group_id)
        .bind(user_id)
        .bind(lp)
        .bind(streak_days)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 프로필 변경 전파: users 원본 → 멤버 미러 → 인증 기록의 비정규화 이름
    ///
    /// 원본 구현의 updateProfile fan-out과 동일한 순서를 한 트랜잭션으로 묶음
    pub async fn update_profile(
        &self,
        user_id: &str,
        name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                photo_url = COALESCE($3, photo_url),
                updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(user_id)
        .bind(name)
        .bind(photo_url)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE group_members SET
                name = COALESCE($2, name),
                photo_url = COALESCE($3, photo_url)
            WHERE user_id = $1
            "#
        )
        .bind(user_id)
        .bind(name)
        .bind(photo_url)
        .execute(&mut *tx)
        .await?;

        if let Some(new_name) = name {
            sqlx::query("UPDATE verifications SET user_name = $2 WHERE user_id = $1")
                .bind(user_id)
                .bind(new_name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // ============ Verification Ledger ============

    /// 원장 엔트리 추가 (생성 후 불변)
    pub async fn insert_verification(&self, entry: &NewVerification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO verifications (
                id, user_id, user_name, group_id, success, message,
                confidence, image_url, date, verified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#
        )
        .bind(entry.id)
        .bind(&entry.user_id)
        .bind(&entry.user_name)
        .bind(&entry.group_id)
        .bind(entry.success)
        .bind(&entry.message)
        .bind(entry.confidence)
        .bind(&entry.image_url)
        .bind(&entry.date)
        .bind(entry.verified_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 당일의 실패 엔트리 정리
    ///
    /// 성공이 수락되는 순간 같은 날의 실패 기록은 의미가 없어서 제거함.
    /// 다른 날짜의 기록과 성공 엔트리는 절대 지우지 않음.
    pub async fn delete_failed_entries_for_day(&self, user_id: &str, date_key: &str) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM verifications WHERE user_id = $1 AND date = $2 AND success = FALSE"
        )
        .bind(user_id)
        .bind(date_key)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// 보관 한도 초과분 정리 (최신 `keep`건만 유지)
    pub async fn prune_history(&self, user_id: &str, keep: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM verifications
            WHERE id IN (
                SELECT id FROM verifications
                WHERE user_id = $1
                ORDER BY verified_at DESC
                OFFSET $2
            )
            "#
        )
        .bind(user_id)
        .bind(keep)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// 인증 히스토리 조회 (최신순)
    pub async fn list_verifications(&self, user_id: &str, limit: i64) -> Result<Vec<VerificationEntry>> {
        let entries = sqlx::query_as::<_, VerificationEntry>(
            r#"
            SELECT * FROM verifications
            WHERE user_id = $1
            ORDER BY verified_at DESC
            LIMIT $2
            "#
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// 원장의 성공 엔트리 개수 (max-of-two-sources 보정용)
    pub async fn count_success(&self, user_id: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM verifications WHERE user_id = $1 AND success = TRUE"
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    // ============ Rankings ============

    /// 개인 랭킹: LP 내림차순
    pub async fn personal_rankings(&self, limit: i64) -> Result<Vec<PersonalRankingRow>> {
        let rows = sqlx::query_as::<_, PersonalRankingRow>(
            r#"
            SELECT id, name, photo_url, lp, streak_days, group_id
            FROM users
            ORDER BY lp DESC, id ASC
            LIMIT $1
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// 그룹 랭킹: 멤버 LP 합산 내림차순
    pub async fn group_rankings(&self, limit: i64) -> Result<Vec<GroupRankingRow>> {
        let rows = sqlx::query_as::<_, GroupRankingRow>(
            r#"
            SELECT
                g.id,
                g.name,
                g.code,
                COALESCE(SUM(m.lp), 0) AS total_lp,
                g.member_count,
                g.leader_id
            FROM groups g
            LEFT JOIN group_members m ON m.group_id = g.id
            GROUP BY g.id, g.name, g.code, g.member_count, g.leader_id
            ORDER BY total_lp DESC, g.id ASC
            LIMIT $1
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Postgres 기반 그룹 보너스 스토어
///
/// # Concurrency
///
/// 마지막 멤버의 인증이 거의 동시에 두 번 들어오면 두 요청 모두
/// "전원 인증"을 관측할 수 있음. 이중 지급을 막는 유일한 장치는
/// last_bonus_date에 대한 조건부 UPDATE - 한 트랜잭션만 행을 바꾸고,
/// 진 쪽은 지급을 건너뜀. read-then-write로 풀면 레이스가 생김.
#[async_trait]
impl GroupBonusStore for Database {
    async fn member_ids(&self, group_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT user_id FROM group_members WHERE group_id = $1"
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn verified_member_ids(&self, group_id: &str, date_key: &str) -> Result<HashSet<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT user_id FROM verifications
            WHERE group_id = $1 AND date = $2 AND success = TRUE
            "#
        )
        .bind(group_id)
        .bind(date_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn grant_bonus_if_unclaimed(
        &self,
        group_id: &str,
        date_key: &str,
        bonus_lp: i64,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // 조건부 check-and-set: 오늘 이미 지급됐다면 0행 변경
        let claimed = sqlx::query(
            r#"
            UPDATE groups SET last_bonus_date = $2
            WHERE id = $1
              AND (last_bonus_date IS NULL OR last_bonus_date <> $2)
            "#
        )
        .bind(group_id)
        .bind(date_key)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if claimed == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        // 미러 레코드와 원본 사용자 레코드 모두 지급
        sqlx::query("UPDATE group_members SET lp = lp + $2 WHERE group_id = $1")
            .bind(group_id)
            .bind(bonus_lp)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE users SET lp = lp + $2, updated_at = NOW()
            WHERE id IN (SELECT user_id FROM group_members WHERE group_id = $1)
            "#
        )
        .bind(group_id)
        .bind(bonus_lp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}

//! be-echo Verification API Server
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Client (Mobile Web)                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum Web Server                         │
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                      Routes Layer                        ││
//! │  │  /health  /users/*  /rankings/*  /grades/guide          ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Services Layer                        ││
//! │  │  Ledger  Streak  Grade  Achievements  Insights  Bonus   ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Data Layer                            ││
//! │  │  PostgreSQL (users / verifications / groups)             ││
//! │  └─────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                YOLO 텀블러 분류 서버 (외부, /predict)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// 라이브러리에서 가져오기
use be_echo_api::{routes, AppState, Config, CupClassifier, Database};

/// 멀티파트 업로드 상한 (인증 이미지)
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    // RUST_LOG=debug,sqlx=warn 형태로 레벨 제어 가능
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "be_echo_api=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting be-echo Verification API Server");

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("📋 Configuration loaded");

    // 데이터베이스 연결
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("🗄️  Database connected");

    // 마이그레이션 실행
    db.run_migrations().await?;
    tracing::info!("📦 Migrations completed");

    // 분류 서버 클라이언트 초기화
    let classifier = CupClassifier::new(&config.classifier_url, config.classifier_timeout_ms);
    tracing::info!("🥤 Cup classifier client ready: {}", config.classifier_url);

    // 앱 상태 구성
    let state = AppState {
        db: Arc::new(db),
        classifier: Arc::new(classifier),
        config: Arc::new(config.clone()),
    };

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🌐 Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 생성
///
/// # Route Structure
///
/// ```text
/// GET   /health                     - 서버 상태 확인
///
/// POST  /users                      - 세션 수립 (upsert)
/// GET   /users/:id                  - 진행도 스냅샷
/// PATCH /users/:id/profile          - 프로필 갱신
/// GET   /users/:id/home             - 홈 화면 읽기 모델
/// GET   /users/:id/achievements     - 업적 카탈로그 + 해금 여부
/// GET   /users/:id/insights         - 요약 + 주간 추이
/// POST  /users/:id/verifications    - 인증 시도 제출 (멀티파트)
/// GET   /users/:id/verifications    - 인증 히스토리
///
/// GET   /rankings/personal          - 개인 랭킹
/// GET   /rankings/groups            - 그룹 랭킹
/// GET   /grades/guide               - 등급 가이드
/// ```
fn create_router(state: AppState) -> Router {
    // CORS 설정
    // 프로덕션에서는 특정 도메인만 허용
    // 개발 환경에서는 localhost 허용
    let cors = if state.config.is_production() {
        // 프로덕션: 특정 도메인만 허용 (환경변수로 설정)
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "https://yourdomain.com".to_string());
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PATCH,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    } else {
        // 개발: localhost 허용
        CorsLayer::new()
            .allow_origin([
                "http://localhost:5173".parse().unwrap(),  // Vite dev server
                "http://localhost:3000".parse().unwrap(),  // Alternative
                "http://127.0.0.1:5173".parse().unwrap(),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))

        // Users
        .route("/users", post(routes::users::register_user))
        .route("/users/:id", get(routes::users::get_user))
        .route("/users/:id/profile", patch(routes::users::update_profile))
        .route("/users/:id/home", get(routes::users::get_home))
        .route("/users/:id/achievements", get(routes::users::get_achievements))
        .route("/users/:id/insights", get(routes::users::get_insights))

        // Verification
        .route(
            "/users/:id/verifications",
            post(routes::verification::submit_verification)
                .get(routes::verification::list_history),
        )

        // Rankings & grade guide
        .route("/rankings/personal", get(routes::rankings::personal_rankings))
        .route("/rankings/groups", get(routes::rankings::group_rankings))
        .route("/grades/guide", get(routes::users::get_grade_guide))

        // 미들웨어
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)

        // 상태 주입
        .with_state(state)
}

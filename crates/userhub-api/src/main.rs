//! UserHub API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 사용자 관리, 역할 관리, 인증(JWT), 헬스 체크 엔드포인트를 제공합니다.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use userhub_core::config::AppConfig;
use userhub_core::logging::{init_logging, LogConfig};

use userhub_api::auth::{PasswordHasher, TokenCodec};
use userhub_api::metrics::setup_metrics_recorder;
use userhub_api::middleware::{
    metrics_layer, rate_limit_middleware, spawn_cleanup_task, RateLimitConfig, RateLimitState,
};
use userhub_api::openapi::swagger_ui_router;
use userhub_api::repository::{PgRoleRepository, PgUserRepository};
use userhub_api::routes::create_api_router;
use userhub_api::state::AppState;

/// 데이터베이스 연결 풀 생성.
///
/// `DATABASE_URL` 환경 변수가 필요하며, 연결 후 간단한 질의로
/// 연결 상태를 확인합니다.
async fn connect_database(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL 환경 변수가 설정되어야 합니다")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&database_url)
        .await
        .context("데이터베이스 연결 실패")?;

    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await
        .context("데이터베이스 연결 확인 실패")?;

    info!("Connected to PostgreSQL successfully");
    Ok(pool)
}

/// CORS 미들웨어 구성.
///
/// `CORS_ORIGINS` 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    config: &AppConfig,
    shutdown: CancellationToken,
) -> Router {
    // 메트릭 라우터 (별도 상태, Rate Limit 제외)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    // API 라우터 (Rate Limit 조건부 적용)
    let api_router = if config.rate_limit.enabled {
        let rate_limit_state =
            RateLimitState::new(RateLimitConfig::new(config.rate_limit.requests_per_minute));

        spawn_cleanup_task(rate_limit_state.limiter().clone(), shutdown);

        info!(
            requests_per_minute = config.rate_limit.requests_per_minute,
            "Rate limiting configured"
        );

        create_api_router()
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                rate_limit_state,
                rate_limit_middleware,
            ))
    } else {
        info!("Rate limiting DISABLED");
        create_api_router().with_state(state)
    };

    Router::new()
        .merge(metrics_router)
        .merge(api_router)
        .merge(swagger_ui_router())
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // 설정 로드
    let config = AppConfig::load_default().context("설정 로드 실패")?;

    // tracing 초기화
    let log_config = LogConfig::new(config.logging.level.clone())
        .with_format(config.logging.format.parse().unwrap_or_default());
    init_logging(log_config).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    info!("Starting UserHub API server...");

    if config.auth.uses_dev_secret() {
        warn!("USERHUB__AUTH__SECRET not set, using default (INSECURE for development only)");
    }

    // Prometheus 메트릭 레코더 설정
    let metrics_handle = setup_metrics_recorder();
    info!("Prometheus metrics recorder initialized");

    // 인증 코어 구성 (토큰 코덱 + 비밀번호 해셔)
    let tokens = TokenCodec::from_config(&config.auth);
    let hasher = PasswordHasher::new(&config.auth.hashing)
        .map_err(|e| anyhow::anyhow!("해싱 파라미터 오류: {}", e))?;

    // 데이터베이스 연결 및 저장소 구성
    let pool = connect_database(&config).await?;
    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let roles = Arc::new(PgRoleRepository::new(pool.clone()));

    let state = Arc::new(AppState::new(users, roles, tokens, hasher).with_db_pool(pool));

    info!(version = %state.version, "Application state initialized");

    // 전역 종료 토큰 (백그라운드 태스크 정리용)
    let shutdown_token = CancellationToken::new();

    // 라우터 생성
    let app = create_router(
        state,
        metrics_handle,
        &config,
        shutdown_token.clone(),
    );

    // 서버 시작
    let addr = config.server.bind_addr();
    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("{} 바인딩 실패", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    // 백그라운드 태스크에 종료 시그널 전파
    shutdown_token.cancel();
    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}

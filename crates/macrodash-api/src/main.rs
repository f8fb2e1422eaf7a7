//! 매크로 대시보드 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 헬스 체크와 홈페이지 페이로드 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, Router};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use macrodash_api::routes::create_api_router;
use macrodash_api::state::AppState;
use macrodash_core::config::{AppConfig, ServerConfig};
use macrodash_core::logging::{init_logging, LogConfig};

/// 소켓 주소 계산.
///
/// # Errors
/// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
fn socket_addr(server: &ServerConfig) -> Result<SocketAddr, std::net::AddrParseError> {
    format!("{}:{}", server.host, server.port).parse()
}

/// CORS 미들웨어 구성.
///
/// 설정의 `server.allowed_origins`가 `*` 또는 비어 있으면 개발 모드로
/// 간주하여 모든 origin을 허용합니다. 그 외에는 쉼표로 구분된 origin
/// 목록만 허용합니다. 자격 증명은 origin 목록이 실제로 제한된
/// 경우에만 허용됩니다 (`Allow-Origin: *`와 조합할 수 없음).
fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let trimmed = allowed_origins.trim();
    let allow_any = trimmed.is_empty() || trimmed == "*";

    let origins: Vec<_> = if allow_any {
        Vec::new()
    } else {
        trimmed
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect()
    };

    let restricted = !origins.is_empty();
    let allow_origin = if restricted {
        info!("CORS configured with {} allowed origins", origins.len());
        AllowOrigin::list(origins)
    } else {
        if allow_any {
            // 개발: 모든 origin 허용
            warn!("allowed_origins not restricted, allowing any origin (development mode)");
        } else {
            warn!("allowed_origins is set but contains no valid origins, allowing any");
        }
        AllowOrigin::any()
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        // 허용되는 HTTP 메서드 (읽기 전용 API)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        // 허용되는 헤더
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(restricted)
        // preflight 요청 캐시 시간
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, allowed_origins: &str) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer(allowed_origins))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // 설정 로드 (config/default.toml + MACRODASH__* 환경 변수)
    let config = AppConfig::load_default().context("failed to load configuration")?;

    // tracing 초기화
    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!("Starting Macrodash API server...");

    let addr = socket_addr(&config.server).map_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. server.host / server.port 설정을 확인하세요."
        );
        anyhow::anyhow!(e)
    })?;

    // AppState 생성 (제공자 클라이언트 + 캐시 + 오케스트레이터)
    let state = Arc::new(AppState::new(&config).context("failed to initialize application state")?);

    info!(version = %state.version, "Application state initialized");
    info!(
        sgs = %config.providers.sgs_base_url,
        brapi = %config.providers.brapi_base_url,
        olinda = %config.providers.olinda_base_url,
        has_brapi_token = config.providers.brapi_token().is_some(),
        "Upstream providers configured"
    );

    // 라우터 생성
    let app = create_router(state, &config.server.allowed_origins);

    // 전역 종료 토큰 생성 (graceful shutdown용)
    let shutdown_token = CancellationToken::new();

    // 서버 시작
    info!(%addr, "API server listening");
    info!("Homepage payload at http://{}/api/homepage/v1", addr);
    info!("Health check at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;

    // Graceful shutdown 처리
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token))
        .await
        .context("server error")?;

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
    info!("Shutdown signal propagated");
}

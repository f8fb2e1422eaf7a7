//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/api/homepage/v1` - 홈페이지 페이로드

pub mod health;
pub mod homepage;

pub use health::{health_router, HealthResponse};
pub use homepage::{get_homepage, homepage_router};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // 홈페이지 엔드포인트
        .nest("/api/homepage", homepage_router())
}

//! REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - 홈페이지 페이로드 조립 (캐시 경유 수집 + 파생 지표)
//! - 헬스 체크 엔드포인트
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`services`]: 페이로드 조립 로직

pub mod routes;
pub mod services;
pub mod state;

pub use routes::{create_api_router, health_router, homepage_router};
pub use services::{build_homepage_payload, HomepagePayload};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;

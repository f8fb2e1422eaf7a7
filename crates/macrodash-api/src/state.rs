//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use macrodash_analytics::MetricsEngine;
use macrodash_core::config::{AppConfig, TtlConfig};
use macrodash_core::MacrodashResult;
use macrodash_data::{CacheStore, FetchOrchestrator, ProviderSet};

/// 애플리케이션 공유 상태.
///
/// 이 구조체는 모든 API 핸들러에서 접근할 수 있는 공유 리소스를 포함합니다.
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 캐시 우선 fetch 오케스트레이터 - 모든 업스트림 읽기의 단일 경로
    pub orchestrator: Arc<FetchOrchestrator>,

    /// 업스트림 제공자 묶음 (SGS, BRAPI, Olinda)
    pub providers: Arc<ProviderSet>,

    /// 파생 지표 엔진 (변동성, 인플레이션, 변화율)
    pub metrics: Arc<MetricsEngine>,

    /// 캐시 TTL 설정
    pub ttl: TtlConfig,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 설정에서 새로운 AppState를 생성합니다.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 에러를 반환합니다.
    pub fn new(config: &AppConfig) -> MacrodashResult<Self> {
        let providers = ProviderSet::from_config(&config.providers)?;
        let store = Arc::new(CacheStore::new());

        Ok(Self {
            orchestrator: Arc::new(FetchOrchestrator::new(store)),
            providers: Arc::new(providers),
            metrics: Arc::new(MetricsEngine::new()),
            ttl: config.ttl.clone(),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 기본 설정으로 동작하는 상태를 생성합니다. 업스트림 요청이 필요한
/// 테스트는 제공자 base URL을 mock 서버로 바꾼 설정을 넘기세요.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state(config: &AppConfig) -> AppState {
    AppState::new(config).expect("Failed to create AppState for test")
}

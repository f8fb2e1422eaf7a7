//! 데이터 캐싱 및 업스트림 제공자.
//!
//! 이 crate는 다음을 제공합니다:
//! - 신선값/최종값 이중 추적 TTL 캐시 저장소
//! - 키 단위 단일 비행 fetch 오케스트레이터
//! - BCB SGS 시계열 제공자
//! - BRAPI 시세/히스토리 제공자
//! - BCB Olinda 시장 기대치 제공자

pub mod cache;
pub mod error;
pub mod provider;

pub use error::{DataError, Result};

// 캐시 타입 재내보내기
pub use cache::orchestrator::{CacheStatus, FetchOrchestrator};
pub use cache::store::{CacheStore, CachedValue, Clock, SystemClock};

// 제공자 재내보내기
pub use provider::brapi::{
    history_cache_key, quote_cache_key, BrapiProvider, DEFAULT_INTERVAL, DEFAULT_RANGE,
    IBOV_TICKER, USDBRL_TICKER,
};
pub use provider::expectations::{
    expectations_cache_key, ExpectationsProvider, DEFAULT_INDICATOR,
};
pub use provider::sgs::{SgsProvider, SgsSeries};
pub use provider::ProviderSet;

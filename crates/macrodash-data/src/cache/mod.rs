//! 캐싱 레이어.
//!
//! - Store: 신선값/최종값 이중 추적 TTL 저장소
//! - Orchestrator: 키 단위 단일 비행 cached-fetch 계약

pub mod orchestrator;
pub mod store;

pub use orchestrator::{CacheStatus, FetchOrchestrator};
pub use store::{CacheStore, CachedValue, Clock, SystemClock};

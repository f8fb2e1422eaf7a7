//! 키 단위 단일 비행 cached-fetch 오케스트레이터.
//!
//! 모든 업스트림 읽기는 이 모듈의 `cached_fetch`를 통과합니다. 같은 키에
//! 대한 동시 요청은 하나의 생산자 실행으로 합쳐지고, 실패한 갱신은
//! 최종값 폴백으로 강등됩니다. 생산자는 재시도 없이 정확히 한 번만
//! 실행됩니다.
//!
//! # 동작 흐름
//!
//! ```text
//! 요청 (key, ttl, producer)
//!         │
//!   ┌─────▼─────┐
//!   │ 신선한 값? │──YES──▶ 반환 (hit)
//!   └─────┬─────┘
//!         │ NO
//! ┌───────▼────────┐
//! │ 키 Lock 획득    │ ← 같은 키는 하나만 생산
//! └───────┬────────┘
//! ┌───────▼────────┐
//! │ 신선도 재확인   │──YES──▶ 반환 (hit, 대기자 경로)
//! └───────┬────────┘
//!         │ NO
//! ┌───────▼────────┐
//! │ 생산자 1회 실행 │
//! └───────┬────────┘
//!    ┌────┴────┐
//!    │ 성공?   │
//!    └────┬────┘
//!     YES │ NO
//!         │  └──▶ 최종값 있으면 반환 (stale, fallback)
//!         │       없으면 None (stale)
//!         ▼
//!   저장 후 반환 (fresh)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::store::{CacheStore, CachedValue};

/// 키별 페칭 상태를 추적하는 Lock 맵.
type FetchLockMap = Arc<RwLock<HashMap<String, Arc<RwLock<()>>>>>;

/// 값이 어떻게 얻어졌는지 설명하는 캐시 상태.
///
/// 페이로드의 `cache`/`sources` 필드에 그대로 직렬화됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatus {
    /// 신선한 캐시 값이 제공되었는지
    pub hit: bool,
    /// 값이 신선하지 않은지 (폴백 제공 또는 데이터 없음)
    pub stale: bool,
    /// 최종값 폴백이 제공되었는지
    pub from_fallback: bool,
    /// 이 키에 적용된 TTL (초)
    pub ttl_seconds: u64,
    /// 마지막 성공 저장 시각 (ISO-8601 UTC)
    pub last_known_at: Option<String>,
}

/// 단일 비행 fetch 오케스트레이터.
///
/// `CacheStore`를 소유하지 않고 공유하며, 키마다 독립적인 락으로
/// 생산자 중복 실행을 방지합니다. 서로 다른 키의 생산자는 서로를
/// 차단하지 않습니다.
pub struct FetchOrchestrator {
    store: Arc<CacheStore>,
    /// 동시성 제어를 위한 Lock 맵
    fetch_locks: FetchLockMap,
}

impl FetchOrchestrator {
    /// 새 오케스트레이터를 생성합니다.
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self {
            store,
            fetch_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 공유 캐시 저장소에 대한 참조를 반환합니다.
    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// 캐시 우선으로 값을 조회하고, 없으면 생산자를 한 번 실행합니다.
    ///
    /// # 인자
    /// - `key`: 캐시 키 (예: "sgs:selic")
    /// - `ttl_seconds`: 성공 시 저장에 적용할 TTL
    /// - `producer`: 업스트림 읽기. `None`이 실패 신호입니다.
    ///
    /// # 반환
    ///
    /// `(값, 상태)`. 값이 `None`인 경우는 키가 저장된 적 없고 생산자도
    /// 실패한 경우뿐입니다. 폴백 값은 항상 `stale`/`from_fallback`으로
    /// 표시됩니다.
    pub async fn cached_fetch<F, Fut>(
        &self,
        key: &str,
        ttl_seconds: u64,
        producer: F,
    ) -> (Option<CachedValue>, CacheStatus)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<CachedValue>>,
    {
        // 1. 신선한 값이 있으면 바로 반환
        if let Some(value) = self.store.get_fresh(key).await {
            debug!(key, "캐시 히트");
            return (Some(value), self.status(key, ttl_seconds, true, false, false).await);
        }

        // 2. 동시성 제어: 키 Lock 획득
        let lock = self.get_or_create_lock(key).await;
        let _guard = lock.write().await;

        // 3. 락 획득 후 재확인. 대기 중에 다른 요청이 채웠을 수 있음
        if let Some(value) = self.store.get_fresh(key).await {
            debug!(key, "캐시 히트 (대기자 경로)");
            return (Some(value), self.status(key, ttl_seconds, true, false, false).await);
        }

        // 4. 생산자 실행 (재시도 없음)
        match producer().await {
            Some(value) => {
                self.store.set(key, value.clone(), ttl_seconds).await;
                debug!(key, ttl_seconds, "업스트림 갱신 성공");
                (Some(value), self.status(key, ttl_seconds, false, false, false).await)
            }
            None => match self.store.get_last_known(key).await {
                Some(fallback) => {
                    warn!(key, "업스트림 갱신 실패, 최종값 폴백 제공");
                    (Some(fallback), self.status(key, ttl_seconds, false, true, true).await)
                }
                None => {
                    warn!(key, "업스트림 갱신 실패, 폴백 없음");
                    (None, self.status(key, ttl_seconds, false, true, false).await)
                }
            },
        }
    }

    /// 키에 대한 Lock을 가져오거나 생성합니다.
    async fn get_or_create_lock(&self, key: &str) -> Arc<RwLock<()>> {
        // 읽기 락으로 먼저 확인
        let locks = self.fetch_locks.read().await;
        if let Some(lock) = locks.get(key) {
            return lock.clone();
        }
        drop(locks);

        // 쓰기 락으로 생성
        let mut locks = self.fetch_locks.write().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// 현재 저장소 상태를 반영한 CacheStatus를 구성합니다.
    async fn status(
        &self,
        key: &str,
        ttl_seconds: u64,
        hit: bool,
        stale: bool,
        from_fallback: bool,
    ) -> CacheStatus {
        CacheStatus {
            hit,
            stale,
            from_fallback,
            ttl_seconds,
            last_known_at: self.store.last_known_at_iso(key).await,
        }
    }
}

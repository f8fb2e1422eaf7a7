//! 신선값/최종값 이중 추적 TTL 캐시 저장소.
//!
//! 모든 업스트림 읽기 결과를 보관하는 메모리 내 저장소입니다. 각 엔트리는
//! 두 벌의 값을 추적합니다:
//!
//! - **신선값**: TTL이 지나면 `get_fresh`에서 사라지는 최신 값
//! - **최종값 (last known)**: 마지막으로 성공한 저장 값. 만료되지 않으며
//!   업스트림 장애 시 폴백으로 제공됩니다.
//!
//! 시간은 `Clock` 트레이트로 주입되므로 테스트에서 시계를 수동으로
//! 진행시켜 TTL 경계를 검증할 수 있습니다.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use macrodash_core::domain::{format_iso_seconds, ExpectationPoint, QuotePoint, TimeSeriesPoint};

/// 시간 소스 추상화.
///
/// 운영 코드는 `SystemClock`을 사용하고, 테스트는 수동 시계를 주입합니다.
pub trait Clock: Send + Sync {
    /// 현재 UTC 시각을 반환합니다.
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 캐시에 저장되는 값.
///
/// 서비스가 캐싱하는 세 가지 데이터 형태를 하나의 타입으로 묶습니다.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// 날짜별 시계열 (SGS, 가격 히스토리)
    Series(Vec<TimeSeriesPoint>),
    /// 시세 스냅샷 (BRAPI quote)
    Quote(QuotePoint),
    /// 시장 기대치 (Olinda)
    Expectation(ExpectationPoint),
}

impl CachedValue {
    /// 시계열이면 참조를 반환합니다.
    pub fn as_series(&self) -> Option<&[TimeSeriesPoint]> {
        match self {
            CachedValue::Series(points) => Some(points),
            _ => None,
        }
    }

    /// 시세 스냅샷이면 참조를 반환합니다.
    pub fn as_quote(&self) -> Option<&QuotePoint> {
        match self {
            CachedValue::Quote(quote) => Some(quote),
            _ => None,
        }
    }

    /// 시장 기대치이면 참조를 반환합니다.
    pub fn as_expectation(&self) -> Option<&ExpectationPoint> {
        match self {
            CachedValue::Expectation(point) => Some(point),
            _ => None,
        }
    }

    /// 시계열로 변환합니다. 다른 형태면 `None`.
    pub fn into_series(self) -> Option<Vec<TimeSeriesPoint>> {
        match self {
            CachedValue::Series(points) => Some(points),
            _ => None,
        }
    }

    /// 시세 스냅샷으로 변환합니다. 다른 형태면 `None`.
    pub fn into_quote(self) -> Option<QuotePoint> {
        match self {
            CachedValue::Quote(quote) => Some(quote),
            _ => None,
        }
    }

    /// 시장 기대치로 변환합니다. 다른 형태면 `None`.
    pub fn into_expectation(self) -> Option<ExpectationPoint> {
        match self {
            CachedValue::Expectation(point) => Some(point),
            _ => None,
        }
    }
}

/// 캐시 엔트리.
///
/// `value`/`expires_at`은 신선도 판정에, `last_known`/`last_known_at`은
/// 폴백 제공에 쓰입니다. 네 필드는 항상 `set` 한 번으로 함께 갱신됩니다.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedValue,
    expires_at: DateTime<Utc>,
    last_known: CachedValue,
    last_known_at: DateTime<Utc>,
}

/// 이중 추적 TTL 캐시 저장소.
///
/// 전역 상태가 아닌 명시적 인스턴스로 생성되며, `Arc`로 감싸 공유합니다.
pub struct CacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    /// 시스템 시계를 사용하는 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// 주입된 시계를 사용하는 저장소를 생성합니다.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// 아직 만료되지 않은 값을 조회합니다.
    ///
    /// # 반환
    ///
    /// 엔트리가 없거나 `now >= expires_at`이면 `None`. 만료 경계는
    /// 배타적입니다: 정확히 만료 시각에 도달한 값은 더 이상 신선하지
    /// 않습니다.
    pub async fn get_fresh(&self, key: &str) -> Option<CachedValue> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if now < entry.expires_at {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// 만료 여부와 무관하게 마지막으로 성공 저장된 값을 조회합니다.
    ///
    /// 키가 한 번도 저장된 적이 없을 때만 `None`을 반환합니다.
    pub async fn get_last_known(&self, key: &str) -> Option<CachedValue> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.last_known.clone())
    }

    /// 값을 저장합니다.
    ///
    /// 신선값, 만료 시각, 최종값, 최종 저장 시각 네 필드를 쓰기 락 안에서
    /// 한 번에 갱신합니다. 최종값은 성공적인 `set`에서만 바뀝니다.
    pub async fn set(&self, key: &str, value: CachedValue, ttl_seconds: u64) {
        let now = self.clock.now();
        let entry = CacheEntry {
            value: value.clone(),
            expires_at: now + Duration::seconds(ttl_seconds as i64),
            last_known: value,
            last_known_at: now,
        };
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry);
    }

    /// 마지막 성공 저장 시각을 ISO-8601 UTC 문자열로 반환합니다.
    ///
    /// # 반환
    ///
    /// 초 단위 정밀도에 `Z` 접미사 (예: `2026-08-25T14:03:07Z`).
    /// 키가 저장된 적이 없으면 `None`.
    pub async fn last_known_at_iso(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .map(|entry| format_iso_seconds(entry.last_known_at))
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// 수동으로 진행시키는 테스트용 시계.
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn starting_at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(now),
            })
        }

        pub fn advance_secs(&self, secs: i64) {
            let mut now = self.now.lock().unwrap();
            *now += Duration::seconds(secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    pub fn test_epoch() -> DateTime<Utc> {
        chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
    }

    pub fn quote_value(value: f64) -> CachedValue {
        CachedValue::Quote(QuotePoint {
            value,
            change_abs: None,
            change_pct: None,
            last_update: "2024-06-01T12:00:00Z".to_string(),
        })
    }
}

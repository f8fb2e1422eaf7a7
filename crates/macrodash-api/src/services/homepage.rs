//! 홈페이지 페이로드 조립 서비스.
//!
//! 홈페이지 한 화면에 필요한 모든 매크로 지표를 수집하고 조립합니다.
//! 원천 수집은 전부 캐시 오케스트레이터를 경유하므로, 업스트림이
//! 전부 죽어도 페이로드는 null 값과 stale 표시로 강등될 뿐 실패하지
//! 않습니다.
//!
//! # 조립 단계
//!
//! 1. 수집: SGS 5종 + BRAPI 시세/히스토리 + Olinda 기대치 (동시 실행)
//! 2. 파생: 12개월 인플레이션, 연율화 변동성, 근사 실질 금리
//! 3. 조립: top_cards / what_changed_today / signals / meta

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use macrodash_analytics::{AnnualizedVolParams, MetricsEngine};
use macrodash_core::config::TtlConfig;
use macrodash_core::domain::{
    iso_now, last_and_prev, series_values, ExpectationPoint, QuotePoint, TimeSeriesPoint,
};
use macrodash_data::{
    expectations_cache_key, history_cache_key, quote_cache_key, CacheStatus, CachedValue,
    SgsSeries, DEFAULT_INDICATOR, DEFAULT_INTERVAL, DEFAULT_RANGE, IBOV_TICKER, USDBRL_TICKER,
};

use crate::state::AppState;

// ==================== 페이로드 타입 ====================

/// 홈페이지 전체 페이로드.
///
/// `GET /api/homepage/v1` 응답 본문과 1:1로 매칭됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomepagePayload {
    /// 상단 카드 4개 (IBOV, USD/BRL, SELIC, IPCA)
    pub top_cards: Vec<TopCard>,
    /// 오늘 변한 것 (원천이 없는 항목은 생략)
    pub what_changed_today: Vec<ChangeItem>,
    /// 파생 시그널 (키 고정)
    pub signals: Signals,
    /// 생성 시각, 신선도, 원천별 캐시 상태
    pub meta: Meta,
}

/// 상단 카드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopCard {
    pub key: String,
    pub label: String,
    /// 원천이 없으면 null
    pub value: Option<f64>,
    pub unit: String,
    /// 전기 대비 변화 (계산 불가 시 null)
    pub change_1d: Option<f64>,
    pub change_1d_unit: String,
    /// ISO-8601 UTC
    pub last_update: String,
}

/// what_changed_today 항목.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeItem {
    pub key: String,
    pub label: String,
    pub value: Option<f64>,
    pub unit: String,
    /// 항목별 부가 정보 (delta 등)
    pub extra: serde_json::Value,
    pub last_update: String,
    /// 비교 주기 표시 ("1d", "m/m", "q/q")
    pub period_label: String,
}

/// 파생 시그널 묶음. 키는 고정입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signals {
    pub real_rate_approx: RealRateSignal,
    pub inflation_expectations_12m: ExpectationsSignal,
    pub ibov_vol_20d_annualized: VolSignal,
    pub usdbrl_vol_20d_annualized: VolSignal,
    pub unemployment_latest: LatestSignal,
    pub gdp_latest: LatestSignal,
}

/// 근사 실질 금리 시그널.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealRateSignal {
    pub key: String,
    pub label: String,
    pub value: Option<f64>,
    pub unit: String,
    pub last_update: String,
    /// 계산에 쓰인 구성 요소
    pub components: RealRateComponents,
}

/// 실질 금리 구성 요소.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealRateComponents {
    pub selic: Option<f64>,
    pub ipca_12m_approx: Option<f64>,
}

/// 인플레이션 기대치 시그널.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectationsSignal {
    pub key: String,
    pub label: String,
    pub value: Option<f64>,
    pub unit: String,
    pub last_update: String,
    pub source: String,
    pub method: String,
    pub cache: CacheStatus,
}

/// 변동성 시그널.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolSignal {
    pub key: String,
    pub label: String,
    pub value: Option<f64>,
    pub unit: String,
    pub last_update: String,
    /// 변동성 계산에 쓰인 원천의 캐시 상태
    pub cache: CacheStatus,
}

/// 최신값 시그널.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestSignal {
    pub key: String,
    pub label: String,
    pub value: Option<f64>,
    pub unit: String,
    pub last_update: String,
}

/// 페이로드 메타 정보.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// 페이로드 생성 시각 (ISO-8601 UTC)
    pub generated_at: String,
    /// 핵심 원천(SELIC, IPCA, USD, IBOV 시세, 기대치) 중 하나라도
    /// 폴백/결측이면 true
    pub stale: bool,
    /// 원천별 캐시 상태
    pub sources: SourceStatuses,
}

/// 원천별 캐시 상태.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStatuses {
    pub sgs: SgsStatuses,
    pub brapi: BrapiStatuses,
    pub expectations: CacheStatus,
}

/// SGS 시계열별 캐시 상태.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SgsStatuses {
    pub selic: CacheStatus,
    pub ipca: CacheStatus,
    pub usdbrl: CacheStatus,
    pub unemployment: CacheStatus,
    pub gdp: CacheStatus,
}

/// BRAPI 원천별 캐시 상태.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrapiStatuses {
    pub ibov_quote: CacheStatus,
    pub ibov_history: CacheStatus,
    pub usd_history: CacheStatus,
}

// ==================== 원천 수집 ====================

/// 캐시 상태가 붙은 수집 결과.
#[derive(Debug, Clone)]
pub(crate) struct Fetched<T> {
    /// 값. 원천이 한 번도 성공한 적 없고 이번에도 실패하면 `None`
    pub data: Option<T>,
    /// 값이 어떻게 얻어졌는지
    pub cache: CacheStatus,
}

/// 홈페이지 조립에 필요한 원천 전체.
#[derive(Debug, Clone)]
pub(crate) struct HomepageSources {
    pub selic: Fetched<Vec<TimeSeriesPoint>>,
    pub ipca: Fetched<Vec<TimeSeriesPoint>>,
    pub usd: Fetched<Vec<TimeSeriesPoint>>,
    pub unemployment: Fetched<Vec<TimeSeriesPoint>>,
    pub gdp: Fetched<Vec<TimeSeriesPoint>>,
    pub ibov_quote: Fetched<QuotePoint>,
    pub ibov_hist: Fetched<Vec<TimeSeriesPoint>>,
    pub usd_hist: Fetched<Vec<TimeSeriesPoint>>,
    pub expectations: Fetched<ExpectationPoint>,
}

/// SGS 시계열별 TTL 클래스.
///
/// 일 단위 시계열(SELIC, USD/BRL)은 daily, 월/분기 단위 시계열은
/// slow TTL을 사용합니다.
fn sgs_ttl(ttl: &TtlConfig, series: SgsSeries) -> u64 {
    match series {
        SgsSeries::Selic | SgsSeries::UsdBrl => ttl.sgs_daily_secs,
        SgsSeries::IpcaMonthly | SgsSeries::Unemployment | SgsSeries::Gdp => ttl.sgs_slow_secs,
    }
}

/// SGS 시계열을 캐시 경유로 수집합니다.
async fn fetch_sgs(state: &AppState, series: SgsSeries) -> Fetched<Vec<TimeSeriesPoint>> {
    let providers = state.providers.clone();
    let (value, cache) = state
        .orchestrator
        .cached_fetch(series.cache_key(), sgs_ttl(&state.ttl, series), || async move {
            providers
                .sgs
                .fetch_series(series)
                .await
                .map(CachedValue::Series)
        })
        .await;

    Fetched {
        data: value.and_then(CachedValue::into_series),
        cache,
    }
}

/// IBOV 시세를 캐시 경유로 수집합니다.
async fn fetch_ibov_quote(state: &AppState) -> Fetched<QuotePoint> {
    let providers = state.providers.clone();
    let key = quote_cache_key(IBOV_TICKER);
    let (value, cache) = state
        .orchestrator
        .cached_fetch(&key, state.ttl.quote_secs, || async move {
            providers
                .brapi
                .fetch_quote(IBOV_TICKER)
                .await
                .map(CachedValue::Quote)
        })
        .await;

    Fetched {
        data: value.and_then(CachedValue::into_quote),
        cache,
    }
}

/// 일봉 히스토리를 캐시 경유로 수집합니다.
async fn fetch_history(state: &AppState, ticker: &'static str) -> Fetched<Vec<TimeSeriesPoint>> {
    let providers = state.providers.clone();
    let key = history_cache_key(ticker, DEFAULT_RANGE, DEFAULT_INTERVAL);
    let (value, cache) = state
        .orchestrator
        .cached_fetch(&key, state.ttl.history_secs, || async move {
            providers
                .brapi
                .fetch_history(ticker, DEFAULT_RANGE, DEFAULT_INTERVAL)
                .await
                .map(CachedValue::Series)
        })
        .await;

    Fetched {
        data: value.and_then(CachedValue::into_series),
        cache,
    }
}

/// 12개월 인플레이션 기대치를 캐시 경유로 수집합니다.
async fn fetch_expectations(state: &AppState) -> Fetched<ExpectationPoint> {
    let providers = state.providers.clone();
    let key = expectations_cache_key(DEFAULT_INDICATOR, true);
    let (value, cache) = state
        .orchestrator
        .cached_fetch(&key, state.ttl.expectations_secs, || async move {
            providers
                .expectations
                .fetch_median_12m(DEFAULT_INDICATOR, true)
                .await
                .map(CachedValue::Expectation)
        })
        .await;

    Fetched {
        data: value.and_then(CachedValue::into_expectation),
        cache,
    }
}

/// 모든 원천을 수집합니다.
///
/// 키가 전부 다르므로 동시에 실행해도 서로 차단하지 않습니다.
pub(crate) async fn collect_sources(state: &AppState) -> HomepageSources {
    let (selic, ipca, usd, unemployment, gdp, ibov_quote, ibov_hist, usd_hist, expectations) = tokio::join!(
        fetch_sgs(state, SgsSeries::Selic),
        fetch_sgs(state, SgsSeries::IpcaMonthly),
        fetch_sgs(state, SgsSeries::UsdBrl),
        fetch_sgs(state, SgsSeries::Unemployment),
        fetch_sgs(state, SgsSeries::Gdp),
        fetch_ibov_quote(state),
        fetch_history(state, IBOV_TICKER),
        fetch_history(state, USDBRL_TICKER),
        fetch_expectations(state),
    );

    HomepageSources {
        selic,
        ipca,
        usd,
        unemployment,
        gdp,
        ibov_quote,
        ibov_hist,
        usd_hist,
        expectations,
    }
}

// ==================== 조립 ====================

/// 마지막 점의 자정 ISO 시각, 없으면 현재 시각.
fn point_update_or_now(point: Option<&TimeSeriesPoint>) -> String {
    point.map(TimeSeriesPoint::iso_midnight).unwrap_or_else(iso_now)
}

/// 최신값 - 직전값. 둘 중 하나라도 없으면 `None`.
fn delta(last: Option<&TimeSeriesPoint>, prev: Option<&TimeSeriesPoint>) -> Option<f64> {
    match (last, prev) {
        (Some(last), Some(prev)) => Some(last.value - prev.value),
        _ => None,
    }
}

/// 수집된 원천으로 홈페이지 페이로드를 조립합니다.
///
/// 순수 함수입니다. 결측 원천은 null 값으로 나타나고, 항목 자체가
/// 만들어질 수 없으면 what_changed_today에서 생략됩니다.
pub(crate) fn assemble(sources: &HomepageSources, metrics: &MetricsEngine) -> HomepagePayload {
    let empty: &[TimeSeriesPoint] = &[];

    let (selic_last, selic_prev) = last_and_prev(sources.selic.data.as_deref().unwrap_or(empty));
    let (ipca_last, ipca_prev) = last_and_prev(sources.ipca.data.as_deref().unwrap_or(empty));
    let (usd_last, usd_prev) = last_and_prev(sources.usd.data.as_deref().unwrap_or(empty));
    let (unemp_last, unemp_prev) =
        last_and_prev(sources.unemployment.data.as_deref().unwrap_or(empty));
    let (gdp_last, gdp_prev) = last_and_prev(sources.gdp.data.as_deref().unwrap_or(empty));

    let ipca_12m = metrics.ipca_12m_compound(&series_values(
        sources.ipca.data.as_deref().unwrap_or(empty),
    ));

    let quote = sources.ibov_quote.data.as_ref();

    // 변동성: IBOV는 히스토리에서만, USD/BRL은 히스토리 실패 시
    // SGS 환율의 마지막 60개 값으로 대체 계산
    let ibov_vol = sources.ibov_hist.data.as_ref().and_then(|hist| {
        metrics.annualized_volatility(&series_values(hist), AnnualizedVolParams::default())
    });

    let usd_vol = match &sources.usd_hist.data {
        Some(hist) => {
            metrics.annualized_volatility(&series_values(hist), AnnualizedVolParams::default())
        }
        None => sources.usd.data.as_ref().and_then(|points| {
            let tail = &points[points.len().saturating_sub(60)..];
            metrics.annualized_volatility(&series_values(tail), AnnualizedVolParams::default())
        }),
    };

    let real_rate = metrics.real_rate_approx(selic_last.map(|p| p.value), ipca_12m);

    // ----- 상단 카드 (항상 4개, 고정 순서) -----

    let top_cards = vec![
        TopCard {
            key: "ibov".to_string(),
            label: "IBOV".to_string(),
            value: quote.map(|q| q.value),
            unit: "pts".to_string(),
            change_1d: quote.and_then(|q| q.change_pct),
            change_1d_unit: "%".to_string(),
            last_update: quote.map(|q| q.last_update.clone()).unwrap_or_else(iso_now),
        },
        TopCard {
            key: "usdbrl".to_string(),
            label: "USD/BRL".to_string(),
            value: usd_last.map(|p| p.value),
            unit: "BRL".to_string(),
            change_1d: delta(usd_last, usd_prev),
            change_1d_unit: "BRL".to_string(),
            last_update: point_update_or_now(usd_last),
        },
        TopCard {
            key: "selic".to_string(),
            label: "SELIC".to_string(),
            value: selic_last.map(|p| p.value),
            unit: "% a.a.".to_string(),
            change_1d: delta(selic_last, selic_prev),
            change_1d_unit: "p.p.".to_string(),
            last_update: point_update_or_now(selic_last),
        },
        TopCard {
            key: "ipca_last".to_string(),
            label: "IPCA (m/m)".to_string(),
            value: ipca_last.map(|p| p.value),
            unit: "%".to_string(),
            change_1d: delta(ipca_last, ipca_prev),
            change_1d_unit: "p.p.".to_string(),
            last_update: point_update_or_now(ipca_last),
        },
    ];

    // ----- 오늘 변한 것 (원천이 없으면 항목 생략) -----

    let mut what_changed_today = Vec::new();

    if let Some(q) = quote {
        what_changed_today.push(ChangeItem {
            key: "ibov_delta_1d".to_string(),
            label: "IBOV Δ 1d".to_string(),
            value: q.change_pct,
            unit: "%".to_string(),
            extra: json!({ "delta_pts": q.change_abs, "delta_pts_unit": "pts" }),
            last_update: q.last_update.clone(),
            period_label: "1d".to_string(),
        });
    }

    if let (Some(last), Some(prev)) = (usd_last, usd_prev) {
        what_changed_today.push(ChangeItem {
            key: "usdbrl_delta_1d".to_string(),
            label: "USD/BRL Δ 1d".to_string(),
            value: metrics.pct_change(last.value, prev.value),
            unit: "%".to_string(),
            extra: json!({ "delta_brl": last.value - prev.value, "delta_brl_unit": "BRL" }),
            last_update: last.iso_midnight(),
            period_label: "1d".to_string(),
        });
    }

    if let (Some(last), Some(prev)) = (selic_last, selic_prev) {
        what_changed_today.push(ChangeItem {
            key: "selic_last".to_string(),
            label: "SELIC (last)".to_string(),
            value: Some(last.value),
            unit: "% a.a.".to_string(),
            extra: json!({ "delta_pp": last.value - prev.value, "delta_pp_unit": "p.p." }),
            last_update: last.iso_midnight(),
            period_label: "1d".to_string(),
        });
    }

    if let (Some(last), Some(prev)) = (ipca_last, ipca_prev) {
        what_changed_today.push(ChangeItem {
            key: "ipca_mm_vs_prev".to_string(),
            label: "IPCA (m/m) vs prev".to_string(),
            value: Some(last.value - prev.value),
            unit: "p.p.".to_string(),
            extra: json!({
                "ipca_mm_last": last.value,
                "ipca_mm_prev": prev.value,
                "unit": "%"
            }),
            last_update: last.iso_midnight(),
            period_label: "m/m".to_string(),
        });
    }

    if let (Some(last), Some(prev)) = (unemp_last, unemp_prev) {
        what_changed_today.push(ChangeItem {
            key: "unemployment_vs_prev".to_string(),
            label: "Desemprego vs prev".to_string(),
            value: Some(last.value - prev.value),
            unit: "p.p.".to_string(),
            extra: json!({
                "unemployment_last": last.value,
                "unemployment_prev": prev.value,
                "unit": "%"
            }),
            last_update: last.iso_midnight(),
            period_label: "m/m".to_string(),
        });
    }

    if let (Some(last), Some(prev)) = (gdp_last, gdp_prev) {
        what_changed_today.push(ChangeItem {
            key: "gdp_vs_prev".to_string(),
            label: "PIB vs prev".to_string(),
            value: Some(last.value - prev.value),
            unit: "raw".to_string(),
            extra: json!({ "gdp_last": last.value, "gdp_prev": prev.value }),
            last_update: last.iso_midnight(),
            period_label: "q/q".to_string(),
        });
    }

    // ----- 시그널 (키 고정, 항상 전부 존재) -----

    let expectation = sources.expectations.data.as_ref();

    let signals = Signals {
        real_rate_approx: RealRateSignal {
            key: "real_rate_approx".to_string(),
            label: "Real Rate (approx)".to_string(),
            value: real_rate,
            unit: "p.p.".to_string(),
            last_update: iso_now(),
            components: RealRateComponents {
                selic: selic_last.map(|p| p.value),
                ipca_12m_approx: ipca_12m,
            },
        },
        inflation_expectations_12m: ExpectationsSignal {
            key: "inflation_expectations_12m".to_string(),
            label: "Inflation expectations (12m) - median".to_string(),
            value: expectation.map(|e| e.value),
            unit: "%".to_string(),
            last_update: expectation
                .map(|e| e.last_update.clone())
                .unwrap_or_else(iso_now),
            source: "BCB Olinda (ExpectativasMercadoInflacao12Meses)".to_string(),
            method: "median (prefer smoothed)".to_string(),
            cache: sources.expectations.cache.clone(),
        },
        ibov_vol_20d_annualized: VolSignal {
            key: "ibov_vol_20d_annualized".to_string(),
            label: "IBOV 20d vol (annualized)".to_string(),
            value: ibov_vol,
            unit: "% a.a.".to_string(),
            last_update: iso_now(),
            cache: sources.ibov_hist.cache.clone(),
        },
        usdbrl_vol_20d_annualized: VolSignal {
            key: "usdbrl_vol_20d_annualized".to_string(),
            label: "USD/BRL 20d vol (annualized)".to_string(),
            value: usd_vol,
            unit: "% a.a.".to_string(),
            last_update: iso_now(),
            // 히스토리로 계산했으면 히스토리 캐시, SGS 대체 계산이면 SGS 캐시
            cache: if sources.usd_hist.data.is_some() {
                sources.usd_hist.cache.clone()
            } else {
                sources.usd.cache.clone()
            },
        },
        unemployment_latest: LatestSignal {
            key: "unemployment_latest".to_string(),
            label: "Unemployment (latest)".to_string(),
            value: unemp_last.map(|p| p.value),
            unit: "%".to_string(),
            last_update: point_update_or_now(unemp_last),
        },
        gdp_latest: LatestSignal {
            key: "gdp_latest".to_string(),
            label: "GDP (latest)".to_string(),
            value: gdp_last.map(|p| p.value),
            unit: "raw".to_string(),
            last_update: point_update_or_now(gdp_last),
        },
    };

    // 핵심 원천만 전체 신선도에 반영. 실업률/GDP/히스토리는
    // 보조 지표라 제외
    let stale = sources.selic.cache.stale
        || sources.ipca.cache.stale
        || sources.usd.cache.stale
        || sources.ibov_quote.cache.stale
        || sources.expectations.cache.stale;

    HomepagePayload {
        top_cards,
        what_changed_today,
        signals,
        meta: Meta {
            generated_at: iso_now(),
            stale,
            sources: SourceStatuses {
                sgs: SgsStatuses {
                    selic: sources.selic.cache.clone(),
                    ipca: sources.ipca.cache.clone(),
                    usdbrl: sources.usd.cache.clone(),
                    unemployment: sources.unemployment.cache.clone(),
                    gdp: sources.gdp.cache.clone(),
                },
                brapi: BrapiStatuses {
                    ibov_quote: sources.ibov_quote.cache.clone(),
                    ibov_history: sources.ibov_hist.cache.clone(),
                    usd_history: sources.usd_hist.cache.clone(),
                },
                expectations: sources.expectations.cache.clone(),
            },
        },
    }
}

/// 홈페이지 페이로드를 수집하고 조립합니다.
///
/// 이 함수는 실패하지 않습니다. 업스트림 장애는 null 값과
/// `meta.stale`로 표현됩니다.
pub async fn build_homepage_payload(state: &AppState) -> HomepagePayload {
    let sources = collect_sources(state).await;
    let payload = assemble(&sources, &state.metrics);

    debug!(
        stale = payload.meta.stale,
        changed_items = payload.what_changed_today.len(),
        "홈페이지 페이로드 조립 완료"
    );
    payload
}

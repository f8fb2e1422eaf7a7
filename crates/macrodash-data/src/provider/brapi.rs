//! BRAPI 시세/히스토리 제공자.
//!
//! brapi.dev API에서 IBOV 지수와 USD/BRL 시세를 조회합니다.
//!
//! - 시세: `GET /quote/{ticker}` → `results[0].regularMarketPrice`
//! - 히스토리: 같은 엔드포인트에 `range`/`interval` 파라미터를 붙여
//!   `results[0].historicalDataPrice`의 unix 타임스탬프/종가를 일 단위
//!   시계열로 정규화합니다.

use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{DataError, Result};
use crate::provider::parse_loose_f64;
use macrodash_core::domain::{iso_now, QuotePoint, TimeSeriesPoint};

/// IBOV(Bovespa 지수) 티커.
pub const IBOV_TICKER: &str = "^BVSP";

/// USD/BRL 환율 티커.
pub const USDBRL_TICKER: &str = "USDBRL";

/// 히스토리 기본 조회 범위.
pub const DEFAULT_RANGE: &str = "1mo";

/// 히스토리 기본 간격.
pub const DEFAULT_INTERVAL: &str = "1d";

/// 시세 캐시 키.
pub fn quote_cache_key(ticker: &str) -> String {
    format!("brapi:quote:{}", ticker)
}

/// 히스토리 캐시 키.
pub fn history_cache_key(ticker: &str, range: &str, interval: &str) -> String {
    format!("brapi:hist:{}:{}:{}", ticker, range, interval)
}

/// BRAPI API 응답.
#[derive(Debug, Deserialize)]
struct BrapiResponse {
    #[serde(default)]
    results: Vec<BrapiResult>,
}

/// BRAPI 결과 항목.
#[derive(Debug, Deserialize)]
struct BrapiResult {
    /// 현재가 (필수)
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<serde_json::Value>,
    /// 전일 대비 변동 (절대값)
    #[serde(rename = "regularMarketChange", default)]
    regular_market_change: Option<serde_json::Value>,
    /// 전일 대비 변동률 (%)
    #[serde(rename = "regularMarketChangePercent", default)]
    regular_market_change_percent: Option<serde_json::Value>,
    /// 시세 시각 (unix 초)
    #[serde(rename = "regularMarketTime", default)]
    regular_market_time: Option<serde_json::Value>,
    /// 가격 히스토리 행
    #[serde(rename = "historicalDataPrice", default)]
    historical_data_price: Vec<BrapiHistoryRow>,
}

/// 가격 히스토리 행.
#[derive(Debug, Deserialize)]
struct BrapiHistoryRow {
    /// 거래일 (unix 초)
    #[serde(default)]
    date: Option<serde_json::Value>,
    /// 종가
    #[serde(default)]
    close: Option<serde_json::Value>,
}

/// unix 초를 ISO-8601 UTC 문자열로 변환합니다.
fn unix_to_iso(ts: i64) -> Option<String> {
    DateTime::from_timestamp(ts, 0).map(macrodash_core::domain::format_iso_seconds)
}

/// 티커를 URL 경로에 넣을 수 있게 인코딩합니다 (`^BVSP` → `%5EBVSP`).
fn encode_ticker(ticker: &str) -> String {
    ticker.replace('^', "%5E")
}

/// JSON 값에서 양의 unix 타임스탬프를 추출합니다.
fn positive_unix(value: &serde_json::Value) -> Option<i64> {
    let ts = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))?;
    (ts > 0).then_some(ts)
}

/// BRAPI 시세/히스토리 제공자.
pub struct BrapiProvider {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrapiProvider {
    /// 새 제공자를 생성합니다.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token,
        }
    }

    /// 설정된 API 토큰을 반환합니다.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// 시세 스냅샷을 조회합니다.
    ///
    /// `regularMarketPrice`가 없으면 실패입니다. 시세 시각이 없거나
    /// 0 이하이면 현재 시각을 대신 사용합니다.
    pub async fn try_fetch_quote(&self, ticker: &str) -> Result<QuotePoint> {
        let result = self.fetch_first_result(ticker, &[]).await?;

        let value = result
            .regular_market_price
            .as_ref()
            .and_then(parse_loose_f64)
            .ok_or_else(|| DataError::MissingField(format!("regularMarketPrice ({})", ticker)))?;
        let change_abs = result
            .regular_market_change
            .as_ref()
            .and_then(parse_loose_f64);
        let change_pct = result
            .regular_market_change_percent
            .as_ref()
            .and_then(parse_loose_f64);
        let last_update = result
            .regular_market_time
            .as_ref()
            .and_then(positive_unix)
            .and_then(unix_to_iso)
            .unwrap_or_else(iso_now);

        debug!(ticker, value, "BRAPI 시세 수신");
        Ok(QuotePoint {
            value,
            change_abs,
            change_pct,
            last_update,
        })
    }

    /// 일 단위 가격 히스토리를 조회합니다.
    ///
    /// 타임스탬프가 없거나 0 이하인 행, 종가를 파싱할 수 없는 행은
    /// 건너뜁니다. 남은 행이 없으면 실패이며, 결과는 날짜 오름차순입니다.
    pub async fn try_fetch_history(
        &self,
        ticker: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<TimeSeriesPoint>> {
        let params = [("range", range), ("interval", interval)];
        let result = self.fetch_first_result(ticker, &params).await?;

        let mut points: Vec<TimeSeriesPoint> = result
            .historical_data_price
            .iter()
            .filter_map(|row| {
                let close = row.close.as_ref().and_then(parse_loose_f64)?;
                let ts = row.date.as_ref().and_then(positive_unix)?;
                let date = DateTime::from_timestamp(ts, 0)?.date_naive();
                Some(TimeSeriesPoint::new(date, close))
            })
            .collect();

        if points.is_empty() {
            return Err(DataError::EmptySeries(format!("brapi hist {}", ticker)));
        }

        points.sort_by_key(|p| p.date);

        debug!(ticker, range, interval, count = points.len(), "BRAPI 히스토리 수신");
        Ok(points)
    }

    /// 실패를 로그로 남기고 `Option`으로 강등한 시세 조회.
    pub async fn fetch_quote(&self, ticker: &str) -> Option<QuotePoint> {
        match self.try_fetch_quote(ticker).await {
            Ok(quote) => Some(quote),
            Err(error) => {
                warn!(ticker, %error, "BRAPI 시세 조회 실패");
                None
            }
        }
    }

    /// 실패를 로그로 남기고 `Option`으로 강등한 히스토리 조회.
    pub async fn fetch_history(
        &self,
        ticker: &str,
        range: &str,
        interval: &str,
    ) -> Option<Vec<TimeSeriesPoint>> {
        match self.try_fetch_history(ticker, range, interval).await {
            Ok(points) => Some(points),
            Err(error) => {
                warn!(ticker, range, interval, %error, "BRAPI 히스토리 조회 실패");
                None
            }
        }
    }

    /// `results[0]`을 반환하는 공통 요청 처리.
    async fn fetch_first_result(
        &self,
        ticker: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<BrapiResult> {
        let url = format!("{}/quote/{}", self.base_url, encode_ticker(ticker));
        let mut params: Vec<(&str, &str)> = extra_params.to_vec();
        if let Some(token) = self.token.as_deref() {
            params.push(("token", token));
        }

        let response = self.client.get(&url).query(&params).send().await?;
        if !response.status().is_success() {
            return Err(DataError::UpstreamStatus {
                status: response.status().as_u16(),
                context: format!("brapi {}", ticker),
            });
        }

        let body: BrapiResponse = response
            .json()
            .await
            .map_err(|e| DataError::Parse(format!("BRAPI 응답 파싱 실패: {}", e)))?;

        body.results
            .into_iter()
            .next()
            .ok_or_else(|| DataError::MissingField(format!("results[0] ({})", ticker)))
    }
}

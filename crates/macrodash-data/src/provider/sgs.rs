//! BCB SGS 시계열 제공자.
//!
//! 브라질 중앙은행 SGS(Sistema Gerenciador de Séries Temporais) API에서
//! 매크로 시계열을 조회합니다.
//!
//! 응답 행은 `{"data": "dd/MM/yyyy", "valor": "13,25"}` 형태이며 값은
//! 쉼표를 소수점으로 사용합니다. 날짜나 값이 없는 행은 건너뛰고,
//! 결과는 날짜 오름차순으로 정렬됩니다.

use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{DataError, Result};
use crate::provider::parse_loose_f64;
use macrodash_core::domain::TimeSeriesPoint;

/// 서비스가 조회하는 SGS 시계열.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SgsSeries {
    /// SELIC 목표 금리 (% a.a.)
    Selic,
    /// IPCA 월간 변동률 (%)
    IpcaMonthly,
    /// USD/BRL PTAX 환율
    UsdBrl,
    /// 실업률 (%)
    Unemployment,
    /// GDP 지수
    Gdp,
}

impl SgsSeries {
    /// SGS 시리즈 코드.
    pub fn code(&self) -> u32 {
        match self {
            SgsSeries::Selic => 11,
            SgsSeries::IpcaMonthly => 433,
            SgsSeries::UsdBrl => 1,
            SgsSeries::Unemployment => 4391,
            SgsSeries::Gdp => 11752,
        }
    }

    /// 이 시계열의 캐시 키.
    pub fn cache_key(&self) -> &'static str {
        match self {
            SgsSeries::Selic => "sgs:selic",
            SgsSeries::IpcaMonthly => "sgs:ipca",
            SgsSeries::UsdBrl => "sgs:usdbrl",
            SgsSeries::Unemployment => "sgs:unemployment",
            SgsSeries::Gdp => "sgs:gdp",
        }
    }

    /// 기본 조회 기간 (일).
    ///
    /// 일 단위 시계열은 짧게, 월/분기 단위 시계열은 길게 조회합니다.
    pub fn lookback_days(&self) -> i64 {
        match self {
            SgsSeries::Selic | SgsSeries::UsdBrl => 90,
            SgsSeries::IpcaMonthly => 900,
            SgsSeries::Unemployment | SgsSeries::Gdp => 3650,
        }
    }
}

/// SGS API 응답 행.
#[derive(Debug, Deserialize)]
struct SgsRow {
    /// 관측 날짜 (dd/MM/yyyy)
    #[serde(default)]
    data: Option<String>,
    /// 관측값 (number 또는 쉼표 소수점 문자열)
    #[serde(default)]
    valor: Option<serde_json::Value>,
}

/// BCB SGS 시계열 제공자.
pub struct SgsProvider {
    client: reqwest::Client,
    base_url: String,
}

impl SgsProvider {
    /// 새 제공자를 생성합니다.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// 오늘을 끝으로 하는 기본 조회 기간으로 시계열을 조회합니다.
    pub async fn try_fetch_series(&self, series: SgsSeries) -> Result<Vec<TimeSeriesPoint>> {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(series.lookback_days());
        self.try_fetch_series_between(series, start, end).await
    }

    /// 기간을 지정하여 시계열을 조회합니다.
    pub async fn try_fetch_series_between(
        &self,
        series: SgsSeries,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeSeriesPoint>> {
        let url = format!(
            "{}/dados/serie/bcdata.sgs.{}/dados",
            self.base_url,
            series.code()
        );
        let params = [
            ("formato", "json".to_string()),
            ("dataInicial", start.format("%d/%m/%Y").to_string()),
            ("dataFinal", end.format("%d/%m/%Y").to_string()),
        ];

        debug!(code = series.code(), %start, %end, "SGS 시계열 조회");

        let response = self.client.get(&url).query(&params).send().await?;
        if !response.status().is_success() {
            return Err(DataError::UpstreamStatus {
                status: response.status().as_u16(),
                context: format!("sgs.{}", series.code()),
            });
        }

        let rows: Vec<SgsRow> = response
            .json()
            .await
            .map_err(|e| DataError::Parse(format!("SGS 응답 파싱 실패: {}", e)))?;

        let mut points: Vec<TimeSeriesPoint> = rows
            .iter()
            .filter_map(|row| {
                let date_str = row.data.as_deref()?;
                let date = NaiveDate::parse_from_str(date_str, "%d/%m/%Y").ok()?;
                let value = row.valor.as_ref().and_then(parse_loose_f64)?;
                Some(TimeSeriesPoint::new(date, value))
            })
            .collect();

        if points.is_empty() {
            return Err(DataError::EmptySeries(format!("sgs.{}", series.code())));
        }

        points.sort_by_key(|p| p.date);

        debug!(code = series.code(), count = points.len(), "SGS 시계열 수신");
        Ok(points)
    }

    /// 실패를 로그로 남기고 `Option`으로 강등한 조회.
    pub async fn fetch_series(&self, series: SgsSeries) -> Option<Vec<TimeSeriesPoint>> {
        match self.try_fetch_series(series).await {
            Ok(points) => Some(points),
            Err(error) => {
                warn!(
                    code = series.code(),
                    key = series.cache_key(),
                    %error,
                    "SGS 시계열 조회 실패"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_series_parses_and_sorts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/dados/serie/bcdata.sgs.11/dados")
            .match_query(Matcher::UrlEncoded("formato".into(), "json".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"data": "03/06/2024", "valor": "13,25"},
                    {"data": "01/06/2024", "valor": "13,00"},
                    {"data": "02/06/2024", "valor": "13,15"},
                    {"data": "04/06/2024", "valor": "n/d"},
                    {"valor": "9,99"}
                ]"#,
            )
            .create_async()
            .await;

        let provider = SgsProvider::new(reqwest::Client::new(), server.url());
        let points = provider
            .try_fetch_series_between(SgsSeries::Selic, date(2024, 6, 1), date(2024, 6, 4))
            .await
            .unwrap();

        mock.assert_async().await;
        // 잘못된 행 2개는 건너뛰고 날짜 오름차순으로 정렬
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, date(2024, 6, 1));
        assert_eq!(points[0].value, 13.00);
        assert_eq!(points[2].date, date(2024, 6, 3));
        assert_eq!(points[2].value, 13.25);
    }

    #[tokio::test]
    async fn test_fetch_series_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/dados/serie/bcdata.sgs.1/dados")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let provider = SgsProvider::new(reqwest::Client::new(), server.url());
        let result = provider
            .try_fetch_series_between(SgsSeries::UsdBrl, date(2024, 6, 1), date(2024, 6, 4))
            .await;

        assert!(matches!(
            result,
            Err(DataError::UpstreamStatus { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_series_all_rows_invalid() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/dados/serie/bcdata.sgs.433/dados")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"data": "01/06/2024", "valor": null}, {"valor": "1,0"}]"#)
            .create_async()
            .await;

        let provider = SgsProvider::new(reqwest::Client::new(), server.url());
        let result = provider
            .try_fetch_series_between(SgsSeries::IpcaMonthly, date(2024, 6, 1), date(2024, 6, 4))
            .await;

        assert!(matches!(result, Err(DataError::EmptySeries(_))));
    }

    #[tokio::test]
    async fn test_fetch_series_degrades_to_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/dados/serie/bcdata.sgs.11/dados")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let provider = SgsProvider::new(reqwest::Client::new(), server.url());
        assert!(provider.fetch_series(SgsSeries::Selic).await.is_none());
    }

    #[test]
    fn test_series_codes_and_keys() {
        assert_eq!(SgsSeries::Selic.code(), 11);
        assert_eq!(SgsSeries::IpcaMonthly.code(), 433);
        assert_eq!(SgsSeries::UsdBrl.code(), 1);
        assert_eq!(SgsSeries::Unemployment.code(), 4391);
        assert_eq!(SgsSeries::Gdp.code(), 11752);
        assert_eq!(SgsSeries::Selic.cache_key(), "sgs:selic");
        assert_eq!(SgsSeries::Gdp.cache_key(), "sgs:gdp");
    }
}

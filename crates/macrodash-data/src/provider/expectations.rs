//! BCB Olinda 시장 기대치 제공자.
//!
//! Olinda OData API의 `ExpectativasMercadoInflacao12Meses` 리소스에서
//! 향후 12개월 인플레이션 기대치(중위값)를 조회합니다.
//!
//! 최신 10개 행을 날짜 내림차순으로 받아, 평활화(Suavizada)된 행을
//! 우선 선택하고 없으면 가장 최신 행을 사용합니다.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{DataError, Result};
use crate::provider::parse_loose_f64;
use macrodash_core::domain::{iso_now, ExpectationPoint};

/// 기본 지표 이름.
pub const DEFAULT_INDICATOR: &str = "IPCA";

/// 12개월 인플레이션 기대치 캐시 키.
///
/// 선택 정책(평활화 우선)이 키에 포함되어 정책이 바뀌면 키도 바뀝니다.
pub fn expectations_cache_key(indicator: &str, prefer_smooth: bool) -> String {
    format!("expectations:{}:median:smooth={}", indicator, prefer_smooth)
}

/// Olinda OData 응답.
#[derive(Debug, Deserialize)]
struct OlindaResponse {
    #[serde(default)]
    value: Vec<serde_json::Value>,
}

/// BCB Olinda 시장 기대치 제공자.
pub struct ExpectationsProvider {
    client: reqwest::Client,
    base_url: String,
}

impl ExpectationsProvider {
    /// 새 제공자를 생성합니다.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// 12개월 인플레이션 기대치 중위값을 조회합니다.
    ///
    /// # 인자
    /// - `indicator`: Olinda 지표 이름 (예: "IPCA")
    /// - `prefer_smooth`: 평활화된 행 우선 선택 여부
    pub async fn try_fetch_median_12m(
        &self,
        indicator: &str,
        prefer_smooth: bool,
    ) -> Result<ExpectationPoint> {
        let url = format!(
            "{}/olinda/servico/Expectativas/versao/v1/odata/ExpectativasMercadoInflacao12Meses",
            self.base_url
        );
        let params = [
            ("$format", "json".to_string()),
            ("$top", "10".to_string()),
            ("$orderby", "Data desc".to_string()),
            (
                "$select",
                "Indicador,Data,Suavizada,Media,Mediana,Minimo,Maximo,numeroRespondentes"
                    .to_string(),
            ),
            ("$filter", format!("Indicador eq '{}'", indicator)),
        ];

        debug!(indicator, prefer_smooth, "Olinda 기대치 조회");

        let response = self.client.get(&url).query(&params).send().await?;
        if !response.status().is_success() {
            return Err(DataError::UpstreamStatus {
                status: response.status().as_u16(),
                context: format!("olinda {}", indicator),
            });
        }

        let body: OlindaResponse = response
            .json()
            .await
            .map_err(|e| DataError::Parse(format!("Olinda 응답 파싱 실패: {}", e)))?;

        if body.value.is_empty() {
            return Err(DataError::EmptySeries(format!("olinda {}", indicator)));
        }

        let chosen = if prefer_smooth {
            body.value
                .iter()
                .find(|row| is_smooth(row))
                .unwrap_or(&body.value[0])
        } else {
            &body.value[0]
        };

        let median = chosen
            .get("Mediana")
            .and_then(parse_loose_f64)
            .ok_or_else(|| DataError::MissingField(format!("Mediana ({})", indicator)))?;
        let last_update = row_last_update(chosen);

        debug!(indicator, median, "Olinda 기대치 수신");
        Ok(ExpectationPoint {
            value: median,
            last_update,
            raw: chosen.clone(),
        })
    }

    /// 실패를 로그로 남기고 `Option`으로 강등한 조회.
    pub async fn fetch_median_12m(
        &self,
        indicator: &str,
        prefer_smooth: bool,
    ) -> Option<ExpectationPoint> {
        match self.try_fetch_median_12m(indicator, prefer_smooth).await {
            Ok(point) => Some(point),
            Err(error) => {
                warn!(indicator, %error, "Olinda 기대치 조회 실패");
                None
            }
        }
    }
}

/// 행이 평활화(Suavizada)되었는지 판정합니다.
///
/// 불리언 외에 `"S"`, `"sim"` 같은 문자열 표기도 허용합니다.
fn is_smooth(row: &serde_json::Value) -> bool {
    match row.get("Suavizada") {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => {
            matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "s" | "sim" | "yes")
        }
        _ => false,
    }
}

/// 행의 `Data` 필드를 ISO-8601 UTC 타임스탬프로 정규화합니다.
///
/// 시각이 포함된 값은 `Z`만 보충하고, 날짜만 있는 값에는 자정을
/// 붙입니다. 필드가 없으면 현재 시각을 사용합니다.
fn row_last_update(row: &serde_json::Value) -> String {
    match row.get("Data").and_then(|v| v.as_str()) {
        Some(raw) => {
            let s = raw.trim();
            if s.is_empty() {
                iso_now()
            } else if s.contains('T') {
                if s.ends_with('Z') {
                    s.to_string()
                } else {
                    format!("{}Z", s)
                }
            } else {
                format!("{}T00:00:00Z", s)
            }
        }
        None => iso_now(),
    }
}

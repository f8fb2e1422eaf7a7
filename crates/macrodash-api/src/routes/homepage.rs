//! 홈페이지 endpoint.
//!
//! 홈페이지 한 화면에 필요한 매크로 지표 전체를 단일 응답으로
//! 제공합니다.
//!
//! # 엔드포인트
//!
//! - `GET /api/homepage/v1` - 홈페이지 페이로드 조회

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::services::homepage::{build_homepage_payload, HomepagePayload};
use crate::state::AppState;

/// 홈페이지 페이로드 조회.
///
/// GET /api/homepage/v1
///
/// 항상 200을 반환합니다. 업스트림 장애는 null 값과 `meta.stale`로
/// 표현되며, 캐시된 최종값이 있으면 그것이 제공됩니다.
pub async fn get_homepage(State(state): State<Arc<AppState>>) -> Json<HomepagePayload> {
    Json(build_homepage_payload(&state).await)
}

/// 홈페이지 라우터 생성.
pub fn homepage_router() -> Router<Arc<AppState>> {
    Router::new().route("/v1", get(get_homepage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use mockito::Matcher;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::create_api_router;
    use macrodash_core::config::AppConfig;

    /// mock 서버를 모든 제공자의 base URL로 쓰는 앱 구성.
    fn app_for(server: &mockito::Server) -> Router {
        let mut config = AppConfig::default();
        config.providers.sgs_base_url = server.url();
        config.providers.brapi_base_url = server.url();
        config.providers.olinda_base_url = server.url();

        let state = Arc::new(AppState::new(&config).unwrap());
        create_api_router().with_state(state)
    }

    async fn request_homepage(app: Router) -> HomepagePayload {
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/homepage/v1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn sgs_body(rows: &[(&str, &str)]) -> String {
        let rows: Vec<serde_json::Value> = rows
            .iter()
            .map(|(date, value)| json!({ "data": date, "valor": value }))
            .collect();
        serde_json::Value::Array(rows).to_string()
    }

    #[tokio::test]
    async fn test_homepage_end_to_end_with_mock_upstreams() {
        let mut server = mockito::Server::new_async().await;

        // SGS 5종
        let selic_mock = server
            .mock("GET", "/dados/serie/bcdata.sgs.11/dados")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(sgs_body(&[("01/06/2024", "13,00"), ("02/06/2024", "13,25")]))
            .expect(1)
            .create_async()
            .await;

        let ipca_rows: Vec<serde_json::Value> = (1..=12)
            .map(|month| {
                let value = match month {
                    11 => 0.4,
                    12 => 0.5,
                    _ => 0.3,
                };
                json!({ "data": format!("01/{:02}/2023", month), "valor": value })
            })
            .collect();
        let _ipca_mock = server
            .mock("GET", "/dados/serie/bcdata.sgs.433/dados")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(serde_json::Value::Array(ipca_rows).to_string())
            .create_async()
            .await;

        let _usd_mock = server
            .mock("GET", "/dados/serie/bcdata.sgs.1/dados")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(sgs_body(&[("01/06/2024", "5,00"), ("02/06/2024", "5,10")]))
            .create_async()
            .await;

        let _unemployment_mock = server
            .mock("GET", "/dados/serie/bcdata.sgs.4391/dados")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(sgs_body(&[("01/01/2024", "7,9"), ("01/04/2024", "7,8")]))
            .create_async()
            .await;

        let _gdp_mock = server
            .mock("GET", "/dados/serie/bcdata.sgs.11752/dados")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(sgs_body(&[("01/01/2024", "150,0"), ("01/04/2024", "151,0")]))
            .create_async()
            .await;

        // IBOV 시세 (query 없는 요청). 히스토리 mock이 나중에 생성되어
        // 우선 매칭되므로 range 파라미터가 없으면 여기로 떨어진다
        let quote_mock = server
            .mock("GET", "/quote/%5EBVSP")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "results": [{
                        "regularMarketPrice": 120000.0,
                        "regularMarketChange": 1000.0,
                        "regularMarketChangePercent": 0.84,
                        "regularMarketTime": 1717250400
                    }]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let history_rows: Vec<serde_json::Value> = (0..21i64)
            .map(|i| json!({ "date": 1_717_200_000 + i * 86_400, "close": 100.0 + i as f64 }))
            .collect();
        let history_body = json!({ "results": [{ "historicalDataPrice": history_rows }] });

        let _ibov_hist_mock = server
            .mock("GET", "/quote/%5EBVSP")
            .match_query(Matcher::UrlEncoded("range".into(), "1mo".into()))
            .with_status(200)
            .with_body(history_body.to_string())
            .create_async()
            .await;

        let _usd_hist_mock = server
            .mock("GET", "/quote/USDBRL")
            .match_query(Matcher::UrlEncoded("range".into(), "1mo".into()))
            .with_status(200)
            .with_body(history_body.to_string())
            .create_async()
            .await;

        let _olinda_mock = server
            .mock(
                "GET",
                "/olinda/servico/Expectativas/versao/v1/odata/ExpectativasMercadoInflacao12Meses",
            )
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "value": [{
                        "Indicador": "IPCA",
                        "Data": "2024-06-03",
                        "Mediana": 4.12,
                        "Suavizada": true
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let app = app_for(&server);

        // 첫 요청: 전부 업스트림에서 생산
        let payload = request_homepage(app.clone()).await;

        assert_eq!(payload.top_cards[0].value, Some(120_000.0));
        assert_eq!(payload.top_cards[0].last_update, "2024-06-01T14:00:00Z");
        assert_eq!(payload.top_cards[2].value, Some(13.25));
        assert_eq!(payload.top_cards[2].change_1d, Some(0.25));
        assert_eq!(payload.what_changed_today.len(), 6);
        assert_eq!(
            payload.signals.inflation_expectations_12m.value,
            Some(4.12)
        );
        assert!(payload.signals.ibov_vol_20d_annualized.value.is_some());
        assert!(!payload.meta.stale);
        assert!(!payload.meta.sources.sgs.selic.hit);

        // 두 번째 요청: 캐시 히트, 업스트림 재호출 없음
        let payload = request_homepage(app).await;
        assert!(payload.meta.sources.sgs.selic.hit);
        assert!(payload.meta.sources.brapi.ibov_quote.hit);
        assert_eq!(payload.top_cards[2].value, Some(13.25));

        selic_mock.assert_async().await;
        quote_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_homepage_degrades_to_nulls_when_upstreams_fail() {
        // mock이 하나도 없으므로 모든 업스트림 요청이 실패한다
        let server = mockito::Server::new_async().await;
        let app = app_for(&server);

        let payload = request_homepage(app).await;

        assert_eq!(payload.top_cards.len(), 4);
        assert!(payload.top_cards.iter().all(|card| card.value.is_none()));
        assert!(payload.what_changed_today.is_empty());
        assert_eq!(payload.signals.real_rate_approx.value, None);
        assert!(payload.meta.stale);
        assert!(payload.meta.sources.sgs.selic.last_known_at.is_none());
    }
}

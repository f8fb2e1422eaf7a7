//! 업스트림 데이터 제공자.
//!
//! - SGS: 브라질 중앙은행 시계열 (SELIC, IPCA, USD/BRL, 실업률, GDP)
//! - BRAPI: 시세 및 가격 히스토리 (IBOV, USD/BRL)
//! - Expectations: BCB Olinda 시장 기대치 (12개월 인플레이션)
//!
//! 각 제공자는 typed error를 반환하는 `try_fetch_*`와, 실패를 로그로
//! 남기고 `Option`으로 강등하는 `fetch_*` 두 계층을 노출합니다.

pub mod brapi;
pub mod expectations;
pub mod sgs;

pub use brapi::BrapiProvider;
pub use expectations::ExpectationsProvider;
pub use sgs::{SgsProvider, SgsSeries};

use std::time::Duration;

use crate::error::{DataError, Result};
use macrodash_core::config::ProviderConfig;

/// 관대한 숫자 파싱.
///
/// 업스트림들은 숫자를 number 또는 문자열로 보내며, 문자열은 쉼표를
/// 소수점으로 쓰기도 합니다 (예: SGS의 `"4,87"`).
pub(crate) fn parse_loose_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

/// 홈페이지 조립에 필요한 제공자 묶음.
///
/// 하나의 `reqwest::Client`를 공유하며 설정의 기본 URL로 구성됩니다.
pub struct ProviderSet {
    /// BCB SGS 시계열 제공자
    pub sgs: SgsProvider,
    /// BRAPI 시세/히스토리 제공자
    pub brapi: BrapiProvider,
    /// BCB Olinda 기대치 제공자
    pub expectations: ExpectationsProvider,
}

impl ProviderSet {
    /// 설정에서 제공자 묶음을 구성합니다.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            sgs: SgsProvider::new(client.clone(), &config.sgs_base_url),
            brapi: BrapiProvider::new(
                client.clone(),
                &config.brapi_base_url,
                config.brapi_token().map(str::to_string),
            ),
            expectations: ExpectationsProvider::new(client, &config.olinda_base_url),
        })
    }
}

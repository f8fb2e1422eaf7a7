//! 파생 지표 모듈.
//!
//! 이 모듈은 홈페이지 페이로드에 들어가는 파생 지표를 제공합니다.
//! 모든 지표 함수는 계산 불가능한 입력에 대해 `None`을 반환하며
//! 패닉하지 않습니다.
//!
//! # 지원 지표
//!
//! ## 변동성 지표 (Volatility Metrics)
//! - **연율화 변동성**: 로그 수익률 모표준편차 × √252 × 100
//!
//! ## 인플레이션 지표 (Inflation Metrics)
//! - **12개월 누적 인플레이션**: 월간 변동률 복리 누적
//! - **근사 실질 금리**: 명목 금리 - 12개월 인플레이션
//!
//! ## 변화율 (Change Metrics)
//! - **퍼센트 변화율**: (new / old - 1) × 100
//!
//! # 사용 예시
//!
//! ```ignore
//! use macrodash_analytics::metrics::{AnnualizedVolParams, MetricsEngine};
//!
//! let engine = MetricsEngine::new();
//!
//! // IBOV 20일 연율화 변동성
//! let vol = engine.annualized_volatility(&closes, AnnualizedVolParams::default());
//!
//! // 전일 대비 변화율
//! let delta = engine.pct_change(last, prev);
//! ```

pub mod change;
pub mod inflation;
pub mod volatility;

pub use change::ChangeMetrics;
pub use inflation::{InflationMetrics, MONTHS_12M};
pub use volatility::{AnnualizedVolParams, VolatilityMetrics};

/// 통합 지표 엔진.
///
/// 홈페이지 조립에 필요한 모든 파생 지표 계산을 위한
/// 통합 인터페이스를 제공합니다.
#[derive(Debug, Default)]
pub struct MetricsEngine {
    volatility: VolatilityMetrics,
    inflation: InflationMetrics,
    change: ChangeMetrics,
}

impl MetricsEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 변동성 지표 ====================

    /// 연율화 변동성 계산 (%).
    ///
    /// # 인자
    /// * `closes` - 종가 시계열 (오름차순)
    /// * `params` - 윈도우 크기와 연간 거래일 수
    ///
    /// # 반환
    /// 종가 부족, 0 이하 종가 등으로 계산 불가 시 `None`
    pub fn annualized_volatility(
        &self,
        closes: &[f64],
        params: AnnualizedVolParams,
    ) -> Option<f64> {
        self.volatility.annualized_from_closes(closes, params)
    }

    // ==================== 인플레이션 지표 ====================

    /// 최근 12개월 누적 인플레이션 계산 (%).
    ///
    /// # 인자
    /// * `monthly_pcts` - 월간 변동률 시계열 (% 단위, 오름차순)
    ///
    /// # 반환
    /// 관측치가 12개 미만이면 `None`
    pub fn ipca_12m_compound(&self, monthly_pcts: &[f64]) -> Option<f64> {
        self.inflation.ipca_12m_compound(monthly_pcts)
    }

    /// 근사 실질 금리 계산 (p.p.).
    ///
    /// # 반환
    /// 두 입력 중 하나라도 `None`이면 `None`
    pub fn real_rate_approx(&self, selic: Option<f64>, ipca_12m: Option<f64>) -> Option<f64> {
        self.inflation.real_rate_approx(selic, ipca_12m)
    }

    // ==================== 변화율 ====================

    /// 퍼센트 변화율 계산.
    ///
    /// # 반환
    /// `old`가 0이면 `None`
    pub fn pct_change(&self, new: f64, old: f64) -> Option<f64> {
        self.change.pct_change(new, old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_delegates_to_calculators() {
        let engine = MetricsEngine::new();

        let closes: Vec<f64> = (0..21).map(|i| 100.0 + i as f64).collect();
        assert!(engine
            .annualized_volatility(&closes, AnnualizedVolParams::default())
            .is_some());

        assert_eq!(engine.ipca_12m_compound(&vec![0.0; 12]), Some(0.0));
        assert_eq!(engine.real_rate_approx(Some(10.0), Some(4.0)), Some(6.0));
        assert_eq!(engine.pct_change(110.0, 0.0), None);
    }
}

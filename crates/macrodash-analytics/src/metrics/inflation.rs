//! 인플레이션 지표 (Inflation Metrics).
//!
//! 월간 물가 변동률 시계열로부터 파생 지표를 계산합니다.
//! - 12개월 누적 인플레이션 (복리)
//! - 근사 실질 금리 (명목 금리 - 12개월 인플레이션)

/// 12개월 누적에 필요한 월간 관측치 수.
pub const MONTHS_12M: usize = 12;

/// 인플레이션 지표 계산기.
#[derive(Debug, Default)]
pub struct InflationMetrics;

impl InflationMetrics {
    /// 새로운 인플레이션 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 최근 12개월 누적 인플레이션 계산 (%).
    ///
    /// 월간 변동률(% 단위)을 복리로 누적합니다:
    /// (∏(1 + vᵢ/100) - 1) × 100
    ///
    /// # 인자
    /// * `monthly_pcts` - 월간 변동률 시계열 (% 단위, 오름차순)
    ///
    /// # 반환
    /// 관측치가 12개 미만이면 `None`
    pub fn ipca_12m_compound(&self, monthly_pcts: &[f64]) -> Option<f64> {
        if monthly_pcts.len() < MONTHS_12M {
            return None;
        }

        let tail = &monthly_pcts[monthly_pcts.len() - MONTHS_12M..];
        let factor: f64 = tail.iter().map(|v| 1.0 + v / 100.0).product();

        Some((factor - 1.0) * 100.0)
    }

    /// 근사 실질 금리 계산 (p.p.).
    ///
    /// 명목 금리에서 12개월 인플레이션을 단순 차감합니다.
    /// 피셔 방정식의 정확한 형태가 아닌 근사치입니다.
    ///
    /// # 반환
    /// 두 입력 중 하나라도 `None`이면 `None`
    pub fn real_rate_approx(&self, selic: Option<f64>, ipca_12m: Option<f64>) -> Option<f64> {
        match (selic, ipca_12m) {
            (Some(rate), Some(inflation)) => Some(rate - inflation),
            _ => None,
        }
    }
}

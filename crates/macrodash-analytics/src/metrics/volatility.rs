//! 변동성 지표 (Volatility Metrics).
//!
//! 종가 시계열로부터 연율화 변동성을 계산합니다.
//! - 로그 수익률 기반 표준편차 (모표준편차)
//! - 연율화 계수: √(연간 거래일 수)

use serde::{Deserialize, Serialize};

/// 연율화 변동성 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnnualizedVolParams {
    /// 수익률 윈도우 크기 (기본: 20). 종가는 window + 1개 필요.
    pub window: usize,
    /// 연간 거래일 수 (기본: 252).
    pub trading_days: u32,
}

impl Default for AnnualizedVolParams {
    fn default() -> Self {
        Self {
            window: 20,
            trading_days: 252,
        }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityMetrics;

impl VolatilityMetrics {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 연율화 변동성 계산 (%).
    ///
    /// 마지막 `window + 1`개 종가에서 로그 수익률을 구하고,
    /// 모표준편차 × √trading_days × 100 으로 연율화합니다.
    ///
    /// # 인자
    /// * `closes` - 종가 시계열 (오름차순)
    /// * `params` - 윈도우 크기와 연간 거래일 수
    ///
    /// # 반환
    /// 계산 불가 시 `None`:
    /// - 종가가 `window + 1`개 미만
    /// - 윈도우 내에 0 이하의 종가 존재
    /// - 수익률이 2개 미만
    pub fn annualized_from_closes(
        &self,
        closes: &[f64],
        params: AnnualizedVolParams,
    ) -> Option<f64> {
        let needed = params.window + 1;
        if closes.len() < needed {
            return None;
        }

        let tail = &closes[closes.len() - needed..];

        let mut returns = Vec::with_capacity(params.window);
        for pair in tail.windows(2) {
            if pair[0] <= 0.0 || pair[1] <= 0.0 {
                return None;
            }
            returns.push((pair[1] / pair[0]).ln());
        }

        if returns.len() < 2 {
            return None;
        }

        // 모표준편차 (N으로 나눔)
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns
            .iter()
            .map(|r| {
                let diff = r - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;

        Some(variance.sqrt() * f64::from(params.trading_days).sqrt() * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising_closes(len: usize) -> Vec<f64> {
        (0..len).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_annualized_vol_rising_prices() {
        let calc = VolatilityMetrics::new();
        let closes = rising_closes(21);

        let vol = calc.annualized_from_closes(&closes, AnnualizedVolParams::default());

        let vol = vol.unwrap();
        assert!(vol > 0.0, "상승 시계열의 변동성은 양수여야 함: {vol}");
        assert!(vol < 100.0, "완만한 상승의 연율화 변동성이 과도함: {vol}");
    }

    #[test]
    fn test_annualized_vol_constant_prices_is_zero() {
        let calc = VolatilityMetrics::new();
        let closes = vec![100.0; 30];

        let vol = calc.annualized_from_closes(&closes, AnnualizedVolParams::default());

        assert_eq!(vol, Some(0.0));
    }

    #[test]
    fn test_annualized_vol_insufficient_closes() {
        let calc = VolatilityMetrics::new();
        // window=20이면 21개 필요
        let closes = rising_closes(20);

        let vol = calc.annualized_from_closes(&closes, AnnualizedVolParams::default());

        assert_eq!(vol, None);
    }

    #[test]
    fn test_annualized_vol_nonpositive_close_in_window() {
        let calc = VolatilityMetrics::new();
        let mut closes = rising_closes(21);
        closes[10] = 0.0;

        assert_eq!(
            calc.annualized_from_closes(&closes, AnnualizedVolParams::default()),
            None
        );

        closes[10] = -5.0;
        assert_eq!(
            calc.annualized_from_closes(&closes, AnnualizedVolParams::default()),
            None
        );
    }

    #[test]
    fn test_annualized_vol_ignores_prices_outside_window() {
        let calc = VolatilityMetrics::new();
        // 윈도우 밖(앞부분)의 0은 무시된다
        let mut closes = vec![0.0, -1.0];
        closes.extend(rising_closes(21));

        let vol = calc.annualized_from_closes(&closes, AnnualizedVolParams::default());

        assert!(vol.is_some());
    }

    #[test]
    fn test_annualized_vol_small_window_needs_two_returns() {
        let calc = VolatilityMetrics::new();
        let params = AnnualizedVolParams {
            window: 1,
            trading_days: 252,
        };
        // 종가 2개 → 수익률 1개 → 계산 불가
        let closes = vec![100.0, 101.0];

        assert_eq!(calc.annualized_from_closes(&closes, params), None);
    }

    #[test]
    fn test_annualized_vol_known_value() {
        let calc = VolatilityMetrics::new();
        // 100과 101이 교대로 나오는 시계열: 로그 수익률은 ±ln(1.01)
        let mut closes = Vec::with_capacity(21);
        for i in 0..21 {
            closes.push(if i % 2 == 0 { 100.0 } else { 101.0 });
        }

        let vol = calc
            .annualized_from_closes(&closes, AnnualizedVolParams::default())
            .unwrap();

        // 모표준편차 = |ln(1.01)| (평균이 0에 가깝고 절댓값이 동일)
        let r = 1.01_f64.ln();
        let expected = r * 252.0_f64.sqrt() * 100.0;
        assert!(
            (vol - expected).abs() < 1e-6,
            "vol={vol}, expected={expected}"
        );
    }
}

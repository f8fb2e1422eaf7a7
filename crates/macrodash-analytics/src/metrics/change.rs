//! 변화율 지표 (Change Metrics).

/// 변화율 계산기.
#[derive(Debug, Default)]
pub struct ChangeMetrics;

impl ChangeMetrics {
    /// 새로운 변화율 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 퍼센트 변화율 계산.
    ///
    /// (new / old - 1) × 100
    ///
    /// # 반환
    /// `old`가 0이면 `None` (0으로 나누기 방지)
    pub fn pct_change(&self, new: f64, old: f64) -> Option<f64> {
        if old == 0.0 {
            return None;
        }
        Some((new / old - 1.0) * 100.0)
    }
}

//! 파생 지표 계산 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 연율화 변동성 계산 (로그 수익률 기반)
//! - 12개월 누적 인플레이션 (복리)
//! - 근사 실질 금리
//! - 퍼센트 변화율
//!
//! 모든 계산은 `f64` 기반이며, 계산 불가능한 입력은 `None`으로
//! 표현됩니다 (패닉 없음).
//!
//! # Re-exports
//!
//! - [`metrics`]: 파생 지표 계산 (MetricsEngine, VolatilityMetrics 등)

pub mod metrics;

// Metrics 모듈 re-exports
pub use metrics::{
    AnnualizedVolParams, ChangeMetrics, InflationMetrics, MetricsEngine, VolatilityMetrics,
    MONTHS_12M,
};

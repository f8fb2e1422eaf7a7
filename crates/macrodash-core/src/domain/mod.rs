//! 매크로 지표 도메인 모델.

mod indicator;

pub use indicator::*;

//! # Macrodash Core
//!
//! 브라질 매크로 대시보드 백엔드의 핵심 타입을 제공합니다.
//!
//! 이 크레이트는 서비스 전반에서 사용되는 기본 구성 요소를 제공합니다:
//! - 시계열/시세/기대치 도메인 타입
//! - 설정 관리 (환경 변수 + TOML)
//! - 로깅 인프라
//! - 공통 에러 타입

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;

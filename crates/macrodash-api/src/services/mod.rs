//! 서비스 모듈.
//!
//! 라우트 핸들러가 호출하는 조립/계산 로직을 제공합니다.

pub mod homepage;

pub use homepage::{build_homepage_payload, HomepagePayload};

//! 매크로 대시보드 서비스의 공통 에러 타입.
//!
//! 이 모듈은 서비스 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 서비스 에러.
#[derive(Debug, Error)]
pub enum MacrodashError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 외부 데이터 제공자 에러
    #[error("데이터 제공자 에러: {0}")]
    Provider(String),

    /// 캐시 에러
    #[error("캐시 에러: {0}")]
    Cache(String),

    /// 지표 계산 에러
    #[error("지표 계산 에러: {0}")]
    Metrics(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 서비스 작업을 위한 Result 타입.
pub type MacrodashResult<T> = Result<T, MacrodashError>;

impl MacrodashError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MacrodashError::Network(_))
    }

    /// 치명적인 에러인지 확인합니다.
    pub fn is_critical(&self) -> bool {
        matches!(self, MacrodashError::Config(_))
    }
}

impl From<serde_json::Error> for MacrodashError {
    fn from(err: serde_json::Error) -> Self {
        MacrodashError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for MacrodashError {
    fn from(err: config::ConfigError) -> Self {
        MacrodashError::Config(err.to_string())
    }
}

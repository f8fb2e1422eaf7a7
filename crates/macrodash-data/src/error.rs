//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP 요청 오류 (연결, 타임아웃)
    #[error("HTTP error: {0}")]
    Http(String),

    /// 업스트림이 비정상 상태 코드를 반환함
    #[error("Upstream returned status {status}: {context}")]
    UpstreamStatus {
        /// HTTP 상태 코드
        status: u16,
        /// 요청 컨텍스트 (제공자/키)
        context: String,
    },

    /// 응답 본문 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 필수 필드 누락
    #[error("Missing field: {0}")]
    MissingField(String),

    /// 필터링 후 남은 데이터가 없음
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<DataError> for macrodash_core::MacrodashError {
    fn from(err: DataError) -> Self {
        use macrodash_core::MacrodashError;

        match err {
            DataError::Http(msg) => MacrodashError::Network(msg),
            DataError::SerializationError(msg) => MacrodashError::Serialization(msg),
            DataError::ConfigError(msg) => MacrodashError::Config(msg),
            other => MacrodashError::Provider(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;
    use macrodash_core::MacrodashError;

    #[test]
    fn test_into_core_error_preserves_class() {
        let err: MacrodashError = DataError::Http("connect timeout".to_string()).into();
        assert!(err.is_retryable());

        let err: MacrodashError = DataError::ConfigError("bad timeout".to_string()).into();
        assert!(err.is_critical());

        let err: MacrodashError = DataError::UpstreamStatus {
            status: 502,
            context: "sgs series 11".to_string(),
        }
        .into();
        assert!(err.to_string().contains("502"));
    }
}

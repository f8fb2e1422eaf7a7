//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 외부 데이터 제공자 설정
    pub providers: ProviderConfig,
    /// 캐시 TTL 설정
    pub ttl: TtlConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            providers: ProviderConfig::default(),
            ttl: TtlConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// CORS 허용 오리진 (쉼표 구분, `*` = 전체 허용)
    pub allowed_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origins: "*".to_string(),
        }
    }
}

/// 외부 데이터 제공자 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// BCB SGS 시계열 API 기본 URL
    pub sgs_base_url: String,
    /// BRAPI 시세 API 기본 URL
    pub brapi_base_url: String,
    /// BCB Olinda OData API 기본 URL
    pub olinda_base_url: String,
    /// BRAPI API 토큰 (빈 문자열 = 토큰 없음)
    #[serde(default)]
    pub brapi_token: String,
    /// 업스트림 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            sgs_base_url: "https://api.bcb.gov.br".to_string(),
            brapi_base_url: "https://brapi.dev/api".to_string(),
            olinda_base_url: "https://olinda.bcb.gov.br".to_string(),
            brapi_token: String::new(),
            request_timeout_secs: 5,
        }
    }
}

impl ProviderConfig {
    /// 공백을 제거한 BRAPI 토큰을 반환합니다. 빈 토큰은 `None`.
    pub fn brapi_token(&self) -> Option<&str> {
        let token = self.brapi_token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }
}

/// 캐시 TTL 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TtlConfig {
    /// 실시간 시세 캐시 TTL (초)
    pub quote_secs: u64,
    /// 가격 히스토리 캐시 TTL (초)
    pub history_secs: u64,
    /// 일 단위 SGS 시계열 캐시 TTL (초)
    pub sgs_daily_secs: u64,
    /// 저빈도 SGS 시계열(실업률, GDP) 캐시 TTL (초)
    pub sgs_slow_secs: u64,
    /// 시장 기대치 캐시 TTL (초)
    pub expectations_secs: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            quote_secs: 60,
            history_secs: 21_600,
            sgs_daily_secs: 21_600,
            sgs_slow_secs: 86_400,
            expectations_secs: 86_400,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값 위에 환경 변수만 적용됩니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.allowed_origins", "*")?
            .set_default("providers.sgs_base_url", "https://api.bcb.gov.br")?
            .set_default("providers.brapi_base_url", "https://brapi.dev/api")?
            .set_default("providers.olinda_base_url", "https://olinda.bcb.gov.br")?
            .set_default("providers.brapi_token", "")?
            .set_default("providers.request_timeout_secs", 5)?
            .set_default("ttl.quote_secs", 60)?
            .set_default("ttl.history_secs", 21_600)?
            .set_default("ttl.sgs_daily_secs", 21_600)?
            .set_default("ttl.sgs_slow_secs", 86_400)?
            .set_default("ttl.expectations_secs", 86_400)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("MACRODASH")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}

//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 모든 필드는 기본값을 가지므로 설정 파일 없이도 기동할 수 있으며,
//! `USERHUB__` 접두사의 환경 변수로 개별 값을 오버라이드합니다.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;

/// 개발 환경용 기본 서명 비밀 키.
///
/// 운영 환경에서는 반드시 `USERHUB__AUTH__SECRET`으로 교체해야 합니다.
pub const DEV_SECRET: &str = "dev-secret-key-change-in-production";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Rate limit 설정
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    #[serde(default = "default_host")]
    pub host: String,
    /// 리스닝할 포트
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소 반환.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
///
/// 연결 문자열 자체는 `DATABASE_URL` 환경 변수로 전달됩니다.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 최대 연결 수
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}
fn default_acquire_timeout() -> u64 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

/// 인증 설정.
///
/// 토큰 서명 비밀 키, 토큰 수명, 비밀번호 해싱 파라미터를 포함합니다.
/// 비밀 키는 [`SecretString`]으로 보관되어 로그나 Debug 출력에 노출되지 않습니다.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// 토큰 서명 비밀 키
    #[serde(default = "default_secret")]
    pub secret: SecretString,
    /// Access Token 수명 (초)
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// 비밀번호 해싱 파라미터
    #[serde(default)]
    pub hashing: HashingConfig,
}

fn default_secret() -> SecretString {
    SecretString::from(DEV_SECRET)
}
fn default_token_ttl() -> u64 {
    3600
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            token_ttl_secs: default_token_ttl(),
            hashing: HashingConfig::default(),
        }
    }
}

impl AuthConfig {
    /// 토큰 수명을 [`chrono::Duration`]으로 반환.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_ttl_secs as i64)
    }

    /// 기본 개발용 비밀 키를 그대로 쓰고 있는지 확인.
    pub fn uses_dev_secret(&self) -> bool {
        use secrecy::ExposeSecret;
        self.secret.expose_secret() == DEV_SECRET
    }
}

/// Argon2id 해싱 파라미터.
///
/// 기본값은 argon2 크레이트의 권장 파라미터와 동일합니다
/// (m=19456 KiB, t=2, p=1).
#[derive(Debug, Clone, Deserialize)]
pub struct HashingConfig {
    /// 메모리 비용 (KiB)
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// 반복 횟수
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// 병렬도
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    19_456
}
fn default_iterations() -> u32 {
    2
}
fn default_parallelism() -> u32 {
    1
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Rate limit 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Rate limiting 활성화 여부
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    /// 분당 최대 요청 수
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

fn default_rate_limit_enabled() -> bool {
    true
}
fn default_requests_per_minute() -> u32 {
    600
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값에서 시작하고, `USERHUB__` 접두사의
    /// 환경 변수가 마지막에 적용됩니다
    /// (예: `USERHUB__SERVER__PORT=8080`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("USERHUB")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert!(config.auth.uses_dev_secret());
        assert_eq!(config.auth.hashing.memory_kib, 19_456);
        assert!(config.rate_limit.enabled);
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(server.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_secret_not_in_debug_output() {
        let config = AuthConfig::default();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains(DEV_SECRET));
    }

    #[test]
    fn test_token_ttl_conversion() {
        let config = AuthConfig {
            token_ttl_secs: 120,
            ..Default::default()
        };
        assert_eq!(config.token_ttl(), chrono::Duration::seconds(120));
    }

    #[test]
    fn test_partial_section_uses_field_defaults() {
        // auth 섹션에 일부 필드만 있어도 나머지는 기본값으로 채워진다
        let config: AuthConfig = serde_json::from_str(r#"{ "token_ttl_secs": 60 }"#).unwrap();
        assert_eq!(config.token_ttl_secs, 60);
        assert!(config.uses_dev_secret());
        assert_eq!(config.hashing.iterations, 2);
    }
}

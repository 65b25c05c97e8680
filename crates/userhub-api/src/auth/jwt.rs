//! JWT 토큰 처리.
//!
//! 서명된 만료 토큰의 발급 및 검증. 토큰은 서버 측에 저장되지 않으며,
//! 유효성은 검증 시점의 서명·만료 확인만으로 결정됩니다 (무상태 세션).
//! 즉시 폐기(blacklist)가 없는 것은 수평 확장을 위한 의도된 설계입니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use userhub_core::config::AuthConfig;

/// JWT 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 이름
    pub sub: String,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
    /// JWT ID - 토큰 고유 식별자
    pub jti: String,
}

/// JWT 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
}

/// 토큰 코덱.
///
/// 서명 비밀 키와 알고리즘(HS256 고정)을 생성 시점에 주입받는
/// 불변 객체입니다. 전역 상태 없이 [`crate::state::AppState`]를 통해
/// 공유됩니다.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: Header,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenCodec {
    /// 비밀 키와 기본 토큰 수명으로 코덱 생성.
    pub fn new(secret: &SecretString, default_ttl: Duration) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        // 만료 판정에 유예 시간을 두지 않는다
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret_bytes),
            decoding: DecodingKey::from_secret(secret_bytes),
            header: Header::new(Algorithm::HS256),
            validation,
            default_ttl,
        }
    }

    /// 인증 설정에서 코덱 생성.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.secret, config.token_ttl())
    }

    /// 토큰 발급.
    ///
    /// `{sub, iat, exp, jti}` 클레임을 담아 서명합니다.
    /// `ttl`이 `None`이면 설정된 기본 수명을 사용합니다.
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, JwtError> {
        let now = Utc::now();
        let ttl = ttl.unwrap_or(self.default_ttl);

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&self.header, &claims, &self.encoding).map_err(JwtError::Encoding)
    }

    /// 토큰 검증.
    ///
    /// 서명, 알고리즘, 만료, `sub` 클레임 존재를 한 번에 확인하고
    /// subject 문자열만 반환합니다. 호출자는 그 외 클레임을 신뢰하지
    /// 않습니다.
    pub fn verify(&self, token: &str) -> Result<String, JwtError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::InvalidToken,
            })
    }

    /// 기본 토큰 수명 (초).
    pub fn default_ttl_secs(&self) -> i64 {
        self.default_ttl.num_seconds()
    }
}

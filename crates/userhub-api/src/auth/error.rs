//! 인증/인가 에러.
//!
//! 요청 경로에서 발생하는 모든 접근 거부를 하나의 타입으로 표현합니다.
//! 어떤 내부 상태에서 거부되었든 호출자는 동일한 봉투 형태의
//! 접근 거부 응답을 받으며, 코드 필드만 운영 진단용으로 구분됩니다.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use userhub_core::StoreError;

use crate::error::ApiErrorResponse;
use crate::metrics::record_auth_denial;

use super::jwt::JwtError;

/// 인증/인가 거부.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// Authorization 헤더 없음
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    /// Bearer 형식이 아닌 Authorization 헤더
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    /// 서명 불일치, 깨진 인코딩, 알고리즘 불일치, 클레임 누락
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    /// 서명은 유효하나 만료됨
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    /// subject를 해석할 수 없음 (존재하지 않거나 잠긴 계정 - 구분 없음)
    #[error("인증 정보를 확인할 수 없습니다")]
    UnknownSubject,
    /// 인증은 되었으나 필요한 역할이 없음
    #[error("접근 권한이 없습니다")]
    Forbidden,
    /// 사용자/역할 저장소의 일시적 장애
    #[error("일시적으로 요청을 처리할 수 없습니다")]
    StoreUnavailable,
}

impl AuthError {
    /// 운영 진단용 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::UnknownSubject => "INVALID_CREDENTIALS",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::StoreUnavailable => "STORE_UNAVAILABLE",
        }
    }

    /// HTTP 상태 코드 매핑.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// 핸들러의 `ApiResult`와 합치기 위한 변환.
    pub fn into_api_error(self) -> (StatusCode, Json<ApiErrorResponse>) {
        record_auth_denial(self.code());

        (
            self.status_code(),
            Json(ApiErrorResponse::simple(self.code(), self.to_string())),
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.into_api_error().into_response()
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        // 상세 원인은 서버 로그로만 남긴다
        tracing::warn!(error = %err, "store failure during authentication");
        AuthError::StoreUnavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::MissingToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TokenExpired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::UnknownSubject.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::StoreUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_jwt_error_mapping() {
        assert_eq!(AuthError::from(JwtError::Expired), AuthError::TokenExpired);
        assert_eq!(
            AuthError::from(JwtError::InvalidToken),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn test_store_error_maps_to_unavailable() {
        let err = AuthError::from(StoreError::Unavailable("timeout".into()));
        assert_eq!(err, AuthError::StoreUnavailable);

        // 응답 본문에 내부 상세가 없어야 한다
        let (_, Json(body)) = err.into_api_error();
        assert!(!body.message.contains("timeout"));
    }

    #[test]
    fn test_all_denials_share_envelope_shape() {
        let denials = [
            AuthError::MissingToken,
            AuthError::InvalidAuthHeader,
            AuthError::InvalidToken,
            AuthError::TokenExpired,
            AuthError::UnknownSubject,
            AuthError::Forbidden,
            AuthError::StoreUnavailable,
        ];

        for denial in denials {
            let (status, Json(body)) = denial.into_api_error();
            assert!(
                status == StatusCode::UNAUTHORIZED
                    || status == StatusCode::FORBIDDEN
                    || status == StatusCode::SERVICE_UNAVAILABLE
            );
            assert!(!body.code.is_empty());
            assert!(body.details.is_none());
        }
    }
}

//! Axum용 인증 추출기.
//!
//! Bearer 토큰 검증 → 주체 해석 → (필요 시) 역할 판정을 핸들러
//! 진입 전에 수행하는 추출기를 제공합니다. 어느 단계에서 거부되든
//! 핸들러는 실행되지 않고 동일한 접근 거부 봉투가 반환됩니다.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use userhub_core::User;

use crate::state::AppState;

use super::error::AuthError;
use super::rbac::{self, ADMIN_ROLE};
use super::identity;

/// 인증된 사용자 추출기.
///
/// 토큰 검증과 주체 해석까지만 수행합니다 (역할 무관).
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn me_handler(AuthUser(user): AuthUser) -> impl IntoResponse {
///     Json(UserResponse::from(&user))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = Arc::<AppState>::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let subject = state.tokens.verify(token)?;
        let user = identity::resolve(state.users.as_ref(), &subject).await?;

        Ok(AuthUser(user))
    }
}

/// ADMIN 역할을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl<S> FromRequestParts<S> for RequireAdmin
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        let state = Arc::<AppState>::from_ref(state);
        rbac::authorize(state.roles.as_ref(), &user, &[ADMIN_ROLE]).await?;

        Ok(RequireAdmin(user))
    }
}

//! 역할 기반 접근 제어 (RBAC).
//!
//! 인증된 주체의 역할 집합과 엔드포인트가 요구하는 역할 집합의
//! 교집합으로 인가를 판정합니다. 역할은 역할 저장소가 관리하는
//! 데이터이며, 토큰에는 실리지 않습니다.

use uuid::Uuid;

use userhub_core::{RoleStore, User};

use super::error::AuthError;

/// 관리자 역할 이름.
pub const ADMIN_ROLE: &str = "ADMIN";

/// 역할 집합 교집합으로 인가 판정.
///
/// `required`가 비어 있으면 인증된 주체를 무조건 허용합니다
/// ("로그인만 필요"). 그 외에는 주체의 역할과 `required`의 교집합이
/// 비어 있지 않을 때만 허용합니다. 판정은 순수 읽기이며 아무것도
/// 변경하지 않습니다.
pub async fn authorize(
    roles: &dyn RoleStore,
    principal: &User,
    required: &[&str],
) -> Result<(), AuthError> {
    if required.is_empty() {
        return Ok(());
    }

    let granted = roles.list_role_names(principal.id).await?;

    if required.iter().any(|name| granted.contains(*name)) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %principal.id,
            required = ?required,
            "authorization denied"
        );
        Err(AuthError::Forbidden)
    }
}

/// 본인이거나 지정된 역할을 가진 경우에만 허용.
///
/// "자기 자신의 리소스는 본인이, 그 외에는 관리자가" 유형의
/// 엔드포인트에서 사용합니다.
pub async fn authorize_self_or_any(
    roles: &dyn RoleStore,
    principal: &User,
    owner_id: Uuid,
    required: &[&str],
) -> Result<(), AuthError> {
    if principal.id == owner_id {
        return Ok(());
    }

    authorize(roles, principal, required).await
}

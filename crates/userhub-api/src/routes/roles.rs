//! 역할 관리 endpoint.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/roles` - 역할 목록 조회 (ADMIN)
//! - `POST /api/v1/roles` - 역할 생성 (ADMIN)

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use userhub_core::{NewRole, Role};

use crate::auth::RequireAdmin;
use crate::error::{store_error, validation_error, ApiResult};
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 역할 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleResponse {
    /// 역할 ID
    pub id: Uuid,
    /// 역할 이름
    pub name: String,
    /// 설명
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 생성 시간
    pub created_at: String,
}

impl From<&Role> for RoleResponse {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id,
            name: role.name.clone(),
            description: role.description.clone(),
            created_at: role.created_at.to_rfc3339(),
        }
    }
}

/// 역할 목록 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RolesListResponse {
    /// 역할 목록
    pub roles: Vec<RoleResponse>,
    /// 전체 역할 수
    pub total: usize,
}

/// 역할 생성 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoleRequest {
    /// 역할 이름 (2~64자)
    #[validate(length(min = 2, max = 64))]
    pub name: String,
    /// 설명 (선택)
    #[serde(default)]
    pub description: Option<String>,
}

// ==================== 핸들러 ====================

/// 역할 목록 조회.
///
/// `GET /api/v1/roles`
pub async fn list_roles(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RolesListResponse>> {
    let roles = state.roles.list_all().await.map_err(store_error)?;

    Ok(Json(RolesListResponse {
        total: roles.len(),
        roles: roles.iter().map(RoleResponse::from).collect(),
    }))
}

/// 역할 생성.
///
/// `POST /api/v1/roles`
pub async fn create_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()
        .map_err(|e| validation_error(serde_json::json!(e)))?;

    let role = state
        .roles
        .create(NewRole {
            name: req.name,
            description: req.description,
        })
        .await
        .map_err(store_error)?;

    info!(role_id = %role.id, name = %role.name, created_by = %admin.id, "role created");

    Ok((StatusCode::CREATED, Json(RoleResponse::from(&role))))
}

/// 역할 라우터 생성.
pub fn roles_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_roles).post(create_role))
}

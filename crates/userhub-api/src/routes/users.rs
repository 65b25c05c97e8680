//! 사용자 관리 endpoint.
//!
//! 사용자 CRUD, 상태 변경, 역할 할당을 위한 REST API를 제공합니다.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/users` - 사용자 목록 조회 (ADMIN, 페이지네이션)
//! - `GET /api/v1/users/{id}` - 사용자 상세 조회 (ADMIN)
//! - `PUT /api/v1/users/{id}` - 사용자 수정 (본인 또는 ADMIN)
//! - `PUT /api/v1/users/{id}/status` - 잠금/해제 토글 (ADMIN)
//! - `DELETE /api/v1/users/{id}` - 사용자 삭제 (ADMIN)
//! - `GET /api/v1/users/{id}/roles` - 사용자 역할 조회 (본인 또는 ADMIN)
//! - `POST /api/v1/users/{id}/roles` - 역할 일괄 부여 (ADMIN)
//! - `DELETE /api/v1/users/{id}/roles/{role_id}` - 역할 해제 (ADMIN)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use userhub_core::{User, UserUpdate};

use crate::auth::{authorize_self_or_any, AuthError, AuthUser, RequireAdmin, ADMIN_ROLE};
use crate::error::{not_found, store_error, validation_error, ApiResult};
use crate::routes::roles::RoleResponse;
use crate::state::AppState;

// ==================== 응답 타입 ====================

/// 사용자 응답.
///
/// 해시를 포함한 내부 필드는 노출하지 않습니다.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// 사용자 ID
    pub id: Uuid,
    /// 로그인 이름
    pub username: String,
    /// 이메일 주소
    pub email: String,
    /// 표시 이름
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// 활성 상태
    pub is_active: bool,
    /// 생성 시간
    pub created_at: String,
    /// 업데이트 시간
    pub updated_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// 사용자 목록 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsersListResponse {
    /// 사용자 목록
    pub users: Vec<UserResponse>,
    /// 전체 사용자 수
    pub total: i64,
    /// 현재 페이지 (1부터)
    pub page: u32,
    /// 페이지 크기
    pub page_size: u32,
}

/// 사용자 삭제 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponse {
    /// 성공 여부
    pub success: bool,
    /// 삭제된 사용자 ID
    pub user_id: Uuid,
}

/// 사용자 역할 목록 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRolesResponse {
    /// 사용자 ID
    pub user_id: Uuid,
    /// 부여된 역할
    pub roles: Vec<RoleResponse>,
}

/// 역할 부여 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignRolesResponse {
    /// 새로 부여된 역할 수 (기존 할당 제외)
    pub assigned: u64,
}

// ==================== 요청 타입 ====================

/// 페이지네이션 파라미터.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    /// 페이지 번호 (1부터)
    #[serde(default = "default_page")]
    pub page: u32,
    /// 페이지 크기 (최대 100)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}
fn default_page_size() -> u32 {
    20
}

impl PageParams {
    /// 허용 범위로 보정한 (page, page_size) 반환.
    fn clamped(&self) -> (u32, u32) {
        (self.page.max(1), self.page_size.clamp(1, 100))
    }
}

/// 사용자 수정 요청.
///
/// `None` 필드는 기존 값을 유지합니다.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// 이메일 주소
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    /// 표시 이름
    #[serde(default)]
    pub full_name: Option<String>,
}

/// 역할 일괄 부여 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRolesRequest {
    /// 부여할 역할 ID 목록
    pub role_ids: Vec<Uuid>,
}

// ==================== 핸들러 ====================

/// 사용자 목록 조회.
///
/// `GET /api/v1/users`
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PageParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UsersListResponse>> {
    let (page, page_size) = params.clamped();

    let (users, total) = state
        .users
        .list(page, page_size)
        .await
        .map_err(store_error)?;

    Ok(Json(UsersListResponse {
        users: users.iter().map(UserResponse::from).collect(),
        total,
        page,
        page_size,
    }))
}

/// 사용자 상세 조회.
///
/// `GET /api/v1/users/{id}`
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .users
        .find_by_id(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| not_found("사용자를 찾을 수 없습니다"))?;

    Ok(Json(UserResponse::from(&user)))
}

/// 사용자 수정.
///
/// 본인 또는 ADMIN만 수정할 수 있습니다.
///
/// `PUT /api/v1/users/{id}`
pub async fn update_user(
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    authorize_self_or_any(state.roles.as_ref(), &caller, id, &[ADMIN_ROLE])
        .await
        .map_err(AuthError::into_api_error)?;

    req.validate()
        .map_err(|e| validation_error(serde_json::json!(e)))?;

    let updated = state
        .users
        .update(
            id,
            UserUpdate {
                email: req.email,
                full_name: req.full_name,
            },
        )
        .await
        .map_err(store_error)?
        .ok_or_else(|| not_found("사용자를 찾을 수 없습니다"))?;

    info!(user_id = %id, updated_by = %caller.id, "user updated");

    Ok(Json(UserResponse::from(&updated)))
}

/// 사용자 잠금/해제 토글.
///
/// `PUT /api/v1/users/{id}/status`
pub async fn toggle_user_status(
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UserResponse>> {
    let updated = state
        .users
        .toggle_status(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| not_found("사용자를 찾을 수 없습니다"))?;

    info!(
        user_id = %id,
        is_active = updated.is_active,
        changed_by = %admin.id,
        "user status toggled"
    );

    Ok(Json(UserResponse::from(&updated)))
}

/// 사용자 삭제.
///
/// `DELETE /api/v1/users/{id}`
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DeleteUserResponse>> {
    let deleted = state.users.delete(id).await.map_err(store_error)?;

    if !deleted {
        return Err(not_found("사용자를 찾을 수 없습니다"));
    }

    info!(user_id = %id, deleted_by = %admin.id, "user deleted");

    Ok(Json(DeleteUserResponse {
        success: true,
        user_id: id,
    }))
}

/// 사용자 역할 조회.
///
/// 본인 또는 ADMIN만 조회할 수 있습니다.
///
/// `GET /api/v1/users/{id}/roles`
pub async fn get_user_roles(
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UserRolesResponse>> {
    authorize_self_or_any(state.roles.as_ref(), &caller, id, &[ADMIN_ROLE])
        .await
        .map_err(AuthError::into_api_error)?;

    let roles = state
        .roles
        .roles_for_user(id)
        .await
        .map_err(store_error)?;

    Ok(Json(UserRolesResponse {
        user_id: id,
        roles: roles.iter().map(RoleResponse::from).collect(),
    }))
}

/// 역할 일괄 부여.
///
/// `POST /api/v1/users/{id}/roles`
pub async fn assign_roles(
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssignRolesRequest>,
) -> ApiResult<impl IntoResponse> {
    // 대상 사용자 존재 확인
    state
        .users
        .find_by_id(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| not_found("사용자를 찾을 수 없습니다"))?;

    let assigned = state
        .roles
        .assign(id, &req.role_ids)
        .await
        .map_err(store_error)?;

    info!(
        user_id = %id,
        assigned,
        assigned_by = %admin.id,
        "roles assigned"
    );

    Ok((
        StatusCode::CREATED,
        Json(AssignRolesResponse { assigned }),
    ))
}

/// 역할 해제.
///
/// `DELETE /api/v1/users/{id}/roles/{role_id}`
pub async fn remove_role(
    RequireAdmin(admin): RequireAdmin,
    Path((id, role_id)): Path<(Uuid, Uuid)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let removed = state
        .roles
        .remove(id, role_id)
        .await
        .map_err(store_error)?;

    if !removed {
        return Err(not_found("해당 역할 할당이 없습니다"));
    }

    info!(user_id = %id, role_id = %role_id, removed_by = %admin.id, "role removed");

    Ok(StatusCode::NO_CONTENT)
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/status", put(toggle_user_status))
        .route("/{id}/roles", get(get_user_roles).post(assign_roles))
        .route("/{id}/roles/{role_id}", delete(remove_role))
}

//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/auth` - 회원가입/로그인/내 정보
//! - `/api/v1/users` - 사용자 관리 (CRUD, 상태, 역할 할당)
//! - `/api/v1/roles` - 역할 관리

pub mod auth;
pub mod health;
pub mod roles;
pub mod users;

pub use auth::{auth_router, LoginRequest, RegisterRequest, RegisterResponse, TokenResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use roles::{roles_router, CreateRoleRequest, RoleResponse, RolesListResponse};
pub use users::{
    users_router, AssignRolesRequest, AssignRolesResponse, DeleteUserResponse, UpdateUserRequest,
    UserResponse, UserRolesResponse, UsersListResponse,
};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/auth", auth_router())
        .nest("/api/v1/users", users_router())
        .nest("/api/v1/roles", roles_router())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::auth::ADMIN_ROLE;
    use crate::testing::{create_failing_state, create_test_state, seed_user};

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// 가입 → 역할 부여 → 토큰 검증 → 주체 해석 → 인가까지의 전체 흐름.
    #[tokio::test]
    async fn test_full_authorization_flow() {
        let (state, stores) = create_test_state();
        let app = create_api_router().with_state(state.clone());

        // 가입
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/register")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "username": "alice",
                            "email": "alice@example.com",
                            "password": "Password123"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let registered = body_json(response).await;
        let alice_id = registered["user"]["id"].as_str().unwrap().to_string();

        // ADMIN 역할 부여
        stores
            .roles
            .grant(alice_id.parse().unwrap(), ADMIN_ROLE);

        // 로그인으로 새 토큰 발급
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({ "username": "alice", "password": "Password123" })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = body_json(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        // ADMIN 전용 엔드포인트 접근 → 인가 성공, 주체는 alice
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/users")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["users"][0]["username"], "alice");
    }

    /// 저장소 장애는 503으로 표면화되고 인가 실패와 구분된다.
    #[tokio::test]
    async fn test_store_outage_returns_503() {
        let state = create_failing_state();
        let app = create_api_router().with_state(state.clone());

        let token = state.tokens.issue("alice", None).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/users")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["code"], "STORE_UNAVAILABLE");
    }

    /// 로그인 경로도 저장소 장애 시 503을 반환한다 (401로 위장하지 않음).
    #[tokio::test]
    async fn test_login_store_outage_returns_503() {
        let state = create_failing_state();
        let app = create_api_router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({ "username": "alice", "password": "Password123" })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unauthenticated_request_never_reaches_handler() {
        let (state, stores) = create_test_state();
        seed_user(&stores, "alice", true);
        let app = create_api_router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

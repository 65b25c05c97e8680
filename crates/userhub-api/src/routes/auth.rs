//! 인증 endpoint.
//!
//! 회원가입, 로그인(토큰 발급), 내 정보 조회를 제공합니다.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/auth/register` - 회원가입 (공개)
//! - `POST /api/v1/auth/login` - 로그인, Bearer 토큰 발급 (공개)
//! - `GET /api/v1/auth/me` - 내 정보 조회 (인증 필요)

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use userhub_core::NewUser;

use crate::auth::{validate_password_strength, AuthUser};
use crate::error::{store_error, validation_error, ApiErrorResponse, ApiResult};
use crate::metrics::{record_login, record_registration};
use crate::routes::users::UserResponse;
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 회원가입 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// 로그인 이름 (3~32자)
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    /// 이메일 주소
    #[validate(email)]
    pub email: String,
    /// 표시 이름 (선택)
    #[serde(default)]
    pub full_name: Option<String>,
    /// 평문 비밀번호
    pub password: String,
}

/// 로그인 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 발급된 토큰 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Bearer 토큰
    pub access_token: String,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
    /// 만료까지 남은 시간 (초)
    pub expires_in: i64,
}

/// 회원가입 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    /// 생성된 사용자
    pub user: UserResponse,
    /// 즉시 사용 가능한 토큰
    pub token: TokenResponse,
}

// ==================== 핸들러 ====================

/// 로그인 실패 응답.
///
/// 존재하지 않는 계정, 비밀번호 불일치, 잠긴 계정 모두 같은
/// 응답을 받습니다 (계정 열거 방지).
fn invalid_credentials() -> (StatusCode, Json<ApiErrorResponse>) {
    record_login("failure");
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiErrorResponse::simple(
            "INVALID_CREDENTIALS",
            "인증 정보를 확인할 수 없습니다",
        )),
    )
}

fn issue_token(state: &AppState, username: &str) -> ApiResult<TokenResponse> {
    let access_token = state.tokens.issue(username, None).map_err(|e| {
        tracing::error!(error = %e, "token issuance failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse::new(
                "TOKEN_ISSUE_FAILED",
                "토큰을 발급하지 못했습니다",
            )),
        )
    })?;

    Ok(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.default_ttl_secs(),
    })
}

/// 회원가입.
///
/// `POST /api/v1/auth/register`
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "가입 성공", body = RegisterResponse),
        (status = 400, description = "입력값 오류", body = ApiErrorResponse),
        (status = 409, description = "중복된 username/email", body = ApiErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()
        .map_err(|e| validation_error(serde_json::json!(e)))?;

    validate_password_strength(&req.password).map_err(|msg| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiErrorResponse::simple("WEAK_PASSWORD", msg)),
        )
    })?;

    let password_hash = state.hasher.hash(&req.password).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse::new(
                "HASHING_FAILED",
                "요청을 처리하지 못했습니다",
            )),
        )
    })?;

    let user = state
        .users
        .create(NewUser {
            username: req.username,
            email: req.email,
            full_name: req.full_name,
            password_hash,
        })
        .await
        .map_err(store_error)?;

    record_registration();
    info!(user_id = %user.id, username = %user.username, "user registered");

    let token = issue_token(&state, &user.username)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse::from(&user),
            token,
        }),
    ))
}

/// 로그인.
///
/// `POST /api/v1/auth/login`
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = TokenResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = state
        .users
        .find_by_username(&req.username)
        .await
        .map_err(store_error)?;

    let Some(user) = user else {
        return Err(invalid_credentials());
    };

    if !state.hasher.verify(&req.password, &user.password_hash) || user.is_locked() {
        return Err(invalid_credentials());
    }

    record_login("success");
    info!(user_id = %user.id, "login succeeded");

    let token = issue_token(&state, &user.username)?;
    Ok(Json(token))
}

/// 내 정보 조회.
///
/// `GET /api/v1/auth/me`
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "내 프로필", body = UserResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    )
)]
pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::testing::{create_test_state, TestStores};

    fn test_app() -> (Router, Arc<AppState>, TestStores) {
        let (state, stores) = create_test_state();
        let app = Router::new()
            .nest("/api/v1/auth", auth_router())
            .with_state(state.clone());
        (app, state, stores)
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register_alice(app: &Router) -> serde_json::Value {
        let response = app
            .clone()
            .oneshot(json_request(
                "/api/v1/auth/register",
                serde_json::json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "Password123"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    #[tokio::test]
    async fn test_register_creates_user_and_issues_token() {
        let (app, state, _) = test_app();

        let body = register_alice(&app).await;

        assert_eq!(body["user"]["username"], "alice");
        assert_eq!(body["token"]["token_type"], "Bearer");
        assert!(body["user"].get("password_hash").is_none());

        // 발급된 토큰의 subject가 username이어야 한다
        let token = body["token"]["access_token"].as_str().unwrap();
        assert_eq!(state.tokens.verify(token).unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let (app, _, _) = test_app();

        let response = app
            .oneshot(json_request(
                "/api/v1/auth/register",
                serde_json::json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "short"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "WEAK_PASSWORD");
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let (app, _, _) = test_app();

        let response = app
            .oneshot(json_request(
                "/api/v1/auth/register",
                serde_json::json!({
                    "username": "alice",
                    "email": "not-an-email",
                    "password": "Password123"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_register_duplicate_username_conflicts() {
        let (app, _, _) = test_app();

        register_alice(&app).await;

        let response = app
            .oneshot(json_request(
                "/api/v1/auth/register",
                serde_json::json!({
                    "username": "alice",
                    "email": "alice2@example.com",
                    "password": "Password123"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let (app, _, _) = test_app();
        register_alice(&app).await;

        let response = app
            .oneshot(json_request(
                "/api/v1/auth/login",
                serde_json::json!({ "username": "alice", "password": "Password123" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["token_type"], "Bearer");
        assert!(body["expires_in"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (app, _, stores) = test_app();
        register_alice(&app).await;

        // 잠긴 계정 준비
        crate::testing::seed_user(&stores, "bob", false);

        let wrong_password = app
            .clone()
            .oneshot(json_request(
                "/api/v1/auth/login",
                serde_json::json!({ "username": "alice", "password": "Wrong123" }),
            ))
            .await
            .unwrap();

        let unknown_user = app
            .clone()
            .oneshot(json_request(
                "/api/v1/auth/login",
                serde_json::json!({ "username": "ghost", "password": "Password123" }),
            ))
            .await
            .unwrap();

        let locked_user = app
            .oneshot(json_request(
                "/api/v1/auth/login",
                serde_json::json!({ "username": "bob", "password": "Password123" }),
            ))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(locked_user.status(), StatusCode::UNAUTHORIZED);

        let b1 = body_json(wrong_password).await;
        let b2 = body_json(unknown_user).await;
        let b3 = body_json(locked_user).await;
        assert_eq!(b1, b2);
        assert_eq!(b2, b3);
    }

    #[tokio::test]
    async fn test_me_returns_profile() {
        let (app, _, _) = test_app();
        let body = register_alice(&app).await;
        let token = body["token"]["access_token"].as_str().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/auth/me")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["username"], "alice");
        assert!(body.get("password_hash").is_none());
    }
}

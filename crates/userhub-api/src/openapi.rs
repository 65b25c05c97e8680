//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! # 어노테이션 규칙
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{
    ComponentHealth, ComponentStatus, CreateRoleRequest, HealthResponse, LoginRequest,
    RegisterRequest, RegisterResponse, RoleResponse, RolesListResponse, TokenResponse,
    UserResponse, UsersListResponse,
};

/// UserHub API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "UserHub API",
        version = "0.1.0",
        description = "사용자 계정 관리 및 역할 기반 접근 제어 REST API"
    ),
    paths(
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::health::health_check,
    ),
    components(schemas(
        ApiErrorResponse,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        TokenResponse,
        UserResponse,
        UsersListResponse,
        CreateRoleRequest,
        RoleResponse,
        RolesListResponse,
        HealthResponse,
        ComponentHealth,
        ComponentStatus,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "인증 및 토큰 발급"),
        (name = "health", description = "헬스 체크")
    )
)]
pub struct ApiDoc;

/// Bearer 토큰 보안 스키마 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI 라우터 생성.
pub fn swagger_ui_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

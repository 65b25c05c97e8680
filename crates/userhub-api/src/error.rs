//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//! 접근 거부를 포함한 모든 실패 응답이 같은 봉투(code/message)를
//! 사용하며, 내부 에러 상세(DB 에러 텍스트 등)는 본문에 실리지 않습니다.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use userhub_core::StoreError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "USER_NOT_FOUND",
///   "message": "사용자를 찾을 수 없습니다",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "DB_ERROR", "VALIDATION_ERROR", "FORBIDDEN")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }

    /// 타임스탬프 없는 간단한 에러.
    ///
    /// 접근 거부처럼 발생 시각이 의미 없는 응답에 사용합니다.
    pub fn simple(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: None,
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

// ==================== 공통 에러 변환 헬퍼 ====================

/// [`StoreError`]를 API 에러 응답으로 변환.
///
/// 내부 메시지는 서버 로그로만 남기고 본문에는 안정된 코드만 싣습니다.
pub fn store_error(err: StoreError) -> (StatusCode, Json<ApiErrorResponse>) {
    let (status, code, message) = match &err {
        StoreError::Unavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "STORE_UNAVAILABLE",
            "저장소를 일시적으로 사용할 수 없습니다",
        ),
        StoreError::Conflict(_) => (
            StatusCode::CONFLICT,
            "DUPLICATE_RESOURCE",
            "이미 존재하는 값입니다",
        ),
        StoreError::Constraint(_) => (
            StatusCode::BAD_REQUEST,
            "INVALID_REFERENCE",
            "존재하지 않는 대상을 참조했습니다",
        ),
        StoreError::Query(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "DB_ERROR",
            "요청을 처리하지 못했습니다",
        ),
    };

    tracing::error!(error = %err, code, "store operation failed");

    (status, Json(ApiErrorResponse::new(code, message)))
}

/// 404 Not Found 응답 생성.
pub fn not_found(message: impl Into<String>) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiErrorResponse::simple("NOT_FOUND", message)),
    )
}

/// 검증 실패 응답 생성.
pub fn validation_error(details: Value) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::with_details(
            "VALIDATION_ERROR",
            "입력값이 유효하지 않습니다",
            details,
        )),
    )
}

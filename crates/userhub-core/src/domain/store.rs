//! 저장소 추상화.
//!
//! 인증 코어와 라우트 핸들러가 소비하는 사용자/역할 저장소 trait를
//! 정의합니다. 실제 구현체는 `userhub-api`의 repository 모듈에 있으며,
//! 테스트에서는 인메모리 구현으로 대체됩니다.

use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use super::role::{NewRole, Role};
use super::user::{NewUser, User, UserUpdate};

/// 저장소 접근 에러.
///
/// `Unavailable`은 일시적 인프라 장애로, 권한 판정 실패와 구분되어
/// 호출자에게 전파됩니다. 내부 메시지는 서버 로그용이며 응답 본문에
/// 그대로 실리지 않습니다.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 일시적 인프라 장애 (연결 끊김, 풀 고갈, 타임아웃)
    #[error("저장소에 연결할 수 없습니다: {0}")]
    Unavailable(String),

    /// 유일 제약 위반 (중복 username/email/역할명)
    #[error("중복된 값입니다: {0}")]
    Conflict(String),

    /// 참조 무결성 위반 (존재하지 않는 역할 할당 등)
    #[error("참조 제약 위반: {0}")]
    Constraint(String),

    /// 그 외 질의 실패
    #[error("저장소 질의 실패: {0}")]
    Query(String),
}

/// 사용자 저장소.
///
/// `find_by_username` / `find_by_id`는 인증 경로에서 읽기 전용으로
/// 사용되고, 나머지는 사용자 관리 엔드포인트가 사용합니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// username으로 사용자 조회 (토큰 subject 해석에 사용).
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// id로 사용자 조회.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// 사용자 목록 조회 (페이지 번호는 1부터).
    ///
    /// (해당 페이지의 사용자, 전체 수)를 반환합니다.
    async fn list(&self, page: u32, page_size: u32) -> Result<(Vec<User>, i64), StoreError>;

    /// 사용자 생성.
    async fn create(&self, input: NewUser) -> Result<User, StoreError>;

    /// 사용자 부분 업데이트. 대상이 없으면 `None`.
    async fn update(&self, id: Uuid, input: UserUpdate) -> Result<Option<User>, StoreError>;

    /// 활성/잠금 상태 토글. 대상이 없으면 `None`.
    async fn toggle_status(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// 사용자 삭제. 삭제됐으면 `true`.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// 역할 저장소.
///
/// `list_role_names`는 권한 판정에 사용되고, 나머지는 역할 관리
/// 엔드포인트가 사용합니다.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// 사용자에게 부여된 역할 이름 집합 조회.
    async fn list_role_names(&self, user_id: Uuid) -> Result<HashSet<String>, StoreError>;

    /// 전체 역할 목록 조회.
    async fn list_all(&self) -> Result<Vec<Role>, StoreError>;

    /// 역할 생성.
    async fn create(&self, input: NewRole) -> Result<Role, StoreError>;

    /// 사용자에게 부여된 역할 레코드 조회.
    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, StoreError>;

    /// 역할 일괄 부여. 새로 부여된 건수를 반환합니다 (이미 있던 할당은 무시).
    async fn assign(&self, user_id: Uuid, role_ids: &[Uuid]) -> Result<u64, StoreError>;

    /// 역할 할당 해제. 해제됐으면 `true`.
    async fn remove(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, StoreError>;
}

//! Postgres 저장소 구현.
//!
//! `userhub-core`의 저장소 trait에 대한 sqlx 기반 구현을 제공합니다.
//! 핸들러는 trait object를 통해서만 접근하므로 이 모듈의 타입은
//! 기동 시점(main)에서만 직접 사용됩니다.

pub mod roles;
pub mod users;

pub use roles::PgRoleRepository;
pub use users::PgUserRepository;

use userhub_core::StoreError;

/// sqlx 에러를 저장소 에러로 변환.
///
/// 연결/풀 계열 실패는 `Unavailable`로 분류되어 상위에서 503으로
/// 매핑되고, 제약 위반은 종류별로 구분됩니다.
pub(crate) fn map_store_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StoreError::Constraint(db.message().to_string())
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Query(err.to_string()),
    }
}

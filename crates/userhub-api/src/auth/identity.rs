//! 인증 주체 해석.
//!
//! 검증된 토큰의 subject를 사용자 저장소에서 현재 주체로 해석합니다.

use userhub_core::{User, UserStore};

use super::error::AuthError;

/// subject(username)를 활성 사용자로 해석.
///
/// 존재하지 않는 계정과 잠긴 계정은 동일하게
/// [`AuthError::UnknownSubject`]로 거부됩니다. 응답만으로 계정 존재
/// 여부를 알아낼 수 없어야 합니다 (계정 열거 방지).
pub async fn resolve(store: &dyn UserStore, subject: &str) -> Result<User, AuthError> {
    match store.find_by_username(subject).await? {
        Some(user) if user.is_active => Ok(user),
        _ => Err(AuthError::UnknownSubject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_user, FailingUserStore, InMemoryUserStore};

    #[tokio::test]
    async fn test_resolves_active_user() {
        let store = InMemoryUserStore::with_users(vec![test_user("alice", true)]);

        let user = resolve(&store, "alice").await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_unknown_subject_rejected() {
        let store = InMemoryUserStore::with_users(vec![]);

        let err = resolve(&store, "ghost").await.unwrap_err();
        assert_eq!(err, AuthError::UnknownSubject);
    }

    #[tokio::test]
    async fn test_locked_user_indistinguishable_from_unknown() {
        let store = InMemoryUserStore::with_users(vec![test_user("bob", false)]);

        let locked = resolve(&store, "bob").await.unwrap_err();
        let unknown = resolve(&store, "ghost").await.unwrap_err();

        // 두 경우가 완전히 동일한 에러여야 한다
        assert_eq!(locked, unknown);
        assert_eq!(locked.code(), unknown.code());
        assert_eq!(locked.status_code(), unknown.status_code());
    }

    #[tokio::test]
    async fn test_store_outage_surfaces_as_unavailable() {
        let store = FailingUserStore;

        let err = resolve(&store, "alice").await.unwrap_err();
        assert_eq!(err, AuthError::StoreUnavailable);
    }
}

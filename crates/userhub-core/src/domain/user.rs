//! 사용자 엔티티.
//!
//! 인증 주체(Principal)이자 사용자 관리 API가 다루는 레코드입니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 사용자 계정.
///
/// `password_hash`는 직렬화 대상에서 제외되어 어떤 응답에도
/// 포함되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct User {
    /// 고유 식별자 (불변)
    pub id: Uuid,
    /// 로그인 이름 (유일, 토큰 subject로 사용됨)
    pub username: String,
    /// 이메일 주소 (유일)
    pub email: String,
    /// 표시 이름
    #[cfg_attr(feature = "sqlx-support", sqlx(default))]
    pub full_name: Option<String>,
    /// Argon2 해시 (PHC 문자열)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// 활성 상태 (false = 잠금)
    pub is_active: bool,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 마지막 수정 시각
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 계정이 잠겨 있는지 확인.
    pub fn is_locked(&self) -> bool {
        !self.is_active
    }
}

/// 새 사용자 생성 입력.
///
/// 해싱은 호출자 책임이며 평문 비밀번호는 이 타입에 실리지 않습니다.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password_hash: String,
}

/// 사용자 부분 업데이트 입력.
///
/// `None` 필드는 기존 값을 유지합니다.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            full_name: Some("Alice Kim".to_string()),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();

        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"username\":\"alice\""));
    }

    #[test]
    fn test_is_locked() {
        let mut user = sample_user();
        assert!(!user.is_locked());

        user.is_active = false;
        assert!(user.is_locked());
    }
}

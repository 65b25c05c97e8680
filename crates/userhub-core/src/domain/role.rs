//! 역할 엔티티.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 권한 역할.
///
/// 사용자와 다대다 관계이며, 엔드포인트 접근 제어는 역할 이름
/// 집합의 교집합으로 결정됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Role {
    /// 고유 식별자
    pub id: Uuid,
    /// 역할 이름 (유일, 예: "ADMIN")
    pub name: String,
    /// 설명
    #[cfg_attr(feature = "sqlx-support", sqlx(default))]
    pub description: Option<String>,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
}

/// 새 역할 생성 입력.
#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization_round_trip() {
        let role = Role {
            id: Uuid::new_v4(),
            name: "ADMIN".to_string(),
            description: Some("시스템 관리자".to_string()),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&role).unwrap();
        let parsed: Role = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, role.id);
        assert_eq!(parsed.name, "ADMIN");
    }
}

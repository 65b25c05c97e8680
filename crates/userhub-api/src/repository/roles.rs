//! Role Repository
//!
//! 역할 및 사용자-역할 할당 관련 데이터베이스 연산을 담당합니다.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use userhub_core::{NewRole, Role, RoleStore, StoreError};

use super::map_store_err;

/// Postgres 역할 저장소.
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleRepository {
    async fn list_role_names(&self, user_id: Uuid) -> Result<HashSet<String>, StoreError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM roles r
            INNER JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_store_err)?;

        Ok(names.into_iter().collect())
    }

    async fn list_all(&self) -> Result<Vec<Role>, StoreError> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(map_store_err)
    }

    async fn create(&self, input: NewRole) -> Result<Role, StoreError> {
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(map_store_err)
    }

    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, StoreError> {
        sqlx::query_as::<_, Role>(
            r#"
            SELECT r.*
            FROM roles r
            INNER JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_store_err)
    }

    async fn assign(&self, user_id: Uuid, role_ids: &[Uuid]) -> Result<u64, StoreError> {
        let mut assigned = 0;

        // 이미 있는 할당은 건너뛴다
        for role_id in role_ids {
            let result = sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, role_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await
            .map_err(map_store_err)?;

            assigned += result.rows_affected();
        }

        Ok(assigned)
    }

    async fn remove(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await
            .map_err(map_store_err)?;

        Ok(result.rows_affected() > 0)
    }
}

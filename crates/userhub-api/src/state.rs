//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유되며, 인증 코어의
//! 구성 요소(토큰 코덱, 해셔)와 저장소는 기동 시 한 번 생성되는
//! 불변 객체입니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use userhub_core::{RoleStore, UserStore};

use crate::auth::{PasswordHasher, TokenCodec};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다. 저장소는
/// trait object로 보관되어 테스트에서 인메모리 구현으로 대체됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 저장소
    pub users: Arc<dyn UserStore>,

    /// 역할 저장소
    pub roles: Arc<dyn RoleStore>,

    /// 토큰 발급/검증 코덱
    pub tokens: Arc<TokenCodec>,

    /// 비밀번호 해셔
    pub hasher: Arc<PasswordHasher>,

    /// 데이터베이스 연결 풀 (헬스 체크용, 테스트에서는 None)
    pub db_pool: Option<PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        tokens: TokenCodec,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            roles,
            tokens: Arc::new(tokens),
            hasher: Arc::new(hasher),
            db_pool: None,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 데이터베이스 연결 풀 설정.
    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        if let Some(pool) = &self.db_pool {
            sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
        } else {
            false
        }
    }
}

//! 테스트 지원 유틸리티.
//!
//! 실제 DB 없이 인증 코어와 라우트를 검증할 수 있도록 인메모리
//! 저장소 구현과 테스트용 AppState 헬퍼를 제공합니다.
//! `test-utils` feature 또는 테스트 빌드에서만 컴파일됩니다.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use uuid::Uuid;

use userhub_core::config::HashingConfig;
use userhub_core::{NewRole, NewUser, Role, RoleStore, StoreError, User, UserStore, UserUpdate};

use crate::auth::{PasswordHasher, TokenCodec};
use crate::state::AppState;

/// 테스트 사용자 생성.
pub fn test_user(username: &str, active: bool) -> User {
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        full_name: None,
        password_hash: String::new(),
        is_active: active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// ==================== 인메모리 사용자 저장소 ====================

/// HashMap 기반 사용자 저장소.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let store = Self::new();
        for user in users {
            store.insert(user);
        }
        store
    }

    pub fn insert(&self, user: User) {
        self.users.write().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }

    async fn list(&self, page: u32, page_size: u32) -> Result<(Vec<User>, i64), StoreError> {
        let users = self.users.read().unwrap();
        let total = users.len() as i64;

        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.created_at);

        let offset = (page.saturating_sub(1) as usize) * (page_size as usize);
        let slice = all
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();

        Ok((slice, total))
    }

    async fn create(&self, input: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().unwrap();

        if users
            .values()
            .any(|u| u.username == input.username || u.email == input.email)
        {
            return Err(StoreError::Conflict(input.username));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: input.username,
            email: input.email,
            full_name: input.full_name,
            password_hash: input.password_hash,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update(&self, id: Uuid, input: UserUpdate) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().unwrap();

        Ok(users.get_mut(&id).map(|user| {
            if let Some(email) = input.email {
                user.email = email;
            }
            if let Some(full_name) = input.full_name {
                user.full_name = Some(full_name);
            }
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn toggle_status(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().unwrap();

        Ok(users.get_mut(&id).map(|user| {
            user.is_active = !user.is_active;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.users.write().unwrap().remove(&id).is_some())
    }
}

// ==================== 인메모리 역할 저장소 ====================

/// HashMap 기반 역할 저장소.
#[derive(Default)]
pub struct InMemoryRoleStore {
    roles: RwLock<Vec<Role>>,
    assignments: RwLock<HashMap<Uuid, HashSet<Uuid>>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 역할을 (없으면 만들어서) 사용자에게 부여.
    pub fn grant(&self, user_id: Uuid, role_name: &str) -> Uuid {
        let role_id = {
            let mut roles = self.roles.write().unwrap();
            match roles.iter().find(|r| r.name == role_name) {
                Some(role) => role.id,
                None => {
                    let role = Role {
                        id: Uuid::new_v4(),
                        name: role_name.to_string(),
                        description: None,
                        created_at: Utc::now(),
                    };
                    let id = role.id;
                    roles.push(role);
                    id
                }
            }
        };

        self.assignments
            .write()
            .unwrap()
            .entry(user_id)
            .or_default()
            .insert(role_id);

        role_id
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn list_role_names(&self, user_id: Uuid) -> Result<HashSet<String>, StoreError> {
        let assignments = self.assignments.read().unwrap();
        let roles = self.roles.read().unwrap();

        let Some(role_ids) = assignments.get(&user_id) else {
            return Ok(HashSet::new());
        };

        Ok(roles
            .iter()
            .filter(|r| role_ids.contains(&r.id))
            .map(|r| r.name.clone())
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Role>, StoreError> {
        let mut roles = self.roles.read().unwrap().clone();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn create(&self, input: NewRole) -> Result<Role, StoreError> {
        let mut roles = self.roles.write().unwrap();

        if roles.iter().any(|r| r.name == input.name) {
            return Err(StoreError::Conflict(input.name));
        }

        let role = Role {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            created_at: Utc::now(),
        };
        roles.push(role.clone());

        Ok(role)
    }

    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, StoreError> {
        let assignments = self.assignments.read().unwrap();
        let roles = self.roles.read().unwrap();

        let Some(role_ids) = assignments.get(&user_id) else {
            return Ok(Vec::new());
        };

        let mut result: Vec<Role> = roles
            .iter()
            .filter(|r| role_ids.contains(&r.id))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(result)
    }

    async fn assign(&self, user_id: Uuid, role_ids: &[Uuid]) -> Result<u64, StoreError> {
        let roles = self.roles.read().unwrap();
        for role_id in role_ids {
            if !roles.iter().any(|r| r.id == *role_id) {
                return Err(StoreError::Constraint(role_id.to_string()));
            }
        }
        drop(roles);

        let mut assignments = self.assignments.write().unwrap();
        let granted = assignments.entry(user_id).or_default();

        let mut newly_assigned = 0;
        for role_id in role_ids {
            if granted.insert(*role_id) {
                newly_assigned += 1;
            }
        }

        Ok(newly_assigned)
    }

    async fn remove(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, StoreError> {
        let mut assignments = self.assignments.write().unwrap();

        Ok(assignments
            .get_mut(&user_id)
            .is_some_and(|granted| granted.remove(&role_id)))
    }
}

// ==================== 장애 주입 저장소 ====================

/// 모든 호출이 `StoreError::Unavailable`로 실패하는 사용자 저장소.
pub struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, StoreError> {
        Err(unavailable())
    }
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, StoreError> {
        Err(unavailable())
    }
    async fn list(&self, _page: u32, _page_size: u32) -> Result<(Vec<User>, i64), StoreError> {
        Err(unavailable())
    }
    async fn create(&self, _input: NewUser) -> Result<User, StoreError> {
        Err(unavailable())
    }
    async fn update(&self, _id: Uuid, _input: UserUpdate) -> Result<Option<User>, StoreError> {
        Err(unavailable())
    }
    async fn toggle_status(&self, _id: Uuid) -> Result<Option<User>, StoreError> {
        Err(unavailable())
    }
    async fn delete(&self, _id: Uuid) -> Result<bool, StoreError> {
        Err(unavailable())
    }
}

/// 모든 호출이 `StoreError::Unavailable`로 실패하는 역할 저장소.
pub struct FailingRoleStore;

#[async_trait]
impl RoleStore for FailingRoleStore {
    async fn list_role_names(&self, _user_id: Uuid) -> Result<HashSet<String>, StoreError> {
        Err(unavailable())
    }
    async fn list_all(&self) -> Result<Vec<Role>, StoreError> {
        Err(unavailable())
    }
    async fn create(&self, _input: NewRole) -> Result<Role, StoreError> {
        Err(unavailable())
    }
    async fn roles_for_user(&self, _user_id: Uuid) -> Result<Vec<Role>, StoreError> {
        Err(unavailable())
    }
    async fn assign(&self, _user_id: Uuid, _role_ids: &[Uuid]) -> Result<u64, StoreError> {
        Err(unavailable())
    }
    async fn remove(&self, _user_id: Uuid, _role_id: Uuid) -> Result<bool, StoreError> {
        Err(unavailable())
    }
}

fn unavailable() -> StoreError {
    StoreError::Unavailable("injected failure".to_string())
}

// ==================== 테스트용 AppState ====================

/// 테스트 상태가 쥐고 있는 인메모리 저장소 핸들.
pub struct TestStores {
    pub users: Arc<InMemoryUserStore>,
    pub roles: Arc<InMemoryRoleStore>,
}

/// 테스트용 AppState 생성.
///
/// 인메모리 저장소, 개발용 비밀 키, 빠른 해싱 파라미터를 사용합니다.
/// 반환된 [`TestStores`]로 데이터를 직접 심을 수 있습니다.
pub fn create_test_state() -> (Arc<AppState>, TestStores) {
    let users = Arc::new(InMemoryUserStore::new());
    let roles = Arc::new(InMemoryRoleStore::new());

    let tokens = TokenCodec::new(
        &SecretString::from("test-secret-key-for-jwt-testing-minimum-32-chars"),
        chrono::Duration::seconds(3600),
    );
    let hasher = PasswordHasher::new(&HashingConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("test hashing params");

    let state = Arc::new(AppState::new(
        users.clone(),
        roles.clone(),
        tokens,
        hasher,
    ));

    (state, TestStores { users, roles })
}

/// 장애 주입 저장소를 사용하는 테스트용 AppState 생성.
pub fn create_failing_state() -> Arc<AppState> {
    let tokens = TokenCodec::new(
        &SecretString::from("test-secret-key-for-jwt-testing-minimum-32-chars"),
        chrono::Duration::seconds(3600),
    );

    Arc::new(AppState::new(
        Arc::new(FailingUserStore),
        Arc::new(FailingRoleStore),
        tokens,
        PasswordHasher::with_defaults(),
    ))
}

/// 사용자를 저장소에 심고 반환.
pub fn seed_user(stores: &TestStores, username: &str, active: bool) -> User {
    let user = test_user(username, active);
    stores.users.insert(user.clone());
    user
}

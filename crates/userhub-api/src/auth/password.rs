//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version,
};

use userhub_core::config::HashingConfig;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("잘못된 해싱 파라미터")]
    InvalidParams,
}

/// 비밀번호 해셔.
///
/// 생성 시점에 주입된 파라미터로 Argon2id 해시를 생성/검증합니다.
/// 생성 이후 상태가 없으므로 요청 간에 안전하게 공유할 수 있습니다.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// 설정된 파라미터로 해셔 생성.
    pub fn new(config: &HashingConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|_| PasswordError::InvalidParams)?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// 기본 파라미터로 해셔 생성.
    pub fn with_defaults() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// 비밀번호 해싱.
    ///
    /// 솔트는 매번 새로 생성되며 PHC 형식 문자열에 포함됩니다.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| PasswordError::HashingFailed)
    }

    /// 비밀번호 검증.
    ///
    /// 비밀번호 불일치와 깨진 해시 입력을 구분하지 않고 모두 `false`를
    /// 반환합니다. 검증 경로에서 에러를 던지지 않습니다.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// 비밀번호 강도 검증.
///
/// # 요구사항
///
/// - 최소 8자 이상
/// - 최소 1개의 숫자 포함
/// - 최소 1개의 영문자 포함
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("비밀번호는 최소 8자 이상이어야 합니다");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("비밀번호에 최소 1개의 숫자가 포함되어야 합니다");
    }

    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("비밀번호에 최소 1개의 영문자가 포함되어야 합니다");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hasher = PasswordHasher::with_defaults();
        let password = "TestPassword123!";
        let hash = hasher.hash(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("WrongPassword123!", &hash));
    }

    #[test]
    fn test_different_passwords_different_hashes() {
        let hasher = PasswordHasher::with_defaults();
        let hash1 = hasher.hash("Password1").unwrap();
        let hash2 = hasher.hash("Password1").unwrap();

        // 같은 비밀번호라도 솔트가 다르므로 해시가 다름
        assert_ne!(hash1, hash2);

        assert!(hasher.verify("Password1", &hash1));
        assert!(hasher.verify("Password1", &hash2));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        let hasher = PasswordHasher::with_defaults();

        assert!(!hasher.verify("password", "not-a-valid-hash"));
        assert!(!hasher.verify("password", ""));
        assert!(!hasher.verify("password", "$argon2id$broken"));
    }

    #[test]
    fn test_configured_params() {
        let config = HashingConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        };
        let hasher = PasswordHasher::new(&config).unwrap();

        let hash = hasher.hash("Quick123").unwrap();
        assert!(hasher.verify("Quick123", &hash));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let config = HashingConfig {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        };
        assert!(PasswordHasher::new(&config).is_err());
    }

    #[test]
    fn test_password_strength_validation() {
        assert!(validate_password_strength("Password1").is_ok());
        assert!(validate_password_strength("abcd1234").is_ok());

        // 너무 짧음
        assert!(validate_password_strength("Pass1").is_err());
        // 숫자 없음
        assert!(validate_password_strength("Password").is_err());
        // 영문자 없음
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("").is_err());
    }

    #[test]
    fn test_unicode_password() {
        let hasher = PasswordHasher::with_defaults();
        let password = "한글패스워드123";
        let hash = hasher.hash(password).unwrap();
        assert!(hasher.verify(password, &hash));
    }
}

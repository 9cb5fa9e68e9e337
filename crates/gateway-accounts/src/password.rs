//! Password hashing and verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use gateway_config::DatabaseConfig;
use gateway_core::{GatewayError, GatewayResult};
use rand::{distributions::Alphanumeric, Rng};

/// Length of generated referral codes.
pub const AFF_CODE_LEN: usize = 4;

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Iteration count.
    pub iterations: u32,
    /// Lane count.
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordParams {
    /// Parameters taken from the database section of the configuration.
    #[must_use]
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            memory_kib: config.password_memory_kib,
            iterations: config.password_iterations,
            parallelism: config.password_parallelism,
        }
    }

    fn to_argon2(self) -> GatewayResult<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| GatewayError::credential(format!("invalid argon2 params: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hash a plaintext password into an argon2id PHC string with a random salt.
///
/// CPU bound; async callers run it on the blocking pool.
pub fn hash_password(plaintext: &str, params: PasswordParams) -> GatewayResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params
        .to_argon2()?
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| GatewayError::credential(format!("hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Check a plaintext password against a stored PHC string.
///
/// The parameters embedded in the hash are used, not the configured ones.
pub fn verify_password(plaintext: &str, hash: &str) -> GatewayResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| GatewayError::credential(format!("parse password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}

/// Random alphanumeric referral code.
#[must_use]
pub fn generate_aff_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AFF_CODE_LEN)
        .map(char::from)
        .collect()
}

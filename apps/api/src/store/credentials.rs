//! Admin password hashing and verification (argon2id, salted PHC strings).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use std::sync::OnceLock;

use crate::errors::{StoreError, StoreResult};

pub const MIN_PASSWORD_LEN: usize = 8;

static UNKNOWN_ACCOUNT_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StoreError::Credential(format!("hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
///
/// Parameters are read from the hash itself; comparison is constant-time.
pub fn verify_password(password: &str, hash: &str) -> StoreResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| StoreError::Credential(format!("parse stored hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Runs the same argon2 verification a real account would get against a
/// throwaway hash and discards the result, so unknown emails take as long
/// as known ones. Always `false`.
pub fn verify_unknown_account(password: &str) -> bool {
    let hash = UNKNOWN_ACCOUNT_HASH.get_or_init(|| hash_password("\0unknown-account\0").ok());
    if let Some(hash) = hash {
        let _ = verify_password(password, hash);
    }
    false
}

/// Whether a stored credential is already a PHC hash rather than legacy cleartext.
pub fn is_password_hash(stored: &str) -> bool {
    PasswordHash::new(stored).is_ok()
}

pub fn validate_new_password(current: &str, new: &str) -> StoreResult<()> {
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(StoreError::Validation(format!(
            "new password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if new == current {
        return Err(StoreError::Validation(
            "new password must differ from the current one".to_string(),
        ));
    }
    Ok(())
}

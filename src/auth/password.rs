//! Password hashing and verification using Argon2id
//!
//! Hashing is CPU bound, so both entry points run on the blocking pool.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use tokio::sync::OnceCell;

use crate::error::AppError;

/// Stand-in hash checked when an account has no password to compare
static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

/// Hash a password with a fresh random salt
///
/// # Returns
/// PHC-formatted hash string safe for database storage
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?
}

/// Verify a password against its stored hash
///
/// # Returns
/// `true` if the password matches, `false` otherwise
///
/// # Errors
/// Returns error if the stored hash is malformed
pub async fn verify_password(password: String, password_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid password hash: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::Internal(anyhow::anyhow!(
                "password verification failed: {e}"
            ))),
        }
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?
}

/// Spend one full verification on a password that has no stored hash
///
/// Sign-in attempts for unknown users then take as long as attempts with a
/// wrong password. The outcome is always a mismatch.
pub async fn verify_dummy(password: String) -> Result<(), AppError> {
    let dummy = DUMMY_HASH
        .get_or_try_init(|| hash_password("quill-unknown-account".to_string()))
        .await?;
    verify_password(password, dummy.clone()).await?;
    Ok(())
}

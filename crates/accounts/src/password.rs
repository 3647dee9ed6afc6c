//! Password hashing and verification.
//!
//! Passwords are stored as Argon2id PHC strings, the parameters travel with
//! the hash so verification never needs them.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::ResultAccounts;

/// Hash `raw` with a fresh random salt.
pub fn hash_password(raw: &str) -> ResultAccounts<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(raw.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check `raw` against a stored hash. A malformed hash is an error, a wrong
/// password is `Ok(false)`.
pub fn verify_password(raw: &str, hash: &str) -> ResultAccounts<bool> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok())
}

//! Password hashing and verification.
//!
//! The credential store is the only caller of this module. Hashes are Argon2id
//! PHC strings produced with fixed cost parameters and a fresh random salt, so
//! two hashes of the same password never compare equal. Verification relies on
//! the algorithm's own constant-time comparison.

use std::fmt;

use argon2::password_hash::{
    Error as PhcError, PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::OsRng;
use thiserror::Error;
use zeroize::Zeroizing;

/// Memory cost in KiB.
const ARGON2_MEMORY_KIB: u32 = 19 * 1024;
/// Number of passes.
const ARGON2_ITERATIONS: u32 = 2;
/// Degree of parallelism.
const ARGON2_PARALLELISM: u32 = 1;

/// Failures raised by the hashing primitive itself.
///
/// A well-formed mismatch is not an error; see [`verify_password`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// Salt generation, parameter setup, or key derivation failed.
    #[error("password hashing failed: {message}")]
    Hashing { message: String },
    /// The stored hash could not be parsed or names an unsupported algorithm.
    #[error("stored password hash is unreadable: {message}")]
    Malformed { message: String },
}

/// Opaque encoded password hash.
///
/// Never serialised; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash string loaded from storage. Validity is checked on use.
    pub fn from_stored(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded PHC string for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

fn hasher() -> Result<Argon2<'static>, PasswordHashError> {
    let params = Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        None,
    )
    .map_err(|err| PasswordHashError::Hashing {
        message: err.to_string(),
    })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a plaintext password with a fresh salt.
///
/// # Examples
/// ```
/// use authbroker::domain::{hash_password, verify_password};
///
/// let hash = hash_password("hunter22").expect("hashing succeeds");
/// assert_ne!(hash.as_str(), "hunter22");
/// assert_eq!(verify_password("hunter22", &hash), Ok(true));
/// ```
pub fn hash_password(plaintext: &str) -> Result<PasswordHash, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    let encoded = hasher()?
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| PasswordHashError::Hashing {
            message: err.to_string(),
        })?
        .to_string();
    Ok(PasswordHash(encoded))
}

/// Compare a plaintext password to a stored hash.
///
/// Returns `Ok(false)` on a mismatch and an error only when the stored hash
/// itself is unreadable.
pub fn verify_password(plaintext: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
    let parsed = PhcString::new(hash.as_str()).map_err(|err| PasswordHashError::Malformed {
        message: err.to_string(),
    })?;
    match hasher()?.verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PhcError::Password) => Ok(false),
        Err(err) => Err(PasswordHashError::Malformed {
            message: err.to_string(),
        }),
    }
}

/// Run [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(
    plaintext: Zeroizing<String>,
) -> Result<PasswordHash, PasswordHashError> {
    tokio::task::spawn_blocking(move || hash_password(plaintext.as_str()))
        .await
        .map_err(|err| PasswordHashError::Hashing {
            message: format!("hashing task failed: {err}"),
        })?
}

/// Run [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(
    plaintext: Zeroizing<String>,
    hash: PasswordHash,
) -> Result<bool, PasswordHashError> {
    tokio::task::spawn_blocking(move || verify_password(plaintext.as_str(), &hash))
        .await
        .map_err(|err| PasswordHashError::Hashing {
            message: format!("verification task failed: {err}"),
        })?
}

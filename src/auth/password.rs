/// Password Hashing and Verification
///
/// bcrypt at a fixed cost. The digest string embeds algorithm, cost and salt,
/// so it is the only thing that needs storing.

use bcrypt::{hash, verify};
use lazy_static::lazy_static;

use crate::error::{AppError, ValidationError};

/// bcrypt work factor
pub const HASH_COST: u32 = 8;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 64;

lazy_static! {
    // Verified against when the email is unknown, so that path costs the
    // same as a wrong password.
    static ref DECOY_DIGEST: Option<String> = hash("decoy-password-never-issued", HASH_COST).ok();
}

/// Hash a password using bcrypt
///
/// # Errors
/// Returns error if bcrypt hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, HASH_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a plaintext password against a stored digest
///
/// A malformed digest is treated as a mismatch, never as an error.
pub fn verify_password(password: &str, digest: &str) -> bool {
    match verify(password, digest) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password digest could not be parsed");
            false
        }
    }
}

/// Burn one bcrypt verification for a login whose email does not exist
pub fn verify_decoy(password: &str) {
    if let Some(digest) = DECOY_DIGEST.as_ref() {
        let _ = verify(password, digest);
    }
}

/// Passwords must be 8 to 64 characters long
pub fn validate_password_length(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(ValidationError::PasswordLength);
    }
    Ok(())
}

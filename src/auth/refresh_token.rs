/// Refresh Token Storage Form
///
/// Refresh tokens are signed JWTs. What lands in `refresh_tokens.token`
/// depends on `RefreshTokenStorage`: the raw token, or its SHA-256 hex
/// fingerprint. Both sides of a comparison go through the same function.

use sha2::{Digest, Sha256};

use crate::configuration::RefreshTokenStorage;

/// The value persisted for `token` under the given storage mode
pub fn storage_form(token: &str, storage: RefreshTokenStorage) -> String {
    match storage {
        RefreshTokenStorage::Plaintext => token.to_string(),
        RefreshTokenStorage::Sha256 => hash_token(token),
    }
}

/// Whether a presented token is the one currently stored
pub fn matches_stored(presented: &str, stored: &str, storage: RefreshTokenStorage) -> bool {
    storage_form(presented, storage) == stored
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

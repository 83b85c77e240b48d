/// Authentication module
///
/// Token signing/parsing, password hashing, refresh-token storage form and
/// the `AuthManager` that ties them to the credential store.

mod claims;
mod manager;
mod password;
mod refresh_token;
mod token;

pub use claims::Claims;
pub use manager::{AuthManager, TokenKind, TokenPair};
pub use password::{hash_password, validate_password_length, verify_password, HASH_COST};
pub use token::TokenCodec;

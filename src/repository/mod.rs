/// Persistence layer
///
/// Thin sqlx wrappers over PostgreSQL. The credential store sits behind a
/// trait so the auth flow can run without a database; the catalog
/// repositories are plain async functions over a `PgPool`.

pub mod artist;
mod credential;
mod filter;
pub mod playlist;
pub mod track;
pub mod user;

pub use credential::{Credential, CredentialStore, PgCredentialStore};
pub use filter::{Filter, ListQuery, SortKey};

#[cfg(test)]
pub(crate) use credential::memory;

use crate::error::{AppError, DatabaseError};

pub(crate) fn not_found(what: &str) -> AppError {
    AppError::Database(DatabaseError::NotFound(what.to_string()))
}

/// Auth Manager
///
/// Login, token minting and token verification. Holds the token codec and
/// the credential store; both are injected at startup.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::auth::password::{hash_password, verify_decoy, verify_password};
use crate::auth::refresh_token::{matches_stored, storage_form};
use crate::auth::token::TokenCodec;
use crate::configuration::{JwtSettings, RefreshTokenStorage};
use crate::error::{AppError, AuthError};
use crate::repository::{not_found, CredentialStore};

/// Which token a verification is about; decides the expiry error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn expired(self) -> AuthError {
        match self {
            TokenKind::Access => AuthError::AccessTokenExpired,
            TokenKind::Refresh => AuthError::RefreshTokenExpired,
        }
    }
}

/// Tokens handed out by login and refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    #[serde(rename = "access token")]
    pub access_token: String,
    #[serde(rename = "refresh token")]
    pub refresh_token: String,
}

pub struct AuthManager {
    codec: TokenCodec,
    store: Arc<dyn CredentialStore>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    refresh_storage: RefreshTokenStorage,
}

impl AuthManager {
    pub fn new(settings: &JwtSettings, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            codec: TokenCodec::new(&settings.secret),
            store,
            access_ttl: settings.access_token_ttl(),
            refresh_ttl: settings.refresh_token_ttl(),
            refresh_storage: settings.refresh_token_storage,
        }
    }

    /// Sign a token for `user_id` valid for `ttl`
    pub fn generate_token(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        self.codec.encode(user_id, ttl)
    }

    pub fn verify_access_token(&self, token: &str, expected: Uuid) -> Result<(), AuthError> {
        self.verify_access_token_at(token, expected, Utc::now())
    }

    pub fn verify_access_token_at(
        &self,
        token: &str,
        expected: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        self.verify_at(token, TokenKind::Access, expected, now).map(|_| ())
    }

    /// decode -> expiry -> identity, in that order
    fn verify_at(
        &self,
        token: &str,
        kind: TokenKind,
        expected: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Claims, AuthError> {
        let claims = self.codec.decode(token)?;

        if claims.is_expired_at(now) {
            return Err(kind.expired());
        }

        if claims.user_id()? != expected {
            return Err(AuthError::IdentityMismatch);
        }

        Ok(claims)
    }

    /// Exchange email + password for a fresh token pair
    ///
    /// Unknown email and wrong password both fail with
    /// `AuthError::InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let credential = match self.store.find_by_email(email).await? {
            Some(credential) => credential,
            None => {
                verify_decoy(password);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !verify_password(password, &credential.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let pair = self.issue_pair(credential.user_id, Utc::now())?;
        self.store_refresh_token(credential.user_id, &pair.refresh_token).await?;

        tracing::info!(user_id = %credential.user_id, "User logged in");
        Ok(pair)
    }

    /// Persist `token` as the only live refresh token of `user_id`
    pub async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        self.store
            .save_refresh_token(user_id, &storage_form(token, self.refresh_storage))
            .await
    }

    pub async fn verify_refresh_token(&self, user_id: Uuid, presented: &str) -> Result<(), AppError> {
        self.verify_refresh_token_at(user_id, presented, Utc::now()).await
    }

    /// Validate like an access token, then require it to be the stored one
    pub async fn verify_refresh_token_at(
        &self,
        user_id: Uuid,
        presented: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.verify_at(presented, TokenKind::Refresh, user_id, now)?;

        let stored = self
            .store
            .refresh_token(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !matches_stored(presented, &stored, self.refresh_storage) {
            tracing::warn!(user_id = %user_id, "Superseded refresh token presented");
            return Err(AuthError::InvalidToken.into());
        }

        Ok(())
    }

    /// Rotate: a valid refresh token buys a new pair and is itself replaced
    pub async fn refresh(&self, user_id: Uuid, presented: &str) -> Result<TokenPair, AppError> {
        self.verify_refresh_token(user_id, presented).await?;

        let pair = self.issue_pair(user_id, Utc::now())?;
        self.store_refresh_token(user_id, &pair.refresh_token).await?;

        tracing::info!(user_id = %user_id, "Refresh token rotated");
        Ok(pair)
    }

    /// Replace the password digest after checking the current password
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let credential = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| not_found("user"))?;

        if !verify_password(old_password, &credential.password_hash) {
            return Err(AuthError::OldPasswordMismatch.into());
        }

        let digest = hash_password(new_password)?;
        self.store.update_password_hash(user_id, &digest).await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    fn issue_pair(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.codec.encode_at(user_id, self.access_ttl, now)?,
            refresh_token: self.codec.encode_at(user_id, self.refresh_ttl, now)?,
        })
    }
}

/// JWT Claims structure
///
/// The payload carried by both access and refresh tokens: the identity the
/// token speaks for and its expiry. Wire shape is `{"id": "<uuid>", "exp": <unix seconds>}`,
/// plus a random `jti` on tokens we mint so that two tokens issued in the
/// same second never coincide.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User identity as a UUID string
    pub id: String,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Claims for `user_id` that expire `ttl` after `now`
    pub fn new(user_id: Uuid, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            id: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            jti: Some(Uuid::new_v4().to_string()),
        }
    }

    /// Extract the identity from the claims
    ///
    /// # Errors
    /// A claim that is not a UUID can only come from a token we did not
    /// mint, so it is reported as an invalid token.
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.id).map_err(|_| AuthError::InvalidToken)
    }

    /// True iff `now` is strictly past the expiry second
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let claims = Claims::new(user_id, Duration::minutes(15), now);

        assert_eq!(claims.id, user_id.to_string());
        assert_eq!(claims.exp, now.timestamp() + 900);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let claims = Claims::new(Uuid::new_v4(), Duration::seconds(60), now);

        assert!(!claims.is_expired_at(now + Duration::seconds(60)));
        assert!(claims.is_expired_at(now + Duration::seconds(61)));
    }

    #[test]
    fn test_user_id_extraction() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Duration::hours(1), Utc::now());

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_invalid_user_id() {
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1), Utc::now());
        claims.id = "invalid-uuid".to_string();

        assert_eq!(claims.user_id(), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_claims_minted_together_differ() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let first = Claims::new(user_id, Duration::days(7), now);
        let second = Claims::new(user_id, Duration::days(7), now);

        assert_eq!(first.exp, second.exp);
        assert_ne!(first, second);
    }

    #[test]
    fn test_wire_shape() {
        let claims = Claims {
            id: "11111111-1111-1111-1111-111111111111".to_string(),
            exp: 1_700_000_000,
            jti: None,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "11111111-1111-1111-1111-111111111111", "exp": 1_700_000_000})
        );
    }
}

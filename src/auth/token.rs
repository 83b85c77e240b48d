/// JWT Token Codec
///
/// Signs and parses `{id, exp, jti}` claims with HMAC-SHA-512. Parsing checks the
/// signature and the algorithm family but deliberately leaves expiry to the
/// caller, so an expired-but-genuine token can be told apart from a forged
/// or corrupted one.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::error::{AppError, AuthError};

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec around the process secret
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        // Any HMAC variant verifies against the shared secret; RSA, EC and
        // `none` headers are refused by the decoder.
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for `user_id` that expires `ttl` from now
    ///
    /// # Errors
    /// Returns an internal error if signing fails
    pub fn encode(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        self.encode_at(user_id, ttl, Utc::now())
    }

    /// Same as [`TokenCodec::encode`] with an explicit issue time
    pub fn encode_at(
        &self,
        user_id: Uuid,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims::new(user_id, ttl, now);

        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify signature and algorithm, returning the claims without
    /// judging expiry
    ///
    /// # Errors
    /// Any malformed, tampered, foreign-key or non-HMAC token yields
    /// `AuthError::InvalidToken`
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "JWT rejected");
                AuthError::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn identity() -> Uuid {
        Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap()
    }

    #[test]
    fn test_encode_then_decode_yields_identity() {
        let codec = TokenCodec::new(SECRET);

        let token = codec
            .encode(identity(), Duration::minutes(15))
            .expect("Failed to generate token");
        let claims = codec.decode(&token).expect("Failed to decode token");

        assert_eq!(claims.user_id().unwrap(), identity());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_header_is_hs512() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.encode(identity(), Duration::minutes(15)).unwrap();

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS512);
    }

    #[test]
    fn test_expired_token_still_decodes() {
        let codec = TokenCodec::new(SECRET);
        let issued = Utc::now() - Duration::hours(2);
        let token = codec
            .encode_at(identity(), Duration::minutes(15), issued)
            .unwrap();

        let claims = codec.decode(&token).expect("expiry is not the codec's concern");
        assert!(claims.is_expired());
    }

    #[test]
    fn test_invalid_token() {
        let codec = TokenCodec::new(SECRET);
        assert_eq!(codec.decode("invalid.token.here"), Err(AuthError::InvalidToken));
        assert_eq!(codec.decode(""), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_tampered_token() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.encode(identity(), Duration::minutes(15)).unwrap();

        let tampered = format!("{}X", token);
        assert_eq!(codec.decode(&tampered), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let ours = TokenCodec::new(SECRET);
        let theirs = TokenCodec::new("some-other-secret-entirely-different");

        let token = theirs.encode(identity(), Duration::minutes(15)).unwrap();
        assert_eq!(ours.decode(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_other_hmac_variant_is_accepted() {
        let codec = TokenCodec::new(SECRET);
        let claims = Claims::new(identity(), Duration::minutes(15), Utc::now());
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec.decode(&token).unwrap(), claims);
    }

    #[test]
    fn test_token_without_jti_is_accepted() {
        let codec = TokenCodec::new(SECRET);
        let claims = Claims {
            id: identity().to_string(),
            exp: (Utc::now() + Duration::minutes(15)).timestamp(),
            jti: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec.decode(&token).unwrap(), claims);
    }

    #[test]
    fn test_same_second_tokens_differ() {
        let codec = TokenCodec::new(SECRET);
        let now = Utc::now();

        let first = codec.encode_at(identity(), Duration::days(7), now).unwrap();
        let second = codec.encode_at(identity(), Duration::days(7), now).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_non_hmac_algorithms_are_rejected() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.encode(identity(), Duration::minutes(15)).unwrap();
        let mut parts = token.split('.');
        let _header = parts.next().unwrap();
        let payload = parts.next().unwrap();
        let signature = parts.next().unwrap();

        // {"alg":"RS256","typ":"JWT"} and {"alg":"none","typ":"JWT"}
        for forged_header in [
            "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9",
            "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0",
        ] {
            let forged = format!("{}.{}.{}", forged_header, payload, signature);
            assert_eq!(codec.decode(&forged), Err(AuthError::InvalidToken));

            let unsigned = format!("{}.{}.", forged_header, payload);
            assert_eq!(codec.decode(&unsigned), Err(AuthError::InvalidToken));
        }
    }
}

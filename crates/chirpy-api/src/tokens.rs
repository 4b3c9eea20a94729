use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use chirpy_types::api::Claims;

use crate::error::ApiError;

pub const ISSUER: &str = "chirpy";

/// Issues and verifies HS256 access tokens.
pub struct AccessTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl AccessTokens {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: u32) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("failed to sign access token: {e}")))
    }

    /// Returns the user id carried in `sub`.
    pub fn verify(&self, token: &str) -> Result<u32, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| ApiError::InvalidToken(e.to_string()))?;

        data.claims
            .sub
            .parse()
            .map_err(|_| ApiError::InvalidToken(format!("bad subject '{}'", data.claims.sub)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_round_trips_multi_digit_ids() {
        let tokens = AccessTokens::new("test-secret", Duration::hours(1));

        for id in [1, 9, 10, 57, 300, 65_536] {
            let token = tokens.issue(id).unwrap();
            assert_eq!(tokens.verify(&token).unwrap(), id);
        }
    }

    #[test]
    fn wrong_secret_fails() {
        let issuer = AccessTokens::new("secret-a", Duration::hours(1));
        let verifier = AccessTokens::new("secret-b", Duration::hours(1));

        let token = issuer.issue(4).unwrap();
        assert!(matches!(verifier.verify(&token), Err(ApiError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_fails() {
        // Well past the default 60s leeway.
        let tokens = AccessTokens::new("test-secret", Duration::minutes(-5));

        let token = tokens.issue(4).unwrap();
        assert!(matches!(tokens.verify(&token), Err(ApiError::InvalidToken(_))));
    }

    #[test]
    fn foreign_issuer_fails() {
        let tokens = AccessTokens::new("test-secret", Duration::hours(1));
        let claims = Claims {
            iss: "someone-else".into(),
            sub: "4".into(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(tokens.verify(&token), Err(ApiError::InvalidToken(_))));
    }

    #[test]
    fn garbage_fails() {
        let tokens = AccessTokens::new("test-secret", Duration::hours(1));
        assert!(tokens.verify("not.a.jwt").is_err());
    }
}

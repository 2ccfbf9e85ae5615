//! Bearer token issuance and validation.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use shelter_finder_core::UserId;

/// Token lifetime: 5 hours.
pub const TOKEN_TTL_SECS: i64 = 5 * 60 * 60;

/// JWT claims embedded in bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// JWT ID (unique per token).
    pub jti: String,
    /// Subject (user ID).
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Parse the subject back into a [`UserId`].
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse::<i64>().ok().map(UserId::new)
    }
}

/// Manages bearer token creation and validation.
#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenManager {
    /// Create a new `TokenManager` with the given secret.
    #[must_use]
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Issue a signed token for the given user.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, jsonwebtoken::errors::Error> {
        let now = now_secs();

        let claims = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate a token's signature and expiry, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is invalid or the token has expired.
    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}

fn now_secs() -> i64 {
    #[allow(clippy::cast_possible_wrap)]
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    secs
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_tokens() -> TokenManager {
        TokenManager::new(b"test-secret-key-for-testing", TOKEN_TTL_SECS)
    }

    #[test]
    fn issue_and_validate() {
        let tokens = test_tokens();
        let token = tokens.issue(UserId::new(7)).unwrap();

        let claims = tokens.validate(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.user_id(), Some(UserId::new(7)));
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn garbage_token_fails_validation() {
        let tokens = test_tokens();
        assert!(tokens.validate("not-a-valid-token").is_err());
    }

    #[test]
    fn wrong_secret_fails_validation() {
        let tokens1 = test_tokens();
        let tokens2 = TokenManager::new(b"different-secret", TOKEN_TTL_SECS);

        let token = tokens1.issue(UserId::new(1)).unwrap();
        assert!(tokens2.validate(&token).is_err());
    }

    #[test]
    fn expired_token_fails_validation() {
        // Negative TTL well past the default validation leeway.
        let tokens = TokenManager::new(b"test-secret-key-for-testing", -3600);
        let token = tokens.issue(UserId::new(1)).unwrap();
        assert!(test_tokens().validate(&token).is_err());
    }

    #[test]
    fn non_numeric_subject_has_no_user_id() {
        let claims = Claims {
            jti: "j".to_string(),
            sub: "abc".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(claims.user_id().is_none());
    }
}

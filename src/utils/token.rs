// utils/token.rs
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorMessage, HttpError};

/// Claims minted by the identity service; this crate only verifies them.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Decode a token and return its subject (the user id).
pub fn decode_token<T: Into<String>>(token: T, secret: &[u8]) -> Result<String, HttpError> {
    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    );

    match decoded {
        Ok(token) => Ok(token.claims.sub),
        Err(_) => Err(HttpError::unauthorized(
            ErrorMessage::InvalidToken.to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn mint_token(user_id: &str, secret: &[u8], expires_in_seconds: i64) -> String {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::seconds(expires_in_seconds)).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn round_trips_the_user_id() {
        let secret = b"test-secret";
        let token = mint_token("a7f9d1d2-0000-0000-0000-000000000000", secret, 60);
        let sub = decode_token(token, secret).unwrap();
        assert_eq!(sub, "a7f9d1d2-0000-0000-0000-000000000000");
    }

    #[test]
    fn rejects_a_foreign_secret() {
        let token = mint_token("user", b"secret-a", 60);
        assert!(decode_token(token, b"secret-b").is_err());
    }

    #[test]
    fn rejects_an_expired_token() {
        let token = mint_token("user", b"secret", -60);
        assert!(decode_token(token, b"secret").is_err());
    }
}

//! Signed bearer tokens. HS256 with a shared secret; the subject is the
//! user's email address.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encode(jsonwebtoken::errors::Error),
    #[error("invalid or expired token")]
    Invalid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User email.
    pub sub: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: Duration,
}

impl TokenSigner {
    pub fn new(secret: &[u8], expiry: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            expiry,
        }
    }

    pub fn sign(&self, email: &str) -> Result<String, TokenError> {
        let claims = Claims {
            sub: email.to_string(),
            exp: (Utc::now() + self.expiry).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Encode)
    }

    /// Returns the subject email for a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| TokenError::Invalid)?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_subject() {
        let signer = TokenSigner::new(b"secret", Duration::minutes(30));
        let token = signer.sign("a@b.c").unwrap();
        assert_eq!(signer.verify(&token).unwrap(), "a@b.c");
    }

    #[test]
    fn rejects_foreign_secret() {
        let signer = TokenSigner::new(b"secret", Duration::minutes(30));
        let other = TokenSigner::new(b"other", Duration::minutes(30));
        let token = signer.sign("a@b.c").unwrap();
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn rejects_expired_token() {
        let signer = TokenSigner::new(b"secret", Duration::minutes(-5));
        let token = signer.sign("a@b.c").unwrap();
        assert!(matches!(signer.verify(&token), Err(TokenError::Invalid)));
    }
}

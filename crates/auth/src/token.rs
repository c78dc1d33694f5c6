//! Session token signing and verification.
//!
//! Tokens are HS256 JWTs signed with `AUTH_SECRET`. Expiry is enforced on
//! decode; a token that fails any check is treated as "no session".

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::models::SessionToken;

/// Errors from encoding or decoding session tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec from the signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Sign `token`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if serialization or signing fails.
    pub fn encode(&self, token: &SessionToken) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), token, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify and decode a signed token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for expired tokens and
    /// `TokenError::Invalid` for anything else that fails verification.
    pub fn decode(&self, raw: &str) -> Result<SessionToken, TokenError> {
        decode::<SessionToken>(raw, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("session token rejected: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use vieux_carre_core::{UserId, UserRole};

    use super::*;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(&SecretString::from(secret.to_string()))
    }

    fn signed_in_token() -> SessionToken {
        let id = UserId::generate();
        SessionToken {
            sub: Some(id),
            id: Some(id),
            role: Some(UserRole::User),
            name: Some("marie".to_string()),
            ..SessionToken::issued_at(Utc::now(), 3600)
        }
    }

    #[test]
    fn test_decode_returns_signed_claims() {
        let codec = codec("k3J9!xQ2@vL7#pZ4$wT8%nB5^mR1&cY6");
        let token = signed_in_token();
        let raw = codec.encode(&token).unwrap();
        assert_eq!(codec.decode(&raw).unwrap(), token);
    }

    #[test]
    fn test_decode_rejects_other_secret() {
        let raw = codec("k3J9!xQ2@vL7#pZ4$wT8%nB5^mR1&cY6")
            .encode(&signed_in_token())
            .unwrap();
        let err = codec("Zq8#Lw3!Rt6@Yp1$Kd4%Vb7^Nm2&Hs5*")
            .decode(&raw)
            .unwrap_err();
        assert!(matches!(err, TokenError::Invalid));
    }

    #[test]
    fn test_decode_rejects_expired() {
        let codec = codec("k3J9!xQ2@vL7#pZ4$wT8%nB5^mR1&cY6");
        let mut token = signed_in_token();
        token.refresh(Utc::now() - Duration::days(2), 3600);
        let raw = codec.encode(&token).unwrap();
        assert!(matches!(codec.decode(&raw), Err(TokenError::Expired)));
    }

    #[test]
    fn test_decode_requires_subject() {
        let codec = codec("k3J9!xQ2@vL7#pZ4$wT8%nB5^mR1&cY6");
        let raw = codec
            .encode(&SessionToken::issued_at(Utc::now(), 3600))
            .unwrap();
        assert!(codec.decode(&raw).is_err());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            codec("k3J9!xQ2@vL7#pZ4$wT8%nB5^mR1&cY6").decode("not.a.token"),
            Err(TokenError::Invalid)
        ));
    }
}

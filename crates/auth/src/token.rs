//! HS256 encoding/decoding of session claims.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use minibank_core::{DomainError, DomainResult};

use crate::claims::SessionClaims;

/// Signs and verifies session tokens with a shared secret.
///
/// Only the signature and claim shape are checked here. Expiry is checked by
/// [`crate::validate_claims`] against an explicit clock so tests stay
/// deterministic.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn hs256(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn encode(&self, claims: &SessionClaims) -> DomainResult<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| DomainError::internal(format!("token signing failed: {e}")))
    }

    /// Verify the signature and parse the claims.
    pub fn decode(&self, token: &str) -> DomainResult<SessionClaims> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                DomainError::InvalidToken
            })
    }
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &"HS256")
            .finish_non_exhaustive()
    }
}

//! Session data kept after signing in

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::AuthUser;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Session data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The bearer token issued by the API
    pub token: String,

    /// The signed-in user, when the API returned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,

    /// Expiry as seconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl Session {
    /// Create a session from an issued token.
    ///
    /// When the token is a JWT its `exp` claim becomes the session expiry.
    /// The signature is not checked here; the API remains the authority.
    pub fn from_token(token: String, user: Option<AuthUser>) -> Self {
        let expires_at = token_expiry(&token);
        Self {
            token,
            user,
            expires_at,
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => now() >= expires_at,
            None => false,
        }
    }
}

fn token_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.exp)
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    #[test]
    fn reads_expiry_from_jwt() {
        let exp = now() + 3600;
        let token = encode(
            &Header::default(),
            &json!({ "sub": "admin", "exp": exp }),
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap();

        let session = Session::from_token(token, None);
        assert_eq!(session.expires_at, Some(exp));
        assert!(!session.is_expired());
    }

    #[test]
    fn past_expiry_is_expired() {
        let token = encode(
            &Header::default(),
            &json!({ "sub": "admin", "exp": 1_000 }),
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap();
        assert!(Session::from_token(token, None).is_expired());
    }

    #[test]
    fn opaque_tokens_never_expire_locally() {
        let session = Session::from_token("abc123".to_string(), None);
        assert_eq!(session.expires_at, None);
        assert!(!session.is_expired());
    }
}

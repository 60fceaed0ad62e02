//! Bearer token signing and verification.
//!
//! Tokens are HMAC-SHA256 signed, time-limited, and carry the user id:
//! `sh_<base64url(payload)>.<base64url(mac)>` where the payload is a small
//! JSON object `{"uid": ..., "exp": ...}`. The signing secret comes from
//! the application configuration, constructed once at startup.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Token prefix, also useful for log scrubbing rules.
const TOKEN_PREFIX: &str = "sh_";

/// Verified token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    uid: Uuid,
    exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    /// Create a signer from the configured secret.
    ///
    /// Secrets shorter than 32 bytes are rejected at startup rather than
    /// silently weakening every token issued.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self> {
        let secret = secret.into();
        if secret.len() < 32 {
            return Err(Error::Config(
                "TOKEN_SECRET must be at least 32 bytes".to_string(),
            ));
        }
        Ok(Self { secret })
    }

    /// Issue a token for the given user, valid for `ttl` from now.
    pub fn sign(&self, user_id: Uuid, ttl: Duration) -> Result<String> {
        let claims = Claims {
            uid: user_id,
            exp: (Utc::now() + ttl).timestamp(),
        };
        let payload = serde_json::to_vec(&claims)?;
        let encoded = URL_SAFE_NO_PAD.encode(&payload);

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| Error::Internal(format!("HMAC init: {}", e)))?;
        mac.update(encoded.as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}{}.{}", TOKEN_PREFIX, encoded, sig))
    }

    /// Verify a token and return its claims.
    ///
    /// Rejects malformed tokens, bad signatures, and expired tokens with
    /// `Error::Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<AuthToken> {
        let rest = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| Error::Unauthorized("Malformed token".to_string()))?;
        let (encoded, sig) = rest
            .split_once('.')
            .ok_or_else(|| Error::Unauthorized("Malformed token".to_string()))?;

        let sig_bytes = URL_SAFE_NO_PAD
            .decode(sig)
            .map_err(|_| Error::Unauthorized("Malformed token signature".to_string()))?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| Error::Internal(format!("HMAC init: {}", e)))?;
        mac.update(encoded.as_bytes());
        mac.verify_slice(&sig_bytes)
            .map_err(|_| Error::Unauthorized("Invalid token signature".to_string()))?;

        let payload = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| Error::Unauthorized("Malformed token payload".to_string()))?;
        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|_| Error::Unauthorized("Malformed token payload".to_string()))?;

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| Error::Unauthorized("Malformed token expiry".to_string()))?;
        if expires_at <= Utc::now() {
            return Err(Error::Unauthorized("Token expired".to_string()));
        }

        Ok(AuthToken {
            user_id: claims.uid,
            expires_at,
        })
    }
}

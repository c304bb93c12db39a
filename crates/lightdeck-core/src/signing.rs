//! Request signing for the device-control service.
//!
//! Every request carries four authentication headers:
//!
//! | Header | Value |
//! |--------|-------|
//! | `Authorization` | the API token |
//! | `t` | freshness token, epoch milliseconds as a decimal string |
//! | `nonce` | 128 random bits as 32 lowercase hex characters |
//! | `sign` | `Base64(HMAC-SHA256(secret, token + t + nonce))` |
//!
//! The shared secret is only ever used as the HMAC key; it never leaves the
//! process. A fresh token/nonce pair is generated for every request.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::OffsetDateTime;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// API token and signing secret for the device-control service.
#[derive(Clone)]
pub struct Credentials {
    token: String,
    secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Create credentials from an API token and the HMAC signing secret.
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }

    /// The API token sent in the `Authorization` header.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Sign a new request with the current time and a fresh nonce.
    pub fn sign(&self) -> Result<SignedHeaders> {
        self.sign_with(freshness_token(), make_nonce())
    }

    /// Sign with an explicit freshness token and nonce.
    pub fn sign_with(&self, t: String, nonce: String) -> Result<SignedHeaders> {
        let sign = signature(&self.token, &self.secret, &t, &nonce)?;
        Ok(SignedHeaders {
            authorization: self.token.clone(),
            t,
            nonce,
            sign,
        })
    }
}

/// Authentication header values for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `Authorization` header (the API token).
    pub authorization: String,
    /// `t` header.
    pub t: String,
    /// `nonce` header.
    pub nonce: String,
    /// `sign` header.
    pub sign: String,
}

impl SignedHeaders {
    /// Attach the headers to a request.
    pub fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .header("t", &self.t)
            .header("nonce", &self.nonce)
            .header("sign", &self.sign)
    }
}

/// Compute `Base64(HMAC-SHA256(secret, token + t + nonce))`.
pub fn signature(token: &str, secret: &str, t: &str, nonce: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::invalid_config(format!("signing key rejected: {}", e)))?;
    mac.update(token.as_bytes());
    mac.update(t.as_bytes());
    mac.update(nonce.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Current epoch time in milliseconds, as a decimal string.
pub fn freshness_token() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    millis.to_string()
}

/// 128 random bits rendered as 32 lowercase hex characters.
pub fn make_nonce() -> String {
    format!("{:032x}", rand::random::<u128>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_known_vector() {
        let sign = signature(
            "api-token",
            "secret-key",
            "1700000000000",
            "0123456789abcdef0123456789abcdef",
        )
        .unwrap();
        assert_eq!(sign, "yaWZDww1U+sa7W0xWxJWamfr+Ak9lyQa6bC2bmPpg6w=");
    }

    #[test]
    fn test_signature_empty_inputs() {
        let sign = signature("", "", "", "").unwrap();
        assert_eq!(sign, "thNnmggU2ex3L5XXeMNfxf8Wl8STcVZTxscSFEKSxa0=");
    }

    #[test]
    fn test_signature_depends_on_every_input() {
        let base = signature("tok", "sec", "1", "n").unwrap();
        assert_ne!(base, signature("tok2", "sec", "1", "n").unwrap());
        assert_ne!(base, signature("tok", "sec2", "1", "n").unwrap());
        assert_ne!(base, signature("tok", "sec", "2", "n").unwrap());
        assert_ne!(base, signature("tok", "sec", "1", "m").unwrap());
    }

    #[test]
    fn test_nonce_format() {
        let nonce = make_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(
            nonce
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn test_nonce_is_fresh() {
        assert_ne!(make_nonce(), make_nonce());
    }

    #[test]
    fn test_freshness_token_is_epoch_millis() {
        let t: i128 = freshness_token().parse().unwrap();
        // 2020-01-01 .. 2100-01-01 in milliseconds
        assert!(t > 1_577_836_800_000);
        assert!(t < 4_102_444_800_000);
    }

    #[test]
    fn test_sign_with_uses_given_values() {
        let creds = Credentials::new("api-token", "secret-key");
        let headers = creds
            .sign_with(
                "1700000000000".to_string(),
                "0123456789abcdef0123456789abcdef".to_string(),
            )
            .unwrap();
        assert_eq!(headers.authorization, "api-token");
        assert_eq!(headers.t, "1700000000000");
        assert_eq!(headers.nonce, "0123456789abcdef0123456789abcdef");
        assert_eq!(headers.sign, "yaWZDww1U+sa7W0xWxJWamfr+Ak9lyQa6bC2bmPpg6w=");
    }

    #[test]
    fn test_sign_never_reuses_nonce() {
        let creds = Credentials::new("tok", "sec");
        let a = creds.sign().unwrap();
        let b = creds.sign().unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.sign, b.sign);
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials::new("my-token", "my-secret");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("my-token"));
        assert!(!debug.contains("my-secret"));
    }
}

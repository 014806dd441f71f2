//! Signature verification for identity provider webhooks.
//!
//! Deliveries carry `svix-id`, `svix-timestamp` and `svix-signature` headers.
//! The signature is HMAC-SHA256 over `"{id}.{timestamp}.{body}"`, base64
//! encoded, listed as space-separated `v1,<signature>` entries.

use axum::http::HeaderMap;
use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_ID: &str = "svix-id";
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";
pub const HEADER_SIGNATURE: &str = "svix-signature";

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Missing or unreadable {0} header")]
    MissingHeader(&'static str),

    #[error("Invalid signing secret: {0}")]
    InvalidSecret(String),

    #[error("Invalid webhook timestamp")]
    InvalidTimestamp,

    #[error("Webhook timestamp outside of tolerance")]
    TimestampOutOfTolerance,

    #[error("No matching webhook signature")]
    InvalidSignature,
}

pub struct WebhookVerifier {
    key: Vec<u8>,
    tolerance: Duration,
}

impl WebhookVerifier {
    /// `secret` is `whsec_<base64 key>`; the bare base64 key is accepted too.
    pub fn new(secret: &str, tolerance: Duration) -> Result<Self, WebhookError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| WebhookError::InvalidSecret(e.to_string()))?;

        if key.is_empty() {
            return Err(WebhookError::InvalidSecret("empty key".to_string()));
        }

        Ok(Self { key, tolerance })
    }

    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), WebhookError> {
        self.verify_at(headers, body, chrono::Utc::now().timestamp())
    }

    fn verify_at(&self, headers: &HeaderMap, body: &[u8], now: i64) -> Result<(), WebhookError> {
        let msg_id = header(headers, HEADER_ID)?;
        let timestamp = header(headers, HEADER_TIMESTAMP)?;
        let signatures = header(headers, HEADER_SIGNATURE)?;

        let sent_at: i64 = timestamp
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp)?;
        if now.abs_diff(sent_at) > self.tolerance.as_secs() {
            return Err(WebhookError::TimestampOutOfTolerance);
        }

        let mac = self.mac(msg_id, timestamp, body)?;

        let matched = signatures
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .filter_map(|(_, signature)| BASE64_STANDARD.decode(signature).ok())
            .any(|signature| mac.clone().verify_slice(&signature).is_ok());

        if matched {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }

    /// Base64 signature of a delivery
    pub fn sign(&self, msg_id: &str, timestamp: &str, body: &[u8]) -> Result<String, WebhookError> {
        let mac = self.mac(msg_id, timestamp, body)?;
        Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
    }

    fn mac(&self, msg_id: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, WebhookError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| WebhookError::InvalidSecret(e.to_string()))?;
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac)
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";
    const NOW: i64 = 1_760_000_000;
    const BODY: &[u8] = br#"{"type":"user.created","data":{"id":"user_1"}}"#;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SECRET, Duration::from_secs(300)).unwrap()
    }

    fn signed_headers(verifier: &WebhookVerifier, timestamp: i64, body: &[u8]) -> HeaderMap {
        let timestamp = timestamp.to_string();
        let signature = verifier.sign("msg_1", &timestamp, body).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(HEADER_ID, HeaderValue::from_static("msg_1"));
        headers.insert(HEADER_TIMESTAMP, HeaderValue::from_str(&timestamp).unwrap());
        headers.insert(
            HEADER_SIGNATURE,
            HeaderValue::from_str(&format!("v1,bm90LWl0 v1,{}", signature)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_signature_is_accepted() {
        let verifier = verifier();
        let headers = signed_headers(&verifier, NOW, BODY);
        assert!(verifier.verify_at(&headers, BODY, NOW + 10).is_ok());
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let verifier = verifier();
        let headers = signed_headers(&verifier, NOW, BODY);
        let tampered = br#"{"type":"user.created","data":{"id":"user_2"}}"#;
        assert!(matches!(
            verifier.verify_at(&headers, tampered, NOW),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let other = WebhookVerifier::new("whsec_c2VjcmV0LWtleS1mb3ItdGVzdHM=", Duration::from_secs(300))
            .unwrap();
        let headers = signed_headers(&other, NOW, BODY);
        assert!(matches!(
            verifier().verify_at(&headers, BODY, NOW),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let verifier = verifier();
        let headers = signed_headers(&verifier, NOW - 301, BODY);
        assert!(matches!(
            verifier.verify_at(&headers, BODY, NOW),
            Err(WebhookError::TimestampOutOfTolerance)
        ));
    }

    #[test]
    fn test_missing_headers_are_rejected() {
        assert!(matches!(
            verifier().verify_at(&HeaderMap::new(), BODY, NOW),
            Err(WebhookError::MissingHeader(HEADER_ID))
        ));
    }

    #[test]
    fn test_invalid_secret() {
        assert!(WebhookVerifier::new("whsec_***", Duration::from_secs(300)).is_err());
    }
}

//! Webhook secret verification.
//!
//! With a secret configured, a request must carry either:
//!   1. `X-Webhook-Secret: <secret>`, or
//!   2. `X-Hub-Signature-256: sha256=<hex>` (also accepted as `X-Hub-Signature`),
//!      an HMAC-SHA256 of the raw body keyed with the secret.
//!
//! Both comparisons are constant-time.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const SECRET_HEADER: &str = "x-webhook-secret";
pub const SIGNATURE_HEADERS: [&str; 2] = ["x-hub-signature-256", "x-hub-signature"];

pub fn verify_request(secret: &str, headers: &HeaderMap, body: &[u8]) -> bool {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Some(provided) = header(SECRET_HEADER) {
        return shared_secret_matches(secret, provided);
    }

    SIGNATURE_HEADERS
        .iter()
        .find_map(|name| header(*name))
        .is_some_and(|signature| signature_matches(secret, body, signature))
}

/// Hash both sides to a fixed length so the comparison does not leak the length
fn shared_secret_matches(secret: &str, provided: &str) -> bool {
    let expected = Sha256::digest(secret.as_bytes());
    let provided = Sha256::digest(provided.as_bytes());
    bool::from(provided.as_slice().ct_eq(expected.as_slice()))
}

fn signature_matches(secret: &str, body: &[u8], signature: &str) -> bool {
    let sig_hex = signature.strip_prefix("sha256=").unwrap_or(signature);

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let computed = hex::encode(mac.finalize().into_bytes());

    bool::from(computed.as_bytes().ct_eq(sig_hex.as_bytes()))
}

/// `sha256=<hex>` signature of `body`, as a caller would compute it
pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

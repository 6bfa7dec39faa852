//! Verification and parsing of inbound Stripe webhook events.
//!
//! The `Stripe-Signature` header carries a timestamp and one or more `v1`
//! signatures: `t=1492774577,v1=5257a869...,v1=...`. The signed payload is
//! `"{t}.{raw body}"` keyed with the endpoint secret.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed event, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StripeSignatureError {
    #[error("missing Stripe-Signature header")]
    MissingHeader,
    #[error("malformed Stripe-Signature header")]
    Malformed,
    #[error("signature timestamp outside the tolerance window")]
    Expired,
    #[error("no matching signature")]
    Mismatch,
}

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, StripeSignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| StripeSignatureError::Malformed)?,
                )
            }
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(SignatureHeader {
            timestamp,
            signatures,
        }),
        _ => Err(StripeSignatureError::Malformed),
    }
}

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, StripeSignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| StripeSignatureError::Malformed)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Verifies `header` against the raw `payload` at time `now` (unix seconds).
pub fn verify_signature(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    now: i64,
) -> Result<(), StripeSignatureError> {
    let header = header.ok_or(StripeSignatureError::MissingHeader)?;
    let parsed = parse_header(header)?;

    if (now - parsed.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(StripeSignatureError::Expired);
    }

    let matched = parsed.signatures.iter().any(|candidate| {
        mac_for(secret, parsed.timestamp, payload)
            .map(|mac| mac.verify_slice(candidate).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(StripeSignatureError::Mismatch)
    }
}

/// Builds a header value for `payload`; used by tests and local tooling.
pub fn signature_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let signature = mac_for(secret, timestamp, payload)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default();
    format!("t={timestamp},v1={signature}")
}

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: Value,
}

impl StripeEvent {
    pub fn object_str(&self, key: &str) -> Option<&str> {
        self.data.object.get(key).and_then(Value::as_str)
    }

    /// Price id of the first subscription item, used as the plan name.
    pub fn subscription_plan(&self) -> Option<&str> {
        self.data
            .object
            .pointer("/items/data/0/price/id")
            .and_then(Value::as_str)
    }
}

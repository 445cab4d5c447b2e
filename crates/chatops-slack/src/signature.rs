//! Slack request signing (`v0` scheme) verification.

use chatops_core::unix_skew_seconds;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

pub const SLACK_TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SLACK_SIGNATURE_HEADER: &str = "x-slack-signature";
pub const DEFAULT_SIGNATURE_TOLERANCE_SECONDS: u64 = 300;

const SIGNATURE_VERSION: &str = "v0";

/// Authentication failures. All of them reject the request before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    #[error("invalid timestamp")]
    InvalidTimestamp,
    #[error("stale request")]
    Stale,
    #[error("invalid signature")]
    InvalidSignature,
}

/// Confirms that `body` was signed by the holder of `signing_secret`.
///
/// The timestamp must be within `tolerance_seconds` of `now_unix` in either
/// direction. The signature comparison is constant-time. `body` is only
/// borrowed, so callers can parse it afterwards.
pub fn verify_slack_signature(
    body: &[u8],
    timestamp_header: Option<&str>,
    signature_header: Option<&str>,
    signing_secret: &str,
    now_unix: i64,
    tolerance_seconds: u64,
) -> Result<(), SignatureError> {
    let timestamp = timestamp_header
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(SignatureError::MissingHeader(SLACK_TIMESTAMP_HEADER))?;
    let signature = signature_header
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(SignatureError::MissingHeader(SLACK_SIGNATURE_HEADER))?;

    let issued_at = timestamp
        .parse::<i64>()
        .map_err(|_| SignatureError::InvalidTimestamp)?;
    if unix_skew_seconds(now_unix, issued_at) > tolerance_seconds {
        return Err(SignatureError::Stale);
    }

    let digest_hex = signature
        .strip_prefix("v0=")
        .ok_or(SignatureError::InvalidSignature)?;
    let claimed = decode_lower_hex(digest_hex).ok_or(SignatureError::InvalidSignature)?;
    let mac = signing_mac(signing_secret, timestamp, body)?;
    mac.verify_slice(&claimed)
        .map_err(|_| SignatureError::InvalidSignature)
}

/// Produces the `v0=<hex>` header value Slack would send for `body`.
pub fn compute_slack_signature(
    signing_secret: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<String, SignatureError> {
    let digest = signing_mac(signing_secret, timestamp, body)?
        .finalize()
        .into_bytes();
    Ok(format!(
        "{SIGNATURE_VERSION}={}",
        digest
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<String>()
    ))
}

fn signing_mac(
    signing_secret: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<Hmac<Sha256>, SignatureError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(signing_secret.as_bytes())
        .map_err(|_| SignatureError::InvalidSignature)?;
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

// Slack emits lowercase hex; anything else cannot be a genuine signature.
fn decode_lower_hex(raw: &str) -> Option<Vec<u8>> {
    if raw.is_empty() || !raw.len().is_multiple_of(2) {
        return None;
    }
    raw.as_bytes()
        .chunks(2)
        .map(|pair| Some((lower_hex_value(pair[0])? << 4) | lower_hex_value(pair[1])?))
        .collect()
}

fn lower_hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}
